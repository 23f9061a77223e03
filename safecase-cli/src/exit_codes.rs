//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different outcomes,
//! enabling scripts and CI systems to act on a scan result.

use safecase_core::SafecaseError;

/// Successful execution, no harmful content.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Harmful content detected.
pub const HARM_DETECTED: i32 = 2;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Cannot open or use the input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// OCR service unreachable or failing.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const SERVICE_UNAVAILABLE: i32 = 69;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub const fn harm_detected() -> Self {
        Self {
            code: HARM_DETECTED,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify by the first typed cause in the chain
        let code = err
            .chain()
            .find_map(|cause| {
                if let Some(e) = cause.downcast_ref::<SafecaseError>() {
                    Some(match e {
                        SafecaseError::InvalidInput(_) => INPUT_ERROR,
                        SafecaseError::ExtractionFailure(_)
                        | SafecaseError::AnalysisFailure(_)
                        | SafecaseError::HttpError(_) => SERVICE_UNAVAILABLE,
                        _ => GENERAL_ERROR,
                    })
                } else if cause.downcast_ref::<std::io::Error>().is_some() {
                    Some(INPUT_ERROR)
                } else {
                    None
                }
            })
            .unwrap_or(GENERAL_ERROR);

        Self {
            code,
            message: Some(message),
        }
    }
}
