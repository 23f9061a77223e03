//! Support resource directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafecaseError};
use crate::model::ThreatLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportCategory {
    Emergency,
    Police,
    Medical,
    Counseling,
    Legal,
}

impl SupportCategory {
    pub const ALL: [SupportCategory; 5] = [
        Self::Emergency,
        Self::Police,
        Self::Medical,
        Self::Counseling,
        Self::Legal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Police => "police",
            Self::Medical => "medical",
            Self::Counseling => "counseling",
            Self::Legal => "legal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Emergency => "Emergency",
            Self::Police => "Police & Cyber Crime",
            Self::Medical => "Medical Care",
            Self::Counseling => "Counseling & Support",
            Self::Legal => "Legal Aid",
        }
    }

    /// Categories to surface for a threat level, most urgent first.
    pub fn recommended_for(level: ThreatLevel) -> &'static [SupportCategory] {
        match level {
            ThreatLevel::Critical | ThreatLevel::High => {
                &[Self::Emergency, Self::Police, Self::Counseling, Self::Legal]
            }
            ThreatLevel::Medium => &[Self::Counseling, Self::Legal],
            ThreatLevel::Low | ThreatLevel::None => &[Self::Counseling],
        }
    }
}

impl fmt::Display for SupportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportCategory {
    type Err = SafecaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SafecaseError::InvalidInput(format!("Unknown support category '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportResource {
    pub name: String,
    pub category: SupportCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub region: String,
    pub available_24_7: bool,
    pub verified: bool,
}

impl SupportResource {
    /// One-line contact summary: `Name (phone, website)`.
    pub fn contact_line(&self) -> String {
        let contacts: Vec<&str> = [self.phone.as_deref(), self.website.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if contacts.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, contacts.join(", "))
        }
    }
}

/// Ordered, filterable list of support resources.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportDirectory {
    resources: Vec<SupportResource>,
}

impl Default for SupportDirectory {
    fn default() -> Self {
        Self::new(default_resources())
    }
}

impl SupportDirectory {
    /// Directory over `resources`, ordered by category then name.
    pub fn new(mut resources: Vec<SupportResource>) -> Self {
        resources.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Self { resources }
    }

    pub fn all(&self) -> &[SupportResource] {
        &self.resources
    }

    pub fn by_category(&self, category: SupportCategory) -> Vec<&SupportResource> {
        self.resources
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Resources for a threat level, grouped in recommendation order.
    pub fn recommend(&self, level: ThreatLevel) -> Vec<&SupportResource> {
        SupportCategory::recommended_for(level)
            .iter()
            .flat_map(|category| self.by_category(*category))
            .collect()
    }

    /// Closing line for exported reports.
    pub fn closing_line(&self) -> String {
        let urgent: Vec<String> = self
            .by_category(SupportCategory::Emergency)
            .into_iter()
            .chain(self.by_category(SupportCategory::Counseling).into_iter().take(1))
            .map(SupportResource::contact_line)
            .collect();
        if urgent.is_empty() {
            "If you are in danger, contact your local emergency services.".to_string()
        } else {
            format!(
                "If you are in danger, contact your local emergency services. Support: {}.",
                urgent.join("; ")
            )
        }
    }
}

fn resource(
    name: &str,
    category: SupportCategory,
    description: &str,
    phone: Option<&str>,
    website: Option<&str>,
    available_24_7: bool,
) -> SupportResource {
    SupportResource {
        name: name.to_string(),
        category,
        description: description.to_string(),
        phone: phone.map(str::to_string),
        website: website.map(str::to_string),
        region: "US".to_string(),
        available_24_7,
        verified: true,
    }
}

fn default_resources() -> Vec<SupportResource> {
    use SupportCategory::*;

    vec![
        resource(
            "Emergency Services",
            Emergency,
            "Immediate danger to life or safety.",
            Some("911"),
            None,
            true,
        ),
        resource(
            "FBI Internet Crime Complaint Center",
            Police,
            "Report online extortion, sextortion and cyber harassment.",
            None,
            Some("https://www.ic3.gov"),
            true,
        ),
        resource(
            "Local Police Non-Emergency Line",
            Police,
            "File a report for threats or stalking that are not immediately dangerous.",
            Some("311"),
            None,
            false,
        ),
        resource(
            "RAINN Sexual Assault Hotline",
            Medical,
            "Referral to local sexual assault care and forensic exams.",
            Some("1-800-656-4673"),
            Some("https://www.rainn.org"),
            true,
        ),
        resource(
            "988 Suicide & Crisis Lifeline",
            Counseling,
            "Confidential crisis counseling by call or text.",
            Some("988"),
            Some("https://988lifeline.org"),
            true,
        ),
        resource(
            "National Domestic Violence Hotline",
            Counseling,
            "Safety planning and support for abuse and intimidation.",
            Some("1-800-799-7233"),
            Some("https://www.thehotline.org"),
            true,
        ),
        resource(
            "Cyber Civil Rights Initiative Helpline",
            Legal,
            "Guidance for non-consensual image sharing and online abuse.",
            Some("844-878-2274"),
            Some("https://cybercivilrights.org"),
            false,
        ),
        resource(
            "LawHelp.org",
            Legal,
            "Directory of free legal aid organizations.",
            None,
            Some("https://www.lawhelp.org"),
            false,
        ),
    ]
}
