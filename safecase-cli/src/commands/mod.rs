//! Subcommand implementations.

pub mod classify;
pub mod scan;
pub mod support;
