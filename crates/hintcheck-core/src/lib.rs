//! hintcheck core
//!
//! Core domain model with stable, versioned types.
//! Never rename diagnostic codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod report;

pub use config::{Config, ConfigError, TelemetryConfig};
pub use diagnostic::{Diagnostic, DiagnosticCode, Location};
pub use report::{Report, ReportSummary, ReportVersion};
