//! Diagnostic codes and violation reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
/// Every code is a violation and fails the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A partitioned model does not carry the matching REBALANCE hint
    RebalanceHintMissing,

    /// `partition_by` has a shape that cannot be turned into a column list
    RebalancePartitionUnrecognized,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RebalanceHintMissing => "REBALANCE_HINT_MISSING",
            Self::RebalancePartitionUnrecognized => "REBALANCE_PARTITION_UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source location in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root
    pub file: String,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Display name of the model the diagnostic is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Expected value (the hint that should be present)
    pub expected: Option<String>,

    /// Partition descriptor the expectation was derived from
    pub partition: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            model: None,
            expected: None,
            partition: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the model display name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the expected hint and the partition descriptor it came from
    pub fn with_expectation(mut self, expected: impl Into<String>, partition: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.partition = Some(partition.into());
        self
    }
}
