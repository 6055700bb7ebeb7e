//! REBALANCE hint verification
//!
//! Every partitioned model must carry `/*+ REBALANCE(<columns>) */` in its
//! compiled SQL, with the columns exactly as declared in `partition_by`.

use hintcheck_core::{Diagnostic, DiagnosticCode, Location, Report};
use hintcheck_dbt::{Model, PartitionSpec};

/// Hint a model partitioned by `descriptor` must contain
pub fn rebalance_hint(descriptor: &str) -> String {
    format!("/*+ REBALANCE({descriptor}) */")
}

/// Result of checking one model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    /// No `partition_by` in the model config: out of scope
    NotPartitioned,

    /// The expected hint is present
    Compliant {
        /// The hint that was found
        hint: String,
    },

    /// The expected hint is missing or cannot be derived
    Violation(Diagnostic),
}

/// Outcome for a single model, detached from the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResult {
    pub unique_id: String,
    pub name: String,
    pub outcome: ModelOutcome,
}

/// Outcomes of a whole run, in evaluation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    pub results: Vec<ModelResult>,
}

impl CheckOutcome {
    /// Process status: 1 if any model failed, 0 otherwise
    ///
    /// Computed over every result, so a later compliant model never masks an
    /// earlier violation.
    pub fn status(&self) -> i32 {
        i32::from(self.violations().next().is_some())
    }

    /// Diagnostics of every violation
    pub fn violations(&self) -> impl Iterator<Item = &Diagnostic> {
        self.results.iter().filter_map(|result| match &result.outcome {
            ModelOutcome::Violation(diagnostic) => Some(diagnostic),
            _ => None,
        })
    }

    /// Number of models that declared partitioning and were evaluated
    pub fn partitioned_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome != ModelOutcome::NotPartitioned)
            .count()
    }

    /// Build a v1 report from the violations
    pub fn to_report(&self) -> Report {
        Report::from_diagnostics(self.violations().cloned().collect())
            .with_model_counts(self.results.len(), self.partitioned_count())
    }
}

/// Checks resolved models for their REBALANCE hint
#[derive(Debug, Clone, Copy, Default)]
pub struct HintChecker;

impl HintChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check every model; evaluation is independent per model
    pub fn check(&self, models: &[Model<'_>]) -> CheckOutcome {
        let results = models
            .iter()
            .map(|model| ModelResult {
                unique_id: model.unique_id.to_string(),
                name: model.name.to_string(),
                outcome: self.check_model(model),
            })
            .collect();

        let outcome = CheckOutcome { results };
        tracing::info!(
            models = outcome.results.len(),
            partitioned = outcome.partitioned_count(),
            violations = outcome.violations().count(),
            status = outcome.status(),
            "rebalance hint check finished"
        );
        outcome
    }

    /// Check a single model
    pub fn check_model(&self, model: &Model<'_>) -> ModelOutcome {
        let descriptor = match &model.partition {
            PartitionSpec::NoPartition => {
                tracing::debug!(model = model.unique_id, "no partition_by, skipping");
                return ModelOutcome::NotPartitioned;
            }
            PartitionSpec::Unrecognized(value) => {
                return ModelOutcome::Violation(unrecognized_partition(model, value));
            }
            PartitionSpec::Single(column) => column.clone(),
            // joined without spaces
            PartitionSpec::Multi(columns) => columns.join(","),
        };

        let hint = rebalance_hint(&descriptor);
        if model.query().contains(&hint) {
            tracing::debug!(model = model.unique_id, %hint, "hint present");
            ModelOutcome::Compliant { hint }
        } else {
            tracing::debug!(model = model.unique_id, %hint, "hint missing");
            ModelOutcome::Violation(missing_hint(model, hint, descriptor))
        }
    }
}

fn missing_hint(model: &Model<'_>, hint: String, descriptor: String) -> Diagnostic {
    let message = format!(
        "REBALANCE hint {} not found in model {} Partition column provided: {}",
        hint, model.name, descriptor
    );

    Diagnostic::new(DiagnosticCode::RebalanceHintMissing, message)
        .with_location(Location::new(model.file_path()))
        .with_model(model.name)
        .with_expectation(hint, descriptor)
}

fn unrecognized_partition(model: &Model<'_>, value: &serde_json::Value) -> Diagnostic {
    let message = format!(
        "REBALANCE hint cannot be derived for model {}: unsupported partition_by value {}",
        model.name, value
    );

    Diagnostic::new(DiagnosticCode::RebalancePartitionUnrecognized, message)
        .with_location(Location::new(model.file_path()))
        .with_model(model.name)
}
