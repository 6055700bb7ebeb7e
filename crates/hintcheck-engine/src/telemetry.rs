//! Per-run hook events
//!
//! The checker never talks to a sink; the caller builds one [`HookEvent`] when
//! the run is over and hands it to [`emit`], which swallows sink failures.

use hintcheck_core::TelemetryConfig;
use hintcheck_dbt::ManifestMetadata;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Environment variable that turns tracking off
pub const DISABLE_TRACKING_ENV: &str = "DISABLE_TRACKING";

/// One event per hook run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookEvent {
    pub event_name: String,
    pub hook_name: String,
    pub description: String,
    pub status: i32,
    /// Seconds spent in resolution and checking
    pub execution_time: f64,
    pub is_test: bool,
    /// SHA-256 of the manifest's project id (or invocation id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_fingerprint: Option<String>,
    pub timestamp: String,
}

impl HookEvent {
    /// "Hook Executed" event for the given hook
    pub fn executed(hook_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            event_name: "Hook Executed".to_string(),
            hook_name: hook_name.into(),
            description: description.into(),
            status: 0,
            execution_time: 0.0,
            is_test: false,
            project_fingerprint: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn with_execution_time(mut self, seconds: f64) -> Self {
        self.execution_time = seconds;
        self
    }

    pub fn with_test_flag(mut self, is_test: bool) -> Self {
        self.is_test = is_test;
        self
    }

    pub fn with_manifest(mut self, metadata: &ManifestMetadata) -> Self {
        self.project_fingerprint = project_fingerprint(metadata);
        self
    }
}

/// Hex SHA-256 of the project id, falling back to the invocation id
pub fn project_fingerprint(metadata: &ManifestMetadata) -> Option<String> {
    let source = metadata
        .project_id
        .as_deref()
        .or(metadata.invocation_id.as_deref())
        .filter(|id| !id.is_empty())?;

    Some(hex::encode(Sha256::digest(source.as_bytes())))
}

/// Telemetry errors
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to write event to {0}: {1}")]
    IoError(String, String),

    #[error("Failed to serialize event: {0}")]
    SerializeError(String),
}

/// Receives hook events
pub trait TelemetrySink {
    fn track(&self, event: &HookEvent) -> Result<(), TelemetryError>;
}

/// Drops every event
#[derive(Debug, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn track(&self, _event: &HookEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Emits events as structured log records
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn track(&self, event: &HookEvent) -> Result<(), TelemetryError> {
        tracing::info!(
            target: "hintcheck::telemetry",
            event = %event.event_name,
            hook = %event.hook_name,
            status = event.status,
            execution_time = event.execution_time,
            is_test = event.is_test,
            project = event.project_fingerprint.as_deref().unwrap_or("-"),
            "{}",
            event.description
        );
        Ok(())
    }
}

/// Appends one JSON document per event to a file
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TelemetrySink for JsonLinesSink {
    fn track(&self, event: &HookEvent) -> Result<(), TelemetryError> {
        let io_err = |e: std::io::Error| TelemetryError::IoError(self.path.display().to_string(), e.to_string());

        let line = serde_json::to_string(event)
            .map_err(|e| TelemetryError::SerializeError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{line}").map_err(io_err)
    }
}

/// Pick the sink for this run
///
/// Tracking is off when the config disables it, when `env_disabled` is set,
/// or when the dbt project opted out of usage stats.
pub fn sink_for(
    config: &TelemetryConfig,
    metadata: &ManifestMetadata,
    env_disabled: bool,
) -> Box<dyn TelemetrySink> {
    if !config.enabled || env_disabled || metadata.send_anonymous_usage_stats == Some(false) {
        return Box::new(NoopSink);
    }

    match &config.events_file {
        Some(path) => Box::new(JsonLinesSink::new(path.clone())),
        None => Box::new(TracingSink),
    }
}

/// Whether the process environment disables tracking
pub fn disabled_by_env() -> bool {
    std::env::var_os(DISABLE_TRACKING_ENV).is_some()
}

/// Send the event; failures are logged and otherwise ignored
pub fn emit(sink: &dyn TelemetrySink, event: &HookEvent) {
    if let Err(e) = sink.track(event) {
        tracing::warn!(error = %e, "failed to record hook event");
    }
}
