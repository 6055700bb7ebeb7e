//! hintcheck engine - Core business logic
//!
//! This crate implements:
//! - REBALANCE hint verification for resolved models
//! - Aggregation of per-model outcomes into a run status
//! - Hook event telemetry, kept apart from the checker

pub mod hint_checker;
pub mod telemetry;

pub use hint_checker::{rebalance_hint, CheckOutcome, HintChecker, ModelOutcome, ModelResult};
pub use telemetry::{HookEvent, TelemetryError, TelemetrySink};
