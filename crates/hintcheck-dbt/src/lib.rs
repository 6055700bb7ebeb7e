//! dbt artifact parsing and model resolution
//!
//! This crate handles:
//! - Parsing manifest.json (dbt-generated artifacts)
//! - Deciding each model's partitioning from its config
//! - Mapping changed file paths to the models they define

pub mod manifest;
pub mod model;
pub mod resolver;

pub use manifest::{Manifest, ManifestError, ManifestMetadata, ManifestNode, NodeConfig};
pub use model::{Model, PartitionSpec};
pub use resolver::ModelResolver;
