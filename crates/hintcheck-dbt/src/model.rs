//! Model views over manifest nodes
//!
//! A [`Model`] borrows its node from the [`Manifest`](crate::Manifest) and
//! carries the partitioning decided once at construction time.

use crate::manifest::{ManifestNode, NodeConfig};
use serde_json::Value;

/// Partitioning declared by a model's `partition_by` config
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionSpec {
    /// No `partition_by` (absent or null): the model is out of scope
    NoPartition,

    /// A single partition column (possibly empty)
    Single(String),

    /// Ordered partition columns (possibly none)
    Multi(Vec<String>),

    /// A `partition_by` value that is neither a column nor a column list
    Unrecognized(Value),
}

impl PartitionSpec {
    /// Decide the partitioning from a node config
    ///
    /// A missing config behaves exactly like a config without `partition_by`.
    pub fn from_config(config: Option<&NodeConfig>) -> Self {
        match config.and_then(|config| config.partition_by.as_ref()) {
            Some(value) => Self::from_value(value),
            None => Self::NoPartition,
        }
    }

    /// Decide the partitioning from a raw `partition_by` value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::NoPartition,
            Value::String(column) => Self::Single(column.clone()),
            Value::Number(_) | Value::Bool(_) => Self::Single(value.to_string()),
            Value::Array(items) => items
                .iter()
                .map(scalar_column)
                .collect::<Option<Vec<_>>>()
                .map(Self::Multi)
                .unwrap_or_else(|| Self::Unrecognized(value.clone())),
            // BigQuery style: {"field": "created_at", "data_type": "timestamp"}
            Value::Object(map) => match map.get("field") {
                Some(Value::String(field)) if !field.is_empty() => Self::Single(field.clone()),
                _ => Self::Unrecognized(value.clone()),
            },
        }
    }
}

fn scalar_column(item: &Value) -> Option<String> {
    match item {
        Value::String(column) => Some(column.clone()),
        Value::Number(_) | Value::Bool(_) => Some(item.to_string()),
        _ => None,
    }
}

/// A model node selected for checking
#[derive(Debug, Clone)]
pub struct Model<'a> {
    /// Manifest key of the node
    pub unique_id: &'a str,

    /// Human-readable model name
    pub name: &'a str,

    /// SQL file stem the model was matched by
    pub filename: String,

    /// Partitioning decided from the node config
    pub partition: PartitionSpec,

    /// The underlying manifest node
    pub node: &'a ManifestNode,
}

impl<'a> Model<'a> {
    /// Build a model view over a manifest node
    pub fn new(unique_id: &'a str, node: &'a ManifestNode) -> Self {
        Self {
            unique_id,
            name: &node.name,
            filename: node.file_stem().unwrap_or(&node.name).to_string(),
            partition: PartitionSpec::from_config(node.config.as_ref()),
            node,
        }
    }

    /// Full query text of the model
    pub fn query(&self) -> &'a str {
        self.node.query_text()
    }

    /// File path shown in diagnostics
    pub fn file_path(&self) -> &'a str {
        if self.node.original_file_path.is_empty() {
            &self.node.path
        } else {
            &self.node.original_file_path
        }
    }
}
