//! dbt manifest.json parsing
//!
//! Parses dbt-generated manifest.json to extract model nodes, their config and
//! their compiled SQL.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// dbt manifest.json structure (subset of fields we care about)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the manifest
    #[serde(default)]
    pub metadata: ManifestMetadata,

    /// Model and test nodes
    #[serde(default)]
    pub nodes: HashMap<String, ManifestNode>,

    /// Disabled nodes (unique_id -> every disabled definition of it)
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled: HashMap<String, Vec<ManifestNode>>,
}

impl Manifest {
    /// Load manifest from file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_str(&contents)
    }

    /// Parse manifest from JSON string
    pub fn from_str(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json)
            .map_err(|e| ManifestError::ParseError(e.to_string()))
    }

    /// Every node keyed by unique_id, followed by the `disabled` section when requested
    pub fn iter_nodes(&self, include_disabled: bool) -> impl Iterator<Item = (&str, &ManifestNode)> {
        let disabled = self
            .disabled
            .iter()
            .filter(move |_| include_disabled)
            .flat_map(|(id, nodes)| nodes.iter().map(move |node| (id.as_str(), node)));

        self.nodes
            .iter()
            .map(|(id, node)| (id.as_str(), node))
            .chain(disabled)
    }
}

/// Manifest metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub dbt_schema_version: String,
    #[serde(default)]
    pub dbt_version: String,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub invocation_id: Option<String>,
    /// Hashed project identifier written by dbt
    #[serde(default)]
    pub project_id: Option<String>,
    /// Project-level opt-out of usage tracking
    #[serde(default)]
    pub send_anonymous_usage_stats: Option<bool>,
}

/// A node in the manifest (model, test, snapshot, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Unique identifier (e.g., "model.my_project.users")
    #[serde(default)]
    pub unique_id: String,

    /// Node name (e.g., "users")
    pub name: String,

    /// Resource type (model, test, snapshot, etc.)
    pub resource_type: String,

    /// Package name
    #[serde(default)]
    pub package_name: String,

    /// Relative path to SQL file
    #[serde(default)]
    pub path: String,

    /// Original file path
    #[serde(default)]
    pub original_file_path: String,

    /// Node configuration; `null` and missing are both `None`
    #[serde(default)]
    pub config: Option<NodeConfig>,

    /// Compiled SQL (dbt >= 1.3)
    #[serde(default)]
    pub compiled_code: Option<String>,

    /// Compiled SQL (dbt < 1.3)
    #[serde(default)]
    pub compiled_sql: Option<String>,

    /// Uncompiled SQL (dbt >= 1.3)
    #[serde(default)]
    pub raw_code: Option<String>,

    /// Uncompiled SQL (dbt < 1.3)
    #[serde(default)]
    pub raw_sql: Option<String>,
}

impl ManifestNode {
    /// Whether this node is a model
    pub fn is_model(&self) -> bool {
        self.resource_type == "model"
    }

    /// Nodes without a config are treated as enabled, like dbt does
    pub fn is_enabled(&self) -> bool {
        self.config.as_ref().map_or(true, |config| config.enabled)
    }

    /// Full query text: compiled SQL when available, raw SQL otherwise
    pub fn query_text(&self) -> &str {
        [
            &self.compiled_code,
            &self.compiled_sql,
            &self.raw_code,
            &self.raw_sql,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|sql| !sql.is_empty())
        .unwrap_or("")
    }

    /// Stem of the SQL file that defines this node
    ///
    /// Falls back to the last segment of the unique_id when the manifest
    /// carries no file paths.
    pub fn file_stem(&self) -> Option<&str> {
        [self.original_file_path.as_str(), self.path.as_str()]
            .into_iter()
            .filter(|path| !path.is_empty())
            .find_map(|path| Path::new(path).file_stem().and_then(|stem| stem.to_str()))
            .or_else(|| self.unique_id.rsplit('.').next().filter(|s| !s.is_empty()))
    }
}

/// Node configuration (from dbt_project.yml or model config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Whether the node is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Partition column(s): string, list of strings, or adapter-specific mapping
    #[serde(default)]
    pub partition_by: Option<serde_json::Value>,

    /// Every other config key, kept verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            partition_by: None,
            extra: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Manifest parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse manifest JSON: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"{
        "metadata": {
            "dbt_schema_version": "https://schemas.getdbt.com/dbt/manifest/v11.json",
            "dbt_version": "1.7.0",
            "generated_at": "2024-01-01T00:00:00Z",
            "project_id": "abc123"
        },
        "nodes": {
            "model.shop.orders": {
                "unique_id": "model.shop.orders",
                "name": "orders",
                "resource_type": "model",
                "path": "marts/orders.sql",
                "original_file_path": "models/marts/orders.sql",
                "config": {"enabled": true, "materialized": "table", "partition_by": "order_date", "file_format": "delta"},
                "compiled_code": "select /*+ REBALANCE(order_date) */ * from raw_orders",
                "raw_code": "select * from {{ ref('raw_orders') }}"
            },
            "test.shop.not_null_orders_id": {
                "unique_id": "test.shop.not_null_orders_id",
                "name": "not_null_orders_id",
                "resource_type": "test",
                "config": null
            }
        },
        "disabled": {
            "model.shop.legacy": [{
                "unique_id": "model.shop.legacy",
                "name": "legacy",
                "resource_type": "model",
                "original_file_path": "models/legacy.sql",
                "config": {"enabled": false}
            }]
        }
    }"#;

    #[test]
    fn parse_manifest() {
        let manifest = Manifest::from_str(MANIFEST).unwrap();

        assert_eq!(manifest.metadata.dbt_version, "1.7.0");
        assert_eq!(manifest.metadata.project_id.as_deref(), Some("abc123"));
        assert_eq!(manifest.nodes.values().filter(|node| node.is_model()).count(), 1);

        let orders = &manifest.nodes["model.shop.orders"];
        let config = orders.config.as_ref().unwrap();
        assert_eq!(config.extra.get("materialized"), Some(&serde_json::json!("table")));
        assert_eq!(config.partition_by, Some(serde_json::json!("order_date")));
        assert_eq!(config.extra.get("file_format"), Some(&serde_json::json!("delta")));
        assert!(orders.is_enabled());

        let test = &manifest.nodes["test.shop.not_null_orders_id"];
        assert!(test.config.is_none());
        assert!(test.is_enabled());
    }

    #[test]
    fn iter_nodes_honors_disabled_flag() {
        let manifest = Manifest::from_str(MANIFEST).unwrap();

        assert_eq!(manifest.iter_nodes(false).count(), 2);

        let ids: Vec<&str> = manifest.iter_nodes(true).map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"model.shop.legacy"));
    }

    #[test]
    fn query_text_prefers_compiled_sql() {
        let manifest = Manifest::from_str(MANIFEST).unwrap();
        let orders = &manifest.nodes["model.shop.orders"];
        assert!(orders.query_text().contains("REBALANCE(order_date)"));

        let mut legacy = orders.clone();
        legacy.compiled_code = None;
        legacy.compiled_sql = Some(String::new());
        legacy.raw_code = None;
        legacy.raw_sql = Some("select 1".to_string());
        assert_eq!(legacy.query_text(), "select 1");

        legacy.raw_sql = None;
        assert_eq!(legacy.query_text(), "");
    }

    #[test]
    fn file_stem_from_paths_or_unique_id() {
        let manifest = Manifest::from_str(MANIFEST).unwrap();
        let orders = &manifest.nodes["model.shop.orders"];
        assert_eq!(orders.file_stem(), Some("orders"));

        let mut bare = orders.clone();
        bare.original_file_path = String::new();
        bare.path = String::new();
        bare.unique_id = "model.shop.bare".to_string();
        assert_eq!(bare.file_stem(), Some("bare"));
    }

    #[test]
    fn null_disabled_section() {
        let manifest = Manifest::from_str(r#"{"nodes": {}, "disabled": null}"#).unwrap();
        assert!(manifest.disabled.is_empty());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = Manifest::from_str("{ not json").unwrap_err();
        assert!(matches!(err, ManifestError::ParseError(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Manifest::from_file(Path::new("/definitely/not/here/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::IoError(_, _)));
        assert!(err.to_string().contains("/definitely/not/here/manifest.json"));
    }
}
