//! Integration tests: manifest on disk -> resolver -> hint checker

use hintcheck_dbt::{Manifest, ModelResolver};
use hintcheck_engine::{HintChecker, ModelOutcome};
use std::io::Write;

const MANIFEST: &str = r#"{
    "metadata": {"dbt_version": "1.7.0"},
    "nodes": {
        "model.lake.daily_sales": {
            "unique_id": "model.lake.daily_sales",
            "name": "daily_sales",
            "resource_type": "model",
            "original_file_path": "models/daily_sales.sql",
            "config": {"enabled": true, "partition_by": "date"},
            "compiled_code": "select /*+ REBALANCE(date) */ * from sales"
        },
        "model.lake.regional_sales": {
            "unique_id": "model.lake.regional_sales",
            "name": "regional_sales",
            "resource_type": "model",
            "original_file_path": "models/regional_sales.sql",
            "config": {"enabled": true, "partition_by": ["region", "date"]},
            "compiled_code": "select * from sales"
        },
        "model.lake.dim_region": {
            "unique_id": "model.lake.dim_region",
            "name": "dim_region",
            "resource_type": "model",
            "original_file_path": "models/dim_region.sql",
            "config": null,
            "compiled_code": "select * from regions"
        },
        "model.lake.old_sales": {
            "unique_id": "model.lake.old_sales",
            "name": "old_sales",
            "resource_type": "model",
            "original_file_path": "models/old_sales.sql",
            "config": {"enabled": false, "partition_by": "date"},
            "compiled_code": "select * from sales"
        }
    }
}"#;

fn load() -> (tempfile::TempDir, Manifest) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let manifest = Manifest::from_file(&path).unwrap();
    (dir, manifest)
}

#[test]
fn compliant_model_passes() {
    let (_dir, manifest) = load();
    let models = ModelResolver::resolve(&["models/daily_sales.sql"], &manifest, false);
    let outcome = HintChecker::new().check(&models);

    assert_eq!(outcome.status(), 0);
    assert_eq!(outcome.violations().count(), 0);
}

#[test]
fn missing_multi_column_hint_fails() {
    let (_dir, manifest) = load();
    let models = ModelResolver::resolve(&["models/regional_sales.sql"], &manifest, false);
    let outcome = HintChecker::new().check(&models);

    assert_eq!(outcome.status(), 1);
    let messages: Vec<&str> = outcome.violations().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["REBALANCE hint /*+ REBALANCE(region,date) */ not found in model regional_sales Partition column provided: region,date"]
    );
}

#[test]
fn null_config_is_not_partitioned() {
    let (_dir, manifest) = load();
    let models = ModelResolver::resolve(&["models/dim_region.sql"], &manifest, false);
    assert_eq!(models.len(), 1);

    let outcome = HintChecker::new().check(&models);
    assert_eq!(outcome.status(), 0);
    assert!(matches!(outcome.results[0].outcome, ModelOutcome::NotPartitioned));
}

#[test]
fn disabled_violator_only_counts_when_included() {
    let (_dir, manifest) = load();
    let paths = ["models/daily_sales.sql", "models/old_sales.sql"];

    let excluded = HintChecker::new().check(&ModelResolver::resolve(&paths, &manifest, false));
    assert_eq!(excluded.status(), 0);
    assert_eq!(excluded.results.len(), 1);

    let included = HintChecker::new().check(&ModelResolver::resolve(&paths, &manifest, true));
    assert_eq!(included.status(), 1);
    assert_eq!(included.results.len(), 2);
}

#[test]
fn diagnostics_follow_file_path_order() {
    let (_dir, manifest) = load();
    let paths = [
        "models/regional_sales.sql",
        "models/old_sales.sql",
        "models/daily_sales.sql",
    ];
    let outcome = HintChecker::new().check(&ModelResolver::resolve(&paths, &manifest, true));

    let names: Vec<&str> = outcome.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["daily_sales", "old_sales", "regional_sales"]);
    assert_eq!(outcome.status(), 1);
    assert_eq!(outcome.violations().count(), 2);
}
