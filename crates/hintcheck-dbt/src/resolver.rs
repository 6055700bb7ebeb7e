//! Resolve changed file paths to manifest models

use crate::manifest::Manifest;
use crate::model::Model;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Maps candidate file paths onto the models they define
pub struct ModelResolver;

impl ModelResolver {
    /// Models defined by `paths`, keyed by unique_id and ordered by file path
    ///
    /// Only `.sql` paths are considered; a path selects every model node whose
    /// SQL file has the same stem. Disabled models are dropped unless
    /// `include_disabled` is set, in which case the manifest's `disabled`
    /// section is searched as well. Paths without a model are ignored.
    pub fn resolve<'a, P: AsRef<Path>>(
        paths: &[P],
        manifest: &'a Manifest,
        include_disabled: bool,
    ) -> Vec<Model<'a>> {
        let stems = Self::sql_stems(paths);
        if stems.is_empty() {
            return Vec::new();
        }

        let mut selected: BTreeMap<&'a str, Model<'a>> = BTreeMap::new();

        for (unique_id, node) in manifest.iter_nodes(include_disabled) {
            if !node.is_model() {
                continue;
            }
            if !include_disabled && !node.is_enabled() {
                tracing::debug!(model = unique_id, "skipping disabled model");
                continue;
            }
            let Some(stem) = node.file_stem() else {
                continue;
            };
            if stems.contains(stem) {
                selected
                    .entry(unique_id)
                    .or_insert_with(|| Model::new(unique_id, node));
            }
        }

        let mut models: Vec<Model<'a>> = selected.into_values().collect();
        models.sort_by(|a, b| {
            a.file_path()
                .cmp(b.file_path())
                .then_with(|| a.unique_id.cmp(b.unique_id))
        });

        tracing::debug!(paths = paths.len(), models = models.len(), "resolved models");
        models
    }

    /// File stems of the `.sql` paths
    pub fn sql_stems<P: AsRef<Path>>(paths: &[P]) -> HashSet<String> {
        paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
            .filter_map(|path| path.file_stem())
            .filter_map(|stem| stem.to_str())
            .map(str::to_string)
            .collect()
    }
}
