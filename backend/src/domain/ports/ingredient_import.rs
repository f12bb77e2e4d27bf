//! Driving port for the bulk ingredient loader.

use async_trait::async_trait;
use serde_json::Value;

/// Counts reported at the end of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "added={} skipped={}", self.added, self.skipped)
    }
}

/// Imports `{name, measurement_unit}` records, skipping bad or duplicate ones.
#[async_trait]
pub trait IngredientImport: Send + Sync {
    async fn import(&self, records: Vec<Value>) -> ImportSummary;
}
