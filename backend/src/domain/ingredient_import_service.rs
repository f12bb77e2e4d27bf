//! Bulk ingredient import used by the `load-ingredients` binary.
//!
//! Every record is handled independently: malformed entries, duplicates, and
//! per-row database failures are logged and counted as skipped, never aborting
//! the run.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::NewIngredient;
use crate::domain::ports::{ImportSummary, IngredientImport, IngredientRepository};

/// Service implementing [`IngredientImport`] over an [`IngredientRepository`].
#[derive(Clone)]
pub struct IngredientImportService {
    repo: Arc<dyn IngredientRepository>,
}

impl IngredientImportService {
    pub fn new(repo: Arc<dyn IngredientRepository>) -> Self {
        Self { repo }
    }

    fn parse(record: &Value) -> Option<NewIngredient> {
        let object = record.as_object()?;
        let name = object.get("name")?.as_str()?;
        let unit = object.get("measurement_unit")?.as_str()?;
        NewIngredient::normalised(name, unit)
    }
}

#[async_trait]
impl IngredientImport for IngredientImportService {
    async fn import(&self, records: Vec<Value>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for (index, record) in records.iter().enumerate() {
            let Some(ingredient) = Self::parse(record) else {
                warn!(index, %record, "skipping malformed ingredient record");
                summary.skipped += 1;
                continue;
            };
            match self.repo.insert_if_absent(&ingredient).await {
                Ok(true) => {
                    info!(
                        index,
                        name = ingredient.name(),
                        unit = ingredient.measurement_unit(),
                        "ingredient added"
                    );
                    summary.added += 1;
                }
                Ok(false) => {
                    warn!(
                        index,
                        name = ingredient.name(),
                        unit = ingredient.measurement_unit(),
                        "ingredient already exists"
                    );
                    summary.skipped += 1;
                }
                Err(error) => {
                    warn!(index, name = ingredient.name(), %error, "ingredient insert failed");
                    summary.skipped += 1;
                }
            }
        }
        info!(added = summary.added, skipped = summary.skipped, "ingredient import finished");
        summary
    }
}
