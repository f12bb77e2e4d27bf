//! Ingredient lookups.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{IngredientRepository, IngredientsQuery};
use crate::domain::{Error, Ingredient, IngredientFilter, IngredientId};

/// Read-only ingredient service implementing [`IngredientsQuery`].
#[derive(Clone)]
pub struct IngredientsService {
    repo: Arc<dyn IngredientRepository>,
}

impl IngredientsService {
    pub fn new(repo: Arc<dyn IngredientRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl IngredientsQuery for IngredientsService {
    async fn list(&self, filter: IngredientFilter) -> Result<Vec<Ingredient>, Error> {
        Ok(self.repo.list(&filter).await?)
    }

    async fn get(&self, id: IngredientId) -> Result<Ingredient, Error> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("ingredient {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{IngredientRepositoryError, MockIngredientRepository};

    fn flour() -> Ingredient {
        Ingredient {
            id: IngredientId::new(1),
            name: "flour".into(),
            measurement_unit: "g".into(),
        }
    }

    #[tokio::test]
    async fn list_passes_filter_through() {
        let mut repo = MockIngredientRepository::new();
        repo.expect_list()
            .withf(|filter| filter.name_prefix() == Some("fl"))
            .times(1)
            .return_once(|_| Ok(vec![flour()]));
        let service = IngredientsService::new(Arc::new(repo));

        let found = service
            .list(IngredientFilter::by_name_prefix(Some("FL")))
            .await
            .expect("list");
        assert_eq!(found, vec![flour()]);
    }

    #[tokio::test]
    async fn unknown_ingredient_is_not_found() {
        let mut repo = MockIngredientRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        let service = IngredientsService::new(Arc::new(repo));

        let error = service.get(IngredientId::new(9)).await.expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockIngredientRepository::new();
        repo.expect_list()
            .return_once(|_| Err(IngredientRepositoryError::connection("refused")));
        let service = IngredientsService::new(Arc::new(repo));

        let error = service
            .list(IngredientFilter::default())
            .await
            .expect_err("down");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
