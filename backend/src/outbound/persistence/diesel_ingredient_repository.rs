//! PostgreSQL-backed `IngredientRepository` over the reference table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IngredientRepository, IngredientRepositoryError};
use crate::domain::{Ingredient, IngredientFilter, IngredientId, NewIngredient};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{IngredientRow, NewIngredientRow};
use super::pool::{DbPool, PoolError};
use super::escape_like;
use super::schema::ingredients;

/// Diesel-backed implementation of the [`IngredientRepository`] port.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> IngredientRepositoryError {
    map_pool_error(error, IngredientRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> IngredientRepositoryError {
    map_diesel_error(
        error,
        IngredientRepositoryError::query,
        IngredientRepositoryError::connection,
    )
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn list(
        &self,
        filter: &IngredientFilter,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
            .into_boxed();
        if let Some(prefix) = filter.name_prefix() {
            query = query.filter(ingredients::name.ilike(format!("{}%", escape_like(prefix))));
        }
        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn find_by_id(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        ingredients::table
            .find(id.get())
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Ingredient::from))
            .map_err(diesel_error)
    }

    async fn find_many(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq_any(raw))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn insert_if_absent(
        &self,
        ingredient: &NewIngredient,
    ) -> Result<bool, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let inserted = diesel::insert_into(ingredients::table)
            .values(&NewIngredientRow {
                name: ingredient.name(),
                measurement_unit: ingredient.measurement_unit(),
            })
            .on_conflict((ingredients::name, ingredients::measurement_unit))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(inserted > 0)
    }
}
