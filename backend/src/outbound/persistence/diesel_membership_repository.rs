//! PostgreSQL-backed `MembershipRepository` over `favorites` and
//! `shopping_carts`.
//!
//! Inserts use `ON CONFLICT DO NOTHING`; the affected-row count tells the
//! service whether the membership was new.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MembershipRepository, MembershipRepositoryError, RecipeList};
use crate::domain::{RecipeId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewFavoriteRow, NewShoppingCartRow};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, shopping_carts};

/// Diesel-backed implementation of the [`MembershipRepository`] port.
#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MembershipRepositoryError {
    map_pool_error(error, MembershipRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MembershipRepositoryError {
    map_diesel_error(
        error,
        MembershipRepositoryError::query,
        MembershipRepositoryError::connection,
    )
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (user_id, recipe_id) = (user.get(), recipe.get());
        let inserted = match list {
            RecipeList::Favorites => {
                diesel::insert_into(favorites::table)
                    .values(&NewFavoriteRow { user_id, recipe_id })
                    .on_conflict((favorites::user_id, favorites::recipe_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
            RecipeList::ShoppingCart => {
                diesel::insert_into(shopping_carts::table)
                    .values(&NewShoppingCartRow { user_id, recipe_id })
                    .on_conflict((shopping_carts::user_id, shopping_carts::recipe_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;
        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = match list {
            RecipeList::Favorites => {
                diesel::delete(
                    favorites::table
                        .filter(favorites::user_id.eq(user.get()))
                        .filter(favorites::recipe_id.eq(recipe.get())),
                )
                .execute(&mut conn)
                .await
            }
            RecipeList::ShoppingCart => {
                diesel::delete(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(user.get()))
                        .filter(shopping_carts::recipe_id.eq(recipe.get())),
                )
                .execute(&mut conn)
                .await
            }
        }
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn contained(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeId>, MembershipRepositoryError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = recipes.iter().map(|id| id.get()).collect();
        let found: Vec<i64> = match list {
            RecipeList::Favorites => {
                favorites::table
                    .filter(favorites::user_id.eq(user.get()))
                    .filter(favorites::recipe_id.eq_any(raw))
                    .select(favorites::recipe_id)
                    .load(&mut conn)
                    .await
            }
            RecipeList::ShoppingCart => {
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user.get()))
                    .filter(shopping_carts::recipe_id.eq_any(raw))
                    .select(shopping_carts::recipe_id)
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;
        Ok(found.into_iter().map(RecipeId::new).collect())
    }
}
