//! PostgreSQL-backed `RecipeRepository`.
//!
//! A recipe row and its ingredient lines are always written together in one
//! transaction, so readers see either the old or the new ingredient set.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{PageRequest, PageSlice};

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    CartItem, IngredientAmount, MembershipFilter, Recipe, RecipeId, RecipeIngredientLine,
    RecipeOrdering, RecipeQuery, RecipeSummary, RecipeWrite, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CartItemRow, IngredientLineRow, NewRecipeIngredientRow, NewRecipeRow, RecipeRow,
    RecipeSummaryRow, RecipeUpdate,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    favorites, ingredients, recipe_ingredients, recipes, shopping_carts, users,
};
use super::{escape_like, page_bounds, to_total};

/// Diesel-backed implementation of the [`RecipeRepository`] port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RecipeRepositoryError {
    map_pool_error(error, RecipeRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    map_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

fn line_rows(recipe_id: i64, lines: &[IngredientAmount]) -> Vec<NewRecipeIngredientRow> {
    lines
        .iter()
        .map(|line| NewRecipeIngredientRow {
            recipe_id,
            ingredient_id: line.ingredient_id.get(),
            amount: line.amount,
        })
        .collect()
}

async fn insert_lines(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    lines: &[IngredientAmount],
) -> QueryResult<()> {
    if lines.is_empty() {
        return Ok(());
    }
    diesel::insert_into(recipe_ingredients::table)
        .values(line_rows(recipe_id, lines))
        .execute(conn)
        .await?;
    Ok(())
}

/// Filtered recipe selection shared by the count and page queries.
fn filtered(query: &RecipeQuery) -> recipes::BoxedQuery<'static, Pg> {
    let mut select = recipes::table.into_boxed();
    if let Some(author) = query.author {
        select = select.filter(recipes::author_id.eq(author.get()));
    }
    if let Some(search) = &query.search {
        select = select.filter(recipes::name.ilike(format!("%{}%", escape_like(search))));
    }
    match query.favorited {
        Some(MembershipFilter::Only(user)) => {
            select = select.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(user.get()))
                        .select(favorites::recipe_id),
                ),
            );
        }
        Some(MembershipFilter::Exclude(user)) => {
            select = select.filter(
                recipes::id.ne_all(
                    favorites::table
                        .filter(favorites::user_id.eq(user.get()))
                        .select(favorites::recipe_id),
                ),
            );
        }
        None => {}
    }
    match query.in_shopping_cart {
        Some(MembershipFilter::Only(user)) => {
            select = select.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(user.get()))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
        Some(MembershipFilter::Exclude(user)) => {
            select = select.filter(
                recipes::id.ne_all(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(user.get()))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
        None => {}
    }
    select
}

fn ordered(
    select: recipes::BoxedQuery<'static, Pg>,
    ordering: RecipeOrdering,
) -> recipes::BoxedQuery<'static, Pg> {
    match ordering {
        RecipeOrdering::PubDateAsc => select.order((recipes::pub_date.asc(), recipes::id.asc())),
        RecipeOrdering::PubDateDesc => {
            select.order((recipes::pub_date.desc(), recipes::id.desc()))
        }
        RecipeOrdering::NameAsc => select.order((recipes::name.asc(), recipes::id.asc())),
        RecipeOrdering::NameDesc => select.order((recipes::name.desc(), recipes::id.desc())),
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(
        &self,
        author: UserId,
        recipe: &RecipeWrite,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let image = recipe
            .image
            .as_deref()
            .ok_or_else(|| RecipeRepositoryError::query("a new recipe needs an image"))?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    let row: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&NewRecipeRow {
                            author_id: author.get(),
                            name: &recipe.name,
                            image,
                            text: &recipe.text,
                            cooking_time: recipe.cooking_time,
                        })
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    insert_lines(conn, row.id, &recipe.ingredients).await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;
        Ok(Recipe::from(row))
    }

    async fn update(
        &self,
        id: RecipeId,
        recipe: &RecipeWrite,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    let row: RecipeRow = diesel::update(recipes::table.find(id.get()))
                        .set(&RecipeUpdate {
                            name: &recipe.name,
                            image: recipe.image.as_deref(),
                            text: &recipe.text,
                            cooking_time: recipe.cooking_time,
                        })
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(id.get())),
                    )
                    .execute(conn)
                    .await?;
                    insert_lines(conn, row.id, &recipe.ingredients).await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;
        Ok(Recipe::from(row))
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(recipes::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        recipes::table
            .find(id.get())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Recipe::from))
            .map_err(diesel_error)
    }

    async fn list(
        &self,
        query: &RecipeQuery,
        page: &PageRequest,
    ) -> Result<PageSlice<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let (offset, limit) = page_bounds(page);
        let rows: Vec<RecipeRow> = ordered(filtered(query), query.ordering)
            .offset(offset)
            .limit(limit)
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(PageSlice::new(
            rows.into_iter().map(Recipe::from).collect(),
            to_total(total),
        ))
    }

    async fn ingredient_lines(
        &self,
        ids: &[RecipeId],
    ) -> Result<Vec<(RecipeId, RecipeIngredientLine)>, RecipeRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows: Vec<IngredientLineRow> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(raw))
            .order((recipe_ingredients::recipe_id, recipe_ingredients::id))
            .select((
                recipe_ingredients::recipe_id,
                ingredients::id,
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<PageSlice<RecipeSummary>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = recipes::table
            .filter(recipes::author_id.eq(author.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let mut select = recipes::table
            .filter(recipes::author_id.eq(author.get()))
            .order((recipes::pub_date.desc(), recipes::id.desc()))
            .select(RecipeSummaryRow::as_select())
            .into_boxed();
        if let Some(limit) = limit {
            select = select.limit(i64::from(limit));
        }
        let rows: Vec<RecipeSummaryRow> = select.load(&mut conn).await.map_err(diesel_error)?;
        Ok(PageSlice::new(
            rows.into_iter().map(RecipeSummary::from).collect(),
            to_total(total),
        ))
    }

    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<CartItemRow> = shopping_carts::table
            .inner_join(recipes::table.on(recipes::id.eq(shopping_carts::recipe_id)))
            .inner_join(users::table.on(users::id.eq(recipes::author_id)))
            .inner_join(
                recipe_ingredients::table.on(recipe_ingredients::recipe_id.eq(recipes::id)),
            )
            .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
            .filter(shopping_carts::user_id.eq(user.get()))
            .select((
                recipes::id,
                recipes::name,
                users::username,
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }
}
