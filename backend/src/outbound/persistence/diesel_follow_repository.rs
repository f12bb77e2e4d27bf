//! PostgreSQL-backed `FollowRepository` over the `follows` table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{PageRequest, PageSlice};

use crate::domain::ports::{FollowRepository, FollowRepositoryError};
use crate::domain::{User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewFollowRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, users};
use super::{page_bounds, to_total};

/// Diesel-backed implementation of the [`FollowRepository`] port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> FollowRepositoryError {
    map_pool_error(error, FollowRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> FollowRepositoryError {
    map_diesel_error(
        error,
        FollowRepositoryError::query,
        FollowRepositoryError::connection,
    )
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn follow(&self, follower: UserId, author: UserId) -> Result<bool, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let inserted = diesel::insert_into(follows::table)
            .values(&NewFollowRow {
                user_id: follower.get(),
                author_id: author.get(),
            })
            .on_conflict((follows::user_id, follows::author_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(inserted > 0)
    }

    async fn unfollow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::user_id.eq(follower.get()))
                .filter(follows::author_id.eq(author.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<Vec<UserId>, FollowRepositoryError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = authors.iter().map(|id| id.get()).collect();
        let followed: Vec<i64> = follows::table
            .filter(follows::user_id.eq(follower.get()))
            .filter(follows::author_id.eq_any(raw))
            .select(follows::author_id)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(followed.into_iter().map(UserId::new).collect())
    }

    async fn followed_authors(
        &self,
        follower: UserId,
        page: &PageRequest,
    ) -> Result<PageSlice<User>, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = follows::table
            .filter(follows::user_id.eq(follower.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let (offset, limit) = page_bounds(page);
        let rows: Vec<UserRow> = follows::table
            .inner_join(users::table.on(users::id.eq(follows::author_id)))
            .filter(follows::user_id.eq(follower.get()))
            .order((users::username.asc(), users::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(PageSlice::new(
            rows.into_iter().map(User::from).collect(),
            to_total(total),
        ))
    }
}
