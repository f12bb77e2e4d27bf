//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Passwords never leave this adapter in clear: registration stores a hex
//! SHA-256 digest and login compares digests.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{PageRequest, PageSlice};
use sha2::{Digest, Sha256};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserId};

use super::diesel_error_mapping::{map_pool_error, map_user_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::{page_bounds, to_total};

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use foodgram::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/foodgram")).await?;
    /// let repository = DieselUserRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

/// Hex SHA-256 digest stored in `users.password_digest`.
pub(crate) fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn raw_ids(ids: &[UserId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let digest = password_digest(user.password.as_str());
        let row = NewUserRow {
            email: &user.email,
            username: &user.username,
            first_name: &user.first_name,
            last_name: &user.last_name,
            password_digest: &digest,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(map_user_diesel_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(map_user_diesel_error)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(raw_ids(ids)))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn list(&self, page: &PageRequest) -> Result<PageSlice<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        let (offset, limit) = page_bounds(page);
        let rows: Vec<UserRow> = users::table
            .order((users::username.asc(), users::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(PageSlice::new(
            rows.into_iter().map(User::from).collect(),
            to_total(total),
        ))
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let stored: Option<(i64, String)> = users::table
            .filter(users::email.eq(email))
            .select((users::id, users::password_digest))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_user_diesel_error)?;
        Ok(stored
            .filter(|(_, digest)| *digest == password_digest(password))
            .map(|(id, _)| UserId::new(id)))
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<String>,
    ) -> Result<Option<String>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let previous = conn
            .transaction(|conn| {
                async move {
                    let current: Option<Option<String>> = users::table
                        .find(id.get())
                        .select(users::avatar)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if current.is_some() {
                        diesel::update(users::table.find(id.get()))
                            .set(users::avatar.eq(avatar))
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(current)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_user_diesel_error)?;
        previous.ok_or_else(|| UserPersistenceError::query(format!("user {id} not found")))
    }
}
