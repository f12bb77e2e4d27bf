//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::{Error, FieldErrors, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (`email` or `username`) already holds the value.
        Duplicate { field: String } => "a user with that {field} already exists",
    }
}

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Self::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { field } => {
                let message = format!("A user with that {field} already exists.");
                FieldErrors::single(field, message)
            }
        }
    }
}

/// Storage of user accounts and their credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, hashing its password.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user in `ids` that exists, in no particular order.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// One page of users ordered by username.
    async fn list(&self, page: &PageRequest) -> Result<PageSlice<User>, UserPersistenceError>;

    /// Id of the account matching `email` and `password`, if any.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserId>, UserPersistenceError>;

    /// Replace the avatar path and return the previous one.
    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<String>,
    ) -> Result<Option<String>, UserPersistenceError>;
}
