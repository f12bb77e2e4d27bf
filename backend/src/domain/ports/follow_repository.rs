//! Port for follow edges between users.

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::{Error, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow repository adapters.
    pub enum FollowRepositoryError {
        Connection { message: String } => "follow repository connection failed: {message}",
        Query { message: String } => "follow repository query failed: {message}",
    }
}

impl From<FollowRepositoryError> for Error {
    fn from(error: FollowRepositoryError) -> Self {
        match error {
            FollowRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("follow repository unavailable: {message}"))
            }
            FollowRepositoryError::Query { message } => {
                Self::internal(format!("follow repository error: {message}"))
            }
        }
    }
}

/// Directed `follower -> author` edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the edge; `false` when it already existed.
    async fn follow(&self, follower: UserId, author: UserId) -> Result<bool, FollowRepositoryError>;

    /// Delete the edge; `false` when there was none.
    async fn unfollow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError>;

    /// The subset of `authors` that `follower` follows.
    async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<Vec<UserId>, FollowRepositoryError>;

    /// One page of followed authors ordered by username.
    async fn followed_authors(
        &self,
        follower: UserId,
        page: &PageRequest,
    ) -> Result<PageSlice<User>, FollowRepositoryError>;
}
