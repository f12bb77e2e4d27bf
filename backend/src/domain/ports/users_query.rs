//! Driving port for user profile reads.

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::{Error, UserId, UserProfile, Viewer};

/// Profiles as seen by the caller; `is_subscribed` reflects the viewer's
/// follow edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// One page of users ordered by username.
    async fn list(
        &self,
        viewer: Viewer,
        page: &PageRequest,
    ) -> Result<PageSlice<UserProfile>, Error>;

    /// A single profile; `404` when unknown.
    async fn profile(&self, viewer: Viewer, id: UserId) -> Result<UserProfile, Error>;

    /// The caller's own profile; `401` for anonymous viewers.
    async fn me(&self, viewer: Viewer) -> Result<UserProfile, Error>;
}
