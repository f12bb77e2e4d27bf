//! Explicit caller context passed from inbound adapters into services.

use super::{Error, UserId};

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    /// No session.
    #[default]
    Anonymous,
    /// Signed-in user.
    User(UserId),
}

impl Viewer {
    /// Identifier of the signed-in user, if any.
    pub const fn user_id(self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(id),
        }
    }

    /// Identifier of the signed-in user or `401`.
    pub fn require(self) -> Result<UserId, Error> {
        self.user_id().ok_or_else(Error::not_authenticated)
    }
}

impl From<Option<UserId>> for Viewer {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Self::Anonymous, Self::User)
    }
}
