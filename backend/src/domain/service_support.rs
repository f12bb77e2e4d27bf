//! Helpers shared by the domain services.

use std::collections::HashSet;

use tracing::warn;

use super::ports::{FollowRepository, ImageStore};
use super::{Error, User, UserId, UserProfile, Viewer};

/// Turn stored users into profiles, flagging those the viewer follows.
pub(crate) async fn profiles_for(
    follows: &dyn FollowRepository,
    viewer: Viewer,
    users: Vec<User>,
) -> Result<Vec<UserProfile>, Error> {
    let followed: HashSet<UserId> = match viewer.user_id() {
        Some(follower) if !users.is_empty() => {
            let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
            follows
                .followed_among(follower, &ids)
                .await?
                .into_iter()
                .collect()
        }
        _ => HashSet::new(),
    };
    Ok(users
        .into_iter()
        .map(|user| {
            let is_subscribed = followed.contains(&user.id);
            UserProfile::from_user(user, is_subscribed)
        })
        .collect())
}

/// Delete a stored image, logging instead of failing.
pub(crate) async fn discard_image(images: &dyn ImageStore, path: &str) {
    if let Err(error) = images.remove(path).await {
        warn!(%path, %error, "failed to delete stored image");
    }
}
