//! Port for follow (subscription) edges between users.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow repository adapters.
    pub enum FollowRepositoryError for "follow repository" {}
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Record that `follower` follows `author`.
    ///
    /// Returns `false` without touching storage when the edge already exists.
    async fn follow(&self, follower: UserId, author: UserId)
    -> Result<bool, FollowRepositoryError>;

    /// Remove the edge. Returns `false` when it did not exist.
    async fn unfollow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError>;

    /// Subset of `authors` that `follower` follows.
    async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, FollowRepositoryError>;

    /// Page through the authors `follower` follows, ordered by username, with
    /// the total count.
    async fn followed_authors(
        &self,
        follower: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<User>, u64), FollowRepositoryError>;
}
