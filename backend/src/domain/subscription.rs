//! Follow edges between users as presented to the follower.

use super::{RecipeSummary, UserProfile};

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// The author; `is_subscribed` is always `true` here.
    pub author: UserProfile,
    /// Newest recipes first, capped by the requested limit.
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes by the author.
    pub recipes_count: u64,
}
