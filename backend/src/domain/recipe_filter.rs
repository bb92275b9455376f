//! Recipe collection filter.
//!
//! Narrows recipes by author, by tag slug (a recipe matches when it carries
//! any requested tag) and by the requester's favourite and shopping-cart
//! membership.

use super::UserId;

/// Parse a membership flag given as `1` or `0`. Any other value is ignored.
///
/// # Examples
/// ```
/// use foodgram::domain::parse_membership_flag;
///
/// assert_eq!(parse_membership_flag("1"), Some(true));
/// assert_eq!(parse_membership_flag("0"), Some(false));
/// assert_eq!(parse_membership_flag("yes"), None);
/// ```
#[must_use]
pub fn parse_membership_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Criteria for listing recipes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Only recipes by this author.
    pub author: Option<UserId>,
    /// Tag slugs; empty means no tag restriction.
    pub tags: Vec<String>,
    /// Require (`true`) or exclude (`false`) recipes the requester favourited.
    pub is_favorited: Option<bool>,
    /// Require (`true`) or exclude (`false`) recipes in the requester's cart.
    pub is_in_shopping_cart: Option<bool>,
}

/// Membership constraint resolved against a concrete requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipConstraint {
    /// Keep only recipes in the user's list.
    In(UserId),
    /// Drop recipes in the user's list.
    NotIn(UserId),
}

/// Filter with membership flags bound to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecipeFilter {
    pub author: Option<UserId>,
    pub tags: Vec<String>,
    pub favorited: Option<MembershipConstraint>,
    pub in_shopping_cart: Option<MembershipConstraint>,
}

impl RecipeFilter {
    /// Bind the membership flags to `viewer`.
    ///
    /// Returns `None` when the filter cannot match anything: an anonymous
    /// requester asking for favourited or carted recipes. For anonymous
    /// requesters a `false` flag places no restriction.
    #[must_use]
    pub fn resolve(&self, viewer: Option<UserId>) -> Option<ResolvedRecipeFilter> {
        let favorited = bind(self.is_favorited, viewer)?;
        let in_shopping_cart = bind(self.is_in_shopping_cart, viewer)?;
        Some(ResolvedRecipeFilter {
            author: self.author,
            tags: self.tags.clone(),
            favorited,
            in_shopping_cart,
        })
    }
}

fn bind(flag: Option<bool>, viewer: Option<UserId>) -> Option<Option<MembershipConstraint>> {
    match (flag, viewer) {
        (None, _) | (Some(false), None) => Some(None),
        (Some(true), None) => None,
        (Some(true), Some(user)) => Some(Some(MembershipConstraint::In(user))),
        (Some(false), Some(user)) => Some(Some(MembershipConstraint::NotIn(user))),
    }
}
