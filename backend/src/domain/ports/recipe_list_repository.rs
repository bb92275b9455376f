//! Port for per-user recipe lists: favourites and the shopping cart.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{RecipeId, ShoppingItem, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe list repository adapters.
    pub enum RecipeListRepositoryError for "recipe list repository" {
        /// The recipe disappeared before the membership was written.
        RecipeMissing { recipe: RecipeId } => "recipe {recipe} does not exist",
    }
}

/// Which list a membership belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    /// Human-readable list name for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeListRepository: Send + Sync {
    /// Add `recipe` to the user's list.
    ///
    /// Returns `false` when the membership already exists; at most one row
    /// per `(user, recipe)` is ever stored. Fails with `RecipeMissing` when
    /// the recipe no longer exists.
    async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeListRepositoryError>;

    /// Remove `recipe` from the user's list. Returns `false` when absent.
    async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeListRepositoryError>;

    /// Subset of `recipes` present in the user's list.
    async fn contained(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RecipeListRepositoryError>;

    /// Ingredient lines of every recipe in the user's cart, in the order the
    /// recipes were added.
    async fn shopping_items(
        &self,
        user: UserId,
    ) -> Result<Vec<ShoppingItem>, RecipeListRepositoryError>;
}
