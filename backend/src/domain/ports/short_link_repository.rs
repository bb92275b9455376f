//! Port for persisted short recipe links.

use async_trait::async_trait;

use crate::domain::{RecipeId, ShortCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by short link repository adapters.
    pub enum ShortLinkRepositoryError for "short link repository" {
        /// The token is already assigned to a different recipe.
        CodeTaken { code: String } => "short link token {code} is already in use",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepository: Send + Sync {
    /// Token already issued for `recipe`, if any.
    async fn find_by_recipe(
        &self,
        recipe: RecipeId,
    ) -> Result<Option<ShortCode>, ShortLinkRepositoryError>;

    /// Store `code` for `recipe` unless the recipe already has one, returning
    /// whichever token is stored afterwards.
    async fn insert(
        &self,
        recipe: RecipeId,
        code: &ShortCode,
    ) -> Result<ShortCode, ShortLinkRepositoryError>;

    /// Recipe a token points at.
    async fn resolve(&self, code: &ShortCode)
    -> Result<Option<RecipeId>, ShortLinkRepositoryError>;
}
