//! Port for recipe storage and filtered listing.
//!
//! Adapters persist a recipe together with its ingredient lines and tag links
//! as one unit: create and update either apply every row or none.

use std::collections::HashMap;

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    MediaPath, Recipe, RecipeDraft, RecipeId, RecipeSummary, ResolvedRecipeFilter, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError for "recipe repository" {}
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe with its ingredient lines and tags.
    async fn create(
        &self,
        author: UserId,
        draft: &RecipeDraft,
        image: &MediaPath,
    ) -> Result<RecipeId, RecipeRepositoryError>;

    /// Replace the recipe content, ingredient lines and tags. A `None` image
    /// keeps the stored one. Returns `false` when the recipe is missing.
    async fn update(
        &self,
        id: RecipeId,
        draft: &RecipeDraft,
        image: Option<MediaPath>,
    ) -> Result<bool, RecipeRepositoryError>;

    /// Delete a recipe and everything that references it. Returns `false`
    /// when the recipe is missing.
    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    /// Full recipe by identifier.
    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Short representation by identifier.
    async fn find_summary(
        &self,
        id: RecipeId,
    ) -> Result<Option<RecipeSummary>, RecipeRepositoryError>;

    /// Page of recipes matching `filter`, newest first, with the total
    /// number of matches.
    async fn list(
        &self,
        filter: &ResolvedRecipeFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipeRepositoryError>;

    /// Newest recipes of each author, at most `limit` per author when given.
    /// Authors without recipes are absent.
    async fn summaries_by_authors(
        &self,
        authors: &[UserId],
        limit: Option<u32>,
    ) -> Result<HashMap<UserId, Vec<RecipeSummary>>, RecipeRepositoryError>;

    /// Number of recipes per author. Authors without recipes are absent.
    async fn count_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<HashMap<UserId, u64>, RecipeRepositoryError>;
}
