//! Port for the tag and ingredient catalogue.

use async_trait::async_trait;

use crate::domain::{Ingredient, IngredientId, NewIngredient, NewTag, Tag, TagId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue repository adapters.
    pub enum CatalogueRepositoryError for "catalogue repository" {}
}

/// Read and seed access to tags and ingredients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Every tag, ordered by name.
    async fn list_tags(&self) -> Result<Vec<Tag>, CatalogueRepositoryError>;

    /// Tag by identifier.
    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, CatalogueRepositoryError>;

    /// Tags whose identifiers appear in `ids`; unknown ids are skipped.
    async fn find_tags(&self, ids: &[TagId]) -> Result<Vec<Tag>, CatalogueRepositoryError>;

    /// Ingredients ordered by name, optionally restricted to names containing
    /// `name_contains` (case-insensitive).
    async fn list_ingredients(
        &self,
        name_contains: Option<String>,
    ) -> Result<Vec<Ingredient>, CatalogueRepositoryError>;

    /// Ingredient by identifier.
    async fn find_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, CatalogueRepositoryError>;

    /// Ingredients whose identifiers appear in `ids`; unknown ids are skipped.
    async fn find_ingredients(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, CatalogueRepositoryError>;

    /// Insert ingredients, skipping existing `(name, unit)` pairs. Returns the
    /// number of rows inserted.
    async fn insert_ingredients(
        &self,
        ingredients: &[NewIngredient],
    ) -> Result<usize, CatalogueRepositoryError>;

    /// Insert tags, skipping existing names or slugs. Returns the number of
    /// rows inserted.
    async fn insert_tags(&self, tags: &[NewTag]) -> Result<usize, CatalogueRepositoryError>;
}
