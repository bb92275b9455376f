//! PostgreSQL-backed catalogue adapter for tags and ingredients.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Ingredient, IngredientId, NewIngredient, NewTag, Tag, TagId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{IngredientRow, NewIngredientRow, NewTagRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, tags};

/// Diesel-backed implementation of the catalogue port.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogueRepositoryError {
    map_basic_pool_error(error, CatalogueRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogueRepositoryError::query,
        CatalogueRepositoryError::connection,
    )
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_tags(&self) -> Result<Vec<Tag>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagRow> = tags::table
            .order(tags::name.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = tags::table
            .filter(tags::id.eq(id.get()))
            .select(TagRow::as_select())
            .first::<TagRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Tag::from))
    }

    async fn find_tags(&self, ids: &[TagId]) -> Result<Vec<Tag>, CatalogueRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows: Vec<TagRow> = tags::table
            .filter(tags::id.eq_any(raw))
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn list_ingredients(
        &self,
        name_contains: Option<String>,
    ) -> Result<Vec<Ingredient>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = ingredients::table
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .select(IngredientRow::as_select())
            .into_boxed();
        if let Some(fragment) = name_contains.as_deref().map(str::trim).filter(|f| !f.is_empty())
        {
            query = query.filter(ingredients::name.ilike(like_pattern(fragment)));
        }
        let rows: Vec<IngredientRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn find_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ingredients::table
            .filter(ingredients::id.eq(id.get()))
            .select(IngredientRow::as_select())
            .first::<IngredientRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Ingredient::from))
    }

    async fn find_ingredients(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, CatalogueRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq_any(raw))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn insert_ingredients(
        &self,
        new_ingredients: &[NewIngredient],
    ) -> Result<usize, CatalogueRepositoryError> {
        if new_ingredients.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewIngredientRow<'_>> = new_ingredients
            .iter()
            .map(|ingredient| NewIngredientRow {
                name: ingredient.name(),
                measurement_unit: ingredient.measurement_unit(),
            })
            .collect();
        diesel::insert_into(ingredients::table)
            .values(&rows)
            .on_conflict((ingredients::name, ingredients::measurement_unit))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_tags(&self, new_tags: &[NewTag]) -> Result<usize, CatalogueRepositoryError> {
        if new_tags.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewTagRow<'_>> = new_tags
            .iter()
            .map(|tag| NewTagRow {
                name: tag.name(),
                slug: tag.slug(),
            })
            .collect();
        diesel::insert_into(tags::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
