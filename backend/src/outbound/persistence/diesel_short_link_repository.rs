//! PostgreSQL-backed short recipe links.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ShortLinkRepository, ShortLinkRepositoryError};
use crate::domain::{RecipeId, ShortCode};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::NewShortLinkRow;
use super::pool::{DbPool, PoolError};
use super::schema::recipe_short_links;

const SHORT_URL_UNIQUE: &str = "recipe_short_links_short_url_unique";

/// Diesel-backed implementation of the short link port.
#[derive(Clone)]
pub struct DieselShortLinkRepository {
    pool: DbPool,
}

impl DieselShortLinkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ShortLinkRepositoryError {
    map_basic_pool_error(error, ShortLinkRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ShortLinkRepositoryError {
    map_basic_diesel_error(
        error,
        ShortLinkRepositoryError::query,
        ShortLinkRepositoryError::connection,
    )
}

fn parse_stored(token: &str) -> Result<ShortCode, ShortLinkRepositoryError> {
    ShortCode::parse(token)
        .map_err(|err| ShortLinkRepositoryError::query(format!("stored token {token}: {err}")))
}

#[async_trait]
impl ShortLinkRepository for DieselShortLinkRepository {
    async fn find_by_recipe(
        &self,
        recipe: RecipeId,
    ) -> Result<Option<ShortCode>, ShortLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let token: Option<String> = recipe_short_links::table
            .filter(recipe_short_links::recipe_id.eq(recipe.get()))
            .select(recipe_short_links::short_url)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        token.as_deref().map(parse_stored).transpose()
    }

    /// Insert `code` for `recipe` unless the recipe already has a link, and
    /// return whichever token is stored afterwards.
    async fn insert(
        &self,
        recipe: RecipeId,
        code: &ShortCode,
    ) -> Result<ShortCode, ShortLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewShortLinkRow {
            recipe_id: recipe.get(),
            short_url: code.as_str(),
        };
        let inserted = diesel::insert_into(recipe_short_links::table)
            .values(&row)
            .on_conflict(recipe_short_links::recipe_id)
            .do_nothing()
            .execute(&mut conn)
            .await;
        match inserted {
            Ok(_) => {}
            Err(error) if unique_violation(&error) == Some(SHORT_URL_UNIQUE) => {
                return Err(ShortLinkRepositoryError::code_taken(code.as_str()));
            }
            Err(error) => return Err(map_diesel_error(error)),
        }

        let stored: String = recipe_short_links::table
            .filter(recipe_short_links::recipe_id.eq(recipe.get()))
            .select(recipe_short_links::short_url)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        parse_stored(&stored)
    }

    async fn resolve(
        &self,
        code: &ShortCode,
    ) -> Result<Option<RecipeId>, ShortLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recipe: Option<i64> = recipe_short_links::table
            .filter(recipe_short_links::short_url.eq(code.as_str()))
            .select(recipe_short_links::recipe_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(recipe.map(RecipeId::new))
    }
}
