//! Get-or-create short links for recipes.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{RecipeRepository, ShortLinkRepository, ShortLinkRepositoryError};
use crate::domain::{Error, RecipeId, ShortCode};

/// Attempts made to draw an unused token before giving up.
pub const SHORT_CODE_ATTEMPTS: usize = 5;

/// Service behind `/recipes/{id}/get-link` and `/s/{token}`.
#[derive(Clone)]
pub struct ShortLinkService {
    recipes: Arc<dyn RecipeRepository>,
    links: Arc<dyn ShortLinkRepository>,
}

impl ShortLinkService {
    /// Create the service over its driven ports.
    pub fn new(recipes: Arc<dyn RecipeRepository>, links: Arc<dyn ShortLinkRepository>) -> Self {
        Self { recipes, links }
    }

    /// Token for `recipe`, generated on first use and stable afterwards.
    pub async fn link_for(&self, recipe: RecipeId) -> Result<ShortCode, Error> {
        if self.recipes.find_summary(recipe).await?.is_none() {
            return Err(Error::not_found("recipe not found"));
        }
        if let Some(existing) = self.links.find_by_recipe(recipe).await? {
            return Ok(existing);
        }
        for _ in 0..SHORT_CODE_ATTEMPTS {
            let candidate = ShortCode::generate();
            match self.links.insert(recipe, &candidate).await {
                Ok(code) => return Ok(code),
                Err(ShortLinkRepositoryError::CodeTaken { code }) => {
                    warn!(recipe_id = %recipe, %code, "short link token collision, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }
        Err(Error::internal("could not allocate a unique short link"))
    }

    /// Recipe a token points at.
    pub async fn resolve(&self, code: &ShortCode) -> Result<RecipeId, Error> {
        self.links
            .resolve(code)
            .await?
            .ok_or_else(|| Error::not_found("short link not found"))
    }
}
