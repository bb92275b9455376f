//! Favourites, the shopping cart and the aggregated shopping list.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{RecipeList, RecipeListRepository, RecipeRepository};
use crate::domain::{Error, RecipeId, RecipeSummary, ShoppingList, UserId};

/// Service behind the favourite and shopping-cart endpoints.
#[derive(Clone)]
pub struct RecipeListService {
    recipes: Arc<dyn RecipeRepository>,
    lists: Arc<dyn RecipeListRepository>,
}

impl RecipeListService {
    /// Create the service over its driven ports.
    pub fn new(recipes: Arc<dyn RecipeRepository>, lists: Arc<dyn RecipeListRepository>) -> Self {
        Self { recipes, lists }
    }

    /// Add a recipe to one of the user's lists and return its summary.
    ///
    /// Adding a recipe that is already present is a conflict.
    pub async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<RecipeSummary, Error> {
        let summary = self
            .recipes
            .find_summary(recipe)
            .await?
            .ok_or_else(|| Error::not_found("recipe not found"))?;
        if !self.lists.add(list, user, recipe).await? {
            return Err(Error::conflict(format!(
                "recipe is already in {}",
                list.label()
            )));
        }
        debug!(user_id = %user, recipe_id = %recipe, list = list.label(), "added recipe");
        Ok(summary)
    }

    /// Remove a recipe from one of the user's lists.
    pub async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<(), Error> {
        if self.recipes.find_summary(recipe).await?.is_none() {
            return Err(Error::not_found("recipe not found"));
        }
        if self.lists.remove(list, user, recipe).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!(
                "recipe is not in {}",
                list.label()
            )))
        }
    }

    /// Ingredient totals across every recipe in the user's cart.
    pub async fn shopping_list(&self, user: UserId) -> Result<ShoppingList, Error> {
        let items = self.lists.shopping_items(user).await?;
        Ok(ShoppingList::aggregate(items))
    }
}
