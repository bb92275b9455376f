//! PostgreSQL-backed favourites and shopping cart.
//!
//! Both lists share a shape: `(user_id, recipe_id)` rows guarded by a unique
//! constraint, so adds use `ON CONFLICT DO NOTHING` and report whether a row
//! was written.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecipeList, RecipeListRepository, RecipeListRepositoryError};
use crate::domain::{RecipeId, ShoppingItem, UserId};

use super::diesel_basic_error_mapping::{
    foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewFavoriteRow, NewShoppingCartRow};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, ingredients, recipe_ingredients, shopping_cart};

/// Diesel-backed implementation of the recipe list port.
#[derive(Clone)]
pub struct DieselRecipeListRepository {
    pool: DbPool,
}

impl DieselRecipeListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeListRepositoryError {
    map_basic_pool_error(error, RecipeListRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeListRepositoryError {
    map_basic_diesel_error(
        error,
        RecipeListRepositoryError::query,
        RecipeListRepositoryError::connection,
    )
}

macro_rules! insert_membership {
    ($conn:expr, $table:ident, $row:expr) => {
        diesel::insert_into($table::table)
            .values(&$row)
            .on_conflict(($table::user_id, $table::recipe_id))
            .do_nothing()
            .execute($conn)
            .await
    };
}

macro_rules! delete_membership {
    ($conn:expr, $table:ident, $user:expr, $recipe:expr) => {
        diesel::delete(
            $table::table
                .filter($table::user_id.eq($user))
                .filter($table::recipe_id.eq($recipe)),
        )
        .execute($conn)
        .await
    };
}

macro_rules! contained_recipes {
    ($conn:expr, $table:ident, $user:expr, $recipes:expr) => {
        $table::table
            .filter($table::user_id.eq($user))
            .filter($table::recipe_id.eq_any($recipes))
            .select($table::recipe_id)
            .load::<i64>($conn)
            .await
    };
}

#[async_trait]
impl RecipeListRepository for DieselRecipeListRepository {
    async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (user_id, recipe_id) = (user.get(), recipe.get());
        let inserted = match list {
            RecipeList::Favorites => insert_membership!(
                &mut conn,
                favorites,
                NewFavoriteRow { user_id, recipe_id }
            ),
            RecipeList::ShoppingCart => insert_membership!(
                &mut conn,
                shopping_cart,
                NewShoppingCartRow { user_id, recipe_id }
            ),
        }
        .map_err(|error| {
            if foreign_key_violation(&error) {
                RecipeListRepositoryError::recipe_missing(recipe)
            } else {
                map_diesel_error(error)
            }
        })?;
        Ok(inserted == 1)
    }

    async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = match list {
            RecipeList::Favorites => {
                delete_membership!(&mut conn, favorites, user.get(), recipe.get())
            }
            RecipeList::ShoppingCart => {
                delete_membership!(&mut conn, shopping_cart, user.get(), recipe.get())
            }
        }
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn contained(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RecipeListRepositoryError> {
        if recipes.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i64> = recipes.iter().map(|id| id.get()).collect();
        let found = match list {
            RecipeList::Favorites => contained_recipes!(&mut conn, favorites, user.get(), ids),
            RecipeList::ShoppingCart => {
                contained_recipes!(&mut conn, shopping_cart, user.get(), ids)
            }
        }
        .map_err(map_diesel_error)?;
        Ok(found.into_iter().map(RecipeId::new).collect())
    }

    async fn shopping_items(
        &self,
        user: UserId,
    ) -> Result<Vec<ShoppingItem>, RecipeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i32, String)> = shopping_cart::table
            .inner_join(
                recipe_ingredients::table
                    .on(recipe_ingredients::recipe_id.eq(shopping_cart::recipe_id)),
            )
            .inner_join(
                ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)),
            )
            .filter(shopping_cart::user_id.eq(user.get()))
            .order((shopping_cart::id.asc(), recipe_ingredients::id.asc()))
            .select((
                ingredients::name,
                recipe_ingredients::amount,
                ingredients::measurement_unit,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, amount, measurement_unit)| ShoppingItem {
                name,
                amount: u32::try_from(amount).unwrap_or(0),
                measurement_unit,
            })
            .collect())
    }
}
