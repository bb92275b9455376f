//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate the
//! stored values and report failures as plain strings that callers wrap in
//! their repository's query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    CookingTime, Email, Ingredient, IngredientAmount, IngredientId, MediaPath, PersonName,
    RecipeId, RecipeSummary, Tag, TagId, User, UserId, Username,
};

use super::schema::{
    favorites, follows, ingredients, recipe_ingredients, recipe_short_links, recipe_tags, recipes,
    shopping_cart, tags, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Public user columns; the password hash is loaded separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let avatar = self
            .avatar
            .map(MediaPath::new)
            .transpose()
            .map_err(|err| err.to_string())?;
        Ok(User {
            id: UserId::new(self.id),
            username: Username::new(self.username).map_err(|err| err.to_string())?,
            email: Email::new(self.email).map_err(|err| err.to_string())?,
            first_name: PersonName::new("first_name", self.first_name)
                .map_err(|err| err.to_string())?,
            last_name: PersonName::new("last_name", self.last_name)
                .map_err(|err| err.to_string())?,
            avatar,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub user_id: i64,
    pub author_id: i64,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::new(row.id),
            name: row.name,
            slug: row.slug,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tags)]
pub(crate) struct NewTagRow<'a> {
    pub name: &'a str,
    pub slug: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: IngredientId::new(row.id),
            name: row.name,
            measurement_unit: row.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ingredients)]
pub(crate) struct NewIngredientRow<'a> {
    pub name: &'a str,
    pub measurement_unit: &'a str,
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub description: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// Columns needed for the short recipe representation.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeSummaryRow {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeSummaryRow {
    pub(crate) fn into_domain(self) -> Result<RecipeSummary, String> {
        Ok(RecipeSummary {
            id: RecipeId::new(self.id),
            name: self.name,
            image: MediaPath::new(self.image).map_err(|err| err.to_string())?,
            cooking_time: CookingTime::new(i64::from(self.cooking_time))
                .map_err(|err| err.to_string())?,
        })
    }
}

/// Recipe preview ranked within its author, read by raw SQL.
#[derive(Debug, QueryableByName)]
#[diesel(table_name = recipes)]
pub(crate) struct AuthorRecipeSummaryRow {
    pub author_id: i64,
    #[diesel(embed)]
    pub summary: RecipeSummaryRow,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub author_id: i64,
    pub name: &'a str,
    pub image: &'a str,
    pub description: &'a str,
    pub cooking_time: i32,
}

/// Changeset for recipe edits. A `None` image leaves the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = recipes)]
pub(crate) struct RecipeUpdate<'a> {
    pub name: &'a str,
    pub image: Option<&'a str>,
    pub description: &'a str,
    pub cooking_time: i32,
}

/// Ingredient line joined with its ingredient, keyed by recipe.
#[derive(Debug, Clone)]
pub(crate) struct RecipeIngredientLine {
    pub recipe_id: i64,
    pub amount: i32,
    pub ingredient: IngredientRow,
}

impl From<(i64, i32, IngredientRow)> for RecipeIngredientLine {
    fn from((recipe_id, amount, ingredient): (i64, i32, IngredientRow)) -> Self {
        Self {
            recipe_id,
            amount,
            ingredient,
        }
    }
}

impl RecipeIngredientLine {
    pub(crate) fn amount(&self) -> Result<IngredientAmount, String> {
        IngredientAmount::new(i64::from(self.amount)).map_err(|err| err.to_string())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub(crate) struct NewRecipeIngredientRow {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipe_tags)]
pub(crate) struct NewRecipeTagRow {
    pub recipe_id: i64,
    pub tag_id: i64,
}

// ---------------------------------------------------------------------------
// Recipe lists and short links
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favorites)]
pub(crate) struct NewFavoriteRow {
    pub user_id: i64,
    pub recipe_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shopping_cart)]
pub(crate) struct NewShoppingCartRow {
    pub user_id: i64,
    pub recipe_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipe_short_links)]
pub(crate) struct NewShortLinkRow<'a> {
    pub recipe_id: i64,
    pub short_url: &'a str,
}
