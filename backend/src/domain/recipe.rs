//! Recipe model, bounded quantities and the validated write payload.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{
    Error, Ingredient, IngredientId, MediaPath, RecipeId, Tag, TagId, User, UserProfile,
};

/// Smallest accepted cooking time and ingredient amount.
pub const QUANTITY_MIN: u32 = 1;
/// Largest accepted cooking time and ingredient amount.
pub const QUANTITY_MAX: u32 = 32_000;
/// Maximum recipe name length.
pub const RECIPE_NAME_MAX: usize = 256;

/// Validation failures for recipe payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("ingredient {id} is listed more than once")]
    DuplicateIngredient { id: IngredientId },
    #[error("tag {id} is listed more than once")]
    DuplicateTag { id: TagId },
}

impl RecipeValidationError {
    /// Request field the failure refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::OutOfRange { field, .. } | Self::Empty { field } => field,
            Self::NameTooLong { .. } => "name",
            Self::DuplicateIngredient { .. } => "ingredients",
            Self::DuplicateTag { .. } => "tags",
        }
    }

    /// Machine-readable reason reported in `details.code`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "out_of_range",
            Self::Empty { .. } => "blank",
            Self::NameTooLong { .. } => "max_length",
            Self::DuplicateIngredient { .. } | Self::DuplicateTag { .. } => "duplicate",
        }
    }
}

impl From<RecipeValidationError> for Error {
    fn from(error: RecipeValidationError) -> Self {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": error.field(),
            "code": error.code(),
        }))
    }
}

fn bounded(field: &'static str, value: i64) -> Result<u32, RecipeValidationError> {
    u32::try_from(value)
        .ok()
        .filter(|v| (QUANTITY_MIN..=QUANTITY_MAX).contains(v))
        .ok_or(RecipeValidationError::OutOfRange {
            field,
            min: QUANTITY_MIN,
            max: QUANTITY_MAX,
        })
}

/// Cooking time in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CookingTime(u32);

impl CookingTime {
    /// Validate a cooking time.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::CookingTime;
    ///
    /// assert!(CookingTime::new(45).is_ok());
    /// assert!(CookingTime::new(0).is_err());
    /// ```
    pub fn new(minutes: i64) -> Result<Self, RecipeValidationError> {
        bounded("cooking_time", minutes).map(Self)
    }

    /// Minutes as stored.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Quantity of an ingredient in its measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IngredientAmount(u32);

impl IngredientAmount {
    /// Validate an ingredient amount.
    pub fn new(amount: i64) -> Result<Self, RecipeValidationError> {
        bounded("amount", amount).map(Self)
    }

    /// Amount as stored.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// One ingredient line of a recipe being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientPortion {
    pub ingredient: IngredientId,
    pub amount: IngredientAmount,
}

/// Validated recipe content shared by create and update.
///
/// Referenced tag and ingredient ids are checked against the catalogue by the
/// recipe service, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    name: String,
    text: String,
    cooking_time: CookingTime,
    ingredients: Vec<IngredientPortion>,
    tags: Vec<TagId>,
}

impl RecipeDraft {
    /// Validate the recipe content.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::{
    ///     CookingTime, IngredientAmount, IngredientId, IngredientPortion, RecipeDraft, TagId,
    /// };
    ///
    /// let portion = IngredientPortion {
    ///     ingredient: IngredientId::new(1),
    ///     amount: IngredientAmount::new(200).expect("amount"),
    /// };
    /// let draft = RecipeDraft::new(
    ///     "Pancakes",
    ///     "Mix and fry.",
    ///     CookingTime::new(20).expect("time"),
    ///     vec![portion],
    ///     vec![TagId::new(1)],
    /// );
    /// assert!(draft.is_ok());
    /// ```
    pub fn new(
        name: &str,
        text: &str,
        cooking_time: CookingTime,
        ingredients: Vec<IngredientPortion>,
        tags: Vec<TagId>,
    ) -> Result<Self, RecipeValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecipeValidationError::Empty { field: "name" });
        }
        if name.chars().count() > RECIPE_NAME_MAX {
            return Err(RecipeValidationError::NameTooLong {
                max: RECIPE_NAME_MAX,
            });
        }
        if text.trim().is_empty() {
            return Err(RecipeValidationError::Empty { field: "text" });
        }
        if ingredients.is_empty() {
            return Err(RecipeValidationError::Empty {
                field: "ingredients",
            });
        }
        if tags.is_empty() {
            return Err(RecipeValidationError::Empty { field: "tags" });
        }

        let mut seen_ingredients = HashSet::new();
        if let Some(dup) = ingredients
            .iter()
            .find(|portion| !seen_ingredients.insert(portion.ingredient))
        {
            return Err(RecipeValidationError::DuplicateIngredient {
                id: dup.ingredient,
            });
        }
        let mut seen_tags = HashSet::new();
        if let Some(dup) = tags.iter().find(|tag| !seen_tags.insert(**tag)) {
            return Err(RecipeValidationError::DuplicateTag { id: *dup });
        }

        Ok(Self {
            name: name.to_owned(),
            text: text.to_owned(),
            cooking_time,
            ingredients,
            tags,
        })
    }

    /// Recipe title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Preparation instructions.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cooking time in minutes.
    #[must_use]
    pub const fn cooking_time(&self) -> CookingTime {
        self.cooking_time
    }

    /// Ingredient lines in request order.
    #[must_use]
    pub fn ingredients(&self) -> &[IngredientPortion] {
        &self.ingredients
    }

    /// Tag ids in request order.
    #[must_use]
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    /// Distinct ingredient ids referenced by the draft.
    #[must_use]
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.ingredients.iter().map(|p| p.ingredient).collect()
    }
}

/// Content of a partial recipe update.
///
/// Ingredients and tags are always replaced. Name, text and cooking time keep
/// their stored values when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<CookingTime>,
    pub ingredients: Vec<IngredientPortion>,
    pub tags: Vec<TagId>,
}

impl RecipeChanges {
    /// Merge the changes over `current` and validate the result.
    pub fn apply_to(self, current: &Recipe) -> Result<RecipeDraft, RecipeValidationError> {
        RecipeDraft::new(
            self.name.as_deref().unwrap_or(&current.name),
            self.text.as_deref().unwrap_or(&current.text),
            self.cooking_time.unwrap_or(current.cooking_time),
            self.ingredients,
            self.tags,
        )
    }
}

/// Ingredient line of a stored recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: IngredientAmount,
}

/// Stored recipe with its author and relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: User,
    pub name: String,
    pub image: MediaPath,
    pub text: String,
    pub cooking_time: CookingTime,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Compact representation used in list memberships and subscriptions.
    #[must_use]
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

/// Recipe as seen by a particular requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub author: UserProfile,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Short recipe representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: MediaPath,
    pub cooking_time: CookingTime,
}
