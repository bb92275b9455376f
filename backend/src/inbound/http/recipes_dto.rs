//! Request and response payloads for the recipe endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CookingTime, Error, IngredientAmount, IngredientId, IngredientPortion, RecipeChanges,
    RecipeDraft, RecipeIngredient, RecipeSummary, RecipeView, TagId,
};
use crate::inbound::http::catalogue::TagResponse;
use crate::inbound::http::urls::PublicUrls;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::required;

/// Ingredient line of a recipe being written.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IngredientAmountRequest {
    #[schema(example = 7)]
    pub id: i64,
    #[schema(example = 200)]
    pub amount: i64,
}

/// Body of `POST /recipes/` and `PATCH /recipes/{id}/`.
///
/// Every field is optional at the serde level so a missing field is reported
/// with its name rather than as a generic JSON error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeWriteRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i64>>,
    /// Base64 data URI; required on create, optional on update.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub image: Option<String>,
    #[schema(example = "Pancakes")]
    pub name: Option<String>,
    #[schema(example = "Mix and fry.")]
    pub text: Option<String>,
    #[schema(example = 20)]
    pub cooking_time: Option<i64>,
}

impl RecipeWriteRequest {
    /// Validate a create body, returning the draft and the raw image field.
    pub fn into_draft(self) -> Result<(RecipeDraft, Option<String>), Error> {
        let (changes, image) = self.into_changes()?;
        let RecipeChanges {
            name,
            text,
            cooking_time,
            ingredients,
            tags,
        } = changes;
        let name = required(name, "name")?;
        let text = required(text, "text")?;
        let cooking_time = required(cooking_time, "cooking_time")?;
        let draft = RecipeDraft::new(&name, &text, cooking_time, ingredients, tags)?;
        Ok((draft, image))
    }

    /// Validate an update body. Name, text and cooking time may be omitted.
    pub fn into_changes(self) -> Result<(RecipeChanges, Option<String>), Error> {
        let ingredients = required(self.ingredients, "ingredients")?;
        let tags = required(self.tags, "tags")?;
        let cooking_time = self.cooking_time.map(CookingTime::new).transpose()?;
        let ingredients = ingredients
            .into_iter()
            .map(|line| {
                IngredientAmount::new(line.amount).map(|amount| IngredientPortion {
                    ingredient: IngredientId::new(line.id),
                    amount,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let changes = RecipeChanges {
            name: self.name,
            text: self.text,
            cooking_time,
            ingredients,
            tags: tags.into_iter().map(TagId::new).collect(),
        };
        Ok((changes, self.image))
    }
}

/// Ingredient line of a stored recipe.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            id: line.ingredient.id.get(),
            name: line.ingredient.name,
            measurement_unit: line.ingredient.measurement_unit,
            amount: line.amount.get(),
        }
    }
}

/// Full recipe as seen by the requester.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
}

impl RecipeResponse {
    #[must_use]
    pub fn from_view(view: RecipeView, urls: &PublicUrls) -> Self {
        let RecipeView {
            recipe,
            author,
            is_favorited,
            is_in_shopping_cart,
        } = view;
        Self {
            id: recipe.id.get(),
            tags: recipe.tags.into_iter().map(TagResponse::from).collect(),
            author: UserResponse::from_profile(author, urls),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: urls.media(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time.get(),
        }
    }
}

/// Short recipe card used by favourites, cart and subscriptions.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub cooking_time: u32,
}

impl RecipeSummaryResponse {
    #[must_use]
    pub fn from_summary(summary: RecipeSummary, urls: &PublicUrls) -> Self {
        Self {
            id: summary.id.get(),
            name: summary.name,
            image: urls.media(&summary.image),
            cooking_time: summary.cooking_time.get(),
        }
    }
}

/// Body of `GET /recipes/{id}/get-link/`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(example = "https://foodgram.example/s/a1B2c3")]
    pub short_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn valid_request() -> RecipeWriteRequest {
        serde_json::from_value(json!({
            "ingredients": [{"id": 1, "amount": 200}, {"id": 2, "amount": 2}],
            "tags": [1],
            "image": "data:image/png;base64,aGVsbG8=",
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": 20
        }))
        .expect("fixture request")
    }

    fn field_of(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|d| d.get("field"))
            .and_then(Value::as_str)
    }

    #[test]
    fn valid_body_becomes_a_draft() {
        let (draft, image) = valid_request().into_draft().expect("valid draft");
        assert_eq!(draft.name(), "Pancakes");
        assert_eq!(draft.ingredients().len(), 2);
        assert!(image.is_some());
    }

    #[test]
    fn missing_tags_are_named() {
        let request = RecipeWriteRequest {
            tags: None,
            ..valid_request()
        };
        let error = request.into_draft().expect_err("tags required");
        assert_eq!(field_of(&error), Some("tags"));
    }

    #[test]
    fn zero_amount_is_out_of_range() {
        let mut request = valid_request();
        request.ingredients = Some(vec![IngredientAmountRequest { id: 1, amount: 0 }]);
        let error = request.into_draft().expect_err("amount out of range");
        assert_eq!(field_of(&error), Some("amount"));
    }

    #[test]
    fn update_body_may_omit_scalar_fields() {
        let request = RecipeWriteRequest {
            name: None,
            text: None,
            cooking_time: None,
            image: None,
            ..valid_request()
        };
        let (changes, image) = request.into_changes().expect("partial update");
        assert_eq!(changes.name, None);
        assert_eq!(changes.cooking_time, None);
        assert_eq!(changes.ingredients.len(), 2);
        assert!(image.is_none());
    }

    #[test]
    fn create_body_still_requires_name() {
        let request = RecipeWriteRequest {
            name: None,
            ..valid_request()
        };
        let error = request.into_draft().expect_err("name required");
        assert_eq!(field_of(&error), Some("name"));
    }

    #[test]
    fn short_link_uses_hyphenated_key() {
        let body = serde_json::to_value(ShortLinkResponse {
            short_link: "https://fg.test/s/a1B2c3".to_owned(),
        })
        .expect("serialise");
        assert_eq!(body, json!({"short-link": "https://fg.test/s/a1B2c3"}));
    }
}
