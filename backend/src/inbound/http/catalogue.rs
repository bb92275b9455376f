//! Tag and ingredient read endpoints.
//!
//! ```text
//! GET /api/tags/
//! GET /api/tags/{id}/
//! GET /api/ingredients/?name=flo
//! GET /api/ingredients/{id}/
//! ```
//!
//! Both collections are small reference lists and are returned unpaginated.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, Ingredient, IngredientId, Tag, TagId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::query::QueryParams;
use crate::inbound::http::state::HttpState;

/// Recipe tag.
#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Breakfast")]
    pub name: String,
    #[schema(example = "breakfast")]
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.get(),
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// Ingredient with its unit of measure.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 7)]
    pub id: i64,
    #[schema(example = "flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id.get(),
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// List every tag.
#[utoipa::path(
    get,
    path = "/api/tags/",
    responses(
        (status = 200, description = "Tags ordered by name", body = [TagResponse]),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listTags",
    security([])
)]
#[get("/tags/")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TagResponse>>> {
    let tags = state.catalogue.list_tags().await?;
    Ok(web::Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Fetch one tag.
#[utoipa::path(
    get,
    path = "/api/tags/{id}/",
    params(("id" = i64, Path, description = "Tag identifier")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Unknown tag", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "getTag",
    security([])
)]
#[get("/tags/{id}/")]
pub async fn get_tag(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TagResponse>> {
    let tag = state
        .catalogue
        .find_tag(TagId::new(path.into_inner()))
        .await?
        .ok_or_else(|| Error::not_found("tag not found"))?;
    Ok(web::Json(tag.into()))
}

/// List ingredients, optionally narrowed by a case-insensitive name fragment.
#[utoipa::path(
    get,
    path = "/api/ingredients/",
    params(("name" = Option<String>, Query, description = "Name fragment to search for")),
    responses(
        (status = 200, description = "Ingredients ordered by name", body = [IngredientResponse]),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listIngredients",
    security([])
)]
#[get("/ingredients/")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    query: QueryParams,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let name = query.first("name").map(str::to_owned);
    let ingredients = state.catalogue.list_ingredients(name).await?;
    Ok(web::Json(
        ingredients.into_iter().map(IngredientResponse::from).collect(),
    ))
}

/// Fetch one ingredient.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    params(("id" = i64, Path, description = "Ingredient identifier")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Unknown ingredient", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "getIngredient",
    security([])
)]
#[get("/ingredients/{id}/")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let ingredient = state
        .catalogue
        .find_ingredient(IngredientId::new(path.into_inner()))
        .await?
        .ok_or_else(|| Error::not_found("ingredient not found"))?;
    Ok(web::Json(ingredient.into()))
}
