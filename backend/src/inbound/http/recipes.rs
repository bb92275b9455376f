//! Recipe CRUD, favourites, shopping cart and short-link issuing.
//!
//! ```text
//! GET    /api/recipes/?tags=breakfast&tags=lunch&is_favorited=1
//! POST   /api/recipes/
//! GET    /api/recipes/download_shopping_cart/
//! PATCH  /api/recipes/{id}/
//! POST   /api/recipes/{id}/favorite/
//! POST   /api/recipes/{id}/shopping_cart/
//! GET    /api/recipes/{id}/get-link/
//! ```

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use pagination::Paginated;

use crate::domain::ports::RecipeList;
use crate::domain::{Error, RecipeId, SHOPPING_LIST_FILE_NAME};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::{RecipePage, paginated};
use crate::inbound::http::query::QueryParams;
use crate::inbound::http::recipes_dto::{
    RecipeResponse, RecipeSummaryResponse, RecipeWriteRequest, ShortLinkResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_image, required};

/// Page through recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipes/",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("author" = Option<i64>, Query, description = "Author identifier"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slugs; a recipe matches any of them"),
        ("is_favorited" = Option<u8>, Query, description = "1 to keep, 0 to drop favourites"),
        ("is_in_shopping_cart" = Option<u8>, Query, description = "1 to keep, 0 to drop carted recipes")
    ),
    responses(
        (status = 200, description = "Recipes", body = RecipePage),
        (status = 400, description = "Malformed filter", body = Error),
        (status = 404, description = "Page out of range", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/recipes/")]
pub async fn list_recipes(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: QueryParams,
) -> ApiResult<web::Json<Paginated<RecipeResponse>>> {
    let viewer = session.user_id()?;
    let filter = query.recipe_filter()?;
    let page = state
        .recipes
        .list(viewer, &filter, query.page_request()?)
        .await?;
    let body = paginated(&req, &state.urls, page, |view| {
        RecipeResponse::from_view(view, &state.urls)
    })?;
    Ok(web::Json(body))
}

/// Publish a recipe.
#[utoipa::path(
    post,
    path = "/api/recipes/",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes/")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeWriteRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let (draft, image) = payload.into_inner().into_draft()?;
    let image = parse_image("image", &required(image, "image")?)?;
    let view = state.recipes.create(author, &draft, &image).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from_view(view, &state.urls)))
}

/// Download the aggregated shopping list as plain text.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    responses(
        (status = 200, description = "Shopping list attachment", content_type = "text/plain", body = String),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart/")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let list = state.recipe_lists.shopping_list(user).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(
                    SHOPPING_LIST_FILE_NAME.to_owned(),
                )],
            },
        ))
        .body(list.render()))
}

/// One recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id}/")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let viewer = session.user_id()?;
    let view = state
        .recipes
        .get(viewer, RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(RecipeResponse::from_view(view, &state.urls)))
}

/// Update a recipe. Ingredients and tags are replaced; omitted name, text,
/// cooking time or image keep their stored values.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id}/")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipeWriteRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let editor = session.require_user_id()?;
    let (changes, image) = payload.into_inner().into_changes()?;
    let image = image.map(|raw| parse_image("image", &raw)).transpose()?;
    let view = state
        .recipes
        .update(editor, RecipeId::new(path.into_inner()), changes, image.as_ref())
        .await?;
    Ok(web::Json(RecipeResponse::from_view(view, &state.urls)))
}

/// Delete a recipe together with its list memberships.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}/")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let editor = session.require_user_id()?;
    state
        .recipes
        .delete(editor, RecipeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_to(
    state: &HttpState,
    session: &SessionContext,
    list: RecipeList,
    id: i64,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let summary = state.recipe_lists.add(list, user, RecipeId::new(id)).await?;
    Ok(HttpResponse::Created().json(RecipeSummaryResponse::from_summary(summary, &state.urls)))
}

async fn remove_from(
    state: &HttpState,
    session: &SessionContext,
    list: RecipeList,
    id: i64,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    state
        .recipe_lists
        .remove(list, user, RecipeId::new(id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a recipe to favourites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 201, description = "Favourited", body = RecipeSummaryResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error),
        (status = 409, description = "Already favourited", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite/")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_to(&state, &session, RecipeList::Favorites, path.into_inner()).await
}

/// Remove a recipe from favourites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe or not favourited", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite/")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_from(&state, &session, RecipeList::Favorites, path.into_inner()).await
}

/// Add a recipe to the shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 201, description = "Added to cart", body = RecipeSummaryResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error),
        (status = 409, description = "Already in cart", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart/")]
pub async fn add_to_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_to(&state, &session, RecipeList::ShoppingCart, path.into_inner()).await
}

/// Remove a recipe from the shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe or not in cart", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart/")]
pub async fn remove_from_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_from(&state, &session, RecipeList::ShoppingCart, path.into_inner()).await
}

/// Stable short link for a recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link/",
    params(("id" = i64, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getShortLink",
    security([])
)]
#[get("/recipes/{id}/get-link/")]
pub async fn get_short_link(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let code = state
        .short_links
        .link_for(RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ShortLinkResponse {
        short_link: state.urls.short_link(&code),
    }))
}
