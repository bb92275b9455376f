//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every annotated handler and response schema. Swagger UI
//! serves it in debug builds and `openapi-dump` prints it for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::catalogue::{IngredientResponse, TagResponse};
use crate::inbound::http::pages::{RecipePage, SubscriptionPage, UserPage};
use crate::inbound::http::recipes_dto::{
    IngredientAmountRequest, RecipeIngredientResponse, RecipeResponse, RecipeSummaryResponse,
    RecipeWriteRequest, ShortLinkResponse,
};
use crate::inbound::http::users::{
    AvatarRequest, AvatarResponse, RegisterRequest, RegisteredUserResponse, SetPasswordRequest,
    SubscriptionResponse, UserResponse,
};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/token/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Foodgram API",
        description = "Recipes, favourites, shopping lists and author subscriptions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::delete_avatar,
        crate::inbound::http::users::set_password,
        crate::inbound::http::users::list_subscriptions,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::catalogue::list_tags,
        crate::inbound::http::catalogue::get_tag,
        crate::inbound::http::catalogue::list_ingredients,
        crate::inbound::http::catalogue::get_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_shopping_cart,
        crate::inbound::http::recipes::remove_from_shopping_cart,
        crate::inbound::http::recipes::get_short_link,
        crate::inbound::http::short_links::resolve_short_link,
        crate::inbound::http::media::serve_media,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        RegisterRequest,
        RegisteredUserResponse,
        UserResponse,
        UserPage,
        AvatarRequest,
        AvatarResponse,
        SetPasswordRequest,
        SubscriptionResponse,
        SubscriptionPage,
        TagResponse,
        IngredientResponse,
        IngredientAmountRequest,
        RecipeWriteRequest,
        RecipeIngredientResponse,
        RecipeResponse,
        RecipeSummaryResponse,
        RecipePage,
        ShortLinkResponse,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Accounts, avatars and subscriptions"),
        (name = "catalogue", description = "Tags and ingredients"),
        (name = "recipes", description = "Recipes, favourites and the shopping cart"),
        (name = "media", description = "Uploaded images"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
