//! Account, avatar and subscription handlers.
//!
//! ```text
//! POST   /api/users/                 {"email":..,"username":..,"password":..}
//! GET    /api/users/?page=2&limit=6
//! GET    /api/users/me/
//! PUT    /api/users/me/avatar/        {"avatar":"data:image/png;base64,.."}
//! POST   /api/users/set_password/     {"current_password":..,"new_password":..}
//! GET    /api/users/subscriptions/?recipes_limit=3
//! POST   /api/users/{id}/subscribe/
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Password, Registration, Subscription, User, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::{SubscriptionPage, UserPage, paginated};
use crate::inbound::http::query::QueryParams;
use crate::inbound::http::recipes_dto::RecipeSummaryResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::urls::PublicUrls;
use crate::inbound::http::validation::{
    credentials_validation_error, parse_image, required, user_validation_error,
};

/// Public user representation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "cook@example.com")]
    pub email: String,
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "cook")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requester follows this user.
    pub is_subscribed: bool,
    /// Absolute avatar URL, `null` when unset.
    pub avatar: Option<String>,
}

impl UserResponse {
    #[must_use]
    pub fn from_profile(profile: UserProfile, urls: &PublicUrls) -> Self {
        let UserProfile {
            user,
            is_subscribed,
        } = profile;
        Self {
            avatar: user.avatar.as_ref().map(|path| urls.media(path)),
            email: user.email.into(),
            id: user.id.get(),
            username: user.username.into(),
            first_name: user.first_name.into(),
            last_name: user.last_name.into(),
            is_subscribed,
        }
    }
}

/// Account returned by registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email.into(),
            id: user.id.get(),
            username: user.username.into(),
            first_name: user.first_name.into(),
            last_name: user.last_name.into(),
        }
    }
}

/// Body of `POST /users/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    #[schema(example = "cook")]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    fn validate(self) -> Result<(Registration, Password), Error> {
        let email = required(self.email, "email")?;
        let username = required(self.username, "username")?;
        let first_name = required(self.first_name, "first_name")?;
        let last_name = required(self.last_name, "last_name")?;
        let password = required(self.password, "password")?;

        let registration = Registration::try_from_parts(&username, &email, &first_name, &last_name)
            .map_err(|err| user_validation_error(&err))?;
        let password =
            Password::new(&password).map_err(|err| credentials_validation_error("password", &err))?;
        Ok((registration, password))
    }
}

/// Body of `PUT /users/me/avatar/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AvatarRequest {
    /// Base64 data URI.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub avatar: Option<String>,
}

/// Stored avatar location.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Body of `POST /users/set_password/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SetPasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Followed author with a preview of their recipes.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl SubscriptionResponse {
    #[must_use]
    pub fn from_subscription(subscription: Subscription, urls: &PublicUrls) -> Self {
        Self {
            user: UserResponse::from_profile(subscription.author, urls),
            recipes: subscription
                .recipes
                .into_iter()
                .map(|summary| RecipeSummaryResponse::from_summary(summary, urls))
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUserResponse),
        (status = 400, description = "Invalid or duplicate field", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let (registration, password) = payload.into_inner().validate()?;
    let user = state.accounts.register(registration, &password).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// Page through users ordered by username.
#[utoipa::path(
    get,
    path = "/api/users/",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Users", body = UserPage),
        (status = 404, description = "Page out of range", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users/")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: QueryParams,
) -> ApiResult<web::Json<Paginated<UserResponse>>> {
    let viewer = session.user_id()?;
    let page = state.accounts.list(viewer, query.page_request()?).await?;
    let body = paginated(&req, &state.urls, page, |profile| {
        UserResponse::from_profile(profile, &state.urls)
    })?;
    Ok(web::Json(body))
}

/// The authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/users/me/",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me/")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let id = session.require_user_id()?;
    let profile = state.accounts.me(id).await?;
    Ok(web::Json(UserResponse::from_profile(profile, &state.urls)))
}

/// Upload a new avatar.
#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Missing or undecodable image", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar/")]
pub async fn set_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<AvatarResponse>> {
    let id = session.require_user_id()?;
    let raw = required(payload.into_inner().avatar, "avatar")?;
    let image = parse_image("avatar", &raw)?;
    let path = state.accounts.set_avatar(id, &image).await?;
    Ok(web::Json(AvatarResponse {
        avatar: state.urls.media(&path),
    }))
}

/// Remove the avatar.
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    responses(
        (status = 204, description = "Avatar cleared"),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteAvatar"
)]
#[delete("/users/me/avatar/")]
pub async fn delete_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let id = session.require_user_id()?;
    state.accounts.remove_avatar(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change the password after confirming the current one.
#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new one", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "setPassword"
)]
#[post("/users/set_password/")]
pub async fn set_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let id = session.require_user_id()?;
    let SetPasswordRequest {
        current_password,
        new_password,
    } = payload.into_inner();
    let current = required(current_password, "current_password")?;
    let new_password = required(new_password, "new_password")?;
    let new_password = Password::new(&new_password)
        .map_err(|err| credentials_validation_error("new_password", &err))?;
    state
        .accounts
        .change_password(id, &current, &new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Authors the current user follows.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("recipes_limit" = Option<u32>, Query, description = "Recipes shown per author")
    ),
    responses(
        (status = 200, description = "Followed authors", body = SubscriptionPage),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Page out of range", body = Error)
    ),
    tags = ["users"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions/")]
pub async fn list_subscriptions(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: QueryParams,
) -> ApiResult<web::Json<Paginated<SubscriptionResponse>>> {
    let follower = session.require_user_id()?;
    let page = state
        .subscriptions
        .list(follower, query.page_request()?, query.recipes_limit()?)
        .await?;
    let body = paginated(&req, &state.urls, page, |subscription| {
        SubscriptionResponse::from_subscription(subscription, &state.urls)
    })?;
    Ok(web::Json(body))
}

/// A user's public profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}/")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let viewer = session.user_id()?;
    let profile = state
        .accounts
        .profile(viewer, UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(UserResponse::from_profile(profile, &state.urls)))
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    params(
        ("id" = i64, Path, description = "Author identifier"),
        ("recipes_limit" = Option<u32>, Query, description = "Recipes shown in the response")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Subscribing to yourself", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown author", body = Error),
        (status = 409, description = "Already subscribed", body = Error)
    ),
    tags = ["users"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe/")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: QueryParams,
) -> ApiResult<HttpResponse> {
    let follower = session.require_user_id()?;
    let subscription = state
        .subscriptions
        .subscribe(
            follower,
            UserId::new(path.into_inner()),
            query.recipes_limit()?,
        )
        .await?;
    Ok(HttpResponse::Created().json(SubscriptionResponse::from_subscription(
        subscription,
        &state.urls,
    )))
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    params(("id" = i64, Path, description = "Author identifier")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown author or not subscribed", body = Error)
    ),
    tags = ["users"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe/")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let follower = session.require_user_id()?;
    state
        .subscriptions
        .unsubscribe(follower, UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
