//! Cookie-session login and logout.
//!
//! ```text
//! POST /api/auth/token/login/  {"email":"cook@example.com","password":"..."}
//! POST /api/auth/token/logout/
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{CredentialsValidationError, Error, LoginCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::credentials_validation_error;

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "cook@example.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialsValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Check credentials and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/token/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank email or password", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/token/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())
        .map_err(|err| credentials_validation_error("password", &err))?;
    let user_id = state.accounts.authenticate(&credentials).await?;
    session.persist_user(user_id)?;
    info!(user_id = %user_id, "user signed in");
    Ok(HttpResponse::Ok().finish())
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/auth/token/logout/",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/token/logout/")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}
