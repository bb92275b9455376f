//! Public short-link redirect: `GET /s/{token}/`.

use actix_web::http::header;
use actix_web::{HttpResponse, web};

use crate::domain::{Error, ShortCode};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Redirect a short-link token to the recipe page.
///
/// Registered for both `/s/{token}` and `/s/{token}/`.
#[utoipa::path(
    get,
    path = "/s/{token}/",
    params(("token" = String, Path, description = "Short-link token")),
    responses(
        (status = 302, description = "Redirect to the recipe page", headers(("Location" = String))),
        (status = 404, description = "Unknown token", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "resolveShortLink",
    security([])
)]
pub async fn resolve_short_link(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = ShortCode::parse(&path.into_inner())
        .map_err(|_| Error::not_found("short link not found"))?;
    let recipe = state.short_links.resolve(&code).await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, state.urls.recipe_page(recipe)))
        .finish())
}

/// Mount the redirect on `cfg`.
pub fn configure_short_links(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["/s/{token}", "/s/{token}/"]).route(web::get().to(resolve_short_link)),
    );
}
