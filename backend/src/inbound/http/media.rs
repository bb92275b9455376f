//! Serves uploaded images under `/media/{path}`.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, MediaPath};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn content_type_for(path: &MediaPath) -> String {
    mime_guess::from_path(path.as_str())
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

/// Stream a stored media file.
#[utoipa::path(
    get,
    path = "/media/{path}",
    params(("path" = String, Path, description = "Relative media path")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = Error)
    ),
    tags = ["media"],
    operation_id = "getMedia",
    security([])
)]
#[get("/media/{path:.*}")]
pub async fn serve_media(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let not_found = || Error::not_found("media file not found");
    let path = MediaPath::new(path.into_inner()).map_err(|_| not_found())?;
    let bytes = state.media.load(&path).await?.ok_or_else(not_found)?;
    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&path))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
