//! `ResponseError` for the domain [`Error`].
//!
//! Client errors (4xx) are returned as raised. Server-side failures keep
//! their code and trace id but have the message replaced and details dropped;
//! the original text only goes to the log.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by every handler.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Payload sent to the client for `error`.
fn public_payload(error: &Error) -> Error {
    let message = match error.code() {
        ErrorCode::InternalError => INTERNAL_MESSAGE,
        ErrorCode::ServiceUnavailable => UNAVAILABLE_MESSAGE,
        _ => return error.clone(),
    };
    let public = Error::new(error.code(), message);
    match error.trace_id() {
        Some(id) => public.with_trace_id(id.to_owned()),
        None => public,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let trace_id = self.trace_id().unwrap_or_default();
        match self.code() {
            ErrorCode::InternalError => {
                error!(trace_id, message = %self.message(), "internal error");
            }
            ErrorCode::ServiceUnavailable => {
                warn!(trace_id, message = %self.message(), "backing service unavailable");
            }
            _ => {}
        }

        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        response.json(public_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "unexpected framework error");
        Self::internal(INTERNAL_MESSAGE)
    }
}
