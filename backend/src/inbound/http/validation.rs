//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every request validation failure is reported as `400 invalid_request`
//! with `details: {field, code, ...}` naming the offending field.

use pagination::PaginationError;
use serde_json::json;

use crate::domain::{
    CredentialsValidationError, Error, ImageUpload, ImageUploadError, UserValidationError,
};

/// Validation error codes carried in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    Blank,
    MaxLength,
    Invalid,
    Reserved,
    InvalidInteger,
    InvalidImage,
    PasswordTooShort,
    PasswordNumeric,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::Blank => "blank",
            ErrorCode::MaxLength => "max_length",
            ErrorCode::Invalid => "invalid",
            ErrorCode::Reserved => "reserved",
            ErrorCode::InvalidInteger => "invalid_integer",
            ErrorCode::InvalidImage => "invalid_image",
            ErrorCode::PasswordTooShort => "password_too_short",
            ErrorCode::PasswordNumeric => "password_entirely_numeric",
        }
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Unwrap an optional request field or report it missing.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn invalid_integer_error(field: &str, value: &str) -> Error {
    ValidationError::new(field, format!("{field} must be a positive integer"))
        .with_value(ErrorCode::InvalidInteger, value)
}

/// Parse a positive integer query value.
pub(crate) fn parse_positive(field: &str, raw: &str) -> Result<u32, Error> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| invalid_integer_error(field, raw))
}

/// Parse a positive identifier given in a query string.
pub(crate) fn parse_id(field: &str, raw: &str) -> Result<i64, Error> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| invalid_integer_error(field, raw))
}

pub(crate) fn user_validation_error(error: &UserValidationError) -> Error {
    let code = match error {
        UserValidationError::EmptyUsername
        | UserValidationError::EmptyEmail
        | UserValidationError::EmptyName { .. } => ErrorCode::Blank,
        UserValidationError::UsernameTooLong { .. }
        | UserValidationError::EmailTooLong { .. }
        | UserValidationError::NameTooLong { .. } => ErrorCode::MaxLength,
        UserValidationError::UsernameInvalidCharacters | UserValidationError::EmailMalformed => {
            ErrorCode::Invalid
        }
        UserValidationError::UsernameReserved => ErrorCode::Reserved,
    };
    ValidationError::new(error.field(), error.to_string()).with_code(code)
}

pub(crate) fn credentials_validation_error(
    field: &str,
    error: &CredentialsValidationError,
) -> Error {
    let code = match error {
        CredentialsValidationError::EmptyEmail | CredentialsValidationError::EmptyPassword => {
            ErrorCode::Blank
        }
        CredentialsValidationError::PasswordTooShort { .. } => ErrorCode::PasswordTooShort,
        CredentialsValidationError::PasswordEntirelyNumeric => ErrorCode::PasswordNumeric,
    };
    let field = match error {
        CredentialsValidationError::EmptyEmail => "email",
        _ => field,
    };
    ValidationError::new(field, error.to_string()).with_code(code)
}

/// Decode a data-URI image field.
pub(crate) fn parse_image(field: &str, raw: &str) -> Result<ImageUpload, Error> {
    ImageUpload::from_data_uri(raw).map_err(|error| image_error(field, &error))
}

fn image_error(field: &str, error: &ImageUploadError) -> Error {
    ValidationError::new(field, error.to_string()).with_code(ErrorCode::InvalidImage)
}

/// Unknown or out-of-range pages are reported as missing resources.
pub(crate) fn pagination_error(error: PaginationError) -> Error {
    Error::not_found(format!("invalid page: {error}"))
        .with_details(json!({ "field": "page", "code": "invalid_page" }))
}
