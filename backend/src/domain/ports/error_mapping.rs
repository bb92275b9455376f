//! Mapping from driven-port failures to transport-agnostic domain errors.
//!
//! Connection failures become `service_unavailable`; every other storage
//! failure is `internal` and gets redacted by the HTTP adapter.

use serde_json::json;

use crate::domain::Error;

use super::{
    CatalogueRepositoryError, FollowRepositoryError, MediaStoreError, RecipeListRepositoryError,
    RecipeRepositoryError, ShortLinkRepositoryError, UserPersistenceError,
};

macro_rules! connection_or_query {
    ($($error:ident),* $(,)?) => {
        $(
            impl From<$error> for Error {
                fn from(error: $error) -> Self {
                    match error {
                        $error::Connection { message } => Error::service_unavailable(message),
                        $error::Query { message } => Error::internal(message),
                    }
                }
            }
        )*
    };
}

connection_or_query!(
    CatalogueRepositoryError,
    FollowRepositoryError,
    RecipeRepositoryError,
);

impl From<RecipeListRepositoryError> for Error {
    fn from(error: RecipeListRepositoryError) -> Self {
        match error {
            RecipeListRepositoryError::Connection { message } => Self::service_unavailable(message),
            RecipeListRepositoryError::Query { message } => Self::internal(message),
            RecipeListRepositoryError::RecipeMissing { .. } => Self::not_found("recipe not found"),
        }
    }
}

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => Self::service_unavailable(message),
            UserPersistenceError::Query { message } => Self::internal(message),
            UserPersistenceError::Duplicate { field } => {
                let message = format!("a user with this {field} already exists");
                Self::invalid_request(message)
                    .with_details(json!({ "field": field, "code": "duplicate" }))
            }
        }
    }
}

impl From<ShortLinkRepositoryError> for Error {
    fn from(error: ShortLinkRepositoryError) -> Self {
        match error {
            ShortLinkRepositoryError::Connection { message } => Self::service_unavailable(message),
            ShortLinkRepositoryError::Query { message } => Self::internal(message),
            taken @ ShortLinkRepositoryError::CodeTaken { .. } => Self::internal(taken.to_string()),
        }
    }
}

impl From<MediaStoreError> for Error {
    fn from(error: MediaStoreError) -> Self {
        Self::internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, RecipeId};
    use rstest::rstest;

    #[rstest]
    #[case(RecipeRepositoryError::connection("refused").into(), ErrorCode::ServiceUnavailable)]
    #[case(RecipeRepositoryError::query("syntax").into(), ErrorCode::InternalError)]
    #[case(FollowRepositoryError::connection("refused").into(), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("boom").into(), ErrorCode::InternalError)]
    #[case(MediaStoreError::io("disk full").into(), ErrorCode::InternalError)]
    #[case(
        RecipeListRepositoryError::recipe_missing(RecipeId::new(3)).into(),
        ErrorCode::NotFound
    )]
    fn maps_failure_categories(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn duplicate_user_names_the_field() {
        let error = Error::from(UserPersistenceError::duplicate("email"));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "email", "code": "duplicate" }))
        );
    }
}
