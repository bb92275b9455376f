//! Paginated response envelopes.

use actix_web::HttpRequest;
use pagination::{Page, Paginated};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::recipes_dto::RecipeResponse;
use crate::inbound::http::urls::PublicUrls;
use crate::inbound::http::users::{SubscriptionResponse, UserResponse};
use crate::inbound::http::validation::pagination_error;

/// Convert `page` into the `{count, next, previous, results}` envelope with
/// absolute links derived from the request URL.
pub fn paginated<T, U>(
    req: &HttpRequest,
    urls: &PublicUrls,
    page: Page<T>,
    convert: impl FnMut(T) -> U,
) -> Result<Paginated<U>, Error> {
    let current = urls.current(req)?;
    Paginated::from_page(page.map(convert), &current).map_err(pagination_error)
}

macro_rules! page_schema {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(ToSchema)]
        #[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
        pub struct $name {
            /// Total number of matching items.
            count: u64,
            /// Absolute link to the following page.
            next: Option<String>,
            /// Absolute link to the preceding page.
            previous: Option<String>,
            results: Vec<$item>,
        }
    };
}

page_schema!(
    /// One page of recipes.
    RecipePage,
    RecipeResponse
);
page_schema!(
    /// One page of users.
    UserPage,
    UserResponse
);
page_schema!(
    /// One page of followed authors.
    SubscriptionPage,
    SubscriptionResponse
);
