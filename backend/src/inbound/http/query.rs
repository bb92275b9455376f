//! Query-string extraction with repeated keys.
//!
//! `web::Query` collapses repeated parameters, but recipe listings accept
//! `?tags=breakfast&tags=lunch`, so handlers read the raw pairs through
//! [`QueryParams`] instead.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use pagination::{LIMIT_PARAM, PAGE_PARAM, PageRequest};
use url::form_urlencoded;

use crate::domain::{Error, RecipeFilter, UserId, parse_membership_flag};
use crate::inbound::http::validation::{pagination_error, parse_id, parse_positive};

/// Query parameter capping the recipes embedded in subscription entries.
pub const RECIPES_LIMIT_PARAM: &str = "recipes_limit";

/// Decoded query pairs in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Decode a raw query string.
    ///
    /// # Examples
    /// ```
    /// use foodgram::inbound::http::query::QueryParams;
    ///
    /// let params = QueryParams::parse("tags=lunch&tags=dinner&name=%D1%81%D0%BE");
    /// assert_eq!(params.all("tags").collect::<Vec<_>>(), ["lunch", "dinner"]);
    /// assert_eq!(params.first("name"), Some("со"));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            form_urlencoded::parse(raw.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    /// First value for `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.all(key).next()
    }

    /// Every value for `key`, in order.
    pub fn all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Page selection from `page` and `limit`.
    pub fn page_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.first(PAGE_PARAM), self.first(LIMIT_PARAM))
            .map_err(pagination_error)
    }

    /// Optional `recipes_limit` cap.
    pub fn recipes_limit(&self) -> Result<Option<u32>, Error> {
        self.first(RECIPES_LIMIT_PARAM)
            .map(|raw| parse_positive(RECIPES_LIMIT_PARAM, raw))
            .transpose()
    }

    /// Recipe filter from `author`, `tags`, `is_favorited` and
    /// `is_in_shopping_cart`.
    ///
    /// Membership flags other than `1`/`0` are ignored; blank tag values are
    /// dropped.
    pub fn recipe_filter(&self) -> Result<RecipeFilter, Error> {
        let author = self
            .first("author")
            .map(|raw| parse_id("author", raw).map(UserId::new))
            .transpose()?;
        let tags = self
            .all("tags")
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(RecipeFilter {
            author,
            tags,
            is_favorited: self.first("is_favorited").and_then(parse_membership_flag),
            is_in_shopping_cart: self
                .first("is_in_shopping_cart")
                .and_then(parse_membership_flag),
        })
    }
}

impl FromRequest for QueryParams {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::parse(req.query_string())))
    }
}
