//! Absolute URLs handed out to clients.
//!
//! Stored media, short links and frontend recipe pages are addressed relative
//! to bases taken from configuration, so responses never depend on the
//! `Host` header of the incoming request.

use actix_web::HttpRequest;
use url::Url;

use crate::domain::{Error, MediaPath, RecipeId, ShortCode};

/// Path prefix under which stored media is served.
pub const MEDIA_PREFIX: &str = "/media";

/// Base URLs used to build absolute links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrls {
    public_base: Url,
    short_link_base: Url,
    frontend_base: Url,
}

impl PublicUrls {
    /// Bundle the three bases.
    #[must_use]
    pub fn new(public_base: Url, short_link_base: Url, frontend_base: Url) -> Self {
        Self {
            public_base,
            short_link_base,
            frontend_base,
        }
    }

    /// Use `base` for every link; handy when the API also serves the frontend.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::MediaPath;
    /// use foodgram::inbound::http::urls::PublicUrls;
    /// use url::Url;
    ///
    /// let urls = PublicUrls::single(Url::parse("http://localhost:8000/").expect("url"));
    /// let path = MediaPath::new("recipes/images/abc.png").expect("path");
    /// assert_eq!(
    ///     urls.media(&path),
    ///     "http://localhost:8000/media/recipes/images/abc.png"
    /// );
    /// ```
    #[must_use]
    pub fn single(base: Url) -> Self {
        Self::new(base.clone(), base.clone(), base)
    }

    /// Absolute URL of a stored media file.
    #[must_use]
    pub fn media(&self, path: &MediaPath) -> String {
        format!("{}{MEDIA_PREFIX}/{path}", trimmed(&self.public_base))
    }

    /// Public short link for a recipe token.
    #[must_use]
    pub fn short_link(&self, code: &ShortCode) -> String {
        format!("{}/s/{code}", trimmed(&self.short_link_base))
    }

    /// Frontend page showing a recipe; short links redirect here.
    #[must_use]
    pub fn recipe_page(&self, id: RecipeId) -> String {
        format!("{}/recipes/{id}", trimmed(&self.frontend_base))
    }

    /// Absolute form of the URL `req` was made to, used for page links.
    pub fn current(&self, req: &HttpRequest) -> Result<Url, Error> {
        let target = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.path().to_owned(), ToString::to_string);
        self.public_base
            .join(&target)
            .map_err(|err| Error::internal(format!("cannot build request URL: {err}")))
    }
}

fn trimmed(base: &Url) -> &str {
    base.as_str().trim_end_matches('/')
}
