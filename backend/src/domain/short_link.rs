//! Short recipe link tokens.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Number of characters in a generated token.
pub const SHORT_CODE_LEN: usize = 6;

/// Token rejected because it is not a well-formed short code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("short link token must be {SHORT_CODE_LEN} ASCII letters or digits")]
pub struct ShortCodeError;

/// Six-character alphanumeric token identifying a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    /// Draw a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SHORT_CODE_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Validate a token received from a client or loaded from storage.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::ShortCode;
    ///
    /// assert!(ShortCode::parse("a1B2c3").is_ok());
    /// assert!(ShortCode::parse("a1-2c3").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ShortCodeError> {
        if raw.len() == SHORT_CODE_LEN && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(ShortCodeError)
        }
    }

    /// Token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..32 {
            let code = ShortCode::generate();
            assert!(ShortCode::parse(code.as_str()).is_ok(), "{code}");
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(ShortCode::parse("abc"), Err(ShortCodeError));
        assert_eq!(ShortCode::parse("abcdefg"), Err(ShortCodeError));
    }
}
