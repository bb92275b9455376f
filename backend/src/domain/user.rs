//! User account model and its validated field types.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::{MediaPath, UserId};

/// Maximum length for usernames and personal names.
pub const NAME_MAX: usize = 150;
/// Maximum length for email addresses.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    UsernameReserved,
    EmptyEmail,
    EmailTooLong { max: usize },
    EmailMalformed,
    EmptyName { field: &'static str },
    NameTooLong { field: &'static str, max: usize },
}

impl UserValidationError {
    /// Request field the failure refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername
            | Self::UsernameTooLong { .. }
            | Self::UsernameInvalidCharacters
            | Self::UsernameReserved => "username",
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::EmailMalformed => "email",
            Self::EmptyName { field } | Self::NameTooLong { field, .. } => field,
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits and @/./+/-/_ characters",
            ),
            Self::UsernameReserved => write!(f, "username 'me' is reserved"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmailMalformed => write!(f, "email must be a valid address"),
            Self::EmptyName { field } => write!(f, "{field} must not be empty"),
            Self::NameTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+\z")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Public login handle, unique across users.
///
/// # Examples
/// ```
/// use foodgram::domain::Username;
///
/// assert!(Username::new("chef.anna").is_ok());
/// assert!(Username::new("Me").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if raw.chars().count() > NAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: NAME_MAX });
        }
        if !username_regex().is_match(&raw) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        if raw.eq_ignore_ascii_case("me") {
            return Err(UserValidationError::UsernameReserved);
        }
        Ok(Self(raw))
    }
}

/// Email address used as the login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`]. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::EmailMalformed);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// First or last name of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name supplied for `field`.
    pub fn new(field: &'static str, raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyName { field });
        }
        if raw.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(raw))
    }
}

macro_rules! string_newtype_impls {
    ($($name:ident),*) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }
        )*
    };
}

string_newtype_impls!(Username, Email, PersonName);

/// Registered user as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub avatar: Option<MediaPath>,
}

/// A user as seen by a particular requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    /// Whether the requester follows this user. Always `false` for anonymous
    /// requesters and for the requester's own profile.
    pub is_subscribed: bool,
}

impl UserProfile {
    /// Profile of `user` for a requester who does not follow them.
    #[must_use]
    pub fn unfollowed(user: User) -> Self {
        Self {
            user,
            is_subscribed: false,
        }
    }
}

/// Validated profile fields supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

impl Registration {
    /// Validate raw registration fields, reporting the first invalid one.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            email: Email::new(email)?,
            first_name: PersonName::new("first_name", first_name)?,
            last_name: PersonName::new("last_name", last_name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("anna")]
    #[case("chef.anna+test@home")]
    #[case("повар_1")]
    fn accepts_valid_usernames(#[case] raw: &str) {
        assert!(Username::new(raw).is_ok());
    }

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("with space", UserValidationError::UsernameInvalidCharacters)]
    #[case("semi;colon", UserValidationError::UsernameInvalidCharacters)]
    #[case("me", UserValidationError::UsernameReserved)]
    #[case("ME", UserValidationError::UsernameReserved)]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Username::new(raw), Err(expected));
    }

    #[test]
    fn rejects_overlong_usernames() {
        let raw = "a".repeat(NAME_MAX + 1);
        assert_eq!(
            Username::new(raw),
            Err(UserValidationError::UsernameTooLong { max: NAME_MAX })
        );
    }

    #[rstest]
    #[case("cook@example.com", true)]
    #[case("  cook@example.com ", true)]
    #[case("cook.example.com", false)]
    #[case("cook@example", false)]
    #[case("", false)]
    fn validates_emails(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(Email::new(raw).is_ok(), valid);
    }

    #[test]
    fn registration_reports_failing_field() {
        let err = Registration::try_from_parts("anna", "anna@example.com", "Anna", " ")
            .expect_err("blank last name");
        assert_eq!(err.field(), "last_name");
    }
}
