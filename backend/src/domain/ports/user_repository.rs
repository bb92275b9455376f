//! Port abstraction for persisting user accounts.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Email, MediaPath, PasswordHash, PersonName, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError for "user repository" {
        /// A unique column already holds the submitted value.
        Duplicate { field: String } => "a user with this {field} already exists",
    }
}

/// Account row to insert at registration.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: Username,
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password_hash: PasswordHash,
}

/// Stored login material for an account.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, reporting clashes as
    /// [`UserPersistenceError::Duplicate`].
    async fn create(&self, user: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch login material by email, matched case-insensitively.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch the stored password hash for a user.
    async fn password_hash(&self, id: UserId)
    -> Result<Option<PasswordHash>, UserPersistenceError>;

    /// Page through users ordered by username; returns the page and the
    /// total number of users.
    async fn list(&self, page: &PageRequest) -> Result<(Vec<User>, u64), UserPersistenceError>;

    /// Replace or clear the avatar. Returns `false` when the user is missing.
    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<MediaPath>,
    ) -> Result<bool, UserPersistenceError>;

    /// Replace the password hash. Returns `false` when the user is missing.
    async fn set_password_hash(
        &self,
        id: UserId,
        hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError>;
}
