//! Account registration, authentication and profile maintenance.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{FollowRepository, MediaStore, NewUserRecord, UserRepository};
use crate::domain::{
    Error, ImageUpload, LoginCredentials, MediaFolder, MediaPath, Password, PasswordHash,
    Registration, User, UserId, UserProfile,
};

/// Service behind the `/users` and `/auth` endpoints.
#[derive(Clone)]
pub struct AccountsService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    media: Arc<dyn MediaStore>,
}

impl AccountsService {
    /// Create the service over its driven ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            users,
            follows,
            media,
        }
    }

    /// Register a new account.
    pub async fn register(
        &self,
        registration: Registration,
        password: &Password,
    ) -> Result<User, Error> {
        let password_hash = PasswordHash::create(password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let record = NewUserRecord {
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
        };
        let user = self.users.create(&record).await?;
        debug!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Check credentials and return the matching user id.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_credentials_by_email(credentials.email())
            .await?;
        match stored {
            Some(stored) if stored.password_hash.verify(credentials.password()) => {
                Ok(stored.user_id)
            }
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }

    /// The authenticated user's own profile.
    pub async fn me(&self, id: UserId) -> Result<UserProfile, Error> {
        let user = self.require_user(id).await?;
        Ok(UserProfile::unfollowed(user))
    }

    /// A user's profile as seen by `viewer`.
    pub async fn profile(&self, viewer: Option<UserId>, id: UserId) -> Result<UserProfile, Error> {
        let user = self.require_user(id).await?;
        let mut profiles = self.profiles_for(viewer, vec![user]).await?;
        profiles
            .pop()
            .ok_or_else(|| Error::internal("profile lookup lost its user"))
    }

    /// Page through every user ordered by username.
    pub async fn list(
        &self,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        let (users, total) = self.users.list(&request).await?;
        let profiles = self.profiles_for(viewer, users).await?;
        Ok(Page::new(profiles, total, request))
    }

    /// Store a new avatar and return its path.
    pub async fn set_avatar(&self, id: UserId, image: &ImageUpload) -> Result<MediaPath, Error> {
        let path = self.media.store(MediaFolder::Avatars, image).await?;
        if !self.users.set_avatar(id, Some(path.clone())).await? {
            return Err(Error::not_found("user not found"));
        }
        Ok(path)
    }

    /// Clear the avatar.
    pub async fn remove_avatar(&self, id: UserId) -> Result<(), Error> {
        if self.users.set_avatar(id, None).await? {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }

    /// Replace the password after checking the current one.
    pub async fn change_password(
        &self,
        id: UserId,
        current_password: &str,
        new_password: &Password,
    ) -> Result<(), Error> {
        let stored = self
            .users
            .password_hash(id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if !stored.verify(current_password) {
            warn!(user_id = %id, "password change rejected: current password mismatch");
            return Err(Error::invalid_request("current password is incorrect").with_details(
                json!({ "field": "current_password", "code": "incorrect_password" }),
            ));
        }
        let hash = PasswordHash::create(new_password)
            .map_err(|err| Error::internal(err.to_string()))?;
        if self.users.set_password_hash(id, &hash).await? {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }

    async fn require_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn profiles_for(
        &self,
        viewer: Option<UserId>,
        users: Vec<User>,
    ) -> Result<Vec<UserProfile>, Error> {
        let Some(viewer) = viewer else {
            return Ok(users.into_iter().map(UserProfile::unfollowed).collect());
        };
        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        let followed = self.follows.followed_among(viewer, &ids).await?;
        Ok(users
            .into_iter()
            .map(|user| UserProfile {
                is_subscribed: followed.contains(&user.id),
                user,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Service behaviour against mocked ports.
    use std::collections::HashSet;

    use super::*;
    use crate::domain::ports::{
        MockFollowRepository, MockMediaStore, MockUserRepository, StoredCredentials,
        UserPersistenceError,
    };
    use crate::domain::{Email, ErrorCode, PersonName, Username};
    use rstest::rstest;

    fn user(id: i64, username: &str) -> User {
        User {
            id: UserId::new(id),
            username: Username::new(username).expect("username"),
            email: Email::new(format!("{username}@example.com")).expect("email"),
            first_name: PersonName::new("first_name", "Test").expect("name"),
            last_name: PersonName::new("last_name", "Cook").expect("name"),
            avatar: None,
        }
    }

    fn service(
        users: MockUserRepository,
        follows: MockFollowRepository,
        media: MockMediaStore,
    ) -> AccountsService {
        AccountsService::new(Arc::new(users), Arc::new(follows), Arc::new(media))
    }

    fn stored_credentials(password: &str) -> StoredCredentials {
        let password = Password::new(password).expect("strong password");
        StoredCredentials {
            user_id: UserId::new(1),
            password_hash: PasswordHash::create(&password).expect("hash"),
        }
    }

    #[rstest]
    #[case("correct-horse", true)]
    #[case("wrong-horse", false)]
    #[tokio::test]
    async fn authenticate_checks_the_password(#[case] attempt: &str, #[case] accepted: bool) {
        let mut users = MockUserRepository::new();
        let stored = stored_credentials("correct-horse");
        users
            .expect_find_credentials_by_email()
            .return_once(move |_| Ok(Some(stored)));
        let service = service(users, MockFollowRepository::new(), MockMediaStore::new());

        let creds = LoginCredentials::try_from_parts("a@example.com", attempt).expect("creds");
        let result = service.authenticate(&creds).await;

        if accepted {
            assert_eq!(result.expect("authenticated"), UserId::new(1));
        } else {
            assert_eq!(
                result.expect_err("rejected").code(),
                ErrorCode::Unauthorized
            );
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials_by_email()
            .return_once(|_| Ok(None));
        let service = service(users, MockFollowRepository::new(), MockMediaStore::new());

        let creds = LoginCredentials::try_from_parts("nobody@example.com", "pw").expect("creds");
        let err = service.authenticate(&creds).await.expect_err("unknown");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn register_surfaces_duplicates_as_invalid_request() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .return_once(|_| Err(UserPersistenceError::duplicate("username")));
        let service = service(users, MockFollowRepository::new(), MockMediaStore::new());

        let registration =
            Registration::try_from_parts("anna", "anna@example.com", "Anna", "Cook")
                .expect("registration");
        let password = Password::new("long-enough").expect("password");
        let err = service
            .register(registration, &password)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn list_marks_followed_users() {
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .return_once(|_| Ok((vec![user(2, "bob"), user(3, "carol")], 2)));
        let mut follows = MockFollowRepository::new();
        follows
            .expect_followed_among()
            .return_once(|_, _| Ok(HashSet::from([UserId::new(3)])));
        let service = service(users, follows, MockMediaStore::new());

        let page = service
            .list(Some(UserId::new(1)), PageRequest::default())
            .await
            .expect("list users");
        let flags: Vec<bool> = page.items().iter().map(|p| p.is_subscribed).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[tokio::test]
    async fn anonymous_profile_skips_follow_lookup() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Ok(Some(user(2, "bob"))));
        let mut follows = MockFollowRepository::new();
        follows.expect_followed_among().never();
        let service = service(users, follows, MockMediaStore::new());

        let profile = service
            .profile(None, UserId::new(2))
            .await
            .expect("profile");
        assert!(!profile.is_subscribed);
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let mut users = MockUserRepository::new();
        let stored = stored_credentials("old-password");
        users
            .expect_password_hash()
            .return_once(move |_| Ok(Some(stored.password_hash)));
        users.expect_set_password_hash().never();
        let service = service(users, MockFollowRepository::new(), MockMediaStore::new());

        let new_password = Password::new("new-password").expect("password");
        let err = service
            .change_password(UserId::new(1), "not-the-password", &new_password)
            .await
            .expect_err("mismatch");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
