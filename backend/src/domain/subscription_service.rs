//! Following authors and listing followed authors with recipe previews.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{FollowRepository, RecipeRepository, UserRepository};
use crate::domain::{Error, Subscription, User, UserId, UserProfile};

/// Service behind the `/users/{id}/subscribe` and `/users/subscriptions`
/// endpoints.
#[derive(Clone)]
pub struct SubscriptionService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    recipes: Arc<dyn RecipeRepository>,
}

impl SubscriptionService {
    /// Create the service over its driven ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        recipes: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            users,
            follows,
            recipes,
        }
    }

    /// Follow `author` and return the new subscription.
    pub async fn subscribe(
        &self,
        follower: UserId,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<Subscription, Error> {
        if follower == author {
            return Err(Error::invalid_request("you cannot subscribe to yourself")
                .with_details(json!({ "field": "author", "code": "self_subscription" })));
        }
        let author_user = self.require_author(author).await?;
        if !self.follows.follow(follower, author).await? {
            return Err(Error::conflict("already subscribed to this author"));
        }
        debug!(follower_id = %follower, author_id = %author, "subscribed");

        let counts = self.recipes.count_by_authors(&[author]).await?;
        let mut previews = self
            .recipes
            .summaries_by_authors(&[author], recipes_limit)
            .await?;
        Ok(Subscription {
            author: followed(author_user),
            recipes: previews.remove(&author).unwrap_or_default(),
            recipes_count: counts.get(&author).copied().unwrap_or(0),
        })
    }

    /// Stop following `author`.
    pub async fn unsubscribe(&self, follower: UserId, author: UserId) -> Result<(), Error> {
        self.require_author(author).await?;
        if self.follows.unfollow(follower, author).await? {
            debug!(follower_id = %follower, author_id = %author, "unsubscribed");
            Ok(())
        } else {
            Err(Error::not_found("not subscribed to this author"))
        }
    }

    /// Page of followed authors ordered by username.
    pub async fn list(
        &self,
        follower: UserId,
        request: PageRequest,
        recipes_limit: Option<u32>,
    ) -> Result<Page<Subscription>, Error> {
        let (authors, total) = self.follows.followed_authors(follower, &request).await?;
        let ids: Vec<UserId> = authors.iter().map(|user| user.id).collect();
        let counts = self.recipes.count_by_authors(&ids).await?;
        let mut previews = self
            .recipes
            .summaries_by_authors(&ids, recipes_limit)
            .await?;

        let subscriptions = authors
            .into_iter()
            .map(|author| Subscription {
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
                recipes: previews.remove(&author.id).unwrap_or_default(),
                author: followed(author),
            })
            .collect();
        Ok(Page::new(subscriptions, total, request))
    }

    async fn require_author(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

fn followed(user: User) -> UserProfile {
    UserProfile {
        user,
        is_subscribed: true,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::ports::{MockFollowRepository, MockRecipeRepository, MockUserRepository};
    use crate::domain::{Email, ErrorCode, PersonName, Username};

    fn user(id: i64) -> User {
        User {
            id: UserId::new(id),
            username: Username::new(format!("author{id}")).expect("username"),
            email: Email::new(format!("author{id}@example.com")).expect("email"),
            first_name: PersonName::new("first_name", "Ada").expect("name"),
            last_name: PersonName::new("last_name", "Cook").expect("name"),
            avatar: None,
        }
    }

    fn existing_author() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(user(id.get()))));
        users
    }

    #[tokio::test]
    async fn self_subscription_is_rejected() {
        let mut follows = MockFollowRepository::new();
        follows.expect_follow().never();
        let service = SubscriptionService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(follows),
            Arc::new(MockRecipeRepository::new()),
        );

        let err = service
            .subscribe(UserId::new(4), UserId::new(4), None)
            .await
            .expect_err("self follow");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn duplicate_subscription_conflicts() {
        let mut follows = MockFollowRepository::new();
        follows.expect_follow().return_once(|_, _| Ok(false));
        let service = SubscriptionService::new(
            Arc::new(existing_author()),
            Arc::new(follows),
            Arc::new(MockRecipeRepository::new()),
        );

        let err = service
            .subscribe(UserId::new(1), UserId::new(2), None)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn subscribing_to_missing_author_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        let service = SubscriptionService::new(
            Arc::new(users),
            Arc::new(MockFollowRepository::new()),
            Arc::new(MockRecipeRepository::new()),
        );

        let err = service
            .subscribe(UserId::new(1), UserId::new(99), None)
            .await
            .expect_err("missing author");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn subscribe_returns_counts_and_limited_previews() {
        let mut follows = MockFollowRepository::new();
        follows.expect_follow().return_once(|_, _| Ok(true));
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_count_by_authors()
            .return_once(|_| Ok(HashMap::from([(UserId::new(2), 7)])));
        recipes
            .expect_summaries_by_authors()
            .withf(|authors, limit| {
                authors.len() == 1 && authors[0] == UserId::new(2) && *limit == Some(3)
            })
            .return_once(|_, _| Ok(HashMap::new()));
        let service = SubscriptionService::new(
            Arc::new(existing_author()),
            Arc::new(follows),
            Arc::new(recipes),
        );

        let subscription = service
            .subscribe(UserId::new(1), UserId::new(2), Some(3))
            .await
            .expect("subscribed");
        assert!(subscription.author.is_subscribed);
        assert_eq!(subscription.recipes_count, 7);
    }

    #[tokio::test]
    async fn list_loads_previews_for_the_whole_page_at_once() {
        let mut follows = MockFollowRepository::new();
        follows
            .expect_followed_authors()
            .return_once(|_, _| Ok((vec![user(2), user(3)], 2)));
        let mut recipes = MockRecipeRepository::new();
        recipes
            .expect_count_by_authors()
            .return_once(|_| Ok(HashMap::from([(UserId::new(2), 4)])));
        recipes
            .expect_summaries_by_authors()
            .times(1)
            .withf(|authors, limit| authors.len() == 2 && *limit == Some(1))
            .return_once(|_, _| Ok(HashMap::new()));
        let service = SubscriptionService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(follows),
            Arc::new(recipes),
        );

        let page = service
            .list(UserId::new(1), PageRequest::default(), Some(1))
            .await
            .expect("page");
        let counts: Vec<(UserId, u64)> = page
            .items()
            .iter()
            .map(|s| (s.author.user.id, s.recipes_count))
            .collect();
        assert_eq!(counts, vec![(UserId::new(2), 4), (UserId::new(3), 0)]);
        assert!(page.items().iter().all(|s| s.recipes.is_empty()));
    }

    #[tokio::test]
    async fn unsubscribing_without_edge_is_not_found() {
        let mut follows = MockFollowRepository::new();
        follows.expect_unfollow().return_once(|_, _| Ok(false));
        let service = SubscriptionService::new(
            Arc::new(existing_author()),
            Arc::new(follows),
            Arc::new(MockRecipeRepository::new()),
        );

        let err = service
            .unsubscribe(UserId::new(1), UserId::new(2))
            .await
            .expect_err("no edge");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
