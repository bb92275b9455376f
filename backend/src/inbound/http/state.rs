//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data<HttpState>` and only see domain
//! services and ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogueRepository, FollowRepository, MediaStore, RecipeListRepository, RecipeRepository,
    ShortLinkRepository, UserRepository,
};
use crate::domain::{
    AccountsService, RecipeListService, RecipeService, ShortLinkService, SubscriptionService,
};
use crate::inbound::http::urls::PublicUrls;

/// Parameter object bundling every driven port the handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub recipe_lists: Arc<dyn RecipeListRepository>,
    pub catalogue: Arc<dyn CatalogueRepository>,
    pub short_links: Arc<dyn ShortLinkRepository>,
    pub media: Arc<dyn MediaStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountsService,
    pub recipes: RecipeService,
    pub recipe_lists: RecipeListService,
    pub subscriptions: SubscriptionService,
    pub short_links: ShortLinkService,
    pub catalogue: Arc<dyn CatalogueRepository>,
    pub media: Arc<dyn MediaStore>,
    pub urls: PublicUrls,
}

impl HttpState {
    /// Wire the domain services over `ports`.
    #[must_use]
    pub fn new(ports: HttpStatePorts, urls: PublicUrls) -> Self {
        let HttpStatePorts {
            users,
            follows,
            recipes,
            recipe_lists,
            catalogue,
            short_links,
            media,
        } = ports;
        Self {
            accounts: AccountsService::new(users.clone(), follows.clone(), media.clone()),
            recipes: RecipeService::new(
                recipes.clone(),
                catalogue.clone(),
                recipe_lists.clone(),
                follows.clone(),
                media.clone(),
            ),
            recipe_lists: RecipeListService::new(recipes.clone(), recipe_lists),
            subscriptions: SubscriptionService::new(users, follows, recipes.clone()),
            short_links: ShortLinkService::new(recipes, short_links),
            catalogue,
            media,
            urls,
        }
    }
}
