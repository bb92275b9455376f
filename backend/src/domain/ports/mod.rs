//! Driven ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_repository;
mod error_mapping;
mod follow_repository;
mod media_store;
mod recipe_list_repository;
mod recipe_repository;
mod short_link_repository;
mod user_repository;

#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CatalogueRepository, CatalogueRepositoryError};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::{FollowRepository, FollowRepositoryError};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use recipe_list_repository::MockRecipeListRepository;
pub use recipe_list_repository::{RecipeList, RecipeListRepository, RecipeListRepositoryError};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use short_link_repository::MockShortLinkRepository;
pub use short_link_repository::{ShortLinkRepository, ShortLinkRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    NewUserRecord, StoredCredentials, UserPersistenceError, UserRepository,
};
