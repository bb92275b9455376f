//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel row structs (`models.rs`) and domain
//! types; they hold no business rules. Connections come from a `bb8` pool of
//! `diesel-async` connections and every failure is mapped into the port's
//! typed error.
//!
//! # Example
//!
//! ```ignore
//! use foodgram::outbound::persistence::{DbPool, DieselRecipeRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/foodgram")).await?;
//! let recipes = DieselRecipeRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_catalogue_repository;
mod diesel_follow_repository;
mod diesel_helpers;
mod diesel_recipe_list_repository;
mod diesel_recipe_repository;
mod diesel_short_link_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_recipe_list_repository::DieselRecipeListRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_short_link_repository::DieselShortLinkRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_SIZE, DbPool, PoolConfig, PoolError};
