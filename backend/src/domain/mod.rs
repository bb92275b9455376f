//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed recipe, user and catalogue model, the
//! driven ports that persistence and media adapters implement, and the
//! services the HTTP adapter calls. Nothing here depends on Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Recipe, RecipeDraft, RecipeView: recipe aggregate and its inputs.
//! - User, UserProfile, Registration: account model.
//! - ShoppingList: cart aggregation.
//! - *Service: use cases grouped by resource.

pub mod accounts_service;
pub mod auth;
pub mod catalogue;
pub mod error;
pub mod ids;
pub mod media;
pub mod ports;
pub mod recipe;
pub mod recipe_filter;
pub mod recipe_list_service;
pub mod recipe_service;
pub mod shopping_list;
pub mod short_link;
pub mod short_link_service;
pub mod subscription;
pub mod subscription_service;
pub mod trace_id;
pub mod user;

pub use self::accounts_service::AccountsService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN, Password, PasswordHash,
    PasswordHashError,
};
pub use self::catalogue::{
    CATALOGUE_NAME_MAX, CatalogueValidationError, Ingredient, NewIngredient, NewTag, Tag,
};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{IngredientId, RecipeId, TagId, UserId};
pub use self::media::{
    ALLOWED_IMAGE_EXTENSIONS, ImageUpload, ImageUploadError, MediaFolder, MediaPath,
    MediaPathError,
};
pub use self::recipe::{
    CookingTime, IngredientAmount, IngredientPortion, QUANTITY_MAX, QUANTITY_MIN,
    RECIPE_NAME_MAX, Recipe, RecipeChanges, RecipeDraft, RecipeIngredient, RecipeSummary,
    RecipeValidationError, RecipeView,
};
pub use self::recipe_filter::{
    MembershipConstraint, RecipeFilter, ResolvedRecipeFilter, parse_membership_flag,
};
pub use self::recipe_list_service::RecipeListService;
pub use self::recipe_service::RecipeService;
pub use self::shopping_list::{SHOPPING_LIST_FILE_NAME, ShoppingItem, ShoppingList, ShoppingTotal};
pub use self::short_link::{SHORT_CODE_LEN, ShortCode, ShortCodeError};
pub use self::short_link_service::{SHORT_CODE_ATTEMPTS, ShortLinkService};
pub use self::subscription::Subscription;
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, NAME_MAX, PersonName, Registration, User, UserProfile, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use foodgram::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
