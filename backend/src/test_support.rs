//! In-memory adapters for handler and end-to-end tests.
//!
//! [`InMemoryStore`] implements every driven port over one shared set of
//! tables, so the HTTP layer can be exercised without PostgreSQL. It is only
//! compiled for tests or with the `test-support` feature.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use pagination::PageRequest;
use url::Url;

use crate::domain::ports::{
    CatalogueRepository, CatalogueRepositoryError, FollowRepository, FollowRepositoryError,
    MediaStore, MediaStoreError, NewUserRecord, RecipeList, RecipeListRepository,
    RecipeListRepositoryError, RecipeRepository, RecipeRepositoryError, ShortLinkRepository,
    ShortLinkRepositoryError, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CookingTime, ImageUpload, Ingredient, IngredientId, IngredientPortion, MediaFolder, MediaPath,
    MembershipConstraint, NewIngredient, NewTag, PasswordHash, Recipe, RecipeDraft, RecipeId,
    RecipeIngredient, RecipeSummary, ResolvedRecipeFilter, ShoppingItem, ShortCode, Tag, TagId,
    User, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::urls::PublicUrls;

/// Base URL used by [`InMemoryStore::http_state`].
pub const TEST_BASE_URL: &str = "http://testserver/";

#[derive(Debug, Clone)]
struct StoredRecipe {
    author: UserId,
    name: String,
    text: String,
    image: MediaPath,
    cooking_time: CookingTime,
    tags: Vec<TagId>,
    ingredients: Vec<IngredientPortion>,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, (User, PasswordHash)>,
    follows: BTreeSet<(UserId, UserId)>,
    tags: BTreeMap<TagId, Tag>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, StoredRecipe>,
    memberships: Vec<(RecipeList, UserId, RecipeId)>,
    short_links: HashMap<RecipeId, ShortCode>,
    media: HashMap<String, Vec<u8>>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn recipe(&self, id: RecipeId) -> Option<Recipe> {
        let stored = self.recipes.get(&id)?;
        let (author, _) = self.users.get(&stored.author)?;
        Some(Recipe {
            id,
            author: author.clone(),
            name: stored.name.clone(),
            image: stored.image.clone(),
            text: stored.text.clone(),
            cooking_time: stored.cooking_time,
            tags: stored
                .tags
                .iter()
                .filter_map(|tag| self.tags.get(tag).cloned())
                .collect(),
            ingredients: stored
                .ingredients
                .iter()
                .filter_map(|portion| {
                    self.ingredients
                        .get(&portion.ingredient)
                        .map(|ingredient| RecipeIngredient {
                            ingredient: ingredient.clone(),
                            amount: portion.amount,
                        })
                })
                .collect(),
            created_at: stored.created_at,
        })
    }

    fn is_member(&self, list: RecipeList, user: UserId, recipe: RecipeId) -> bool {
        self.memberships.contains(&(list, user, recipe))
    }

    fn matches(&self, id: RecipeId, stored: &StoredRecipe, filter: &ResolvedRecipeFilter) -> bool {
        if filter.author.is_some_and(|author| author != stored.author) {
            return false;
        }
        if !filter.tags.is_empty()
            && !stored.tags.iter().any(|tag| {
                self.tags
                    .get(tag)
                    .is_some_and(|tag| filter.tags.contains(&tag.slug))
            })
        {
            return false;
        }
        let satisfied =
            |list: RecipeList, constraint: Option<MembershipConstraint>| match constraint {
                None => true,
                Some(MembershipConstraint::In(user)) => self.is_member(list, user, id),
                Some(MembershipConstraint::NotIn(user)) => !self.is_member(list, user, id),
            };
        satisfied(RecipeList::Favorites, filter.favorited)
            && satisfied(RecipeList::ShoppingCart, filter.in_shopping_cart)
    }
}

fn window<T>(items: Vec<T>, page: &PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Shared in-memory backing store implementing every driven port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a tag directly.
    pub fn add_tag(&self, name: &str, slug: &str) -> Tag {
        let mut tables = self.tables();
        let tag = Tag {
            id: TagId::new(tables.next_id()),
            name: name.to_owned(),
            slug: slug.to_owned(),
        };
        tables.tags.insert(tag.id, tag.clone());
        tag
    }

    /// Insert an ingredient directly.
    pub fn add_ingredient(&self, name: &str, measurement_unit: &str) -> Ingredient {
        let mut tables = self.tables();
        let ingredient = Ingredient {
            id: IngredientId::new(tables.next_id()),
            name: name.to_owned(),
            measurement_unit: measurement_unit.to_owned(),
        };
        tables.ingredients.insert(ingredient.id, ingredient.clone());
        ingredient
    }

    /// Number of stored memberships of `recipe` in `list` across all users.
    #[must_use]
    pub fn membership_count(&self, list: RecipeList, recipe: RecipeId) -> usize {
        self.tables()
            .memberships
            .iter()
            .filter(|(l, _, r)| *l == list && *r == recipe)
            .count()
    }

    /// Whether a recipe row exists.
    #[must_use]
    pub fn has_recipe(&self, recipe: RecipeId) -> bool {
        self.tables().recipes.contains_key(&recipe)
    }

    /// Every port backed by this store.
    #[must_use]
    pub fn ports(&self) -> HttpStatePorts {
        HttpStatePorts {
            users: Arc::new(self.clone()),
            follows: Arc::new(self.clone()),
            recipes: Arc::new(self.clone()),
            recipe_lists: Arc::new(self.clone()),
            catalogue: Arc::new(self.clone()),
            short_links: Arc::new(self.clone()),
            media: Arc::new(self.clone()),
        }
    }

    /// Handler state wired to this store with every link rooted at
    /// [`TEST_BASE_URL`].
    #[must_use]
    pub fn http_state(&self) -> HttpState {
        let base = Url::parse(TEST_BASE_URL).expect("constant test URL parses");
        HttpState::new(self.ports(), PublicUrls::single(base))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut tables = self.tables();
        for (existing, _) in tables.users.values() {
            if existing.username.as_ref() == user.username.as_ref() {
                return Err(UserPersistenceError::duplicate("username"));
            }
            if existing
                .email
                .as_ref()
                .eq_ignore_ascii_case(user.email.as_ref())
            {
                return Err(UserPersistenceError::duplicate("email"));
            }
        }
        let created = User {
            id: UserId::new(tables.next_id()),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: None,
        };
        tables
            .users
            .insert(created.id, (created.clone(), user.password_hash.clone()));
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.tables().users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|(user, _)| user.email.as_ref().eq_ignore_ascii_case(email))
            .map(|(user, hash)| StoredCredentials {
                user_id: user.id,
                password_hash: hash.clone(),
            }))
    }

    async fn password_hash(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        Ok(self.tables().users.get(&id).map(|(_, hash)| hash.clone()))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let mut users: Vec<User> = self
            .tables()
            .users
            .values()
            .map(|(user, _)| user.clone())
            .collect();
        users.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        let total = count(users.len());
        Ok((window(users, page), total))
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<MediaPath>,
    ) -> Result<bool, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .get_mut(&id)
            .map(|(user, _)| user.avatar = avatar)
            .is_some())
    }

    async fn set_password_hash(
        &self,
        id: UserId,
        hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .get_mut(&id)
            .map(|(_, stored)| *stored = hash.clone())
            .is_some())
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn follow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError> {
        Ok(self.tables().follows.insert((follower, author)))
    }

    async fn unfollow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError> {
        Ok(self.tables().follows.remove(&(follower, author)))
    }

    async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, FollowRepositoryError> {
        let tables = self.tables();
        Ok(authors
            .iter()
            .copied()
            .filter(|author| tables.follows.contains(&(follower, *author)))
            .collect())
    }

    async fn followed_authors(
        &self,
        follower: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<User>, u64), FollowRepositoryError> {
        let tables = self.tables();
        let mut authors: Vec<User> = tables
            .follows
            .iter()
            .filter(|(f, _)| *f == follower)
            .filter_map(|(_, author)| tables.users.get(author).map(|(user, _)| user.clone()))
            .collect();
        authors.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        let total = count(authors.len());
        Ok((window(authors, page), total))
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn create(
        &self,
        author: UserId,
        draft: &RecipeDraft,
        image: &MediaPath,
    ) -> Result<RecipeId, RecipeRepositoryError> {
        let mut tables = self.tables();
        let id = RecipeId::new(tables.next_id());
        tables.recipes.insert(
            id,
            StoredRecipe {
                author,
                name: draft.name().to_owned(),
                text: draft.text().to_owned(),
                image: image.clone(),
                cooking_time: draft.cooking_time(),
                tags: draft.tags().to_vec(),
                ingredients: draft.ingredients().to_vec(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: RecipeId,
        draft: &RecipeDraft,
        image: Option<MediaPath>,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut tables = self.tables();
        let Some(stored) = tables.recipes.get_mut(&id) else {
            return Ok(false);
        };
        draft.name().clone_into(&mut stored.name);
        draft.text().clone_into(&mut stored.text);
        stored.cooking_time = draft.cooking_time();
        stored.tags = draft.tags().to_vec();
        stored.ingredients = draft.ingredients().to_vec();
        if let Some(image) = image {
            stored.image = image;
        }
        Ok(true)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut tables = self.tables();
        if tables.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        tables.memberships.retain(|(_, _, recipe)| *recipe != id);
        tables.short_links.remove(&id);
        Ok(true)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(self.tables().recipe(id))
    }

    async fn find_summary(
        &self,
        id: RecipeId,
    ) -> Result<Option<RecipeSummary>, RecipeRepositoryError> {
        Ok(self.tables().recipe(id).map(|recipe| recipe.summary()))
    }

    async fn list(
        &self,
        filter: &ResolvedRecipeFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipeRepositoryError> {
        let tables = self.tables();
        let matching: Vec<Recipe> = tables
            .recipes
            .iter()
            .rev()
            .filter(|(id, stored)| tables.matches(**id, stored, filter))
            .filter_map(|(id, _)| tables.recipe(*id))
            .collect();
        let total = count(matching.len());
        Ok((window(matching, page), total))
    }

    async fn summaries_by_authors(
        &self,
        authors: &[UserId],
        limit: Option<u32>,
    ) -> Result<HashMap<UserId, Vec<RecipeSummary>>, RecipeRepositoryError> {
        let tables = self.tables();
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let mut previews: HashMap<UserId, Vec<RecipeSummary>> = HashMap::new();
        for (id, stored) in tables.recipes.iter().rev() {
            if !authors.contains(&stored.author) {
                continue;
            }
            let entry = previews.entry(stored.author).or_default();
            if entry.len() < limit {
                if let Some(recipe) = tables.recipe(*id) {
                    entry.push(recipe.summary());
                }
            }
        }
        Ok(previews)
    }

    async fn count_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<HashMap<UserId, u64>, RecipeRepositoryError> {
        let mut counts = HashMap::new();
        for stored in self.tables().recipes.values() {
            if authors.contains(&stored.author) {
                *counts.entry(stored.author).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl RecipeListRepository for InMemoryStore {
    async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeListRepositoryError> {
        let mut tables = self.tables();
        if !tables.recipes.contains_key(&recipe) {
            return Err(RecipeListRepositoryError::recipe_missing(recipe));
        }
        if tables.is_member(list, user, recipe) {
            return Ok(false);
        }
        tables.memberships.push((list, user, recipe));
        Ok(true)
    }

    async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeListRepositoryError> {
        let mut tables = self.tables();
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|entry| *entry != (list, user, recipe));
        Ok(tables.memberships.len() != before)
    }

    async fn contained(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RecipeListRepositoryError> {
        let tables = self.tables();
        Ok(recipes
            .iter()
            .copied()
            .filter(|recipe| tables.is_member(list, user, *recipe))
            .collect())
    }

    async fn shopping_items(
        &self,
        user: UserId,
    ) -> Result<Vec<ShoppingItem>, RecipeListRepositoryError> {
        let tables = self.tables();
        Ok(tables
            .memberships
            .iter()
            .filter(|(list, u, _)| *list == RecipeList::ShoppingCart && *u == user)
            .filter_map(|(_, _, recipe)| tables.recipe(*recipe))
            .flat_map(|recipe| recipe.ingredients)
            .map(|line| ShoppingItem {
                name: line.ingredient.name,
                amount: line.amount.get(),
                measurement_unit: line.ingredient.measurement_unit,
            })
            .collect())
    }
}

#[async_trait]
impl CatalogueRepository for InMemoryStore {
    async fn list_tags(&self) -> Result<Vec<Tag>, CatalogueRepositoryError> {
        let mut tags: Vec<Tag> = self.tables().tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, CatalogueRepositoryError> {
        Ok(self.tables().tags.get(&id).cloned())
    }

    async fn find_tags(&self, ids: &[TagId]) -> Result<Vec<Tag>, CatalogueRepositoryError> {
        let tables = self.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.tags.get(id).cloned())
            .collect())
    }

    async fn list_ingredients(
        &self,
        name_contains: Option<String>,
    ) -> Result<Vec<Ingredient>, CatalogueRepositoryError> {
        let needle = name_contains.map(|name| name.to_lowercase());
        let mut ingredients: Vec<Ingredient> = self
            .tables()
            .ingredients
            .values()
            .filter(|ingredient| {
                needle
                    .as_deref()
                    .is_none_or(|needle| ingredient.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ingredients)
    }

    async fn find_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, CatalogueRepositoryError> {
        Ok(self.tables().ingredients.get(&id).cloned())
    }

    async fn find_ingredients(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, CatalogueRepositoryError> {
        let tables = self.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.ingredients.get(id).cloned())
            .collect())
    }

    async fn insert_ingredients(
        &self,
        ingredients: &[NewIngredient],
    ) -> Result<usize, CatalogueRepositoryError> {
        let mut inserted = 0;
        for new in ingredients {
            let exists = self.tables().ingredients.values().any(|existing| {
                existing.name == new.name() && existing.measurement_unit == new.measurement_unit()
            });
            if !exists {
                self.add_ingredient(new.name(), new.measurement_unit());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn insert_tags(&self, tags: &[NewTag]) -> Result<usize, CatalogueRepositoryError> {
        let mut inserted = 0;
        for new in tags {
            let exists = self
                .tables()
                .tags
                .values()
                .any(|existing| existing.name == new.name() || existing.slug == new.slug());
            if !exists {
                self.add_tag(new.name(), new.slug());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl ShortLinkRepository for InMemoryStore {
    async fn find_by_recipe(
        &self,
        recipe: RecipeId,
    ) -> Result<Option<ShortCode>, ShortLinkRepositoryError> {
        Ok(self.tables().short_links.get(&recipe).cloned())
    }

    async fn insert(
        &self,
        recipe: RecipeId,
        code: &ShortCode,
    ) -> Result<ShortCode, ShortLinkRepositoryError> {
        let mut tables = self.tables();
        if let Some(existing) = tables.short_links.get(&recipe) {
            return Ok(existing.clone());
        }
        if tables.short_links.values().any(|taken| taken == code) {
            return Err(ShortLinkRepositoryError::code_taken(code.as_str()));
        }
        tables.short_links.insert(recipe, code.clone());
        Ok(code.clone())
    }

    async fn resolve(
        &self,
        code: &ShortCode,
    ) -> Result<Option<RecipeId>, ShortLinkRepositoryError> {
        Ok(self
            .tables()
            .short_links
            .iter()
            .find(|(_, stored)| *stored == code)
            .map(|(recipe, _)| *recipe))
    }
}

#[async_trait]
impl MediaStore for InMemoryStore {
    async fn store(
        &self,
        folder: MediaFolder,
        image: &ImageUpload,
    ) -> Result<MediaPath, MediaStoreError> {
        let path = MediaPath::in_folder(folder, &image.file_name());
        self.tables()
            .media
            .insert(path.as_str().to_owned(), image.bytes().to_vec());
        Ok(path)
    }

    async fn load(&self, path: &MediaPath) -> Result<Option<Vec<u8>>, MediaStoreError> {
        Ok(self.tables().media.get(path.as_str()).cloned())
    }
}
