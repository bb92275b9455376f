//! Recipe listing, retrieval and authoring.
//!
//! Repositories return requester-agnostic [`Recipe`] values; this service
//! decorates them with the requester's favourite, cart and follow state in
//! batched lookups, one per page.

use std::collections::HashSet;
use std::sync::Arc;

use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    CatalogueRepository, FollowRepository, MediaStore, RecipeList, RecipeListRepository,
    RecipeRepository,
};
use crate::domain::{
    Error, ImageUpload, MediaFolder, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeId,
    RecipeView, UserId, UserProfile,
};

/// Service behind the `/recipes` endpoints.
#[derive(Clone)]
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    catalogue: Arc<dyn CatalogueRepository>,
    lists: Arc<dyn RecipeListRepository>,
    follows: Arc<dyn FollowRepository>,
    media: Arc<dyn MediaStore>,
}

impl RecipeService {
    /// Create the service over its driven ports.
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        catalogue: Arc<dyn CatalogueRepository>,
        lists: Arc<dyn RecipeListRepository>,
        follows: Arc<dyn FollowRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            recipes,
            catalogue,
            lists,
            follows,
            media,
        }
    }

    /// Page of recipes matching `filter`, newest first.
    pub async fn list(
        &self,
        viewer: Option<UserId>,
        filter: &RecipeFilter,
        request: PageRequest,
    ) -> Result<Page<RecipeView>, Error> {
        let Some(resolved) = filter.resolve(viewer) else {
            return Ok(Page::new(Vec::new(), 0, request));
        };
        let (recipes, total) = self.recipes.list(&resolved, &request).await?;
        let views = self.views_for(viewer, recipes).await?;
        Ok(Page::new(views, total, request))
    }

    /// One recipe as seen by `viewer`.
    pub async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeView, Error> {
        let recipe = self.require_recipe(id).await?;
        self.single_view(viewer, recipe).await
    }

    /// Publish a new recipe authored by `author`.
    pub async fn create(
        &self,
        author: UserId,
        draft: &RecipeDraft,
        image: &ImageUpload,
    ) -> Result<RecipeView, Error> {
        self.ensure_catalogue_references(draft).await?;
        let path = self.media.store(MediaFolder::RecipeImages, image).await?;
        let id = self.recipes.create(author, draft, &path).await?;
        debug!(recipe_id = %id, author_id = %author, "created recipe");
        self.get(Some(author), id).await
    }

    /// Apply `changes` to a recipe. Only its author may do so.
    pub async fn update(
        &self,
        editor: UserId,
        id: RecipeId,
        changes: RecipeChanges,
        image: Option<&ImageUpload>,
    ) -> Result<RecipeView, Error> {
        let existing = self.require_recipe(id).await?;
        ensure_author(&existing, editor)?;
        let draft = changes.apply_to(&existing)?;
        self.ensure_catalogue_references(&draft).await?;
        let path = match image {
            Some(image) => Some(self.media.store(MediaFolder::RecipeImages, image).await?),
            None => None,
        };
        if !self.recipes.update(id, &draft, path).await? {
            return Err(Error::not_found("recipe not found"));
        }
        self.get(Some(editor), id).await
    }

    /// Delete a recipe. Only its author may do so.
    pub async fn delete(&self, editor: UserId, id: RecipeId) -> Result<(), Error> {
        let existing = self.require_recipe(id).await?;
        ensure_author(&existing, editor)?;
        if self.recipes.delete(id).await? {
            debug!(recipe_id = %id, "deleted recipe");
            Ok(())
        } else {
            Err(Error::not_found("recipe not found"))
        }
    }

    async fn require_recipe(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("recipe not found"))
    }

    async fn ensure_catalogue_references(&self, draft: &RecipeDraft) -> Result<(), Error> {
        let wanted_ingredients = draft.ingredient_ids();
        let found: HashSet<_> = self
            .catalogue
            .find_ingredients(&wanted_ingredients)
            .await?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        if let Some(missing) = wanted_ingredients.iter().find(|id| !found.contains(id)) {
            return Err(
                Error::invalid_request(format!("ingredient {missing} does not exist"))
                    .with_details(json!({
                        "field": "ingredients",
                        "code": "unknown_ingredient",
                        "id": missing,
                    })),
            );
        }

        let found_tags: HashSet<_> = self
            .catalogue
            .find_tags(draft.tags())
            .await?
            .into_iter()
            .map(|tag| tag.id)
            .collect();
        if let Some(missing) = draft.tags().iter().find(|id| !found_tags.contains(id)) {
            return Err(
                Error::invalid_request(format!("tag {missing} does not exist")).with_details(
                    json!({ "field": "tags", "code": "unknown_tag", "id": missing }),
                ),
            );
        }
        Ok(())
    }

    async fn single_view(
        &self,
        viewer: Option<UserId>,
        recipe: Recipe,
    ) -> Result<RecipeView, Error> {
        self.views_for(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("recipe view lookup lost its recipe"))
    }

    async fn views_for(
        &self,
        viewer: Option<UserId>,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeView>, Error> {
        let Some(viewer) = viewer else {
            return Ok(recipes
                .into_iter()
                .map(|recipe| RecipeView {
                    author: UserProfile::unfollowed(recipe.author.clone()),
                    recipe,
                    is_favorited: false,
                    is_in_shopping_cart: false,
                })
                .collect());
        };

        let ids: Vec<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
        let authors: Vec<UserId> = recipes.iter().map(|recipe| recipe.author.id).collect();
        let favorited = self
            .lists
            .contained(RecipeList::Favorites, viewer, &ids)
            .await?;
        let carted = self
            .lists
            .contained(RecipeList::ShoppingCart, viewer, &ids)
            .await?;
        let followed = self.follows.followed_among(viewer, &authors).await?;

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeView {
                author: UserProfile {
                    is_subscribed: followed.contains(&recipe.author.id),
                    user: recipe.author.clone(),
                },
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: carted.contains(&recipe.id),
                recipe,
            })
            .collect())
    }
}

fn ensure_author(recipe: &Recipe, editor: UserId) -> Result<(), Error> {
    if recipe.author.id == editor {
        Ok(())
    } else {
        Err(Error::forbidden("only the author may modify this recipe"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{
        MockCatalogueRepository, MockFollowRepository, MockMediaStore,
        MockRecipeListRepository, MockRecipeRepository,
    };
    use crate::domain::{
        CookingTime, Email, ErrorCode, Ingredient, IngredientAmount, IngredientId,
        IngredientPortion, MediaPath, PersonName, Tag, TagId, User, Username,
    };

    struct Mocks {
        recipes: MockRecipeRepository,
        catalogue: MockCatalogueRepository,
        lists: MockRecipeListRepository,
        follows: MockFollowRepository,
        media: MockMediaStore,
    }

    impl Mocks {
        fn into_service(self) -> RecipeService {
            RecipeService::new(
                Arc::new(self.recipes),
                Arc::new(self.catalogue),
                Arc::new(self.lists),
                Arc::new(self.follows),
                Arc::new(self.media),
            )
        }
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            recipes: MockRecipeRepository::new(),
            catalogue: MockCatalogueRepository::new(),
            lists: MockRecipeListRepository::new(),
            follows: MockFollowRepository::new(),
            media: MockMediaStore::new(),
        }
    }

    fn author(id: i64) -> User {
        User {
            id: UserId::new(id),
            username: Username::new(format!("cook{id}")).expect("username"),
            email: Email::new(format!("cook{id}@example.com")).expect("email"),
            first_name: PersonName::new("first_name", "Test").expect("name"),
            last_name: PersonName::new("last_name", "Cook").expect("name"),
            avatar: None,
        }
    }

    fn recipe(id: i64, author_id: i64) -> Recipe {
        Recipe {
            id: RecipeId::new(id),
            author: author(author_id),
            name: format!("Recipe {id}"),
            image: MediaPath::new("recipes/images/abc.png").expect("path"),
            text: "Cook it.".to_owned(),
            cooking_time: CookingTime::new(10).expect("time"),
            tags: Vec::new(),
            ingredients: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn draft() -> RecipeDraft {
        RecipeDraft::new(
            "Omelette",
            "Whisk and fry.",
            CookingTime::new(10).expect("time"),
            vec![IngredientPortion {
                ingredient: IngredientId::new(1),
                amount: IngredientAmount::new(2).expect("amount"),
            }],
            vec![TagId::new(1)],
        )
        .expect("draft")
    }

    fn changes() -> RecipeChanges {
        RecipeChanges {
            name: None,
            text: None,
            cooking_time: None,
            ingredients: vec![IngredientPortion {
                ingredient: IngredientId::new(1),
                amount: IngredientAmount::new(3).expect("amount"),
            }],
            tags: vec![TagId::new(1)],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_favorited_filter_short_circuits(mut mocks: Mocks) {
        mocks.recipes.expect_list().never();
        let service = mocks.into_service();
        let filter = RecipeFilter {
            is_favorited: Some(true),
            ..RecipeFilter::default()
        };

        let page = service
            .list(None, &filter, PageRequest::default())
            .await
            .expect("empty page");
        assert_eq!(page.total(), 0);
        assert!(page.items().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn list_decorates_views_for_the_viewer(mut mocks: Mocks) {
        mocks
            .recipes
            .expect_list()
            .return_once(|_, _| Ok((vec![recipe(1, 2), recipe(2, 3)], 2)));
        mocks
            .lists
            .expect_contained()
            .withf(|list, _, _| *list == RecipeList::Favorites)
            .return_once(|_, _, _| Ok(HashSet::from([RecipeId::new(2)])));
        mocks
            .lists
            .expect_contained()
            .withf(|list, _, _| *list == RecipeList::ShoppingCart)
            .return_once(|_, _, _| Ok(HashSet::from([RecipeId::new(1)])));
        mocks
            .follows
            .expect_followed_among()
            .return_once(|_, _| Ok(HashSet::from([UserId::new(3)])));
        let service = mocks.into_service();

        let page = service
            .list(Some(UserId::new(9)), &RecipeFilter::default(), PageRequest::default())
            .await
            .expect("page");
        let flags: Vec<(bool, bool, bool)> = page
            .items()
            .iter()
            .map(|v| (v.is_favorited, v.is_in_shopping_cart, v.author.is_subscribed))
            .collect();
        assert_eq!(flags, vec![(false, true, false), (true, false, true)]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_by_non_author_is_forbidden(mut mocks: Mocks) {
        mocks
            .recipes
            .expect_find()
            .return_once(|_| Ok(Some(recipe(1, 2))));
        mocks.recipes.expect_update().never();
        let service = mocks.into_service();

        let err = service
            .update(UserId::new(5), RecipeId::new(1), changes(), None)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn partial_update_keeps_stored_content(mut mocks: Mocks) {
        mocks
            .recipes
            .expect_find()
            .times(2)
            .returning(|_| Ok(Some(recipe(1, 2))));
        mocks.catalogue.expect_find_ingredients().return_once(|_| {
            Ok(vec![Ingredient {
                id: IngredientId::new(1),
                name: "egg".to_owned(),
                measurement_unit: "pcs".to_owned(),
            }])
        });
        mocks.catalogue.expect_find_tags().return_once(|_| {
            Ok(vec![Tag {
                id: TagId::new(1),
                name: "Lunch".to_owned(),
                slug: "lunch".to_owned(),
            }])
        });
        mocks.media.expect_store().never();
        mocks
            .recipes
            .expect_update()
            .withf(|_, draft, image| {
                draft.name() == "Recipe 1"
                    && draft.text() == "Cook it."
                    && draft.cooking_time().get() == 10
                    && image.is_none()
            })
            .return_once(|_, _, _| Ok(true));
        mocks
            .lists
            .expect_contained()
            .times(2)
            .returning(|_, _, _| Ok(HashSet::new()));
        mocks
            .follows
            .expect_followed_among()
            .return_once(|_, _| Ok(HashSet::new()));
        let service = mocks.into_service();

        let view = service
            .update(UserId::new(2), RecipeId::new(1), changes(), None)
            .await
            .expect("updated");
        assert_eq!(view.recipe.id, RecipeId::new(1));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_of_missing_recipe_is_not_found(mut mocks: Mocks) {
        mocks.recipes.expect_find().return_once(|_| Ok(None));
        let service = mocks.into_service();

        let err = service
            .delete(UserId::new(1), RecipeId::new(404))
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_unknown_ingredient(mut mocks: Mocks) {
        mocks
            .catalogue
            .expect_find_ingredients()
            .return_once(|_| Ok(Vec::new()));
        mocks.media.expect_store().never();
        mocks.recipes.expect_create().never();
        let service = mocks.into_service();
        let image = ImageUpload::from_data_uri("data:image/png;base64,aGVsbG8=").expect("image");

        let err = service
            .create(UserId::new(1), &draft(), &image)
            .await
            .expect_err("unknown ingredient");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!("ingredients"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn create_stores_image_then_recipe(mut mocks: Mocks) {
        mocks.catalogue.expect_find_ingredients().return_once(|_| {
            Ok(vec![Ingredient {
                id: IngredientId::new(1),
                name: "egg".to_owned(),
                measurement_unit: "pcs".to_owned(),
            }])
        });
        mocks.catalogue.expect_find_tags().return_once(|_| {
            Ok(vec![Tag {
                id: TagId::new(1),
                name: "Breakfast".to_owned(),
                slug: "breakfast".to_owned(),
            }])
        });
        mocks.media.expect_store().return_once(|folder, upload| {
            Ok(MediaPath::in_folder(folder, &upload.file_name()))
        });
        mocks
            .recipes
            .expect_create()
            .withf(|_, _, image| image.as_str().starts_with("recipes/images/"))
            .return_once(|_, _, _| Ok(RecipeId::new(7)));
        mocks
            .recipes
            .expect_find()
            .return_once(|_| Ok(Some(recipe(7, 1))));
        mocks
            .lists
            .expect_contained()
            .times(2)
            .returning(|_, _, _| Ok(HashSet::new()));
        mocks
            .follows
            .expect_followed_among()
            .return_once(|_, _| Ok(HashSet::new()));
        let service = mocks.into_service();
        let image = ImageUpload::from_data_uri("data:image/png;base64,aGVsbG8=").expect("image");

        let view = service
            .create(UserId::new(1), &draft(), &image)
            .await
            .expect("created");
        assert_eq!(view.recipe.id, RecipeId::new(7));
        assert!(!view.is_favorited);
    }
}
