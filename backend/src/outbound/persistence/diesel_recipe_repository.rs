//! PostgreSQL-backed `RecipeRepository` implementation.
//!
//! Recipes are loaded in two steps: the filtered, paged `recipes` rows first,
//! then authors, tags and ingredient lines for the whole page in one query
//! each.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{count_star, exists, not};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Nullable};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    CookingTime, MediaPath, MembershipConstraint, Recipe, RecipeDraft, RecipeId,
    RecipeIngredient, RecipeSummary, ResolvedRecipeFilter, Tag, User, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{collect_rows, count_to_u64, page_window, quantity_for_db};
use super::models::{
    AuthorRecipeSummaryRow, IngredientRow, NewRecipeIngredientRow, NewRecipeRow, NewRecipeTagRow,
    RecipeIngredientLine, RecipeRow, RecipeSummaryRow, RecipeUpdate, TagRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart, tags, users,
};

/// Newest recipes per author; `$2` caps each author's previews when not null.
const SUMMARIES_BY_AUTHORS_SQL: &str = r#"
SELECT author_id, id, name, image, cooking_time
FROM (
    SELECT author_id, id, name, image, cooking_time,
           ROW_NUMBER() OVER (
               PARTITION BY author_id ORDER BY created_at DESC, id DESC
           ) AS position
    FROM recipes
    WHERE author_id = ANY($1)
) ranked
WHERE $2::BIGINT IS NULL OR position <= $2
ORDER BY author_id, position
"#;

/// Diesel-backed implementation of the recipe repository port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    map_basic_pool_error(error, RecipeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    map_basic_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

/// Adds an `EXISTS`/`NOT EXISTS` membership check against a per-user list
/// table.
macro_rules! membership_filter {
    ($query:ident, $constraint:expr, $table:ident) => {
        match $constraint {
            Some(MembershipConstraint::In(user)) => {
                $query = $query.filter(exists(
                    $table::table
                        .filter($table::recipe_id.eq(recipes::id))
                        .filter($table::user_id.eq(user.get())),
                ));
            }
            Some(MembershipConstraint::NotIn(user)) => {
                $query = $query.filter(not(exists(
                    $table::table
                        .filter($table::recipe_id.eq(recipes::id))
                        .filter($table::user_id.eq(user.get())),
                )));
            }
            None => {}
        }
    };
}

fn filtered_recipes(filter: &ResolvedRecipeFilter) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();
    if let Some(author) = filter.author {
        query = query.filter(recipes::author_id.eq(author.get()));
    }
    if !filter.tags.is_empty() {
        query = query.filter(exists(
            recipe_tags::table
                .inner_join(tags::table)
                .filter(recipe_tags::recipe_id.eq(recipes::id))
                .filter(tags::slug.eq_any(filter.tags.clone())),
        ));
    }
    membership_filter!(query, filter.favorited, favorites);
    membership_filter!(query, filter.in_shopping_cart, shopping_cart);
    query
}

fn ingredient_rows(recipe_id: i64, draft: &RecipeDraft) -> Vec<NewRecipeIngredientRow> {
    draft
        .ingredients()
        .iter()
        .map(|portion| NewRecipeIngredientRow {
            recipe_id,
            ingredient_id: portion.ingredient.get(),
            amount: quantity_for_db(portion.amount.get()),
        })
        .collect()
}

fn tag_rows(recipe_id: i64, draft: &RecipeDraft) -> Vec<NewRecipeTagRow> {
    draft
        .tags()
        .iter()
        .map(|tag| NewRecipeTagRow {
            recipe_id,
            tag_id: tag.get(),
        })
        .collect()
}

async fn replace_relations(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> Result<(), diesel::result::Error> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;
    diesel::insert_into(recipe_ingredients::table)
        .values(&ingredient_rows(recipe_id, draft))
        .execute(conn)
        .await?;
    diesel::insert_into(recipe_tags::table)
        .values(&tag_rows(recipe_id, draft))
        .execute(conn)
        .await?;
    Ok(())
}

/// Attach authors, tags and ingredient lines to `rows`, preserving order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> Result<Vec<Recipe>, RecipeRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<i64> = rows.iter().map(|row| row.author_id).collect();

    let author_rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(author_ids))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut authors: HashMap<i64, User> = HashMap::with_capacity(author_rows.len());
    for row in author_rows {
        let user = row.into_domain().map_err(RecipeRepositoryError::query)?;
        authors.insert(user.id.get(), user);
    }

    let tag_links: Vec<(i64, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids.clone()))
        .order((recipe_tags::recipe_id.asc(), tags::id.asc()))
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in tag_links {
        tags_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(Tag::from(tag));
    }

    let lines: Vec<(i64, i32, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .order(recipe_ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut lines_by_recipe: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    for line in lines.into_iter().map(RecipeIngredientLine::from) {
        let amount = line.amount().map_err(RecipeRepositoryError::query)?;
        lines_by_recipe
            .entry(line.recipe_id)
            .or_default()
            .push(RecipeIngredient {
                ingredient: line.ingredient.into(),
                amount,
            });
    }

    collect_rows(
        rows.into_iter().map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| format!("recipe {} has no author", row.id))?;
            Ok(Recipe {
                id: RecipeId::new(row.id),
                author,
                name: row.name,
                image: MediaPath::new(row.image).map_err(|err| err.to_string())?,
                text: row.description,
                cooking_time: CookingTime::new(i64::from(row.cooking_time))
                    .map_err(|err| err.to_string())?,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                ingredients: lines_by_recipe.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
            })
        }),
        RecipeRepositoryError::query,
    )
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(
        &self,
        author: UserId,
        draft: &RecipeDraft,
        image: &MediaPath,
    ) -> Result<RecipeId, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewRecipeRow {
            author_id: author.get(),
            name: draft.name(),
            image: image.as_str(),
            description: draft.text(),
            cooking_time: quantity_for_db(draft.cooking_time().get()),
        };
        let id = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(recipes::table)
                        .values(&new_row)
                        .returning(recipes::id)
                        .get_result(conn)
                        .await?;
                    replace_relations(conn, id, draft).await?;
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(RecipeId::new(id))
    }

    async fn update(
        &self,
        id: RecipeId,
        draft: &RecipeDraft,
        image: Option<MediaPath>,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = RecipeUpdate {
            name: draft.name(),
            image: image.as_ref().map(MediaPath::as_str),
            description: draft.text(),
            cooking_time: quantity_for_db(draft.cooking_time().get()),
        };
        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(recipes::table.filter(recipes::id.eq(id.get())))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Ok(false);
                }
                replace_relations(conn, id.get(), draft).await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(recipes::table.filter(recipes::id.eq(id.get())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = recipes::table
            .filter(recipes::id.eq(id.get()))
            .select(RecipeRow::as_select())
            .first::<RecipeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(hydrate(&mut conn, vec![row]).await?.pop())
    }

    async fn find_summary(
        &self,
        id: RecipeId,
    ) -> Result<Option<RecipeSummary>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = recipes::table
            .filter(recipes::id.eq(id.get()))
            .select(RecipeSummaryRow::as_select())
            .first::<RecipeSummaryRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_domain().map_err(RecipeRepositoryError::query))
            .transpose()
    }

    async fn list(
        &self,
        filter: &ResolvedRecipeFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered_recipes(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<RecipeRow> = filtered_recipes(filter)
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let recipes = hydrate(&mut conn, rows).await?;
        Ok((recipes, count_to_u64(total)))
    }

    async fn summaries_by_authors(
        &self,
        authors: &[UserId],
        limit: Option<u32>,
    ) -> Result<HashMap<UserId, Vec<RecipeSummary>>, RecipeRepositoryError> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i64> = authors.iter().map(|id| id.get()).collect();
        let rows: Vec<AuthorRecipeSummaryRow> = sql_query(SUMMARIES_BY_AUTHORS_SQL)
            .bind::<Array<BigInt>, _>(&ids)
            .bind::<Nullable<BigInt>, _>(limit.map(i64::from))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut previews: HashMap<UserId, Vec<RecipeSummary>> = HashMap::new();
        for row in rows {
            let summary = row
                .summary
                .into_domain()
                .map_err(RecipeRepositoryError::query)?;
            previews
                .entry(UserId::new(row.author_id))
                .or_default()
                .push(summary);
        }
        Ok(previews)
    }

    async fn count_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<HashMap<UserId, u64>, RecipeRepositoryError> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i64> = authors.iter().map(|id| id.get()).collect();
        let counts: Vec<(i64, i64)> = recipes::table
            .filter(recipes::author_id.eq_any(ids))
            .group_by(recipes::author_id)
            .select((recipes::author_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(counts
            .into_iter()
            .map(|(author, count)| (UserId::new(author), count_to_u64(count)))
            .collect())
    }
}
