//! PostgreSQL-backed `FollowRepository` implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{FollowRepository, FollowRepositoryError};
use crate::domain::{User, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{collect_rows, count_to_u64, page_window};
use super::models::{NewFollowRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, users};

/// Diesel-backed implementation of the follow repository port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowRepositoryError {
    map_basic_pool_error(error, FollowRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FollowRepositoryError {
    map_basic_diesel_error(
        error,
        FollowRepositoryError::query,
        FollowRepositoryError::connection,
    )
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn follow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(follows::table)
            .values(&NewFollowRow {
                user_id: follower.get(),
                author_id: author.get(),
            })
            .on_conflict((follows::user_id, follows::author_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn unfollow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::user_id.eq(follower.get()))
                .filter(follows::author_id.eq(author.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, FollowRepositoryError> {
        if authors.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i64> = authors.iter().map(|id| id.get()).collect();
        let followed: Vec<i64> = follows::table
            .filter(follows::user_id.eq(follower.get()))
            .filter(follows::author_id.eq_any(ids))
            .select(follows::author_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(followed.into_iter().map(UserId::new).collect())
    }

    async fn followed_authors(
        &self,
        follower: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<User>, u64), FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = follows::table
            .filter(follows::user_id.eq(follower.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<UserRow> = follows::table
            .inner_join(users::table.on(users::id.eq(follows::author_id)))
            .filter(follows::user_id.eq(follower.get()))
            .order((users::username.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let authors = collect_rows(
            rows.into_iter().map(UserRow::into_domain),
            FollowRepositoryError::query,
        )?;
        Ok((authors, count_to_u64(total)))
    }
}
