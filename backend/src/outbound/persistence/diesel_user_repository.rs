//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::define_sql_function;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{NewUserRecord, StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{MediaPath, PasswordHash, User, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::diesel_helpers::{collect_rows, count_to_u64, page_window};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

define_sql_function! {
    /// SQL `LOWER(text)`; emails are unique case-insensitively.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match unique_violation(&error) {
        Some("users_username_unique") => UserPersistenceError::duplicate("username"),
        Some("users_email_unique") => UserPersistenceError::duplicate("email"),
        _ => map_basic_diesel_error(
            error,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        ),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_domain().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            first_name: user.first_name.as_ref(),
            last_name: user.last_name.as_ref(),
            password_hash: user.password_hash.as_str(),
        };

        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(i64, String)> = users::table
            .filter(lower(users::email).eq(email.trim().to_lowercase()))
            .select((users::id, users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(id, hash)| StoredCredentials {
            user_id: UserId::new(id),
            password_hash: PasswordHash::from_stored(hash),
        }))
    }

    async fn password_hash(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let hash: Option<String> = users::table
            .filter(users::id.eq(id.get()))
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(hash.map(PasswordHash::from_stored))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<UserRow> = users::table
            .order((users::username.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let users = collect_rows(
            rows.into_iter().map(UserRow::into_domain),
            UserPersistenceError::query,
        )?;
        Ok((users, count_to_u64(total)))
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<MediaPath>,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.get())))
            .set(users::avatar.eq(avatar.as_ref().map(MediaPath::as_str)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn set_password_hash(
        &self,
        id: UserId,
        hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.get())))
            .set(users::password_hash.eq(hash.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }
}
