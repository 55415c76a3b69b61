use std::io::Error;

use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::postgres::storage_error;
use crate::user::User;
use crate::user_storage::{user_not_found, UserStorage};

pub struct PostgresUserStorage {
    pool: &'static Pool,
}

impl PostgresUserStorage {
    pub fn new(pool: &'static Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStorage for PostgresUserStorage {
    async fn contains(&self, id: i64) -> Result<bool, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare("SELECT id FROM users WHERE id = $1").await.map_err(storage_error)?;

        let row = client.query_opt(&stmt, &[&id]).await.map_err(storage_error)?;

        Ok(row.is_some())
    }

    async fn create(&self, user: &User) -> Result<User, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "INSERT INTO users (name, email, birthdate) VALUES ($1, $2, $3) RETURNING id, name, email, birthdate"
        ).await.map_err(storage_error)?;

        let row = client.query_one(
            &stmt,
            &[&user.name(), &user.email(), &user.birthdate()]
        ).await.map_err(storage_error)?;

        Ok(User::from(row))
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "UPDATE users SET name = $2, email = $3, birthdate = $4 WHERE id = $1 RETURNING id, name, email, birthdate"
        ).await.map_err(storage_error)?;

        let row = client.query_opt(
            &stmt,
            &[&user.id(), &user.name(), &user.email(), &user.birthdate()]
        ).await.map_err(storage_error)?;

        match row {
            Some(row) => Ok(User::from(row)),
            None => Err(user_not_found(user.id())),
        }
    }

    async fn delete(&self, id: i64) -> Result<User, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "DELETE FROM users WHERE id = $1 RETURNING id, name, email, birthdate"
        ).await.map_err(storage_error)?;

        let row = client.query_opt(&stmt, &[&id]).await.map_err(storage_error)?;

        match row {
            Some(row) => Ok(User::from(row)),
            None => Err(user_not_found(id)),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<User, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "SELECT id, name, email, birthdate FROM users WHERE id = $1"
        ).await.map_err(storage_error)?;

        let row = client.query_opt(&stmt, &[&id]).await.map_err(storage_error)?;

        match row {
            Some(row) => Ok(User::from(row)),
            None => Err(user_not_found(id)),
        }
    }

    async fn find_all(&self) -> Result<Vec<User>, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "SELECT id, name, email, birthdate FROM users ORDER BY id"
        ).await.map_err(storage_error)?;

        let rows = client.query(&stmt, &[]).await.map_err(storage_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
