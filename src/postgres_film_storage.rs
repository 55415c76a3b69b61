use std::io::Error;

use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::film::Film;
use crate::film_storage::{film_not_found, FilmStorage};
use crate::postgres::storage_error;

pub struct PostgresFilmStorage {
    pool: &'static Pool,
}

impl PostgresFilmStorage {
    pub fn new(pool: &'static Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FilmStorage for PostgresFilmStorage {
    async fn create(&self, film: &Film) -> Result<Film, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "INSERT INTO films (title, description, release_date, duration_minutes) VALUES ($1, $2, $3, $4) RETURNING id, title, description, release_date, duration_minutes"
        ).await.map_err(storage_error)?;

        let row = client.query_one(
            &stmt,
            &[&film.title(), &film.description(), &film.release_date(), &film.duration_minutes()]
        ).await.map_err(storage_error)?;

        Ok(Film::from(row))
    }

    async fn delete(&self, id: i64) -> Result<Film, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "DELETE FROM films WHERE id = $1 RETURNING id, title, description, release_date, duration_minutes"
        ).await.map_err(storage_error)?;

        let row = client.query_opt(&stmt, &[&id]).await.map_err(storage_error)?;

        match row {
            Some(row) => Ok(Film::from(row)),
            None => Err(film_not_found(id)),
        }
    }

    async fn update(&self, film: &Film) -> Result<Film, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "UPDATE films SET title = $2, description = $3, release_date = $4, duration_minutes = $5 WHERE id = $1 RETURNING id, title, description, release_date, duration_minutes"
        ).await.map_err(storage_error)?;

        let row = client.query_opt(
            &stmt,
            &[&film.id(), &film.title(), &film.description(), &film.release_date(), &film.duration_minutes()]
        ).await.map_err(storage_error)?;

        match row {
            Some(row) => Ok(Film::from(row)),
            None => Err(film_not_found(film.id())),
        }
    }

    async fn find_all(&self) -> Result<Vec<Film>, Error> {
        let client = self.pool.get().await.map_err(storage_error)?;

        let stmt = client.prepare(
            "SELECT id, title, description, release_date, duration_minutes FROM films ORDER BY id"
        ).await.map_err(storage_error)?;

        let rows = client.query(&stmt, &[]).await.map_err(storage_error)?;

        Ok(rows.into_iter().map(Film::from).collect())
    }
}
