use std::io::{Error, ErrorKind};

use async_trait::async_trait;

use crate::film::Film;

pub fn film_not_found(id: i64) -> Error {
    Error::new(ErrorKind::NotFound, format!("film with id {} does not exist", id))
}

#[async_trait]
pub trait FilmStorage {
    async fn create(&self, film: &Film) -> Result<Film, Error>;
    async fn delete(&self, id: i64) -> Result<Film, Error>;
    async fn update(&self, film: &Film) -> Result<Film, Error>;
    async fn find_all(&self) -> Result<Vec<Film>, Error>;
}
