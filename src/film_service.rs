use std::io::Error;

use crate::film::Film;
use crate::film_storage::FilmStorage;

pub struct FilmService {
    storage: Box<dyn FilmStorage + Send + Sync>,
}

impl FilmService {
    pub fn new(storage: Box<dyn FilmStorage + Send + Sync>) -> FilmService {
        FilmService { storage }
    }

    pub async fn create_film(&self, film: &Film) -> Result<Film, Error> {
        self.storage.create(film).await
    }

    pub async fn delete_film(&self, id: i64) -> Result<Film, Error> {
        self.storage.delete(id).await
    }

    pub async fn update_film(&self, film: &Film) -> Result<Film, Error> {
        self.storage.update(film).await
    }

    pub async fn find_all_films(&self) -> Result<Vec<Film>, Error> {
        self.storage.find_all().await
    }
}
