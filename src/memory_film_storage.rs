use std::collections::BTreeMap;
use std::io::Error;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::film::Film;
use crate::film_storage::{film_not_found, FilmStorage};

struct Inner {
    seq: i64,
    films: BTreeMap<i64, Film>,
}

pub struct MemoryFilmStorage {
    inner: Mutex<Inner>,
}

impl MemoryFilmStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                seq: 0,
                films: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl FilmStorage for MemoryFilmStorage {
    async fn create(&self, film: &Film) -> Result<Film, Error> {
        let mut inner = self.inner.lock().await;
        inner.seq += 1;
        let created = film.with_id(inner.seq);
        inner.films.insert(created.id(), created.clone());
        Ok(created)
    }

    async fn delete(&self, id: i64) -> Result<Film, Error> {
        let mut inner = self.inner.lock().await;
        inner.films.remove(&id).ok_or_else(|| film_not_found(id))
    }

    async fn update(&self, film: &Film) -> Result<Film, Error> {
        let mut inner = self.inner.lock().await;
        if !inner.films.contains_key(&film.id()) {
            return Err(film_not_found(film.id()));
        }
        inner.films.insert(film.id(), film.clone());
        Ok(film.clone())
    }

    async fn find_all(&self) -> Result<Vec<Film>, Error> {
        let inner = self.inner.lock().await;
        Ok(inner.films.values().cloned().collect())
    }
}
