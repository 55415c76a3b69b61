use std::io::{Error, ErrorKind};

use async_trait::async_trait;

use crate::user::User;

pub fn user_not_found(id: i64) -> Error {
    Error::new(ErrorKind::NotFound, format!("user with id {} does not exist", id))
}

#[async_trait]
pub trait UserStorage {
    async fn contains(&self, id: i64) -> Result<bool, Error>;
    async fn create(&self, user: &User) -> Result<User, Error>;
    async fn update(&self, user: &User) -> Result<User, Error>;
    async fn delete(&self, id: i64) -> Result<User, Error>;
    async fn get_by_id(&self, id: i64) -> Result<User, Error>;
    async fn find_all(&self) -> Result<Vec<User>, Error>;
}
