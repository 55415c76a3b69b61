use std::collections::BTreeMap;
use std::io::Error;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::user::User;
use crate::user_storage::{user_not_found, UserStorage};

struct Inner {
    seq: i64,
    users: BTreeMap<i64, User>,
}

pub struct MemoryUserStorage {
    inner: Mutex<Inner>,
}

impl MemoryUserStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                seq: 0,
                users: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn contains(&self, id: i64) -> Result<bool, Error> {
        Ok(self.inner.lock().await.users.contains_key(&id))
    }

    async fn create(&self, user: &User) -> Result<User, Error> {
        let mut inner = self.inner.lock().await;
        inner.seq += 1;
        let created = user.with_id(inner.seq);
        inner.users.insert(created.id(), created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains_key(&user.id()) {
            return Err(user_not_found(user.id()));
        }
        inner.users.insert(user.id(), user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<User, Error> {
        let mut inner = self.inner.lock().await;
        inner.users.remove(&id).ok_or_else(|| user_not_found(id))
    }

    async fn get_by_id(&self, id: i64) -> Result<User, Error> {
        let inner = self.inner.lock().await;
        inner.users.get(&id).cloned().ok_or_else(|| user_not_found(id))
    }

    async fn find_all(&self) -> Result<Vec<User>, Error> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;

    fn sample_user(name: &str) -> User {
        User::new(name, &format!("{}@example.com", name.to_lowercase()), "1990-04-12").unwrap()
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let storage = MemoryUserStorage::new();
        let first = storage.create(&sample_user("Alice")).await.unwrap();
        let second = storage.create(&sample_user("Bob")).await.unwrap();
        assert_eq!(1, first.id());
        assert_eq!(2, second.id());
        assert!(storage.contains(1).await.unwrap());
        assert!(storage.contains(2).await.unwrap());
        assert!(!storage.contains(3).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let storage = MemoryUserStorage::new();
        storage.create(&sample_user("Alice")).await.unwrap();
        let deleted = storage.delete(1).await.unwrap();
        assert_eq!("Alice", deleted.name());
        let err = storage.delete(1).await.unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
    }

    #[tokio::test]
    async fn update_of_absent_user_fails() {
        let storage = MemoryUserStorage::new();
        let phantom = sample_user("Alice").with_id(7);
        let err = storage.update(&phantom).await.unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
    }

    #[tokio::test]
    async fn update_replaces_the_stored_record() {
        let storage = MemoryUserStorage::new();
        let created = storage.create(&sample_user("Alice")).await.unwrap();
        let renamed = User::new("Alicia", "alice@example.com", "1990-04-12")
            .unwrap()
            .with_id(created.id());
        storage.update(&renamed).await.unwrap();
        assert_eq!("Alicia", storage.get_by_id(created.id()).await.unwrap().name());
    }

    #[tokio::test]
    async fn find_all_returns_users_in_id_order() {
        let storage = MemoryUserStorage::new();
        storage.create(&sample_user("Alice")).await.unwrap();
        storage.create(&sample_user("Bob")).await.unwrap();
        let all = storage.find_all().await.unwrap();
        let ids: Vec<i64> = all.iter().map(|u| u.id()).collect();
        assert_eq!(vec![1, 2], ids);
    }
}
