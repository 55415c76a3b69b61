use std::collections::{HashMap, HashSet};
use std::io::{Error, ErrorKind};

use tokio::sync::Mutex;

use crate::user::User;
use crate::user_storage::{user_not_found, UserStorage};

// Friendships are stored as two independent set memberships: a friend pair
// (a, b) occupies b's slot in a's set and a's slot in b's set. Every mutation
// touches both sides under one lock, which also serializes the existence
// check against a concurrent user deletion.
pub struct UserService {
    storage: Box<dyn UserStorage + Send + Sync>,
    friends: Mutex<HashMap<i64, HashSet<i64>>>,
}

impl UserService {
    // Seeds one empty friend set per stored user, so a persistent backend
    // that outlives the process starts with a complete index.
    pub async fn new(storage: Box<dyn UserStorage + Send + Sync>) -> Result<UserService, Error> {
        let mut friends = HashMap::new();
        for user in storage.find_all().await? {
            friends.insert(user.id(), HashSet::new());
        }
        Ok(UserService {
            storage,
            friends: Mutex::new(friends),
        })
    }

    async fn check_id(&self, id: i64) -> Result<(), Error> {
        if !self.storage.contains(id).await? {
            log::debug!("referenced user id {} does not exist", id);
            return Err(user_not_found(id));
        }
        Ok(())
    }

    pub async fn add_friend(&self, user_id: i64, friend_id: i64) -> Result<(), Error> {
        if user_id == friend_id {
            return Err(Error::new(ErrorKind::InvalidInput, "a user cannot befriend themselves"));
        }

        let mut friends = self.friends.lock().await;
        self.check_id(user_id).await?;
        self.check_id(friend_id).await?;

        log::debug!("friend add request: {} -> {}", user_id, friend_id);

        friends.entry(user_id).or_default().insert(friend_id);
        friends.entry(friend_id).or_default().insert(user_id);

        Ok(())
    }

    pub async fn delete_friend(&self, user_id: i64, friend_id: i64) -> Result<User, Error> {
        let mut friends = self.friends.lock().await;
        self.check_id(user_id).await?;
        self.check_id(friend_id).await?;

        log::debug!("friend delete request: {} -> {}", user_id, friend_id);

        if let Some(ids) = friends.get_mut(&user_id) {
            ids.remove(&friend_id);
        }
        if let Some(ids) = friends.get_mut(&friend_id) {
            ids.remove(&user_id);
        }

        self.storage.get_by_id(friend_id).await
    }

    pub async fn get_all_friends(&self, id: i64) -> Result<Vec<User>, Error> {
        let friends = self.friends.lock().await;
        self.check_id(id).await?;

        let friend_ids: Vec<i64> = match friends.get(&id) {
            Some(ids) => ids.iter().copied().collect(),
            None => Vec::new(),
        };

        let mut result = Vec::with_capacity(friend_ids.len());
        for friend_id in friend_ids {
            result.push(self.storage.get_by_id(friend_id).await?);
        }
        Ok(result)
    }

    pub async fn get_common_friends(&self, user_id: i64, other_id: i64) -> Result<Vec<User>, Error> {
        let friends = self.friends.lock().await;
        self.check_id(user_id).await?;
        self.check_id(other_id).await?;

        let empty = HashSet::new();
        let user_friends = friends.get(&user_id).unwrap_or(&empty);
        let other_friends = friends.get(&other_id).unwrap_or(&empty);
        let common: Vec<i64> = user_friends.intersection(other_friends).copied().collect();

        let mut result = Vec::with_capacity(common.len());
        for id in common {
            result.push(self.storage.get_by_id(id).await?);
        }
        Ok(result)
    }

    pub async fn create_user(&self, user: &User) -> Result<User, Error> {
        let mut friends = self.friends.lock().await;
        let created = self.storage.create(user).await?;
        friends.insert(created.id(), HashSet::new());
        Ok(created)
    }

    pub async fn update_user(&self, user: &User) -> Result<User, Error> {
        self.storage.update(user).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<User, Error> {
        let mut friends = self.friends.lock().await;
        let deleted = self.storage.delete(id).await?;

        // Dropping the user's own entry keeps the index free of ids the
        // storage no longer knows about.
        if let Some(ids) = friends.remove(&id) {
            for friend_id in ids {
                if let Some(friend_friends) = friends.get_mut(&friend_id) {
                    friend_friends.remove(&id);
                }
            }
        }

        Ok(deleted)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<User, Error> {
        self.storage.get_by_id(id).await
    }

    pub async fn find_all_users(&self) -> Result<Vec<User>, Error> {
        self.storage.find_all().await
    }
}
