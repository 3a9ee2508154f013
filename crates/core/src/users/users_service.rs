use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::users_model::{normalize_owner_id, validate_username, NewUser, User};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::errors::{Error, Result};

pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        UserService { repository }
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let username = validate_username(&new_user.username)?;
        if self.repository.get_by_username(&username)?.is_some() {
            return Err(Error::ConstraintViolation(format!(
                "username '{username}' is already registered"
            )));
        }
        let user = self
            .repository
            .create(NewUser {
                username,
                ..new_user
            })
            .await?;
        info!("Provisioned user {}", user.username);
        Ok(user)
    }

    fn find_by_key_id(&self, key_id: &str) -> Result<Option<User>> {
        self.repository.get_by_key_id(key_id)
    }

    fn get_user(&self, username: &str) -> Result<Option<User>> {
        self.repository
            .get_by_username(&normalize_owner_id(username))
    }
}
