use crate::errors::Result;
use crate::users::users_model::{NewUser, User};
use async_trait::async_trait;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User>;
    fn get_by_key_id(&self, key_id: &str) -> Result<Option<User>>;
    fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    fn find_by_key_id(&self, key_id: &str) -> Result<Option<User>>;
    fn get_user(&self, username: &str) -> Result<Option<User>>;
}
