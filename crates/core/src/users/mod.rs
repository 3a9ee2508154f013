//! Users module - owner identity, API users, and their repository contract.

mod users_model;
mod users_service;
mod users_traits;

pub use users_model::{normalize_owner_id, validate_username, NewUser, User};
pub use users_service::UserService;
pub use users_traits::{UserRepositoryTrait, UserServiceTrait};
