use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use savetrack_core::users::User;

use crate::{auth::CurrentUser, main_lib::AppState};

async fn current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/users/me", get(current_user))
}
