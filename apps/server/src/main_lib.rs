use std::sync::Arc;

use crate::config::Config;
use savetrack_ai::{Assistant, ChatRelayTrait, GeminiRelay};
use savetrack_core::{
    goals::{GoalService, GoalServiceTrait},
    users::{UserService, UserServiceTrait},
};
use savetrack_storage_sqlite::{db, goals::GoalRepository, users::UserRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait + Send + Sync>,
    pub user_service: Arc<dyn UserServiceTrait + Send + Sync>,
    pub chat_relay: Arc<dyn ChatRelayTrait>,
    pub assistant: Arc<Assistant>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("ST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let relay: Arc<dyn ChatRelayTrait> = Arc::new(GeminiRelay::new(config.chat.clone())?);
    build_state_with_relay(config, relay).await
}

/// Wires storage and services around the given chat relay.
pub async fn build_state_with_relay(
    config: &Config,
    chat_relay: Arc<dyn ChatRelayTrait>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let goal_service: Arc<dyn GoalServiceTrait + Send + Sync> =
        Arc::new(GoalService::new(goal_repository));

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let user_service: Arc<dyn UserServiceTrait + Send + Sync> =
        Arc::new(UserService::new(user_repository));

    let assistant = Arc::new(Assistant::new(chat_relay.clone()));

    Ok(Arc::new(AppState {
        goal_service,
        user_service,
        chat_relay,
        assistant,
        db_path,
    }))
}
