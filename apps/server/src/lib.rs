pub mod api;
pub mod auth;
pub mod config;
pub mod error;
mod main_lib;
pub mod models;

pub use main_lib::{build_state, build_state_with_relay, init_tracing, AppState};
