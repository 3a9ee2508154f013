use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use savetrack_ai::ChatRequest;
use savetrack_core::goals::SortCriteria;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{AssistantRequest, ChatMessageRequest, ChatMessageResponse},
};

/// Pure relay: the message never touches ledger data.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatMessageRequest>, JsonRejection>,
) -> ApiResult<Json<ChatMessageResponse>> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let reply = state
        .chat_relay
        .relay(ChatRequest {
            message: request.message,
            user_name: request.user_name,
        })
        .await?;
    Ok(Json(ChatMessageResponse {
        response: reply.text,
    }))
}

/// Answers assistant commands from the caller's goals, relaying anything else.
async fn assistant(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<AssistantRequest>, JsonRejection>,
) -> ApiResult<Json<ChatMessageResponse>> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let criteria = request
        .sort
        .as_deref()
        .map(SortCriteria::parse_or_default)
        .unwrap_or_default();
    let ledger = state.goal_service.load_ledger(user.owner_id())?;
    let response = state
        .assistant
        .respond(&ledger, &criteria, &request.message)
        .await?;
    Ok(Json(ChatMessageResponse { response }))
}

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

pub fn assistant_router() -> Router<Arc<AppState>> {
    Router::new().route("/assistant", post(assistant))
}
