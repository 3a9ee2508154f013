use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use savetrack_core::constants::{DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
use savetrack_core::goals::{
    GoalError, GoalQuery, GoalSummary, GoalUpdate, NewGoal, SortBy, SortDirection,
};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{ContributionRequest, ContributionResponse, GoalListParams, GoalView},
};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn list_query(params: GoalListParams) -> ApiResult<GoalQuery> {
    let limit = params.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
    if !(1..=MAX_QUERY_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_QUERY_LIMIT}"
        )));
    }
    Ok(GoalQuery {
        sort_by: params
            .sort_by
            .as_deref()
            .map(SortBy::parse_or_default)
            .unwrap_or_default(),
        direction: params
            .sort_dir
            .as_deref()
            .map(SortDirection::parse_or_default)
            .unwrap_or_default(),
        offset: params.skip.unwrap_or(0),
        limit: Some(limit),
    })
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    params: Result<Query<GoalListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<GoalView>>> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let query = list_query(params)?;
    let goals = state.goal_service.get_goals(user.owner_id(), &query)?;
    Ok(Json(goals.into_iter().map(GoalView::from).collect()))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewGoal>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GoalView>)> {
    let new_goal = body(payload)?;
    let goal = state
        .goal_service
        .create_goal(user.owner_id(), new_goal)
        .await?;
    Ok((StatusCode::CREATED, Json(goal.into())))
}

async fn summarize_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<GoalSummary>> {
    Ok(Json(state.goal_service.summarize(user.owner_id())?))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<GoalView>> {
    let goal = state.goal_service.get_goal(user.owner_id(), &id)?;
    Ok(Json(goal.into()))
}

async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<GoalUpdate>, JsonRejection>,
) -> ApiResult<Json<GoalView>> {
    let update = body(payload)?;
    let goal = state
        .goal_service
        .update_goal(user.owner_id(), &id, update)
        .await?;
    Ok(Json(goal.into()))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    if state.goal_service.delete_goal(user.owner_id(), &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(GoalError::NotFound(id).into())
    }
}

async fn contribute(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<ContributionRequest>, JsonRejection>,
) -> ApiResult<Json<ContributionResponse>> {
    let request = body(payload)?;
    let contribution = state
        .goal_service
        .contribute(user.owner_id(), &id, request.amount)
        .await?;
    Ok(Json(contribution.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/summary", get(summarize_goals))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/goals/{id}/contribute", post(contribute))
}
