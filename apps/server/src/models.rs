use rust_decimal::Decimal;
use savetrack_core::goals::{Contribution, Goal};
use serde::{Deserialize, Serialize};

/// A goal as returned by the API, with its derived figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub remaining: Decimal,
    pub progress_percent: Decimal,
    pub is_complete: bool,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        Self {
            remaining: goal.remaining(),
            progress_percent: goal.progress_percent().round_dp(2),
            is_complete: goal.is_complete(),
            goal,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionResponse {
    pub goal: GoalView,
    pub completed_now: bool,
}

impl From<Contribution> for ContributionResponse {
    fn from(contribution: Contribution) -> Self {
        Self {
            goal: contribution.goal.into(),
            completed_now: contribution.completed_now,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalListParams {
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: String,
    /// `<key>_<direction>`, e.g. `priority_desc`; defaults to `date_desc`.
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub response: String,
}
