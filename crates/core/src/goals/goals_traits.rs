use crate::errors::Result;
use crate::goals::goals_ledger::GoalLedger;
use crate::goals::goals_model::{Contribution, Goal, GoalQuery, GoalSummary, GoalUpdate, NewGoal};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Persistence adapter for an owner's goal collection.
///
/// `save_goals` replaces the owner's whole collection and must be
/// all-or-nothing. Amounts must round-trip exactly.
#[async_trait]
pub trait GoalStoreTrait: Send + Sync {
    fn load_goals(&self, owner_id: &str) -> Result<Vec<Goal>>;
    async fn save_goals(&self, owner_id: &str, goals: Vec<Goal>) -> Result<()>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn load_ledger(&self, owner_id: &str) -> Result<GoalLedger>;
    fn get_goals(&self, owner_id: &str, query: &GoalQuery) -> Result<Vec<Goal>>;
    fn get_goal(&self, owner_id: &str, id_or_name: &str) -> Result<Goal>;
    fn summarize(&self, owner_id: &str) -> Result<GoalSummary>;
    async fn create_goal(&self, owner_id: &str, new_goal: NewGoal) -> Result<Goal>;
    async fn contribute(
        &self,
        owner_id: &str,
        id_or_name: &str,
        amount: Decimal,
    ) -> Result<Contribution>;
    async fn update_goal(&self, owner_id: &str, goal_id: &str, update: GoalUpdate)
        -> Result<Goal>;
    async fn delete_goal(&self, owner_id: &str, goal_id: &str) -> Result<bool>;
}
