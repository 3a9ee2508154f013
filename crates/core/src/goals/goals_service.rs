use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::goals_errors::GoalError;
use super::goals_ledger::GoalLedger;
use super::goals_model::{Contribution, Goal, GoalQuery, GoalSummary, GoalUpdate, NewGoal};
use super::goals_traits::{GoalServiceTrait, GoalStoreTrait};
use crate::errors::Result;
use crate::users::normalize_owner_id;

/// Applies ledger operations on top of a persistence adapter.
///
/// Mutations for one owner run one at a time: each takes the owner's lock,
/// loads the collection, applies the change and saves it before releasing.
/// A failed save leaves durable state as it was.
pub struct GoalService {
    store: Arc<dyn GoalStoreTrait>,
    owner_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GoalService {
    pub fn new(store: Arc<dyn GoalStoreTrait>) -> Self {
        GoalService {
            store,
            owner_locks: DashMap::new(),
        }
    }

    fn owner_lock(&self, owner_id: &str) -> Arc<Mutex<()>> {
        self.owner_locks
            .entry(owner_id.to_string())
            .or_default()
            .clone()
    }

    /// Runs `op` against a freshly loaded ledger under the owner's lock.
    /// The ledger is saved only when `op` reports a change.
    async fn mutate<T, F>(&self, owner_id: &str, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut GoalLedger) -> std::result::Result<(T, bool), GoalError> + Send,
    {
        let owner_id = owner_key(owner_id)?;
        let lock = self.owner_lock(&owner_id);
        let guard = lock.lock().await;
        let result = self.apply(&owner_id, op).await;
        drop(guard);
        drop(lock);

        // Forget the lock once no other task holds or waits on it.
        self.owner_locks
            .remove_if(&owner_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn apply<T, F>(&self, owner_id: &str, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut GoalLedger) -> std::result::Result<(T, bool), GoalError> + Send,
    {
        let mut ledger = GoalLedger::new(owner_id, self.store.load_goals(owner_id)?);
        let (value, changed) = op(&mut ledger)?;
        if changed {
            self.store.save_goals(owner_id, ledger.into_goals()).await?;
        }
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn tracked_owner_locks(&self) -> usize {
        self.owner_locks.len()
    }
}

fn owner_key(raw: &str) -> Result<String> {
    let owner_id = normalize_owner_id(raw);
    if owner_id.is_empty() {
        return Err(GoalError::invalid("owner", "must not be empty").into());
    }
    Ok(owner_id)
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn load_ledger(&self, owner_id: &str) -> Result<GoalLedger> {
        let owner_id = owner_key(owner_id)?;
        let goals = self.store.load_goals(&owner_id)?;
        Ok(GoalLedger::new(owner_id, goals))
    }

    fn get_goals(&self, owner_id: &str, query: &GoalQuery) -> Result<Vec<Goal>> {
        Ok(self.load_ledger(owner_id)?.query(query))
    }

    fn get_goal(&self, owner_id: &str, id_or_name: &str) -> Result<Goal> {
        self.load_ledger(owner_id)?
            .find(id_or_name)
            .cloned()
            .ok_or_else(|| GoalError::NotFound(id_or_name.to_string()).into())
    }

    fn summarize(&self, owner_id: &str) -> Result<GoalSummary> {
        Ok(self.load_ledger(owner_id)?.summarize())
    }

    async fn create_goal(&self, owner_id: &str, new_goal: NewGoal) -> Result<Goal> {
        let goal = self
            .mutate(owner_id, |ledger| Ok((ledger.create(new_goal)?, true)))
            .await?;
        debug!("Created goal {} ({})", goal.id, goal.name);
        Ok(goal)
    }

    async fn contribute(
        &self,
        owner_id: &str,
        id_or_name: &str,
        amount: Decimal,
    ) -> Result<Contribution> {
        let contribution = self
            .mutate(owner_id, |ledger| {
                Ok((ledger.contribute(id_or_name, amount)?, true))
            })
            .await?;
        debug!(
            "Contributed {} to goal {} (completed: {})",
            amount, contribution.goal.id, contribution.completed_now
        );
        Ok(contribution)
    }

    async fn update_goal(
        &self,
        owner_id: &str,
        goal_id: &str,
        update: GoalUpdate,
    ) -> Result<Goal> {
        self.mutate(owner_id, |ledger| Ok((ledger.update(goal_id, update)?, true)))
            .await
    }

    async fn delete_goal(&self, owner_id: &str, goal_id: &str) -> Result<bool> {
        self.mutate(owner_id, |ledger| {
            let removed = ledger.delete(goal_id);
            Ok((removed, removed))
        })
        .await
    }
}
