//! In-memory goal ledger for a single owner.
//!
//! A `GoalLedger` is the session object every front-end works through: it
//! carries the owner id and that owner's collection in insertion order, and
//! applies the ledger rules. It performs no I/O; loading and saving is the
//! job of a [`GoalStoreTrait`](super::GoalStoreTrait) implementation.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::goals_errors::GoalError;
use super::goals_model::{
    round_amount, Contribution, Goal, GoalQuery, GoalSummary, GoalUpdate, NewGoal, Priority,
    SortBy, SortDirection,
};
use crate::constants::{GOAL_ID_LEN, MAX_GOAL_NAME_LEN, MAX_GOAL_TARGET};

#[derive(Debug, Clone, PartialEq)]
pub struct GoalLedger {
    owner_id: String,
    goals: Vec<Goal>,
}

impl GoalLedger {
    pub fn new(owner_id: impl Into<String>, goals: Vec<Goal>) -> Self {
        Self {
            owner_id: owner_id.into(),
            goals,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Goals in insertion order.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn into_goals(self) -> Vec<Goal> {
        self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn create(&mut self, new_goal: NewGoal) -> Result<Goal, GoalError> {
        let name = validate_name(&new_goal.name)?;
        validate_target(new_goal.target)?;
        if self.name_taken(&name, None) {
            return Err(GoalError::DuplicateName(name));
        }

        let now = self.next_timestamp();
        let goal = Goal {
            id: self.generate_id(),
            name,
            target: new_goal.target,
            current: Decimal::ZERO,
            priority: new_goal.priority.unwrap_or_default(),
            added_date: now,
            last_updated: now,
        };
        self.goals.push(goal.clone());
        Ok(goal)
    }

    /// Adds `amount` to the goal found by id, or failing that by name.
    pub fn contribute(
        &mut self,
        id_or_name: &str,
        amount: Decimal,
    ) -> Result<Contribution, GoalError> {
        if amount <= Decimal::ZERO {
            return Err(GoalError::invalid(
                "amount",
                format!("{amount} must be greater than zero"),
            ));
        }
        if amount > Decimal::from(MAX_GOAL_TARGET) {
            return Err(GoalError::invalid(
                "amount",
                format!("must be at most {MAX_GOAL_TARGET}"),
            ));
        }
        let index = self
            .position(id_or_name)
            .ok_or_else(|| GoalError::NotFound(id_or_name.to_string()))?;

        if self.goals[index].is_complete() {
            return Err(GoalError::AlreadyComplete(self.goals[index].name.clone()));
        }

        let now = self.next_timestamp();
        let goal = &mut self.goals[index];
        let new_current = goal
            .current
            .checked_add(amount)
            .ok_or_else(|| GoalError::invalid("amount", format!("{amount} is too large")))?;
        goal.current = round_amount(new_current);
        goal.last_updated = now;

        Ok(Contribution {
            completed_now: goal.is_complete(),
            goal: goal.clone(),
        })
    }

    pub fn update(&mut self, goal_id: &str, update: GoalUpdate) -> Result<Goal, GoalError> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| GoalError::NotFound(goal_id.to_string()))?;

        let name = update.name.as_deref().map(validate_name).transpose()?;
        if let Some(target) = update.target {
            validate_target(target)?;
        }
        if let Some(name) = &name {
            if self.name_taken(name, Some(goal_id)) {
                return Err(GoalError::DuplicateName(name.clone()));
            }
        }

        let now = self.next_timestamp();
        let goal = &mut self.goals[index];
        if let Some(name) = name {
            goal.name = name;
        }
        if let Some(target) = update.target {
            goal.target = target;
        }
        if let Some(priority) = update.priority {
            goal.priority = priority;
        }
        goal.last_updated = now;
        Ok(goal.clone())
    }

    /// Removes the goal with `goal_id`; returns whether one was removed.
    pub fn delete(&mut self, goal_id: &str) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != goal_id);
        self.goals.len() != before
    }

    /// Returns a sorted, paged copy of the collection.
    ///
    /// The sort is stable and `Desc` reverses the comparison rather than the
    /// output, so goals with equal keys keep insertion order either way.
    pub fn query(&self, query: &GoalQuery) -> Vec<Goal> {
        let mut sorted: Vec<&Goal> = self.goals.iter().collect();
        sorted.sort_by(|a, b| {
            let ordering = compare_by(a, b, query.sort_by);
            match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        sorted
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub fn summarize(&self) -> GoalSummary {
        self.goals
            .iter()
            .fold(GoalSummary::default(), |mut summary, goal| {
                summary.total_goals += 1;
                if goal.is_complete() {
                    summary.completed_goals += 1;
                } else {
                    summary.incomplete_goals += 1;
                }
                match goal.priority {
                    Priority::High => summary.high_priority += 1,
                    Priority::Medium => summary.medium_priority += 1,
                    Priority::Low => summary.low_priority += 1,
                }
                // Stored collections are not re-validated on load.
                summary.total_saved = summary.total_saved.saturating_add(goal.current);
                summary.total_target = summary.total_target.saturating_add(goal.target);
                summary.total_remaining =
                    summary.total_remaining.saturating_add(goal.remaining());
                summary
            })
    }

    /// Resolves by exact id first, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Option<&Goal> {
        self.position(id_or_name).map(|i| &self.goals[i])
    }

    /// The incomplete goal nearest to its target: least remaining, then
    /// higher priority, then higher progress.
    pub fn closest_to_completion(&self) -> Option<&Goal> {
        self.goals
            .iter()
            .filter(|g| g.target > Decimal::ZERO && !g.is_complete())
            .min_by(|a, b| {
                a.remaining()
                    .cmp(&b.remaining())
                    .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
                    .then_with(|| b.progress_ratio().cmp(&a.progress_ratio()))
            })
    }

    pub fn complete(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| g.is_complete())
    }

    pub fn incomplete(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| !g.is_complete())
    }

    pub fn with_priority(&self, priority: Priority) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(move |g| g.priority == priority)
    }

    fn position(&self, id_or_name: &str) -> Option<usize> {
        self.goals
            .iter()
            .position(|g| g.id == id_or_name)
            .or_else(|| self.goals.iter().position(|g| g.matches_name(id_or_name)))
    }

    fn name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.goals
            .iter()
            .any(|g| Some(g.id.as_str()) != except_id && g.matches_name(name))
    }

    fn generate_id(&self) -> String {
        loop {
            let id: String = Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .take(GOAL_ID_LEN)
                .collect();
            if !self.goals.iter().any(|g| g.id == id) {
                return id;
            }
        }
    }

    /// Wall-clock now, bumped past every timestamp already in the collection
    /// so stamps from one ledger are strictly increasing.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let latest = self
            .goals
            .iter()
            .map(|g| g.added_date.max(g.last_updated))
            .max();
        match latest {
            Some(latest) if now <= latest => latest + Duration::microseconds(1),
            _ => now,
        }
    }
}

fn compare_by(a: &Goal, b: &Goal, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Date => a.added_date.cmp(&b.added_date),
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortBy::Target => a.target.cmp(&b.target),
        SortBy::Remaining => a.remaining().cmp(&b.remaining()),
        SortBy::Progress => a.progress_ratio().cmp(&b.progress_ratio()),
        SortBy::Priority => a.priority.rank().cmp(&b.priority.rank()),
    }
}

fn validate_name(raw: &str) -> Result<String, GoalError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(GoalError::invalid("name", "must not be empty"));
    }
    let len = name.chars().count();
    if len > MAX_GOAL_NAME_LEN {
        return Err(GoalError::invalid(
            "name",
            format!("must be at most {MAX_GOAL_NAME_LEN} characters (got {len})"),
        ));
    }
    Ok(name.to_string())
}

fn validate_target(target: Decimal) -> Result<(), GoalError> {
    if target <= Decimal::ZERO {
        return Err(GoalError::invalid(
            "target",
            format!("{target} must be greater than zero"),
        ));
    }
    if target > Decimal::from(MAX_GOAL_TARGET) {
        return Err(GoalError::invalid(
            "target",
            format!("must be at most {MAX_GOAL_TARGET}"),
        ));
    }
    Ok(())
}
