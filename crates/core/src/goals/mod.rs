//! Goals module - ledger rules, domain models, services, and traits.

mod goals_errors;
mod goals_ledger;
mod goals_model;
mod goals_service;
mod goals_traits;



#[cfg(test)]
mod goals_service_tests;

pub use goals_errors::GoalError;
pub use goals_ledger::GoalLedger;
pub use goals_model::{
    format_currency, parse_amount, round_amount, Contribution, Goal, GoalQuery, GoalSummary,
    GoalUpdate, NewGoal, Priority, SortBy, SortCriteria, SortDirection,
};
pub use goals_service::GoalService;
pub use goals_traits::{GoalServiceTrait, GoalStoreTrait};
