//! Goals domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::goals_errors::GoalError;
use crate::constants::{AMOUNT_DECIMAL_PRECISION, CURRENCY_SYMBOL, DEFAULT_SORT_CRITERIA};

// =============================================================================
// Priority
// =============================================================================

/// Three-valued ranking used for ordering and filtering goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Ordinal used by the `priority` sort key: high=3, medium=2, low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = GoalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(GoalError::invalid(
                "priority",
                format!("'{other}' is not one of high, medium, low"),
            )),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = GoalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Sort key for goal listings. Unrecognized input falls back to `Date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortBy {
    #[default]
    Date,
    Name,
    Target,
    Remaining,
    Progress,
    Priority,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Date => "date",
            SortBy::Name => "name",
            SortBy::Target => "target",
            SortBy::Remaining => "remaining",
            SortBy::Progress => "progress",
            SortBy::Priority => "priority",
        }
    }

    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => SortBy::Name,
            "target" => SortBy::Target,
            "remaining" => SortBy::Remaining,
            "progress" => SortBy::Progress,
            "priority" => SortBy::Priority,
            _ => SortBy::Date,
        }
    }
}

impl From<String> for SortBy {
    fn from(value: String) -> Self {
        SortBy::parse_or_default(&value)
    }
}

/// Unrecognized input falls back to `Desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse_or_default(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        SortDirection::parse_or_default(&value)
    }
}

/// A sort key and direction, written as `<key>_<direction>` (e.g. `priority_desc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SortCriteria {
    pub sort_by: SortBy,
    pub direction: SortDirection,
}

impl SortCriteria {
    pub fn new(sort_by: SortBy, direction: SortDirection) -> Self {
        Self { sort_by, direction }
    }

    /// Parses `<key>_<direction>`. A malformed string yields `date_desc`.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().split_once('_') {
            Some((key, dir)) => Self {
                sort_by: SortBy::parse_or_default(key),
                direction: SortDirection::parse_or_default(dir),
            },
            None => Self::parse_or_default(DEFAULT_SORT_CRITERIA),
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.sort_by.as_str(), self.direction.as_str())
    }
}

impl From<String> for SortCriteria {
    fn from(value: String) -> Self {
        SortCriteria::parse_or_default(&value)
    }
}

impl From<SortCriteria> for String {
    fn from(value: SortCriteria) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Goal
// =============================================================================

/// Domain model representing a savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: Decimal,
    pub current: Decimal,
    #[serde(default)]
    pub priority: Priority,
    pub added_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Goal {
    /// `max(0, target - current)`
    pub fn remaining(&self) -> Decimal {
        self.target.saturating_sub(self.current).max(Decimal::ZERO)
    }

    /// `current / target`, uncapped; zero when the target is not positive.
    pub fn progress_ratio(&self) -> Decimal {
        if self.target <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.current
            .checked_div(self.target)
            .unwrap_or(Decimal::MAX)
    }

    /// Progress as a percentage clamped to `[0, 100]`.
    pub fn progress_percent(&self) -> Decimal {
        let percent = self
            .progress_ratio()
            .checked_mul(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ONE_HUNDRED);
        percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    pub fn is_complete(&self) -> bool {
        self.target > Decimal::ZERO && self.current >= self.target
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub target: Decimal,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Partial update of a goal. Absent fields keep their value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target: Option<Decimal>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Outcome of a successful contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub goal: Goal,
    /// True when this contribution moved the goal from incomplete to complete.
    pub completed_now: bool,
}

/// Ordering and paging for a goal listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalQuery {
    pub sort_by: SortBy,
    pub direction: SortDirection,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl GoalQuery {
    pub fn sorted(criteria: SortCriteria) -> Self {
        Self {
            sort_by: criteria.sort_by,
            direction: criteria.direction,
            ..Self::default()
        }
    }
}

/// Aggregate figures over an owner's goals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub incomplete_goals: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub total_saved: Decimal,
    pub total_target: Decimal,
    pub total_remaining: Decimal,
}

/// Rounds an amount to cents, halves away from zero, always keeping two places.
pub fn round_amount(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(
        AMOUNT_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(AMOUNT_DECIMAL_PRECISION);
    rounded
}

/// Parses a user-typed amount such as `1,250.50` or `₹400`.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, GoalError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(CURRENCY_SYMBOL)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(cleaned.trim())
        .map_err(|_| GoalError::invalid(field, format!("'{}' is not a valid amount", raw.trim())))
}

/// Formats an amount as rupees with thousands separators and two decimals,
/// e.g. `₹1,250.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_amount(amount);
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{CURRENCY_SYMBOL}{grouped}.{fraction}")
}
