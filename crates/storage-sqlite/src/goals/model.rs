//! Database models for goals.

use std::str::FromStr;

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::utils::{format_timestamp, parse_timestamp};
use savetrack_core::errors::{DatabaseError, Error};
use savetrack_core::goals::{Goal, Priority};

/// Database model for goals.
///
/// Amounts and timestamps are stored as text so they round-trip exactly.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub owner_id: String,
    pub id: String,
    pub position: i32,
    pub name: String,
    pub target: String,
    pub current: String,
    pub priority: String,
    pub added_date: String,
    pub last_updated: String,
}

impl GoalDB {
    pub fn from_domain(owner_id: &str, position: i32, goal: Goal) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            id: goal.id,
            position,
            name: goal.name,
            target: goal.target.to_string(),
            current: goal.current.to_string(),
            priority: goal.priority.as_str().to_string(),
            added_date: format_timestamp(&goal.added_date),
            last_updated: format_timestamp(&goal.last_updated),
        }
    }
}

// Conversion to domain models
impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, value: &str| {
            Error::Database(DatabaseError::Corrupt(format!(
                "goal {} has invalid {field} '{value}'",
                db.id
            )))
        };
        Ok(Goal {
            target: Decimal::from_str(&db.target).map_err(|_| corrupt("target", &db.target))?,
            current: Decimal::from_str(&db.current)
                .map_err(|_| corrupt("current", &db.current))?,
            priority: Priority::from_str(&db.priority)
                .map_err(|_| corrupt("priority", &db.priority))?,
            added_date: parse_timestamp(&db.added_date)
                .ok_or_else(|| corrupt("added_date", &db.added_date))?,
            last_updated: parse_timestamp(&db.last_updated)
                .ok_or_else(|| corrupt("last_updated", &db.last_updated))?,
            id: db.id.clone(),
            name: db.name.clone(),
        })
    }
}
