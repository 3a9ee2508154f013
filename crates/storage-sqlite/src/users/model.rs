//! Database models for API users.

use diesel::prelude::*;

use crate::utils::{format_timestamp, parse_timestamp};
use savetrack_core::errors::{DatabaseError, Error};
use savetrack_core::users::User;

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub username: String,
    pub key_id: String,
    pub key_hash: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserDB {
    pub id: String,
    pub username: String,
    pub key_id: String,
    pub key_hash: String,
    pub is_active: bool,
    pub created_at: String,
}

impl NewUserDB {
    pub fn created_now(id: String, username: String, key_id: String, key_hash: String) -> Self {
        Self {
            id,
            username,
            key_id,
            key_hash,
            is_active: true,
            created_at: format_timestamp(&chrono::Utc::now()),
        }
    }
}

impl TryFrom<UserDB> for User {
    type Error = Error;

    fn try_from(db: UserDB) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&db.created_at).ok_or_else(|| {
            Error::Database(DatabaseError::Corrupt(format!(
                "user {} has invalid created_at '{}'",
                db.username, db.created_at
            )))
        })?;
        Ok(User {
            id: db.id,
            username: db.username,
            key_id: db.key_id,
            key_hash: db.key_hash,
            is_active: db.is_active,
            created_at,
        })
    }
}
