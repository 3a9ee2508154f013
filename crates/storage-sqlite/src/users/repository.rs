use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use super::model::{NewUserDB, UserDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::users;
use savetrack_core::users::{NewUser, User, UserRepositoryTrait};
use savetrack_core::Result;

pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        UserRepository { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let row = NewUserDB::created_now(
            Uuid::new_v4().to_string(),
            new_user.username,
            new_user.key_id,
            new_user.key_hash,
        );
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let inserted = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result::<UserDB>(conn)
                    .into_core()?;
                User::try_from(inserted)
            })
            .await
    }

    fn get_by_key_id(&self, key: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        users::table
            .filter(users::key_id.eq(key))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?
            .map(User::try_from)
            .transpose()
    }

    fn get_by_username(&self, name: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        users::table
            .filter(users::username.eq(name))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?
            .map(User::try_from)
            .transpose()
    }
}
