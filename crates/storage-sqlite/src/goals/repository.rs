use savetrack_core::goals::{Goal, GoalStoreTrait};
use savetrack_core::Result;

use super::model::GoalDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::goals;
use crate::schema::goals::dsl::*;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use std::sync::Arc;

pub struct GoalRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        GoalRepository { pool, writer }
    }

    fn load_goals_impl(&self, owner: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let goals_db = goals
            .filter(owner_id.eq(owner))
            .order(position.asc())
            .select(GoalDB::as_select())
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        goals_db.into_iter().map(Goal::try_from).collect()
    }
}

#[async_trait]
impl GoalStoreTrait for GoalRepository {
    fn load_goals(&self, owner: &str) -> Result<Vec<Goal>> {
        self.load_goals_impl(owner)
    }

    /// Replaces the owner's rows inside one writer transaction.
    async fn save_goals(&self, owner: &str, collection: Vec<Goal>) -> Result<()> {
        let owner = owner.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(goals::table.filter(owner_id.eq(&owner)))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let rows: Vec<GoalDB> = collection
                    .into_iter()
                    .enumerate()
                    .map(|(index, goal)| GoalDB::from_domain(&owner, index as i32, goal))
                    .collect();
                if !rows.is_empty() {
                    diesel::insert_into(goals::table)
                        .values(&rows)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use savetrack_core::goals::{GoalLedger, NewGoal, Priority};
    use tempfile::tempdir;

    async fn create_test_repository() -> (GoalRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (GoalRepository::new(Arc::clone(&pool), writer), temp_dir)
    }

    fn sample_ledger(owner: &str) -> GoalLedger {
        let mut ledger = GoalLedger::new(owner, vec![]);
        let laptop = ledger
            .create(NewGoal {
                name: "Laptop".to_string(),
                target: dec!(1000.00),
                priority: Some(Priority::High),
            })
            .unwrap();
        ledger
            .create(NewGoal {
                name: "Trip".to_string(),
                target: dec!(250.5),
                priority: None,
            })
            .unwrap();
        ledger.contribute(&laptop.id, dec!(0.1)).unwrap();
        ledger.contribute(&laptop.id, dec!(0.2)).unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_round_trip_is_exact() {
        let (repo, _dir) = create_test_repository().await;
        let ledger = sample_ledger("ALICE");
        let expected = ledger.goals().to_vec();

        repo.save_goals("ALICE", ledger.into_goals()).await.unwrap();
        let loaded = repo.load_goals("ALICE").unwrap();

        assert_eq!(loaded, expected);
        assert_eq!(loaded[0].current, dec!(0.30));
        assert_eq!(loaded[0].current.to_string(), "0.30");
        assert_eq!(loaded[1].target.to_string(), "250.5");
    }

    #[tokio::test]
    async fn test_save_replaces_only_that_owner() {
        let (repo, _dir) = create_test_repository().await;
        repo.save_goals("ALICE", sample_ledger("ALICE").into_goals())
            .await
            .unwrap();
        repo.save_goals("BOB", sample_ledger("BOB").into_goals())
            .await
            .unwrap();

        let mut alice = repo.load_goals("ALICE").unwrap();
        alice.remove(0);
        repo.save_goals("ALICE", alice).await.unwrap();

        assert_eq!(repo.load_goals("ALICE").unwrap().len(), 1);
        assert_eq!(repo.load_goals("BOB").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_load_preserves_insertion_order() {
        let (repo, _dir) = create_test_repository().await;
        let mut ledger = GoalLedger::new("ALICE", vec![]);
        for goal_name in ["zeta", "alpha", "mid"] {
            ledger
                .create(NewGoal {
                    name: goal_name.to_string(),
                    target: Decimal::ONE,
                    priority: None,
                })
                .unwrap();
        }
        repo.save_goals("ALICE", ledger.into_goals()).await.unwrap();

        let names: Vec<String> = repo
            .load_goals("ALICE")
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_empty() {
        let (repo, _dir) = create_test_repository().await;
        assert!(repo.load_goals("NOBODY").unwrap().is_empty());
    }
}
