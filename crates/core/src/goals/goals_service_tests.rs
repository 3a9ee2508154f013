//! Unit tests for the goal service.

use super::*;
use crate::errors::{DatabaseError, Error, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

// ============================================================================
// Mock Implementations
// ============================================================================

#[derive(Default)]
struct MockGoalStore {
    goals: RwLock<HashMap<String, Vec<Goal>>>,
    fail_saves: AtomicBool,
}

impl MockGoalStore {
    fn stored(&self, owner_id: &str) -> Vec<Goal> {
        self.goals
            .read()
            .unwrap()
            .get(owner_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl GoalStoreTrait for MockGoalStore {
    fn load_goals(&self, owner_id: &str) -> Result<Vec<Goal>> {
        Ok(self.stored(owner_id))
    }

    async fn save_goals(&self, owner_id: &str, goals: Vec<Goal>) -> Result<()> {
        // Yield so concurrent callers interleave between load and save.
        tokio::task::yield_now().await;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "disk full".to_string(),
            )));
        }
        self.goals
            .write()
            .unwrap()
            .insert(owner_id.to_string(), goals);
        Ok(())
    }
}

fn service() -> (Arc<MockGoalStore>, GoalService) {
    let store = Arc::new(MockGoalStore::default());
    let service = GoalService::new(store.clone());
    (store, service)
}

fn new_goal(name: &str, target: Decimal) -> NewGoal {
    NewGoal {
        name: name.to_string(),
        target,
        priority: None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_create_persists_under_normalized_owner() {
    let (store, service) = service();
    let goal = service
        .create_goal(" alice ", new_goal("Laptop", dec!(1000)))
        .await
        .unwrap();

    assert_eq!(store.stored("ALICE"), vec![goal.clone()]);
    assert_eq!(service.get_goal("Alice", &goal.id).unwrap(), goal);
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let (_store, service) = service();
    let goal = service
        .create_goal("ALICE", new_goal("Trip", dec!(500)))
        .await
        .unwrap();

    // Same name is fine for another owner.
    service
        .create_goal("BOB", new_goal("Trip", dec!(500)))
        .await
        .unwrap();

    let err = service.contribute("BOB", &goal.id, dec!(1)).await.unwrap_err();
    assert!(matches!(err, Error::Goal(GoalError::NotFound(_))));
    assert!(!service.delete_goal("BOB", &goal.id).await.unwrap());
}

#[tokio::test]
async fn test_blank_owner_is_rejected() {
    let (_store, service) = service();
    let err = service
        .create_goal("  ", new_goal("Trip", dec!(500)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Goal(GoalError::InvalidInput { field: "owner", .. })
    ));
}

#[tokio::test]
async fn test_rejected_operation_does_not_save() {
    let (store, service) = service();
    service
        .create_goal("ALICE", new_goal("Trip", dec!(500)))
        .await
        .unwrap();
    store.fail_saves.store(true, Ordering::SeqCst);

    // Rejections short-circuit before the store is touched.
    let err = service
        .create_goal("ALICE", new_goal("TRIP", dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Goal(GoalError::DuplicateName(_))));
}

#[tokio::test]
async fn test_failed_save_keeps_durable_state() {
    let (store, service) = service();
    let goal = service
        .create_goal("ALICE", new_goal("Trip", dec!(500)))
        .await
        .unwrap();
    store.fail_saves.store(true, Ordering::SeqCst);

    let err = service.contribute("ALICE", &goal.id, dec!(100)).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    assert_eq!(store.stored("ALICE")[0].current, Decimal::ZERO);

    store.fail_saves.store(false, Ordering::SeqCst);
    let contribution = service.contribute("ALICE", &goal.id, dec!(100)).await.unwrap();
    assert_eq!(contribution.goal.current, dec!(100));
}

#[tokio::test]
async fn test_delete_missing_goal_skips_save() {
    let (store, service) = service();
    store.fail_saves.store(true, Ordering::SeqCst);
    assert!(!service.delete_goal("ALICE", "missing").await.unwrap());
}

#[tokio::test]
async fn test_summary_matches_listing() {
    let (_store, service) = service();
    for (name, amount) in [("A", dec!(10.10)), ("B", dec!(20.20)), ("C", dec!(30.30))] {
        let goal = service
            .create_goal("ALICE", new_goal(name, dec!(100)))
            .await
            .unwrap();
        service.contribute("ALICE", &goal.id, amount).await.unwrap();
    }

    let summary = service.summarize("ALICE").unwrap();
    let listed = service
        .get_goals(
            "ALICE",
            &GoalQuery {
                limit: Some(1000),
                ..GoalQuery::default()
            },
        )
        .unwrap();
    let listed_total: Decimal = listed.iter().map(|g| g.current).sum();
    assert_eq!(summary.total_saved, listed_total);
    assert_eq!(summary.total_saved, dec!(60.60));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_contributions_are_not_lost() {
    let (store, service) = service();
    let service = Arc::new(service);
    let goal = service
        .create_goal("ALICE", new_goal("Jar", dec!(100000)))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let service = service.clone();
        let goal_id = goal.id.clone();
        handles.push(tokio::spawn(async move {
            service.contribute("alice", &goal_id, dec!(1.25)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.stored("ALICE")[0].current, dec!(62.50));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_owner_locks_are_released_after_use() {
    let (store, service) = service();
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_goal(&format!("user{i}"), new_goal("Trip", dec!(500)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(service.tracked_owner_locks(), 0);
    assert_eq!(store.stored("USER7").len(), 1);

    // Failed saves release the lock too.
    store.fail_saves.store(true, Ordering::SeqCst);
    assert!(service
        .create_goal("ALICE", new_goal("Car", dec!(900)))
        .await
        .is_err());
    assert!(service
        .create_goal("ALICE", new_goal("", dec!(900)))
        .await
        .is_err());
    assert_eq!(service.tracked_owner_locks(), 0);
}

#[tokio::test]
async fn test_update_goal_through_service() {
    let (_store, service) = service();
    let goal = service
        .create_goal("ALICE", new_goal("Car", dec!(5000)))
        .await
        .unwrap();
    let updated = service
        .update_goal(
            "ALICE",
            &goal.id,
            GoalUpdate {
                name: Some("New Car".to_string()),
                priority: Some(Priority::High),
                ..GoalUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "New Car");
    assert_eq!(service.get_goal("ALICE", "new car").unwrap(), updated);
}
