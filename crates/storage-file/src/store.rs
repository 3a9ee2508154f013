use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use savetrack_core::errors::{DatabaseError, Error};
use savetrack_core::goals::{Goal, GoalStoreTrait, SortCriteria};
use savetrack_core::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataFile {
    #[serde(default)]
    last_active_user_name: Option<String>,
    #[serde(default)]
    global_sort_criteria: SortCriteria,
    #[serde(default)]
    all_user_data: BTreeMap<String, OwnerData>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OwnerData {
    #[serde(default)]
    goals: Vec<Goal>,
}

/// Goal store backed by a single JSON file.
///
/// Every write re-reads the file, applies the change and replaces the file
/// through a sibling temp file, so other owners' data is preserved and a
/// crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct FileGoalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileGoalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole document once, surfacing a corrupt file early.
    pub fn verify(&self) -> Result<()> {
        self.read_data().map(|_| ())
    }

    pub fn last_active_user(&self) -> Result<Option<String>> {
        Ok(self.read_data()?.last_active_user_name)
    }

    pub fn set_last_active_user(&self, owner_id: Option<&str>) -> Result<()> {
        let owner_id = owner_id.map(str::to_string);
        self.with_data(|data| {
            data.last_active_user_name = owner_id;
            Ok(())
        })
    }

    pub fn sort_criteria(&self) -> Result<SortCriteria> {
        Ok(self.read_data()?.global_sort_criteria)
    }

    pub fn set_sort_criteria(&self, criteria: SortCriteria) -> Result<()> {
        self.with_data(|data| {
            data.global_sort_criteria = criteria;
            Ok(())
        })
    }

    /// Owners that have an entry in the file, in sorted order.
    pub fn known_users(&self) -> Result<Vec<String>> {
        Ok(self.read_data()?.all_user_data.into_keys().collect())
    }

    fn lock_guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "data file lock poisoned".to_string(),
            ))
        })
    }

    fn with_data<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut DataFile) -> Result<()>,
    {
        let _guard = self.lock_guard()?;
        let mut data = self.load_locked()?;
        op(&mut data)?;
        self.persist_locked(&data)
    }

    fn read_data(&self) -> Result<DataFile> {
        let _guard = self.lock_guard()?;
        self.load_locked()
    }

    fn load_locked(&self) -> Result<DataFile> {
        if !self.path.exists() {
            return Ok(DataFile::default());
        }

        let raw = fs::read(&self.path)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(DataFile::default());
        }

        serde_json::from_slice(&raw).map_err(|e| {
            Error::Database(DatabaseError::Corrupt(format!(
                "{} is not a valid data file: {e}",
                self.path.display()
            )))
        })
    }

    fn persist_locked(&self, data: &DataFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp_path = self.temp_path();
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        debug!("Wrote data file {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl GoalStoreTrait for FileGoalStore {
    fn load_goals(&self, owner_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .read_data()?
            .all_user_data
            .remove(owner_id)
            .map(|owner| owner.goals)
            .unwrap_or_default())
    }

    async fn save_goals(&self, owner_id: &str, goals: Vec<Goal>) -> Result<()> {
        self.with_data(|data| {
            data.all_user_data
                .entry(owner_id.to_string())
                .or_default()
                .goals = goals;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use savetrack_core::goals::{GoalLedger, NewGoal, Priority, SortBy, SortDirection};
    use tempfile::tempdir;

    fn ledger_with(owner: &str, names: &[&str]) -> GoalLedger {
        let mut ledger = GoalLedger::new(owner, vec![]);
        for name in names {
            ledger
                .create(NewGoal {
                    name: name.to_string(),
                    target: dec!(500.00),
                    priority: Some(Priority::Low),
                })
                .unwrap();
        }
        ledger
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_state() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path().join("absent.json"));
        assert!(store.load_goals("ALICE").unwrap().is_empty());
        assert_eq!(store.last_active_user().unwrap(), None);
        assert_eq!(store.sort_criteria().unwrap().to_string(), "date_desc");
        assert!(store.known_users().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path().join("data.json"));
        let mut ledger = ledger_with("ALICE", &["Laptop"]);
        let id = ledger.goals()[0].id.clone();
        ledger.contribute(&id, dec!(0.1)).unwrap();
        ledger.contribute(&id, dec!(0.2)).unwrap();
        let expected = ledger.goals().to_vec();

        store.save_goals("ALICE", ledger.into_goals()).await.unwrap();

        let loaded = store.load_goals("ALICE").unwrap();
        assert_eq!(loaded, expected);
        assert_eq!(loaded[0].current.to_string(), "0.30");
    }

    #[tokio::test]
    async fn test_save_preserves_other_owners_and_preferences() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path().join("data.json"));
        store
            .save_goals("ALICE", ledger_with("ALICE", &["A1", "A2"]).into_goals())
            .await
            .unwrap();
        store.set_last_active_user(Some("ALICE")).unwrap();
        store
            .set_sort_criteria(SortCriteria::new(SortBy::Priority, SortDirection::Asc))
            .unwrap();
        store
            .save_goals("BOB", ledger_with("BOB", &["B1"]).into_goals())
            .await
            .unwrap();

        assert_eq!(store.load_goals("ALICE").unwrap().len(), 2);
        assert_eq!(store.load_goals("BOB").unwrap().len(), 1);
        assert_eq!(store.last_active_user().unwrap().as_deref(), Some("ALICE"));
        assert_eq!(store.sort_criteria().unwrap().to_string(), "priority_asc");
        assert_eq!(store.known_users().unwrap(), vec!["ALICE", "BOB"]);
    }

    #[tokio::test]
    async fn test_file_layout_uses_camel_case_and_string_amounts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = FileGoalStore::new(&path);
        store
            .save_goals("ALICE", ledger_with("ALICE", &["Trip"]).into_goals())
            .await
            .unwrap();
        store.set_last_active_user(Some("ALICE")).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["lastActiveUserName"], "ALICE");
        assert_eq!(value["globalSortCriteria"], "date_desc");
        let goal = &value["allUserData"]["ALICE"]["goals"][0];
        assert_eq!(goal["target"], "500.00");
        assert_eq!(goal["priority"], "low");
        assert!(goal.get("addedDate").is_some());
        assert!(!dir.path().join("data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported_and_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileGoalStore::new(&path);

        assert!(matches!(
            store.load_goals("ALICE"),
            Err(Error::Database(DatabaseError::Corrupt(_)))
        ));
        assert!(store.save_goals("ALICE", vec![]).await.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "\n").unwrap();
        let store = FileGoalStore::new(&path);
        assert!(store.load_goals("ALICE").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goal_without_priority_defaults_to_medium() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"allUserData":{"ALICE":{"goals":[{"id":"abc123def","name":"Old",
            "target":"100","current":"5","addedDate":"2024-01-01T00:00:00Z",
            "lastUpdated":"2024-01-01T00:00:00Z"}]}}}"#,
        )
        .unwrap();
        let store = FileGoalStore::new(&path);
        let goals = store.load_goals("ALICE").unwrap();
        assert_eq!(goals[0].priority, Priority::Medium);
        assert_eq!(goals[0].current, dec!(5));
    }
}
