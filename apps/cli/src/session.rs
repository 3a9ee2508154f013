//! Interactive session state and command execution.

use std::sync::Arc;

use savetrack_ai::{Assistant, ChatError, ChatRelayTrait, ChatRequest};
use savetrack_core::goals::{
    GoalQuery, GoalService, GoalServiceTrait, GoalStoreTrait, NewGoal, SortCriteria,
};
use savetrack_core::users::normalize_owner_id;
use savetrack_storage_file::FileGoalStore;
use thiserror::Error;

use crate::commands::{Command, HELP};
use crate::render;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No user active. Use 'switch <username>' first.")]
    NoActiveUser,

    #[error("Username cannot be empty.")]
    EmptyUsername,

    #[error(transparent)]
    Core(#[from] savetrack_core::Error),

    #[error("Assistant unavailable: {0}")]
    Chat(#[from] ChatError),
}

/// What the REPL should do with a command's result.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// Deletion needs a `y/N` answer before [`Session::confirm_delete`] runs.
    ConfirmDelete { prompt: String, goal_id: String },
    Exit(String),
}

pub struct Session {
    store: Arc<FileGoalStore>,
    goals: GoalService,
    assistant: Assistant,
    relay: Arc<dyn ChatRelayTrait>,
    owner: Option<String>,
    sort: SortCriteria,
}

impl Session {
    /// Opens the data file and restores the last active user and sort order.
    pub fn open(
        store: Arc<FileGoalStore>,
        relay: Arc<dyn ChatRelayTrait>,
    ) -> Result<Self, SessionError> {
        store.verify()?;
        let owner = store.last_active_user()?;
        let sort = store.sort_criteria()?;
        let goal_store: Arc<dyn GoalStoreTrait> = store.clone();
        Ok(Self {
            goals: GoalService::new(goal_store),
            assistant: Assistant::new(relay.clone()),
            relay,
            store,
            owner,
            sort,
        })
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn sort(&self) -> SortCriteria {
        self.sort
    }

    pub fn prompt(&self) -> String {
        format!("({}) > ", self.owner().unwrap_or("NO USER"))
    }

    fn require_owner(&self) -> Result<String, SessionError> {
        self.owner.clone().ok_or(SessionError::NoActiveUser)
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply, SessionError> {
        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Exit => return Ok(Reply::Exit("Goodbye!".to_string())),
            Command::User => match self.owner() {
                Some(owner) => format!("Current user: {owner}"),
                None => "No user is currently active.".to_string(),
            },
            Command::Switch { user } => self.switch_user(&user).await?,
            Command::Sort(None) => format!("Current sort order: {}", self.sort),
            Command::Sort(Some(criteria)) => {
                self.store.set_sort_criteria(criteria)?;
                self.sort = criteria;
                format!("Sorting changed to: {criteria}")
            }
            Command::Ask(question) => self.ask(&question).await?,
            Command::List => {
                let owner = self.require_owner()?;
                let goals = self.goals.get_goals(&owner, &GoalQuery::sorted(self.sort))?;
                render::goals_table(&owner, &self.sort, &goals)
            }
            Command::Summary => {
                let owner = self.require_owner()?;
                render::summary(&owner, &self.goals.summarize(&owner)?)
            }
            Command::Export => {
                let owner = self.require_owner()?;
                let ledger = self.goals.load_ledger(&owner)?;
                if ledger.is_empty() {
                    format!("No goals to export for user {owner}.")
                } else {
                    serde_json::to_string_pretty(ledger.goals())
                        .map_err(savetrack_core::Error::from)?
                }
            }
            Command::Add {
                name,
                target,
                priority,
            } => {
                let owner = self.require_owner()?;
                let goal = self
                    .goals
                    .create_goal(
                        &owner,
                        NewGoal {
                            name,
                            target,
                            priority: Some(priority),
                        },
                    )
                    .await?;
                format!("Added goal {}", render::goal_detail(&goal))
            }
            Command::Fund { goal, amount } => {
                let owner = self.require_owner()?;
                let contribution = self.goals.contribute(&owner, &goal, amount).await?;
                let detail = render::goal_detail(&contribution.goal);
                if contribution.completed_now {
                    format!("Goal reached! {detail}")
                } else {
                    format!("Added funds to {detail}")
                }
            }
            Command::Update { goal, update } => {
                let owner = self.require_owner()?;
                let existing = self.goals.get_goal(&owner, &goal)?;
                let updated = self.goals.update_goal(&owner, &existing.id, update).await?;
                format!("Updated goal {}", render::goal_detail(&updated))
            }
            Command::Delete { goal } => {
                let owner = self.require_owner()?;
                let existing = self.goals.get_goal(&owner, &goal)?;
                return Ok(Reply::ConfirmDelete {
                    prompt: format!(
                        "Delete goal {} for user {owner}? [y/N] ",
                        render::goal_detail(&existing)
                    ),
                    goal_id: existing.id,
                });
            }
        };
        Ok(Reply::Text(text))
    }

    /// Second half of `delete`, run once the user has answered `y`.
    pub async fn confirm_delete(&mut self, goal_id: &str) -> Result<String, SessionError> {
        let owner = self.require_owner()?;
        if self.goals.delete_goal(&owner, goal_id).await? {
            Ok(format!("Goal {goal_id} deleted for user {owner}."))
        } else {
            Err(savetrack_core::Error::from(
                savetrack_core::goals::GoalError::NotFound(goal_id.to_string()),
            )
            .into())
        }
    }

    async fn switch_user(&mut self, raw: &str) -> Result<String, SessionError> {
        let owner = normalize_owner_id(raw);
        if owner.is_empty() {
            return Err(SessionError::EmptyUsername);
        }
        if self.owner.as_deref() == Some(owner.as_str()) {
            return Ok(format!("Already managing goals for user {owner}."));
        }

        let is_new = !self.store.known_users()?.contains(&owner);
        if is_new {
            self.store.save_goals(&owner, Vec::new()).await?;
        }
        self.store.set_last_active_user(Some(&owner))?;
        self.owner = Some(owner.clone());

        Ok(if is_new {
            format!("Created new profile and switched to user {owner}.")
        } else {
            format!("Switched to user {owner}.")
        })
    }

    async fn ask(&self, question: &str) -> Result<String, SessionError> {
        match self.owner() {
            Some(owner) => {
                let ledger = self.goals.load_ledger(owner)?;
                Ok(self.assistant.respond(&ledger, &self.sort, question).await?)
            }
            None => Ok(self.relay.relay(ChatRequest::new(question)).await?.text),
        }
    }
}
