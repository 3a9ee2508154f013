//! Plain-text assistant commands answered from the owner's ledger.
//!
//! Recognized phrases are matched case-insensitively; goal names keep the
//! casing the user typed. Anything else is left to the chat relay.

use std::fmt::Write as _;
use std::sync::Arc;

use log::debug;
use rand::seq::SliceRandom;
use savetrack_core::goals::{format_currency, Goal, GoalLedger, GoalQuery, Priority, SortCriteria};

use crate::error::ChatError;
use crate::relay::{ChatRelayTrait, ChatRequest};

const TIPS: [&str; 8] = [
    "TIP: Automate small, regular transfers to your savings goal accounts right after payday.",
    "TIP: Review your subscriptions (streaming, apps, etc.). Cancel any you don't use regularly.",
    "TIP: Try a 'no-spend' challenge for a week or a weekend to identify non-essential spending.",
    "TIP: Pack your lunch instead of buying it. The daily savings add up significantly over time!",
    "TIP: Use a budgeting app or spreadsheet to track exactly where your money is going.",
    "TIP: Set specific, measurable, achievable, relevant, and time-bound (SMART) savings goals.",
    "TIP: Consider rounding up your purchases to the nearest ₹10 or ₹50 and transferring the difference to savings.",
    "TIP: Look for free entertainment options like parks, libraries, or community events.",
];

const HELP: &str = "AVAILABLE COMMANDS:
  list goals / ls                 - your goals in the current sort order
  list complete goals             - only completed goals
  list incomplete goals           - only incomplete goals
  list high|medium|low priority goals
  count goals                     - total number of goals
  count complete goals
  count incomplete goals
  count high|medium|low priority goals
  summary                         - counts and totals
  progress <goal> / status <goal> - progress of one goal
  remaining <goal> / left for <goal>
  goal details <goal>             - everything about one goal
  check goal <goal>               - whether a goal exists
  closest goal                    - the incomplete goal nearest its target
  current sort                    - the active sort order
  tip / suggestion                - a saving suggestion
  help / ?                        - this list
Anything else is answered by the assistant, which only discusses savings goals.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantCommand {
    Help,
    ListGoals,
    ListComplete,
    ListIncomplete,
    ListPriority(Priority),
    CountGoals,
    CountComplete,
    CountIncomplete,
    CountPriority(Priority),
    Summary,
    Progress(String),
    Remaining(String),
    Details(String),
    Check(String),
    Closest,
    CurrentSort,
    Tip,
}

/// Returns the text after `prefix` (matched case-insensitively), trimmed,
/// or `None` when the prefix is absent or nothing follows it.
fn argument_after<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    let head = raw.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = raw[prefix.len()..].trim();
    (!rest.is_empty()).then_some(rest)
}

fn priority_phrase(lower: &str, verb: &str) -> Option<Priority> {
    lower
        .strip_prefix(verb)?
        .strip_suffix(" priority goals")?
        .parse()
        .ok()
}

impl AssistantCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let raw = text.trim();
        let lower = raw.to_lowercase();

        let command = match lower.as_str() {
            "help" | "?" => Self::Help,
            "list goals" | "ls" => Self::ListGoals,
            "list complete goals" => Self::ListComplete,
            "list incomplete goals" => Self::ListIncomplete,
            "count goals" => Self::CountGoals,
            "count complete goals" => Self::CountComplete,
            "count incomplete goals" => Self::CountIncomplete,
            "summary" => Self::Summary,
            "closest goal" => Self::Closest,
            "current sort" => Self::CurrentSort,
            "tip" | "suggestion" => Self::Tip,
            _ => {
                if let Some(p) = priority_phrase(&lower, "list ") {
                    Self::ListPriority(p)
                } else if let Some(p) = priority_phrase(&lower, "count ") {
                    Self::CountPriority(p)
                } else if let Some(name) = argument_after(raw, "goal details ") {
                    Self::Details(name.to_string())
                } else if let Some(name) = argument_after(raw, "check goal ") {
                    Self::Check(name.to_string())
                } else if let Some(name) = argument_after(raw, "progress ")
                    .or_else(|| argument_after(raw, "status "))
                {
                    Self::Progress(name.to_string())
                } else if let Some(name) = argument_after(raw, "remaining ")
                    .or_else(|| argument_after(raw, "left for "))
                {
                    Self::Remaining(name.to_string())
                } else {
                    return None;
                }
            }
        };
        Some(command)
    }

    /// Renders the answer for this command from the ledger.
    pub fn render(&self, ledger: &GoalLedger, criteria: &SortCriteria) -> String {
        let owner = ledger.owner_id();
        match self {
            Self::Help => HELP.to_string(),
            Self::ListGoals => {
                let goals = ledger.query(&GoalQuery::sorted(*criteria));
                if goals.is_empty() {
                    return format!("NO ACTIVE GOALS FOUND FOR USER {owner}.");
                }
                let header = format!(
                    "CURRENT GOALS FOR {owner} (SORTED BY {}):",
                    sort_label(criteria)
                );
                bullet_list(header, goals.iter(), true)
            }
            Self::ListComplete => {
                let goals: Vec<&Goal> = ledger.complete().collect();
                if goals.is_empty() {
                    return format!("NO COMPLETED GOALS FOUND FOR USER {owner}.");
                }
                bullet_list(format!("COMPLETED GOALS FOR {owner}:"), goals, false)
            }
            Self::ListIncomplete => {
                let goals: Vec<&Goal> = ledger.incomplete().collect();
                if goals.is_empty() {
                    return format!("ALL GOALS ARE COMPLETE FOR USER {owner}!");
                }
                bullet_list(format!("INCOMPLETE GOALS FOR {owner}:"), goals, true)
            }
            Self::ListPriority(priority) => {
                let label = priority.as_str().to_uppercase();
                let goals: Vec<&Goal> = ledger.with_priority(*priority).collect();
                if goals.is_empty() {
                    return format!("NO {label} PRIORITY GOALS FOUND FOR USER {owner}.");
                }
                bullet_list(format!("{label} PRIORITY GOALS FOR {owner}:"), goals, false)
            }
            Self::CountGoals => {
                format!("USER {owner} HAS A TOTAL OF {} GOALS.", ledger.len())
            }
            Self::CountComplete => format!(
                "USER {owner} HAS {} COMPLETED GOALS.",
                ledger.complete().count()
            ),
            Self::CountIncomplete => format!(
                "USER {owner} HAS {} INCOMPLETE GOALS.",
                ledger.incomplete().count()
            ),
            Self::CountPriority(priority) => format!(
                "USER {owner} HAS {} {} PRIORITY GOALS.",
                ledger.with_priority(*priority).count(),
                priority.as_str().to_uppercase()
            ),
            Self::Summary => {
                let s = ledger.summarize();
                format!(
                    "GOAL SUMMARY FOR {owner}:\n\
                     - Total Goals: {} ({} complete)\n\
                     - Priorities: {} High / {} Medium / {} Low\n\
                     - Total Saved: {}\n\
                     - Total Target: {}\n\
                     - Total Remaining: {}",
                    s.total_goals,
                    s.completed_goals,
                    s.high_priority,
                    s.medium_priority,
                    s.low_priority,
                    format_currency(s.total_saved),
                    format_currency(s.total_target),
                    format_currency(s.total_remaining),
                )
            }
            Self::Progress(name) => match find_by_name(ledger, name) {
                Some(goal) => format!(
                    "PROGRESS FOR {} (User: {owner} | Priority: {}):\n\
                     - SAVED: {}\n\
                     - TARGET: {}\n\
                     - REMAINING: {}\n\
                     - COMPLETION: {}%{}",
                    goal.name,
                    goal.priority.as_str().to_uppercase(),
                    format_currency(goal.current),
                    format_currency(goal.target),
                    format_currency(goal.remaining()),
                    whole_percent(goal),
                    complete_marker(goal, " (COMPLETE)"),
                ),
                None => not_found(name, owner),
            },
            Self::Remaining(name) => match find_by_name(ledger, name) {
                Some(goal) if goal.is_complete() => format!(
                    "GOAL {} IS COMPLETE FOR {owner}! {} REMAINING.",
                    goal.name,
                    format_currency(goal.remaining())
                ),
                Some(goal) => format!(
                    "REMAINING FOR {} (User: {owner}): {}",
                    goal.name,
                    format_currency(goal.remaining())
                ),
                None => not_found(name, owner),
            },
            Self::Details(name) => match find_by_name(ledger, name) {
                Some(goal) => format!(
                    "DETAILS FOR GOAL {} (User: {owner}):\n\
                     - Id: {}\n\
                     - Priority: {}\n\
                     - Saved: {}\n\
                     - Target: {}\n\
                     - Remaining: {}\n\
                     - Completion: {}%{}\n\
                     - Added: {}\n\
                     - Last Updated: {}",
                    goal.name,
                    goal.id,
                    goal.priority.as_str().to_uppercase(),
                    format_currency(goal.current),
                    format_currency(goal.target),
                    format_currency(goal.remaining()),
                    whole_percent(goal),
                    complete_marker(goal, " (COMPLETE)"),
                    goal.added_date.format("%Y-%m-%d %H:%M UTC"),
                    goal.last_updated.format("%Y-%m-%d %H:%M UTC"),
                ),
                None => not_found(name, owner),
            },
            Self::Check(name) => {
                if find_by_name(ledger, name).is_some() {
                    format!("GOAL \"{name}\" EXISTS FOR USER {owner}.")
                } else {
                    format!("GOAL \"{name}\" NOT FOUND FOR USER {owner}.")
                }
            }
            Self::Closest => match ledger.closest_to_completion() {
                Some(goal) => format!(
                    "CLOSEST GOAL TO COMPLETION FOR {owner}: {} (Priority: {})\n\
                     REMAINING: {} ({}% complete).",
                    goal.name,
                    goal.priority.as_str().to_uppercase(),
                    format_currency(goal.remaining()),
                    whole_percent(goal),
                ),
                None => format!("ALL GOALS ARE COMPLETE FOR USER {owner}!"),
            },
            Self::CurrentSort => format!(
                "Goals for user {owner} are currently sorted by {}.",
                sort_label(criteria)
            ),
            Self::Tip => TIPS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(TIPS[0])
                .to_string(),
        }
    }
}

fn find_by_name<'a>(ledger: &'a GoalLedger, name: &str) -> Option<&'a Goal> {
    ledger.goals().iter().find(|g| g.matches_name(name))
}

fn not_found(name: &str, owner: &str) -> String {
    format!("ERROR: Goal \"{name}\" not found for user {owner}.")
}

fn sort_label(criteria: &SortCriteria) -> String {
    criteria.to_string().replacen('_', " ", 1).to_uppercase()
}

fn whole_percent(goal: &Goal) -> String {
    goal.progress_percent().round().to_string()
}

fn complete_marker(goal: &Goal, marker: &'static str) -> &'static str {
    if goal.is_complete() {
        marker
    } else {
        ""
    }
}

fn bullet_list<'a>(
    header: String,
    goals: impl IntoIterator<Item = &'a Goal>,
    with_priority: bool,
) -> String {
    let mut out = header;
    for goal in goals {
        let _ = write!(out, "\n- {}", goal.name);
        if with_priority {
            let _ = write!(out, " [{}]", goal.priority.as_str().to_uppercase());
        }
        let _ = write!(
            out,
            ": {} / {} [{}%]{}",
            format_currency(goal.current),
            format_currency(goal.target),
            whole_percent(goal),
            complete_marker(goal, " - COMPLETE"),
        );
    }
    out
}

/// Answers chat input: an assistant command when one matches, the chat
/// relay otherwise.
pub struct Assistant {
    relay: Arc<dyn ChatRelayTrait>,
}

impl Assistant {
    pub fn new(relay: Arc<dyn ChatRelayTrait>) -> Self {
        Self { relay }
    }

    pub async fn respond(
        &self,
        ledger: &GoalLedger,
        criteria: &SortCriteria,
        message: &str,
    ) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::invalid_input("No message received."));
        }
        if let Some(command) = AssistantCommand::parse(message) {
            debug!("Answering assistant command {:?} locally", command);
            return Ok(command.render(ledger, criteria));
        }
        let reply = self
            .relay
            .relay(ChatRequest {
                message: message.to_string(),
                user_name: Some(ledger.owner_id().to_string()),
            })
            .await?;
        Ok(reply.text)
    }
}
