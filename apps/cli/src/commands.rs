//! Parsing of REPL input lines into typed commands.
//!
//! Verbs are case-insensitive. Arguments are whitespace separated; double
//! quotes group words, so `add "New Laptop" 1200 high` and
//! `update laptop name="Gaming Laptop"` both work.

use rust_decimal::Decimal;
use savetrack_core::goals::{
    parse_amount, GoalError, GoalUpdate, Priority, SortBy, SortCriteria, SortDirection,
};
use thiserror::Error;

pub const HELP: &str = "Available commands:
  list / ls                        Show goals for the current user (current sort order)
  add \"<name>\" <target> [prio]     Add a goal; priority is high, medium or low (default medium)
  fund <id|name> <amount>          Add funds to a goal
  update <id|name> key=value ...   Change name=, target= or priority= of a goal
  delete <id|name>                 Delete a goal (asks for confirmation)
  switch <user>                    Switch to, or create, another user profile
  user                             Show the current user
  summary                          Totals for the current user
  sort <criteria>_<direction>      e.g. sort priority_desc, sort name_asc
                                   criteria: date, name, target, remaining, progress, priority
  export                           Print the current user's goals as JSON
  ask <question>                   Ask the savings assistant
  help / ?                         Show this help
  exit / quit / q                  Leave the tracker
Names with spaces must be quoted.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    List,
    Add {
        name: String,
        target: Decimal,
        priority: Priority,
    },
    Fund {
        goal: String,
        amount: Decimal,
    },
    Update {
        goal: String,
        update: GoalUpdate,
    },
    Delete {
        goal: String,
    },
    Switch {
        user: String,
    },
    User,
    Summary,
    /// `None` shows the active sort order.
    Sort(Option<SortCriteria>),
    Export,
    Ask(String),
    Exit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unclosed quote in command")]
    UnclosedQuote,

    #[error("Unknown command '{0}'. Type 'help' for options.")]
    Unknown(String),

    #[error("Invalid sort option '{0}'. Use <criteria>_<direction>, e.g. name_asc")]
    InvalidSort(String),

    #[error(transparent)]
    Invalid(#[from] GoalError),
}

const ADD_USAGE: &str = "add \"<goal name>\" <target> [high|medium|low]";
const FUND_USAGE: &str = "fund <goal id or name> <amount>";
const UPDATE_USAGE: &str = "update <goal id or name> [name=...] [target=...] [priority=...]";
const DELETE_USAGE: &str = "delete <goal id or name>";
const SWITCH_USAGE: &str = "switch <username>";
const ASK_USAGE: &str = "ask <question>";

/// Splits a line into words, honouring double quotes anywhere in a word.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(CommandError::UnclosedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let tokens = tokenize(line)?;
        let Some((verb, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match verb.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "list" | "ls" => Command::List,
            "add" => parse_add(args)?,
            "fund" => match args {
                [goal, amount] => Command::Fund {
                    goal: goal.clone(),
                    amount: parse_amount("amount", amount)?,
                },
                _ => return Err(CommandError::Usage(FUND_USAGE)),
            },
            "update" => parse_update(args)?,
            "delete" => match args {
                [goal] => Command::Delete { goal: goal.clone() },
                _ => return Err(CommandError::Usage(DELETE_USAGE)),
            },
            "switch" => {
                let user = args.join(" ");
                if user.trim().is_empty() {
                    return Err(CommandError::Usage(SWITCH_USAGE));
                }
                Command::Switch { user }
            }
            "user" => Command::User,
            "summary" => Command::Summary,
            "sort" => match args {
                [] => Command::Sort(None),
                [raw] => Command::Sort(Some(parse_sort(raw)?)),
                _ => return Err(CommandError::InvalidSort(args.join(" "))),
            },
            "export" => Command::Export,
            "ask" => {
                let question = args.join(" ");
                if question.trim().is_empty() {
                    return Err(CommandError::Usage(ASK_USAGE));
                }
                Command::Ask(question)
            }
            "exit" | "quit" | "q" => Command::Exit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_add(args: &[String]) -> Result<Command, CommandError> {
    let (name, target, priority) = match args {
        [name, target] => (name, target, None),
        [name, target, priority] => (name, target, Some(priority)),
        _ => return Err(CommandError::Usage(ADD_USAGE)),
    };
    Ok(Command::Add {
        name: name.clone(),
        target: parse_amount("target", target)?,
        priority: match priority {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        },
    })
}

fn parse_update(args: &[String]) -> Result<Command, CommandError> {
    let Some((goal, fields)) = args.split_first() else {
        return Err(CommandError::Usage(UPDATE_USAGE));
    };
    if fields.is_empty() {
        return Err(CommandError::Usage(UPDATE_USAGE));
    }

    let mut update = GoalUpdate::default();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(CommandError::Usage(UPDATE_USAGE));
        };
        match key.trim().to_lowercase().as_str() {
            "name" => update.name = Some(value.to_string()),
            "target" => update.target = Some(parse_amount("target", value)?),
            "priority" => update.priority = Some(value.parse()?),
            _ => return Err(CommandError::Usage(UPDATE_USAGE)),
        }
    }
    Ok(Command::Update {
        goal: goal.clone(),
        update,
    })
}

/// Strict `<criteria>_<direction>` parsing; unlike stored preferences, typed
/// input is rejected instead of falling back to the default order.
pub fn parse_sort(raw: &str) -> Result<SortCriteria, CommandError> {
    let lower = raw.trim().to_lowercase();
    let invalid = || CommandError::InvalidSort(raw.to_string());
    let (key, dir) = lower.split_once('_').ok_or_else(invalid)?;

    let sort_by = SortBy::parse_or_default(key);
    if sort_by.as_str() != key {
        return Err(invalid());
    }
    let direction = match dir {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        _ => return Err(invalid()),
    };
    Ok(SortCriteria::new(sort_by, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tokenize_groups_quoted_words() {
        assert_eq!(
            tokenize(r#"add "New Laptop" 1200 high"#).unwrap(),
            vec!["add", "New Laptop", "1200", "high"]
        );
        assert_eq!(
            tokenize(r#"update laptop name="Gaming Laptop""#).unwrap(),
            vec!["update", "laptop", "name=Gaming Laptop"]
        );
        assert_eq!(tokenize("   ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"switch """#).unwrap(), vec!["switch", ""]);
    }

    #[test]
    fn tokenize_rejects_unclosed_quote() {
        assert_eq!(
            tokenize(r#"add "New Laptop 1200"#),
            Err(CommandError::UnclosedQuote)
        );
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("  \t ").unwrap(), None);
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(Command::parse("LS").unwrap(), Some(Command::List));
        assert_eq!(Command::parse("Help").unwrap(), Some(Command::Help));
        assert_eq!(Command::parse("Q").unwrap(), Some(Command::Exit));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Exit));
    }

    #[test]
    fn add_parses_amount_and_priority() {
        assert_eq!(
            Command::parse(r#"add "Vacation Fund" ₹50,000 HIGH"#).unwrap(),
            Some(Command::Add {
                name: "Vacation Fund".to_string(),
                target: dec!(50000),
                priority: Priority::High,
            })
        );
        assert_eq!(
            Command::parse("add CarFund 500000").unwrap(),
            Some(Command::Add {
                name: "CarFund".to_string(),
                target: dec!(500000),
                priority: Priority::Medium,
            })
        );
    }

    #[test]
    fn add_reports_bad_input() {
        assert_eq!(
            Command::parse("add Laptop").unwrap_err(),
            CommandError::Usage(ADD_USAGE)
        );
        assert!(matches!(
            Command::parse("add Laptop lots").unwrap_err(),
            CommandError::Invalid(GoalError::InvalidInput { field: "target", .. })
        ));
        assert!(matches!(
            Command::parse("add Laptop 100 urgent").unwrap_err(),
            CommandError::Invalid(GoalError::InvalidInput { field: "priority", .. })
        ));
    }

    #[test]
    fn fund_takes_identifier_and_amount() {
        assert_eq!(
            Command::parse(r#"fund "Vacation Fund" 500.25"#).unwrap(),
            Some(Command::Fund {
                goal: "Vacation Fund".to_string(),
                amount: dec!(500.25),
            })
        );
        assert_eq!(
            Command::parse("fund Vacation Fund 500").unwrap_err(),
            CommandError::Usage(FUND_USAGE)
        );
    }

    #[test]
    fn update_collects_fields() {
        let parsed = Command::parse(r#"update abc123def name="Big Trip" target=900 priority=low"#)
            .unwrap()
            .unwrap();
        let Command::Update { goal, update } = parsed else {
            panic!("expected update, got {parsed:?}");
        };
        assert_eq!(goal, "abc123def");
        assert_eq!(update.name.as_deref(), Some("Big Trip"));
        assert_eq!(update.target, Some(dec!(900)));
        assert_eq!(update.priority, Some(Priority::Low));

        assert_eq!(
            Command::parse("update abc123def").unwrap_err(),
            CommandError::Usage(UPDATE_USAGE)
        );
        assert_eq!(
            Command::parse("update abc123def colour=red").unwrap_err(),
            CommandError::Usage(UPDATE_USAGE)
        );
    }

    #[test]
    fn switch_and_ask_keep_the_rest_of_the_line() {
        assert_eq!(
            Command::parse("switch Jane Doe").unwrap(),
            Some(Command::Switch {
                user: "Jane Doe".to_string()
            })
        );
        assert_eq!(
            Command::parse("ask how much should I save").unwrap(),
            Some(Command::Ask("how much should I save".to_string()))
        );
        assert_eq!(
            Command::parse("switch").unwrap_err(),
            CommandError::Usage(SWITCH_USAGE)
        );
        assert_eq!(
            Command::parse("ask").unwrap_err(),
            CommandError::Usage(ASK_USAGE)
        );
    }

    #[test]
    fn sort_is_strict() {
        assert_eq!(
            Command::parse("sort Priority_DESC").unwrap(),
            Some(Command::Sort(Some(SortCriteria::new(
                SortBy::Priority,
                SortDirection::Desc
            ))))
        );
        assert_eq!(Command::parse("sort").unwrap(), Some(Command::Sort(None)));
        for bad in ["sort colour_asc", "sort name", "sort name_up", "sort name_asc extra"] {
            assert!(
                matches!(Command::parse(bad), Err(CommandError::InvalidSort(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_verb_is_reported() {
        assert_eq!(
            Command::parse("frobnicate now").unwrap_err(),
            CommandError::Unknown("frobnicate".to_string())
        );
    }
}
