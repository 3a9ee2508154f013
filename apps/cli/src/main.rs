//! savetrack-cli - interactive savings goal tracker
//!
//! Goals are kept in a local JSON file shared by every user profile.
//!
//! ```bash
//! savetrack-cli --data-file ~/goals.json --user alice
//! (ALICE) > add "New Laptop" 120000 high
//! (ALICE) > fund "New Laptop" 5000
//! (ALICE) > ls
//! ```

mod commands;
mod render;
mod session;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use savetrack_ai::{ChatConfig, GeminiRelay};
use savetrack_storage_file::FileGoalStore;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::session::{Reply, Session};

#[derive(Parser)]
#[command(name = "savetrack-cli", version, about = "Savings goal tracker (terminal edition)")]
struct Cli {
    /// JSON file holding every user's goals
    #[arg(
        long,
        env = "ST_DATA_FILE",
        default_value = "savings_tracker_cli_data.json"
    )]
    data_file: PathBuf,

    /// Switch to this user on start instead of the last active one
    #[arg(long)]
    user: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

async fn run_repl(
    session: &mut Session,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    loop {
        prompt(&session.prompt())?;
        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("ERROR: {e}");
                continue;
            }
        };

        match session.execute(command).await {
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Exit(text)) => {
                println!("{text}");
                return Ok(());
            }
            Ok(Reply::ConfirmDelete { prompt: question, goal_id }) => {
                prompt(&question)?;
                let answer = lines.next_line().await?.unwrap_or_default();
                let answer = answer.trim();
                if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
                    match session.confirm_delete(&goal_id).await {
                        Ok(text) => println!("{text}"),
                        Err(e) => println!("ERROR: {e}"),
                    }
                } else {
                    println!("Deletion cancelled.");
                }
            }
            Err(e) => {
                tracing::debug!("Command failed: {:?}", e);
                println!("ERROR: {e}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let store = Arc::new(FileGoalStore::new(cli.data_file.clone()));
    let relay = Arc::new(GeminiRelay::new(ChatConfig::from_env())?);
    let mut session = Session::open(store, relay).with_context(|| {
        format!(
            "Could not load {}; fix or move the file and try again",
            cli.data_file.display()
        )
    })?;

    println!("SAVINGS GOAL TRACKER - terminal edition. Type 'help' for commands.");
    if let Some(user) = cli.user {
        if let Reply::Text(text) = session.execute(Command::Switch { user }).await? {
            println!("{text}");
        }
    }
    match session.owner() {
        Some(owner) => println!("Active user: {owner}"),
        None => println!("No user loaded. Use 'switch <username>' to begin."),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    run_repl(&mut session, &mut lines).await
}
