//! Savetrack AI - chat relay and assistant commands.
//!
//! - `relay`: forwards a free-form message to a hosted LLM (Gemini REST API)
//!   under a savings-only system instruction and maps every failure to a
//!   typed [`ChatError`]
//! - `commands`: a small set of plain-text commands (`list goals`,
//!   `summary`, `closest goal`, ...) answered locally from a `GoalLedger`
//! - [`Assistant`]: tries a command first and falls back to the relay
//!
//! The relay never sees ledger data; only the assistant commands read it.
//!
//! ```ignore
//! let relay = Arc::new(GeminiRelay::new(ChatConfig::from_env())?);
//! let assistant = Assistant::new(relay);
//! let text = assistant.respond(&ledger, &criteria, "closest goal").await?;
//! ```

pub mod commands;
pub mod error;
pub mod relay;

pub use commands::{Assistant, AssistantCommand};
pub use error::ChatError;
pub use relay::{ChatConfig, ChatRelayTrait, ChatReply, ChatRequest, GeminiRelay};
