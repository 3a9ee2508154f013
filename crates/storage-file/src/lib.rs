//! JSON file storage for Savetrack.
//!
//! All owners share one pretty-printed JSON document. Besides the goal
//! collections it remembers the last active user and the global sort
//! preference of the terminal front-end.

mod store;

pub use store::FileGoalStore;
