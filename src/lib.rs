pub mod analysis;
pub mod chat;
pub mod completion;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod logging;
pub mod prompts;
pub mod runner;
pub mod ui;
pub mod util;

pub use sbos_common::{IntakeRecord, TaskKind, contracts};
