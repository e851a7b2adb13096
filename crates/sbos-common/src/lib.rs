//! Shared domain types for the SBOS analysis engine.
//!
//! Everything here is plain data: the business intake, the five analysis
//! task kinds, and the typed JSON contracts each task's output must satisfy.

pub mod contracts;
pub mod intake;
pub mod task;

pub use contracts::{ContractViolation, TaskRecord};
pub use intake::{IntakeError, IntakeRecord};
pub use task::{TaskKind, UnknownTaskKind};
