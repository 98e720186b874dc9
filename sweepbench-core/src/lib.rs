#![warn(missing_docs)]
//! SweepBench Core - Suite Model and Timed Execution
//!
//! This crate holds everything that runs a suite, minus presentation:
//! - `SuiteBuilder` for explicit registration with eager validation
//! - Parameter-space expansion by pairwise cross products
//! - `Procedure` abstraction over blocking and suspending bodies
//! - The wall-clock bounded timed loop

mod error;
mod invoke;
mod param;
mod suite;
mod timed_loop;
mod value;

pub use error::{ConfigError, HookRole, RunError, Stage};
pub use invoke::{Completion, Procedure};
pub use param::{Assignment, Combination, ParamDecl, expand};
pub use suite::{Case, CaseId, CaseSpec, Hook, Suite, SuiteBuilder};
pub use timed_loop::{RunBudget, run_timed_loop};
pub use value::{Args, FromLiteral, Literal, Signature, Value, ValueKind};
