//! Suite Executor
//!
//! Runs a planned suite and narrates it. Listing and running share the same
//! plan, so a dry run shows exactly what a real run would execute.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Suite (validated by SuiteBuilder::build)
//!       │
//!       ▼
//! ┌─────────────┐
//! │   planner   │  Filter cases, size the run
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ orchestrator │  Global hooks, combinations, timed loops
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   listing   │  Dry-run description of the plan
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`orchestrator`] - Lifecycle state machine over a suite
//! - [`listing`] - Human-readable plan listing

mod listing;
mod orchestrator;

pub use listing::format_plan;
pub use orchestrator::Orchestrator;
