//! Error Types
//!
//! Two families: [`ConfigError`] is raised while a suite is being built and
//! always surfaces before anything executes; [`RunError`] is raised while the
//! suite runs and terminates the run immediately.

use crate::value::Signature;
use std::fmt;
use thiserror::Error;

/// Invalid suite definition, detected eagerly by `SuiteBuilder::build`
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A parameter slot was declared more than once
    #[error("parameter `{0}` is declared more than once")]
    DuplicateParameter(String),

    /// A parameter was declared without any values
    #[error("parameter `{0}` must declare at least one value")]
    EmptyDomain(String),

    /// Two cases share a name
    #[error("case `{0}` is declared more than once")]
    DuplicateCase(String),

    /// Two hooks share a name
    #[error("hook `{0}` is declared more than once")]
    DuplicateHook(String),

    /// An explicitly declared argument tuple has no values
    #[error("case `{0}` declares an empty argument tuple")]
    EmptyArguments(String),

    /// An argument tuple does not fit the case signature
    #[error("case `{case}` expects {expected} but argument tuple #{index} is {found}")]
    ArgumentMismatch {
        /// Case name
        case: String,
        /// Position of the tuple in the case's declaration order
        index: usize,
        /// Case signature
        expected: Signature,
        /// Signature of the offending tuple
        found: Signature,
    },

    /// A case takes parameters but has no argument tuple to call it with
    #[error("case `{case}` takes {expected} but declares no argument tuples")]
    MissingArguments {
        /// Case name
        case: String,
        /// Case signature
        expected: Signature,
    },

    /// A case binds a hook name that was never registered
    #[error("case `{case}` binds {role} hook `{hook}`, which is not registered")]
    UnresolvedHook {
        /// Case name
        case: String,
        /// Setup or cleanup
        role: HookRole,
        /// Hook name as written in the binding
        hook: String,
    },

    /// A bound hook's parameter list differs from the case's
    #[error("{role} hook `{hook}` takes {hook_signature} but case `{case}` takes {case_signature}")]
    SignatureMismatch {
        /// Case name
        case: String,
        /// Setup or cleanup
        role: HookRole,
        /// Hook name
        hook: String,
        /// Hook signature
        hook_signature: Signature,
        /// Case signature
        case_signature: Signature,
    },

    /// The run-time budget must be non-zero
    #[error("case run time must be positive")]
    ZeroBudget,
}

/// Role a hook is bound in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookRole {
    /// Runs before a case's timed loop
    Setup,
    /// Runs after a case's timed loop
    Cleanup,
}

impl fmt::Display for HookRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookRole::Setup => f.write_str("setup"),
            HookRole::Cleanup => f.write_str("cleanup"),
        }
    }
}

/// Lifecycle stage a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A global setup hook
    GlobalSetup,
    /// A case setup hook
    CaseSetup,
    /// The case body inside its timed loop
    Case,
    /// A case cleanup hook
    CaseCleanup,
    /// A global cleanup hook
    GlobalCleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::GlobalSetup => "global setup",
            Stage::CaseSetup => "case setup",
            Stage::Case => "case",
            Stage::CaseCleanup => "case cleanup",
            Stage::GlobalCleanup => "global cleanup",
        };
        f.write_str(name)
    }
}

/// Failure while running a suite
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// A case body or hook returned an error
    #[error("{stage} `{name}` failed in {label}: {source}")]
    Execution {
        /// Where the failure happened
        stage: Stage,
        /// Procedure name
        name: String,
        /// Combination label, `-` outside of a combination
        label: String,
        /// Error returned by the procedure
        #[source]
        source: anyhow::Error,
    },

    /// The single-threaded runtime driving the run could not start
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl RunError {
    /// Stage of an execution failure
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunError::Execution { stage, .. } => Some(*stage),
            RunError::Runtime(_) => None,
        }
    }
}
