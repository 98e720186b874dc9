//! Suite Registration
//!
//! A [`Suite`] is the normalized view of a benchmark definition: parameter
//! declarations with typed setters, cases with their argument tuples, global
//! hooks, and case hooks resolved by name. It is produced by
//! [`SuiteBuilder::build`], which performs every structural check up front so
//! that a malformed binding can never surface in the middle of a run.
//!
//! # Example
//!
//! ```ignore
//! let suite = Suite::builder(Store::default())
//!     .param("Size", [10, 100], |s: &mut Store, v: u32| s.size = v)
//!     .global_setup("connect", |s| s.connect())
//!     .hook("truncate", Signature::of([ValueKind::Int]), |s, _| s.truncate())
//!     .case(
//!         CaseSpec::new("insert").arg(1024).setup("truncate"),
//!         |s, args| s.insert(args.get::<usize>(0)?),
//!     )
//!     .build()?;
//! ```

use crate::error::{ConfigError, HookRole, RunError, Stage};
use crate::invoke::Procedure;
use crate::param::{Combination, ParamDecl, expand};
use crate::timed_loop::{RunBudget, run_timed_loop};
use crate::value::{Args, Literal, Signature, ValueKind};
use futures::future::LocalBoxFuture;
use std::collections::HashSet;

/// Label used in errors raised outside of any combination
const NO_COMBINATION: &str = "-";

type Setter<T> = Box<dyn Fn(&mut T, usize)>;

/// A named procedure: global hook, case hook, or case body
pub struct Hook<T> {
    name: String,
    signature: Signature,
    procedure: Procedure<T>,
}

impl<T> Hook<T> {
    /// Hook name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter list the hook is called with
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    async fn call(&mut self, target: &mut T, args: &Args, stage: Stage, label: &str) -> Result<(), RunError> {
        tracing::debug!(hook = %self.name, %stage, %label, "invoking hook");
        self.procedure
            .invoke(target, args)
            .await
            .map_err(|source| RunError::Execution {
                stage,
                name: self.name.clone(),
                label: label.to_string(),
                source,
            })
    }
}

/// Declarative part of a case, before its body is attached
#[derive(Debug, Clone, Default)]
pub struct CaseSpec {
    name: String,
    description: Option<String>,
    signature: Option<Signature>,
    args: Vec<Args>,
    setup: Vec<String>,
    cleanup: Vec<String>,
}

impl CaseSpec {
    /// Start a case declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Free-text description shown when listing
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Declare the parameter list explicitly.
    ///
    /// Without this, the first argument tuple's kinds are used, or the empty
    /// list when there are no tuples.
    pub fn takes(mut self, kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        self.signature = Some(Signature::of(kinds));
        self
    }

    /// Add an argument tuple; each tuple is run as its own timed loop
    pub fn args(mut self, args: Args) -> Self {
        self.args.push(args);
        self
    }

    /// Add a single-value argument tuple
    pub fn arg<L: Literal>(self, value: L) -> Self {
        self.args(Args::new([value.into_value()]))
    }

    /// Bind a setup hook by name
    pub fn setup(mut self, hook: impl Into<String>) -> Self {
        self.setup.push(hook.into());
        self
    }

    /// Bind a cleanup hook by name
    pub fn cleanup(mut self, hook: impl Into<String>) -> Self {
        self.cleanup.push(hook.into());
        self
    }

    fn resolved_signature(&self) -> Signature {
        self.signature
            .clone()
            .or_else(|| self.args.first().map(Args::signature))
            .unwrap_or_default()
    }
}

/// A validated benchmark case
pub struct Case<T> {
    name: String,
    description: Option<String>,
    signature: Signature,
    args: Vec<Args>,
    setup: Vec<usize>,
    cleanup: Vec<usize>,
    body: Procedure<T>,
}

impl<T> Case<T> {
    /// Case name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameter list
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Argument tuples as declared (possibly none)
    pub fn declared_args(&self) -> &[Args] {
        &self.args
    }

    /// Tuples the case is run with: the declared ones, or one empty tuple
    pub fn invocations(&self) -> Vec<Args> {
        if self.args.is_empty() {
            vec![Args::empty()]
        } else {
            self.args.clone()
        }
    }
}

/// Identifies a case within its suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaseId(usize);

impl CaseId {
    /// Position in discovery order
    pub fn index(self) -> usize {
        self.0
    }
}

/// A validated suite, owning the single target instance
pub struct Suite<T> {
    target: T,
    decls: Vec<ParamDecl>,
    setters: Vec<Setter<T>>,
    global_setup: Vec<Hook<T>>,
    global_cleanup: Vec<Hook<T>>,
    hooks: Vec<Hook<T>>,
    cases: Vec<Case<T>>,
}

impl<T: 'static> Suite<T> {
    /// Start registering a suite around `target`
    pub fn builder(target: T) -> SuiteBuilder<T> {
        SuiteBuilder::new(target)
    }
}

impl<T> Suite<T> {
    /// Parameter declarations in declaration order
    pub fn decls(&self) -> &[ParamDecl] {
        &self.decls
    }

    /// Every combination of parameter values, in run order
    pub fn combinations(&self) -> Vec<Combination> {
        expand(&self.decls)
    }

    /// Render a combination label against this suite's declarations
    pub fn label(&self, combination: &Combination) -> String {
        combination.label(&self.decls)
    }

    /// Cases in discovery order
    pub fn cases(&self) -> &[Case<T>] {
        &self.cases
    }

    /// Ids of all cases in discovery order
    pub fn case_ids(&self) -> impl Iterator<Item = CaseId> + '_ {
        (0..self.cases.len()).map(CaseId)
    }

    /// Look up a case
    pub fn case(&self, id: CaseId) -> &Case<T> {
        &self.cases[id.0]
    }

    /// Case hooks available for binding
    pub fn hooks(&self) -> &[Hook<T>] {
        &self.hooks
    }

    /// Names of the hooks bound to a case in `role`, in binding order
    pub fn bound_hooks(&self, id: CaseId, role: HookRole) -> Vec<&str> {
        let case = &self.cases[id.0];
        let bound = match role {
            HookRole::Setup => &case.setup,
            HookRole::Cleanup => &case.cleanup,
        };
        bound.iter().map(|&h| self.hooks[h].name()).collect()
    }

    /// Global setup hooks in declaration order
    pub fn global_setup_hooks(&self) -> &[Hook<T>] {
        &self.global_setup
    }

    /// Global cleanup hooks in declaration order
    pub fn global_cleanup_hooks(&self) -> &[Hook<T>] {
        &self.global_cleanup
    }

    /// The target instance
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Consume the suite, returning the target instance
    pub fn into_target(self) -> T {
        self.target
    }

    /// Write every value of `combination` into the target's slots
    pub fn assign(&mut self, combination: &Combination) {
        for assignment in combination.assignments() {
            if let Some(setter) = self.setters.get(assignment.param) {
                setter(&mut self.target, assignment.value);
            }
        }
    }

    /// Run every global setup hook once, in declaration order
    pub async fn run_global_setup(&mut self) -> Result<(), RunError> {
        let args = Args::empty();
        for hook in &mut self.global_setup {
            hook.call(&mut self.target, &args, Stage::GlobalSetup, NO_COMBINATION)
                .await?;
        }
        Ok(())
    }

    /// Run every global cleanup hook once, in declaration order
    pub async fn run_global_cleanup(&mut self) -> Result<(), RunError> {
        let args = Args::empty();
        for hook in &mut self.global_cleanup {
            hook.call(&mut self.target, &args, Stage::GlobalCleanup, NO_COMBINATION)
                .await?;
        }
        Ok(())
    }

    /// Run the hooks bound to a case in `role`, with the case's tuple
    pub async fn run_case_hooks(
        &mut self,
        id: CaseId,
        role: HookRole,
        args: &Args,
        label: &str,
    ) -> Result<(), RunError> {
        let case = &self.cases[id.0];
        let (bound, stage) = match role {
            HookRole::Setup => (&case.setup, Stage::CaseSetup),
            HookRole::Cleanup => (&case.cleanup, Stage::CaseCleanup),
        };
        for &hook in bound {
            self.hooks[hook]
                .call(&mut self.target, args, stage, label)
                .await?;
        }
        Ok(())
    }

    /// Run a case's timed loop with one argument tuple
    pub async fn run_case_loop(
        &mut self,
        id: CaseId,
        args: &Args,
        budget: RunBudget,
        label: &str,
    ) -> Result<(), RunError> {
        let case = &mut self.cases[id.0];
        run_timed_loop(&mut case.body, &mut self.target, args, budget)
            .await
            .map_err(|source| RunError::Execution {
                stage: Stage::Case,
                name: case.name.clone(),
                label: label.to_string(),
                source,
            })
    }
}

/// Explicit registration of parameters, hooks and cases
pub struct SuiteBuilder<T> {
    target: T,
    decls: Vec<ParamDecl>,
    setters: Vec<Setter<T>>,
    global_setup: Vec<Hook<T>>,
    global_cleanup: Vec<Hook<T>>,
    hooks: Vec<Hook<T>>,
    cases: Vec<(CaseSpec, Procedure<T>)>,
}

impl<T: 'static> SuiteBuilder<T> {
    /// Start registering around `target`
    pub fn new(target: T) -> Self {
        Self {
            target,
            decls: Vec::new(),
            setters: Vec::new(),
            global_setup: Vec::new(),
            global_cleanup: Vec::new(),
            hooks: Vec::new(),
            cases: Vec::new(),
        }
    }

    /// Declare a parameter slot, its domain, and how to write a value into the target
    pub fn param<L, F>(mut self, name: impl Into<String>, values: impl IntoIterator<Item = L>, setter: F) -> Self
    where
        L: Literal,
        F: Fn(&mut T, L) + 'static,
    {
        let domain: Vec<L> = values.into_iter().collect();
        self.decls.push(ParamDecl::new(
            name,
            domain.iter().cloned().map(Literal::into_value),
        ));
        self.setters.push(Box::new(move |target: &mut T, index: usize| {
            if let Some(value) = domain.get(index) {
                setter(target, value.clone());
            }
        }));
        self
    }

    /// Register a blocking global setup hook
    pub fn global_setup<F>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(&mut T) -> anyhow::Result<()> + 'static,
    {
        let procedure = Procedure::blocking(move |target, _args| f(target));
        self.global_setup.push(global_hook(name, procedure));
        self
    }

    /// Register a suspending global setup hook
    pub fn global_setup_async<F>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: for<'a> FnMut(&'a mut T) -> LocalBoxFuture<'a, anyhow::Result<()>> + 'static,
    {
        let procedure = Procedure::suspending(move |target, _args| f(target));
        self.global_setup.push(global_hook(name, procedure));
        self
    }

    /// Register a blocking global cleanup hook
    pub fn global_cleanup<F>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(&mut T) -> anyhow::Result<()> + 'static,
    {
        let procedure = Procedure::blocking(move |target, _args| f(target));
        self.global_cleanup.push(global_hook(name, procedure));
        self
    }

    /// Register a suspending global cleanup hook
    pub fn global_cleanup_async<F>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: for<'a> FnMut(&'a mut T) -> LocalBoxFuture<'a, anyhow::Result<()>> + 'static,
    {
        let procedure = Procedure::suspending(move |target, _args| f(target));
        self.global_cleanup.push(global_hook(name, procedure));
        self
    }

    /// Register a blocking case hook that cases can bind by name
    pub fn hook<F>(self, name: impl Into<String>, signature: Signature, f: F) -> Self
    where
        F: FnMut(&mut T, &Args) -> anyhow::Result<()> + 'static,
    {
        self.with_hook(name, signature, Procedure::blocking(f))
    }

    /// Register a suspending case hook that cases can bind by name
    pub fn hook_async<F>(self, name: impl Into<String>, signature: Signature, f: F) -> Self
    where
        F: for<'a> FnMut(&'a mut T, &'a Args) -> LocalBoxFuture<'a, anyhow::Result<()>> + 'static,
    {
        self.with_hook(name, signature, Procedure::suspending(f))
    }

    /// Register a case with a blocking body
    pub fn case<F>(self, spec: CaseSpec, body: F) -> Self
    where
        F: FnMut(&mut T, &Args) -> anyhow::Result<()> + 'static,
    {
        self.with_case(spec, Procedure::blocking(body))
    }

    /// Register a case with a suspending body
    pub fn case_async<F>(self, spec: CaseSpec, body: F) -> Self
    where
        F: for<'a> FnMut(&'a mut T, &'a Args) -> LocalBoxFuture<'a, anyhow::Result<()>> + 'static,
    {
        self.with_case(spec, Procedure::suspending(body))
    }

    /// Register a case hook with an already built procedure
    pub fn with_hook(mut self, name: impl Into<String>, signature: Signature, procedure: Procedure<T>) -> Self {
        self.hooks.push(Hook {
            name: name.into(),
            signature,
            procedure,
        });
        self
    }

    /// Register a case with an already built procedure
    pub fn with_case(mut self, spec: CaseSpec, body: Procedure<T>) -> Self {
        self.cases.push((spec, body));
        self
    }

    /// Validate every declaration and binding, producing the runnable suite
    pub fn build(self) -> Result<Suite<T>, ConfigError> {
        let mut seen = HashSet::new();
        for decl in &self.decls {
            if !seen.insert(decl.name()) {
                return Err(ConfigError::DuplicateParameter(decl.name().to_string()));
            }
            if decl.values().is_empty() {
                return Err(ConfigError::EmptyDomain(decl.name().to_string()));
            }
        }

        let mut seen = HashSet::new();
        for hook in &self.hooks {
            if !seen.insert(hook.name()) {
                return Err(ConfigError::DuplicateHook(hook.name.clone()));
            }
        }

        let mut seen = HashSet::new();
        for (spec, _) in &self.cases {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateCase(spec.name.clone()));
            }
        }

        let mut cases = Vec::with_capacity(self.cases.len());
        for (spec, body) in self.cases {
            let signature = spec.resolved_signature();
            check_args(&spec, &signature)?;
            let setup = resolve_hooks(&self.hooks, &spec, &signature, HookRole::Setup)?;
            let cleanup = resolve_hooks(&self.hooks, &spec, &signature, HookRole::Cleanup)?;
            cases.push(Case {
                name: spec.name,
                description: spec.description,
                signature,
                args: spec.args,
                setup,
                cleanup,
                body,
            });
        }

        let suite = Suite {
            target: self.target,
            decls: self.decls,
            setters: self.setters,
            global_setup: self.global_setup,
            global_cleanup: self.global_cleanup,
            hooks: self.hooks,
            cases,
        };
        tracing::debug!(
            params = suite.decls.len(),
            cases = suite.cases.len(),
            hooks = suite.hooks.len(),
            "suite validated"
        );
        Ok(suite)
    }
}

fn global_hook<T>(name: impl Into<String>, procedure: Procedure<T>) -> Hook<T> {
    Hook {
        name: name.into(),
        signature: Signature::empty(),
        procedure,
    }
}

fn check_args(spec: &CaseSpec, signature: &Signature) -> Result<(), ConfigError> {
    if spec.args.is_empty() && signature.arity() > 0 {
        return Err(ConfigError::MissingArguments {
            case: spec.name.clone(),
            expected: signature.clone(),
        });
    }
    for (index, args) in spec.args.iter().enumerate() {
        if args.is_empty() {
            return Err(ConfigError::EmptyArguments(spec.name.clone()));
        }
        if !signature.accepts(args) {
            return Err(ConfigError::ArgumentMismatch {
                case: spec.name.clone(),
                index,
                expected: signature.clone(),
                found: args.signature(),
            });
        }
    }
    Ok(())
}

fn resolve_hooks<T>(
    hooks: &[Hook<T>],
    spec: &CaseSpec,
    signature: &Signature,
    role: HookRole,
) -> Result<Vec<usize>, ConfigError> {
    let names = match role {
        HookRole::Setup => &spec.setup,
        HookRole::Cleanup => &spec.cleanup,
    };
    names
        .iter()
        .map(|name| {
            let index = hooks
                .iter()
                .position(|h| h.name == *name)
                .ok_or_else(|| ConfigError::UnresolvedHook {
                    case: spec.name.clone(),
                    role,
                    hook: name.clone(),
                })?;
            let hook_signature = &hooks[index].signature;
            if hook_signature != signature {
                return Err(ConfigError::SignatureMismatch {
                    case: spec.name.clone(),
                    role,
                    hook: name.clone(),
                    hook_signature: hook_signature.clone(),
                    case_signature: signature.clone(),
                });
            }
            Ok(index)
        })
        .collect()
}
