//! Invocation Strategy
//!
//! Every case body and hook is stored as a [`Procedure`]: either a blocking
//! call that occupies the caller until it returns, or a suspending call whose
//! future the caller awaits. Both are driven through the same async
//! [`Procedure::invoke`], so the orchestrator and timed loop have a single
//! code path.

use crate::value::Args;
use futures::future::LocalBoxFuture;
use std::fmt;

type BlockingFn<T> = Box<dyn FnMut(&mut T, &Args) -> anyhow::Result<()>>;
type SuspendingFn<T> =
    Box<dyn for<'a> FnMut(&'a mut T, &'a Args) -> LocalBoxFuture<'a, anyhow::Result<()>>>;

/// How a procedure completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Returns when done
    Blocking,
    /// Returns a future that signals completion
    Suspending,
}

/// A callable case body or hook bound to a target type
pub enum Procedure<T> {
    /// Plain call
    Blocking(BlockingFn<T>),
    /// Awaited call
    Suspending(SuspendingFn<T>),
}

impl<T> Procedure<T> {
    /// Wrap a blocking closure
    pub fn blocking<F>(f: F) -> Self
    where
        F: FnMut(&mut T, &Args) -> anyhow::Result<()> + 'static,
    {
        Procedure::Blocking(Box::new(f))
    }

    /// Wrap a closure returning a boxed future
    pub fn suspending<F>(f: F) -> Self
    where
        F: for<'a> FnMut(&'a mut T, &'a Args) -> LocalBoxFuture<'a, anyhow::Result<()>> + 'static,
    {
        Procedure::Suspending(Box::new(f))
    }

    /// Completion contract of this procedure
    pub fn completion(&self) -> Completion {
        match self {
            Procedure::Blocking(_) => Completion::Blocking,
            Procedure::Suspending(_) => Completion::Suspending,
        }
    }

    /// Run once to completion.
    ///
    /// A blocking procedure never yields; a suspending one yields only inside
    /// its own future.
    pub async fn invoke(&mut self, target: &mut T, args: &Args) -> anyhow::Result<()> {
        match self {
            Procedure::Blocking(f) => f(target, args),
            Procedure::Suspending(f) => f(target, args).await,
        }
    }
}

impl<T> fmt::Debug for Procedure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Procedure").field(&self.completion()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_blocking_invoke() {
        let mut proc = Procedure::blocking(|count: &mut u32, args: &Args| {
            *count += args.len() as u32 + 1;
            Ok(())
        });
        let mut count = 0;
        futures::executor::block_on(proc.invoke(&mut count, &crate::args![1, 2])).unwrap();
        assert_eq!(count, 3);
        assert_eq!(proc.completion(), Completion::Blocking);
    }

    #[test]
    fn test_suspending_invoke() {
        let mut proc = Procedure::suspending(|count: &mut u32, _args| {
            async move {
                *count += 10;
                anyhow::Ok(())
            }
            .boxed_local()
        });
        let mut count = 1;
        futures::executor::block_on(proc.invoke(&mut count, &Args::empty())).unwrap();
        assert_eq!(count, 11);
        assert_eq!(proc.completion(), Completion::Suspending);
    }

    #[test]
    fn test_error_propagates() {
        let mut proc =
            Procedure::blocking(|_: &mut (), _: &Args| Err(anyhow::anyhow!("disk full")));
        let err = futures::executor::block_on(proc.invoke(&mut (), &Args::empty())).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
