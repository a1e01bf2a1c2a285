//! Advice functions and the phases they execute in.

use std::fmt;
use std::sync::Arc;

use crate::aspect::{Joinpoint, Proceed};
use crate::error::DiResult;
use crate::provider::AnyArc;

/// Phase of the four-phase proceeding protocol an advice runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvicePhase {
    /// Runs before the target; a failure here aborts the call and the
    /// target never executes.
    Before,
    /// Wraps the target; receives a `Proceed` continuation.
    Around,
    /// Runs after a successful target return.
    AfterReturning,
    /// Runs after the target raised an error; may suppress it.
    AfterThrowing,
    /// Runs last on both paths, success or failure.
    After,
}

impl fmt::Display for AdvicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvicePhase::Before => "Before",
            AdvicePhase::Around => "Around",
            AdvicePhase::AfterReturning => "AfterReturning",
            AdvicePhase::AfterThrowing => "AfterThrowing",
            AdvicePhase::After => "After",
        };
        f.write_str(name)
    }
}

/// Advice body for the non-wrapping phases.
pub type AdviceFn = Arc<dyn Fn(&mut Joinpoint) -> DiResult<()> + Send + Sync>;

/// Around advice body: receives the joinpoint and a one-shot continuation
/// for the rest of the chain (innermost is the target itself). Not calling
/// `proceed` skips the target.
pub type AroundFn =
    Arc<dyn for<'p> Fn(&mut Joinpoint, Proceed<'p>) -> DiResult<AnyArc> + Send + Sync>;

/// A single advice: phase plus body.
#[derive(Clone)]
pub enum Advice {
    Before(AdviceFn),
    Around(AroundFn),
    AfterReturning(AdviceFn),
    AfterThrowing(AdviceFn),
    After(AdviceFn),
}

impl Advice {
    pub fn phase(&self) -> AdvicePhase {
        match self {
            Advice::Before(_) => AdvicePhase::Before,
            Advice::Around(_) => AdvicePhase::Around,
            Advice::AfterReturning(_) => AdvicePhase::AfterReturning,
            Advice::AfterThrowing(_) => AdvicePhase::AfterThrowing,
            Advice::After(_) => AdvicePhase::After,
        }
    }
}

/// Ordered set of advices registered together against one pointcut.
///
/// Order within a set is the order the builder methods were called; order
/// across sets is aspect-registration order.
///
/// # Examples
///
/// ```
/// use weave_di::AdviceSet;
///
/// let advices = AdviceSet::new()
///     .before(|jp| {
///         println!("calling {}", jp.method());
///         Ok(())
///     })
///     .after(|_jp| Ok(()));
/// assert_eq!(advices.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct AdviceSet {
    advices: Vec<Advice>,
}

impl AdviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(
        mut self,
        f: impl Fn(&mut Joinpoint) -> DiResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.advices.push(Advice::Before(Arc::new(f)));
        self
    }

    pub fn around(
        mut self,
        f: impl for<'p> Fn(&mut Joinpoint, Proceed<'p>) -> DiResult<AnyArc> + Send + Sync + 'static,
    ) -> Self {
        self.advices.push(Advice::Around(Arc::new(f)));
        self
    }

    pub fn after_returning(
        mut self,
        f: impl Fn(&mut Joinpoint) -> DiResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.advices.push(Advice::AfterReturning(Arc::new(f)));
        self
    }

    pub fn after_throwing(
        mut self,
        f: impl Fn(&mut Joinpoint) -> DiResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.advices.push(Advice::AfterThrowing(Arc::new(f)));
        self
    }

    pub fn after(
        mut self,
        f: impl Fn(&mut Joinpoint) -> DiResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.advices.push(Advice::After(Arc::new(f)));
        self
    }

    pub fn len(&self) -> usize {
        self.advices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advices.is_empty()
    }

    pub(crate) fn push_advice(mut self, advice: Advice) -> Self {
        self.advices.push(advice);
        self
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Advice> {
        self.advices.iter()
    }
}
