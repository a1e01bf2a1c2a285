//! The proceeding engine: runs a call through its advice chain.

use crate::aspect::{Advice, AdviceFn, AdvicePhase, AdviceSet, Args, AroundFn, Joinpoint};
use crate::error::{DiError, DiResult};
use crate::provider::AnyArc;
use crate::token::Token;

/// One-shot continuation handed to Around advice.
///
/// Running it executes the rest of the chain — the next Around advice, or
/// the target itself at the innermost position. Dropping it without
/// running skips the target entirely.
pub struct Proceed<'p> {
    inner: Box<dyn FnOnce(&mut Joinpoint) -> DiResult<AnyArc> + 'p>,
}

impl<'p> Proceed<'p> {
    /// Continues the chain.
    pub fn run(self, jp: &mut Joinpoint) -> DiResult<AnyArc> {
        (self.inner)(jp)
    }
}

/// Per-method advice chain assembled from every matching pointcut rule.
///
/// Advices are grouped by phase but keep aspect-registration order within
/// each phase. Invocation follows the four-phase protocol:
///
/// - Before advices, in order; a failure aborts before the target runs and
///   surfaces as an [`DiError::Advice`] chain failure.
/// - Around advices wrap the target, first registered outermost.
/// - On success: AfterReturning advices, then After advices.
/// - On target failure: AfterThrowing advices (which may suppress with a
///   replacement value), then After advices, then the original error
///   re-propagates unless suppressed.
#[derive(Clone, Default)]
pub struct AdviceChain {
    before: Vec<AdviceFn>,
    around: Vec<AroundFn>,
    after_returning: Vec<AdviceFn>,
    after_throwing: Vec<AdviceFn>,
    after: Vec<AdviceFn>,
}

impl AdviceChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn absorb(&mut self, set: &AdviceSet) {
        for advice in set.iter() {
            match advice {
                Advice::Before(f) => self.before.push(f.clone()),
                Advice::Around(f) => self.around.push(f.clone()),
                Advice::AfterReturning(f) => self.after_returning.push(f.clone()),
                Advice::AfterThrowing(f) => self.after_throwing.push(f.clone()),
                Advice::After(f) => self.after.push(f.clone()),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
            && self.around.is_empty()
            && self.after_returning.is_empty()
            && self.after_throwing.is_empty()
            && self.after.is_empty()
    }

    /// Total number of advices across all phases.
    pub fn len(&self) -> usize {
        self.before.len()
            + self.around.len()
            + self.after_returning.len()
            + self.after_throwing.len()
            + self.after.len()
    }

    /// Routes one call through the chain.
    ///
    /// `target_call` is the original method body; it runs at the innermost
    /// Around position, at most once.
    pub fn invoke(
        &self,
        target: Token,
        method: &'static str,
        args: Args,
        target_call: impl FnOnce(&Args) -> DiResult<AnyArc>,
    ) -> DiResult<AnyArc> {
        let mut jp = Joinpoint::new(target, method, args);

        jp.set_phase(AdvicePhase::Before);
        for advice in &self.before {
            advice(&mut jp).map_err(|e| DiError::advice(AdvicePhase::Before, e))?;
        }

        jp.set_phase(AdvicePhase::Around);
        let mut innermost = Some(move |jp: &mut Joinpoint| {
            match target_call(jp.args()) {
                Ok(value) => Ok(value),
                Err(error) => {
                    // Record the target's own failure so it can be told
                    // apart from an advice failing.
                    jp.record_error(error.clone());
                    Err(error)
                }
            }
        });

        match run_around(&self.around, 0, &mut jp, &mut innermost) {
            Ok(value) => {
                // An around advice may have absorbed a target failure and
                // produced a value anyway; the call counts as successful.
                jp.clear_error();
                jp.set_return(value.clone());

                jp.set_phase(AdvicePhase::AfterReturning);
                for advice in &self.after_returning {
                    advice(&mut jp).map_err(|e| DiError::advice(AdvicePhase::AfterReturning, e))?;
                }

                jp.set_phase(AdvicePhase::After);
                for advice in &self.after {
                    advice(&mut jp).map_err(|e| DiError::advice(AdvicePhase::After, e))?;
                }

                Ok(jp.take_return().unwrap_or(value))
            }
            Err(error) => {
                if jp.error().is_none() {
                    // The target never failed: this is an advice's own
                    // error escaping the Around phase.
                    return Err(DiError::advice(AdvicePhase::Around, error));
                }

                jp.set_phase(AdvicePhase::AfterThrowing);
                for advice in &self.after_throwing {
                    advice(&mut jp).map_err(|e| DiError::advice(AdvicePhase::AfterThrowing, e))?;
                }

                jp.set_phase(AdvicePhase::After);
                for advice in &self.after {
                    advice(&mut jp).map_err(|e| DiError::advice(AdvicePhase::After, e))?;
                }

                match jp.suppression() {
                    Some(value) => Ok(value),
                    None => Err(error),
                }
            }
        }
    }
}

fn run_around<F>(
    arounds: &[AroundFn],
    index: usize,
    jp: &mut Joinpoint,
    innermost: &mut Option<F>,
) -> DiResult<AnyArc>
where
    F: FnOnce(&mut Joinpoint) -> DiResult<AnyArc>,
{
    match arounds.get(index) {
        Some(advice) => {
            let proceed = Proceed {
                inner: Box::new(move |jp: &mut Joinpoint| {
                    run_around(arounds, index + 1, jp, innermost)
                }),
            };
            advice(jp, proceed)
        }
        None => {
            let call = innermost
                .take()
                .ok_or_else(|| DiError::failed("proceed invoked after the target already ran"))?;
            call(jp)
        }
    }
}
