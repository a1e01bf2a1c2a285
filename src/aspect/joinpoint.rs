//! Runtime descriptor of an intercepted call.

use std::sync::Arc;

use crate::aspect::AdvicePhase;
use crate::error::{DiError, DiResult};
use crate::provider::AnyArc;
use crate::token::Token;

/// Type-erased argument list carried by a joinpoint.
///
/// Arguments are `Arc`-shared so the same list can flow through every
/// advice phase and into the target without copying.
#[derive(Clone, Default)]
pub struct Args {
    values: Vec<AnyArc>,
}

impl Args {
    /// Empty argument list.
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Builds a list from pre-erased values.
    pub fn new(values: Vec<AnyArc>) -> Self {
        Self { values }
    }

    /// Appends a typed argument.
    pub fn push<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    /// Typed access to the argument at `index`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let any = self
            .values
            .get(index)
            .ok_or_else(|| DiError::failed(format!("missing argument at index {}", index)))?;
        any.clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Raw access to the argument at `index`.
    pub fn raw(&self, index: usize) -> Option<&AnyArc> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The runtime descriptor passed through an advice chain.
///
/// Carries the target token, method name, arguments, the phase currently
/// executing, and the produced value or raised error. Only the advice
/// executing a given phase receives a mutable reference, so mutation is
/// confined to that phase.
pub struct Joinpoint {
    target: Token,
    method: &'static str,
    args: Args,
    phase: AdvicePhase,
    returned: Option<AnyArc>,
    error: Option<DiError>,
    suppressed: bool,
}

impl Joinpoint {
    pub(crate) fn new(target: Token, method: &'static str, args: Args) -> Self {
        Self {
            target,
            method,
            args,
            phase: AdvicePhase::Before,
            returned: None,
            error: None,
            suppressed: false,
        }
    }

    /// Token of the instance being intercepted.
    pub fn target(&self) -> &Token {
        &self.target
    }

    /// Name of the intercepted method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Arguments of the intercepted call.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Phase currently executing.
    pub fn phase(&self) -> AdvicePhase {
        self.phase
    }

    /// The value produced by the target (or by an advice that replaced it).
    pub fn returned(&self) -> Option<&AnyArc> {
        self.returned.as_ref()
    }

    /// Typed view of the produced value.
    pub fn return_value<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.returned.as_ref().and_then(|v| v.clone().downcast::<T>().ok())
    }

    /// Replaces the produced value. Meaningful from Around and
    /// AfterReturning advice.
    pub fn set_return(&mut self, value: AnyArc) {
        self.returned = Some(value);
    }

    /// The error raised by the target, if any. Populated before the
    /// AfterThrowing phase runs.
    pub fn error(&self) -> Option<&DiError> {
        self.error.as_ref()
    }

    /// Suppresses the target's error, substituting `value` as the call's
    /// result. Only AfterThrowing advice may suppress; anywhere else this
    /// fails.
    pub fn suppress_with(&mut self, value: AnyArc) -> DiResult<()> {
        if self.phase != AdvicePhase::AfterThrowing {
            return Err(DiError::failed(format!(
                "suppress_with is only valid in the AfterThrowing phase (called in {})",
                self.phase
            )));
        }
        self.suppressed = true;
        self.returned = Some(value);
        Ok(())
    }

    pub(crate) fn set_phase(&mut self, phase: AdvicePhase) {
        self.phase = phase;
    }

    pub(crate) fn record_error(&mut self, error: DiError) {
        self.error = Some(error);
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn suppression(&self) -> Option<AnyArc> {
        if self.suppressed {
            self.returned.clone()
        } else {
            None
        }
    }

    pub(crate) fn take_return(&mut self) -> Option<AnyArc> {
        self.returned.take()
    }
}
