//! Aspect weaving: pointcut matching, advice chains, and the proceeding
//! engine that routes intercepted calls through them.
//!
//! Cross-cutting behavior (logging, transactions, validation) is expressed
//! as advice registered against a [`Pointcut`]. The [`Advisor`] matches
//! rules against declared types and methods, assembles a per-method
//! [`AdviceChain`], and the injector wraps matched instances in an
//! [`Advised`] proceeding wrapper at construction time.

mod advice;
mod advisor;
mod joinpoint;
mod pointcut;
mod proceeding;

pub use advice::{Advice, AdviceFn, AdvicePhase, AdviceSet, AroundFn};
pub use advisor::{Advised, Advisor, Dispatch};
pub use joinpoint::{Args, Joinpoint};
pub use pointcut::{MethodCandidate, Pointcut};
pub use proceeding::{AdviceChain, Proceed};
