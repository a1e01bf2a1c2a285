//! Rule registry and the proceeding wrapper applied to matched instances.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::aspect::{AdviceChain, AdviceSet, Args, MethodCandidate, Pointcut};
use crate::error::DiResult;
use crate::provider::AnyArc;
use crate::token::Token;

/// Surface through which the container invokes interceptable methods.
///
/// Rust cannot patch a type's method dispatch, so types opt into
/// interception by exposing their operations as named dispatch entries.
/// The container wraps matched instances in an [`Advised`] implementing
/// the same surface, which routes matched methods through their advice
/// chain before delegating.
///
/// # Examples
///
/// ```
/// use weave_di::{Args, DiResult, Dispatch};
/// use std::sync::Arc;
///
/// struct Greeter;
///
/// impl Dispatch for Greeter {
///     fn dispatch(&self, method: &'static str, args: &Args) -> DiResult<Arc<dyn std::any::Any + Send + Sync>> {
///         match method {
///             "greet" => {
///                 let name = args.get::<String>(0)?;
///                 Ok(Arc::new(format!("hello {}", name)))
///             }
///             other => Err(weave_di::DiError::failed(format!("no method {}", other))),
///         }
///     }
/// }
/// ```
pub trait Dispatch: Send + Sync + 'static {
    /// Invokes the named operation with type-erased arguments.
    fn dispatch(&self, method: &'static str, args: &Args) -> DiResult<AnyArc>;
}

struct AspectRegistration {
    pointcut: Pointcut,
    advices: AdviceSet,
}

/// Registry of pointcut rules and their advice sets.
///
/// Rules are matched against every candidate method of every registered
/// type; when two rules target the same method both apply, ordered by
/// rule-registration order (never alphabetically).
#[derive(Default)]
pub struct Advisor {
    registrations: Vec<AspectRegistration>,
    declaring_types: HashSet<TypeId>,
}

impl Advisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an aspect: a pointcut rule plus the advices to run at
    /// every method it matches.
    pub fn register_aspect(&mut self, pointcut: Pointcut, advices: AdviceSet) {
        self.registrations.push(AspectRegistration { pointcut, advices });
    }

    pub fn rule_count(&self) -> usize {
        self.registrations.len()
    }

    /// Marks a type's declared aspects as registered. Returns false when
    /// the type already claimed them, so re-running the registration
    /// pipeline (e.g. in a child scope) does not double its rules.
    pub(crate) fn claim_declaring_type(&mut self, type_id: TypeId) -> bool {
        self.declaring_types.insert(type_id)
    }

    /// Advice chain for a single candidate, accumulated across all
    /// matching rules in registration order. Empty when nothing matches.
    pub fn chain_for(&self, candidate: &MethodCandidate) -> AdviceChain {
        let mut chain = AdviceChain::new();
        for registration in &self.registrations {
            if registration.pointcut.matches(candidate) {
                chain.absorb(&registration.advices);
            }
        }
        chain
    }

    /// Per-method chains for a type, keyed by method name. Methods with no
    /// matching rule are omitted.
    pub fn advise(&self, candidates: &[MethodCandidate]) -> HashMap<&'static str, Arc<AdviceChain>> {
        let mut chains = HashMap::new();
        for candidate in candidates {
            let chain = self.chain_for(candidate);
            if !chain.is_empty() {
                chains.insert(candidate.method, Arc::new(chain));
            }
        }
        chains
    }

    /// True when at least one rule matches one of the candidates.
    pub fn is_eligible(&self, candidates: &[MethodCandidate]) -> bool {
        candidates
            .iter()
            .any(|c| self.registrations.iter().any(|r| r.pointcut.matches(c)))
    }

    #[cfg(feature = "diagnostics")]
    pub fn debug_dump(&self) -> String {
        format!("advisor: {} rule(s) registered", self.registrations.len())
    }
}

/// Proceeding wrapper produced for instances with at least one matched
/// method.
///
/// Matched methods route through their advice chain with the target call
/// at the innermost position; unmatched methods delegate straight to the
/// target. Since wrapping happens at construction, a singleton's chains
/// are frozen at first resolve.
pub struct Advised {
    target: Arc<dyn Dispatch>,
    token: Token,
    chains: HashMap<&'static str, Arc<AdviceChain>>,
}

impl Advised {
    pub(crate) fn new(
        target: Arc<dyn Dispatch>,
        token: Token,
        chains: HashMap<&'static str, Arc<AdviceChain>>,
    ) -> Self {
        Self { target, token, chains }
    }

    /// The unwrapped instance.
    pub fn target(&self) -> &Arc<dyn Dispatch> {
        &self.target
    }

    /// True when the named method has an advice chain.
    pub fn is_advised(&self, method: &str) -> bool {
        self.chains.contains_key(method)
    }
}

impl Dispatch for Advised {
    fn dispatch(&self, method: &'static str, args: &Args) -> DiResult<AnyArc> {
        match self.chains.get(method) {
            Some(chain) => {
                let target = self.target.clone();
                chain.invoke(self.token.clone(), method, args.clone(), move |call_args| {
                    target.dispatch(method, call_args)
                })
            }
            None => self.target.dispatch(method, args),
        }
    }
}
