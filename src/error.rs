//! Error types for the container, pipelines, and advisor.

use std::fmt;

use crate::aspect::AdvicePhase;

/// Errors surfaced by registration, resolution, pipeline execution, and
/// advice weaving.
///
/// Every failure path in the crate funnels into this enum; nothing is
/// swallowed. Resolution errors reach the caller of `resolve`, registration
/// errors the caller of `register`, and pipeline mis-configuration fails at
/// setup time.
///
/// # Examples
///
/// ```rust
/// use weave_di::{DiError, Injector, Resolver};
///
/// let injector = Injector::root();
/// match injector.get::<String>() {
///     Err(DiError::Unresolved(name)) => {
///         assert_eq!(name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No binding for the token anywhere in the injector chain
    Unresolved(&'static str),
    /// Uniqueness-constrained token registered twice in the same injector
    DuplicateBinding(&'static str),
    /// Pipeline insertion referenced an action that is not in the scope
    AnchorNotFound(&'static str),
    /// Construction graph revisited a token already under construction
    /// (includes the full path, first entry repeated at the end)
    Circular(Vec<&'static str>),
    /// An advice itself failed, distinct from the target method's own error
    Advice {
        /// Phase the failing advice was registered for
        phase: AdvicePhase,
        /// The advice's underlying failure
        source: Box<DiError>,
    },
    /// A lifecycle hook failed during first construction; the instance was
    /// discarded, not cached
    Lifecycle {
        /// Display name of the token under construction
        token: &'static str,
        source: Box<DiError>,
    },
    /// Sync `resolve` hit a binding that carries async lifecycle hooks;
    /// use `resolve_async`
    AsyncLifecycle(&'static str),
    /// `dispose` called on a parent while this many children are still live
    ChildrenAlive(usize),
    /// Operation on an injector that has already been disposed
    InjectorDisposed,
    /// Stored value did not downcast to the requested type
    TypeMismatch(&'static str),
    /// Construction recursion exceeded the depth guard
    DepthExceeded(usize),
    /// Free-form failure raised by user code (factories, hooks, advices)
    Failed(String),
}

impl DiError {
    /// Wraps an error raised by an advice, tagging the phase it ran in.
    pub fn advice(phase: AdvicePhase, source: DiError) -> Self {
        DiError::Advice { phase, source: Box::new(source) }
    }

    /// Free-form failure for user code inside factories, hooks, and advices.
    pub fn failed(message: impl Into<String>) -> Self {
        DiError::Failed(message.into())
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Unresolved(name) => write!(f, "No binding for token: {}", name),
            DiError::DuplicateBinding(name) => {
                write!(f, "Token already bound with unique semantics: {}", name)
            }
            DiError::AnchorNotFound(name) => write!(f, "Pipeline anchor not found: {}", name),
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::Advice { phase, source } => {
                write!(f, "Advice failed in {} phase: {}", phase, source)
            }
            DiError::Lifecycle { token, source } => {
                write!(f, "Lifecycle hook failed constructing {}: {}", token, source)
            }
            DiError::AsyncLifecycle(name) => write!(
                f,
                "Binding {} has async lifecycle hooks; resolve it with resolve_async",
                name
            ),
            DiError::ChildrenAlive(count) => {
                write!(f, "Cannot dispose injector: {} child injector(s) still live", count)
            }
            DiError::InjectorDisposed => write!(f, "Injector has been disposed"),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::DepthExceeded(depth) => write!(f, "Max construction depth {} exceeded", depth),
            DiError::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for container operations
///
/// A convenience alias for `Result<T, DiError>` used throughout weave-di.
pub type DiResult<T> = Result<T, DiError>;
