//! Per-resolution state and the context handed to factories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::DiResult;
use crate::injector::Injector;
use crate::internal::BoxFutureUnit;
use crate::provider::{AnyArc, Binding};
use crate::token::Token;
use crate::traits::{AsyncLifecycle, Resolver, ResolverCore};

/// Commit handle for a singleton whose async hooks are still pending.
pub(crate) struct CommitTicket {
    pub(crate) owner: Injector,
    pub(crate) binding: Arc<Binding>,
}

/// A constructed instance waiting for its async lifecycle hooks.
pub(crate) struct PendingAsyncInit {
    pub(crate) token: Token,
    pub(crate) display: &'static str,
    /// Final value, possibly the proceeding wrapper
    pub(crate) value: AnyArc,
    /// Unwrapped instance that hooks and disposal binders bind to
    pub(crate) raw: AnyArc,
    pub(crate) hooks: Arc<dyn AsyncLifecycle>,
    pub(crate) commit: Option<CommitTicket>,
}

/// State threaded through one resolution call: the in-progress stack for
/// circular detection (spec'd per call, not per thread), the staging cache
/// for singletons constructed but not yet committed, and the queue of
/// pending async initializations.
pub(crate) struct ResolveState {
    pub(crate) in_progress: Vec<&'static str>,
    pub(crate) staged: HashMap<Token, AnyArc>,
    pub(crate) pending: Vec<PendingAsyncInit>,
    /// Whether this resolution may construct async-hooked bindings.
    pub(crate) async_ok: bool,
}

impl ResolveState {
    pub(crate) fn new(async_ok: bool) -> Self {
        Self {
            in_progress: Vec::new(),
            staged: HashMap::new(),
            pending: Vec::new(),
            async_ok,
        }
    }
}

/// Context passed to factory functions to pull dependencies.
///
/// Nested resolutions made through this context share the originating
/// call's in-progress stack, so construction cycles are caught with the
/// full path instead of overflowing.
///
/// # Examples
///
/// ```
/// use weave_di::{Injector, Provider, Resolver, token_of};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
/// struct Repo {
///     db: Arc<Database>,
/// }
///
/// let injector = Injector::root();
/// injector
///     .register(token_of::<Database>(), Provider::instance(Database { url: "mem://".into() }))
///     .unwrap();
/// injector
///     .register(
///         token_of::<Repo>(),
///         Provider::factory(|ctx| Ok(Repo { db: ctx.get::<Database>()? })).singleton(),
///     )
///     .unwrap();
///
/// assert_eq!(injector.get_required::<Repo>().db.url, "mem://");
/// ```
pub struct ResolverContext {
    injector: Injector,
    state: Arc<Mutex<ResolveState>>,
}

impl ResolverContext {
    pub(crate) fn new(injector: Injector, state: Arc<Mutex<ResolveState>>) -> Self {
        Self { injector, state }
    }

    /// The injector the resolution started from.
    pub fn injector(&self) -> &Injector {
        &self.injector
    }
}

impl ResolverCore for ResolverContext {
    fn resolve_any(&self, token: &Token) -> DiResult<AnyArc> {
        self.injector.resolve_one_with_state(token, &self.state)
    }

    fn resolve_all_any(&self, token: &Token) -> DiResult<Vec<AnyArc>> {
        self.injector.resolve_many_with_state(token, &self.state)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.injector.add_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.injector.add_async_disposer(f);
    }
}

impl Resolver for ResolverContext {}
