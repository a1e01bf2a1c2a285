//! Hierarchical injectors: scoped provider tables, singleton caches, and
//! parent/child chains.

mod context;

pub use context::ResolverContext;
pub(crate) use context::{CommitTicket, PendingAsyncInit, ResolveState};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Instant;

use crate::aspect::{AdviceChain, AdviceSet, Advised, Advisor, Dispatch, Pointcut};
use crate::error::{DiError, DiResult};
use crate::internal::{BoxFutureUnit, DisposeBag};
use crate::metadata::{MetadataRegistry, TypeDecl};
use crate::observer::{ContainerObserver, Observers};
use crate::pipeline::{
    default_registration_scope, default_resolution_scope, RegistrationContext, ResolutionContext,
    ResolveMode, Scope,
};
use crate::provider::{
    AnyArc, Binding, BindingDescriptor, Provider, ProviderStrategy,
};
use crate::token::{token_of, Token};
use crate::traits::{Lifecycle, Resolver, ResolverCore};

const MAX_DEPTH: usize = 256;

/// Process-wide engine state, owned by the root injector and shared down
/// the chain: the two pipelines, the advisor, the metadata registry, and
/// the observer fan-out. Tests build independent roots for isolation
/// instead of sharing process globals.
pub(crate) struct Runtime {
    pub(crate) registration: RwLock<Scope<RegistrationContext>>,
    pub(crate) resolution: RwLock<Scope<ResolutionContext>>,
    pub(crate) advisor: RwLock<Advisor>,
    pub(crate) metadata: RwLock<MetadataRegistry>,
    pub(crate) observers: Observers,
}

impl Runtime {
    fn new() -> Self {
        Self {
            registration: RwLock::new(default_registration_scope()),
            resolution: RwLock::new(default_resolution_scope()),
            advisor: RwLock::new(Advisor::new()),
            metadata: RwLock::new(MetadataRegistry::new()),
            observers: Observers::new(),
        }
    }

    pub(crate) fn advise_type(
        &self,
        type_id: std::any::TypeId,
    ) -> HashMap<&'static str, Arc<AdviceChain>> {
        let candidates = self.metadata.read().unwrap().method_candidates(type_id);
        if candidates.is_empty() {
            return HashMap::new();
        }
        self.advisor.read().unwrap().advise(&candidates)
    }
}

struct ProviderTable {
    // Insertion order is authoritative for fan-out; the index only serves
    // exact lookup.
    entries: Vec<(Token, Arc<Binding>)>,
    index: HashMap<Token, usize>,
}

impl ProviderTable {
    fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    fn get(&self, token: &Token) -> Option<&Arc<Binding>> {
        self.index.get(token).map(|&pos| &self.entries[pos].1)
    }

    fn insert(&mut self, token: Token, binding: Binding) {
        match self.index.get(&token) {
            // Override keeps the original discovery position.
            Some(&pos) => self.entries[pos] = (token, Arc::new(binding)),
            None => {
                self.index.insert(token.clone(), self.entries.len());
                self.entries.push((token, Arc::new(binding)));
            }
        }
    }

    fn iter(&self) -> impl Iterator<Item = &(Token, Arc<Binding>)> {
        self.entries.iter()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

struct InjectorInner {
    runtime: Arc<Runtime>,
    parent: Option<Injector>,
    table: RwLock<ProviderTable>,
    disposers: Mutex<DisposeBag>,
    children: Mutex<Vec<Weak<InjectorInner>>>,
    disposed: AtomicBool,
}

/// A hierarchical scope owning provider bindings and singleton caches.
///
/// Injectors form parent/child chains: a child shadows its parent's
/// bindings for the same token and never owns the parent's lifetime.
/// Handles are cheap to clone (`Arc` internally).
///
/// Registration is caller-serialized: concurrent `register` calls on the
/// same injector are not synchronized against readers beyond lock
/// consistency, and their relative order is unspecified. Singleton
/// construction is committed at most once — two racing first resolves may
/// both run a factory, but every later resolve observes the first
/// committed value.
///
/// # Examples
///
/// ```
/// use weave_di::{Injector, Provider, Resolver, token_of};
///
/// struct Config {
///     name: &'static str,
/// }
///
/// let root = Injector::root();
/// root.register(token_of::<Config>(), Provider::instance(Config { name: "root" }))
///     .unwrap();
///
/// let child = root.create_child();
/// child
///     .register(token_of::<Config>(), Provider::instance(Config { name: "child" }))
///     .unwrap();
///
/// assert_eq!(root.get_required::<Config>().name, "root");
/// assert_eq!(child.get_required::<Config>().name, "child");
/// ```
pub struct Injector {
    inner: Arc<InjectorInner>,
}

impl Clone for Injector {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl Injector {
    /// Creates a fresh root injector with default pipelines and an empty
    /// advisor and metadata registry.
    pub fn root() -> Self {
        Self {
            inner: Arc::new(InjectorInner {
                runtime: Arc::new(Runtime::new()),
                parent: None,
                table: RwLock::new(ProviderTable::new()),
                disposers: Mutex::new(DisposeBag::default()),
                children: Mutex::new(Vec::new()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a child scope. The child owns its own provider table and
    /// caches; it shares the root's pipelines, advisor, and metadata.
    pub fn create_child(&self) -> Injector {
        let child = Injector {
            inner: Arc::new(InjectorInner {
                runtime: self.inner.runtime.clone(),
                parent: Some(self.clone()),
                table: RwLock::new(ProviderTable::new()),
                disposers: Mutex::new(DisposeBag::default()),
                children: Mutex::new(Vec::new()),
                disposed: AtomicBool::new(false),
            }),
        };
        self.inner
            .children
            .lock()
            .unwrap()
            .push(Arc::downgrade(&child.inner));
        child
    }

    pub(crate) fn runtime(&self) -> &Arc<Runtime> {
        &self.inner.runtime
    }

    fn ensure_live(&self) -> DiResult<()> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            Err(DiError::InjectorDisposed)
        } else {
            Ok(())
        }
    }

    /// True once `dispose` has completed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    // ----- Registration -----

    /// Installs a provider for the token in this injector.
    ///
    /// A later registration overrides an earlier one for the same token,
    /// unless either requested `unique` semantics — then this fails with
    /// [`DiError::DuplicateBinding`].
    pub fn register(&self, token: Token, provider: Provider) -> DiResult<()> {
        self.ensure_live()?;
        let mut table = self.inner.table.write().unwrap();
        if let Some(existing) = table.get(&token) {
            if existing.provider.unique || provider.unique {
                return Err(DiError::DuplicateBinding(token.display_name()));
            }
        }
        table.insert(token.clone(), Binding::new(provider));
        drop(table);
        self.runtime().observers.registered(&token);
        Ok(())
    }

    /// Commits a type declaration's metadata and runs the registration
    /// pipeline for it.
    pub fn install<T: Send + Sync + 'static>(&self, decl: TypeDecl<T>) -> DiResult<()> {
        self.ensure_live()?;
        decl.commit(&mut self.runtime().metadata.write().unwrap());
        self.register_type::<T>()
    }

    /// Runs the registration pipeline for an already-declared type,
    /// creating its binding in *this* injector. Useful to shadow a
    /// declared type inside a child scope.
    pub fn register_type<T: Send + Sync + 'static>(&self) -> DiResult<()> {
        self.ensure_live()?;
        let scope = self.registration_snapshot();
        let mut ctx = RegistrationContext::new(
            self.clone(),
            std::any::TypeId::of::<T>(),
            std::any::type_name::<T>(),
            token_of::<T>(),
        );
        scope.execute(&mut ctx)?;
        if !ctx.committed {
            return Err(DiError::failed(format!(
                "registration pipeline did not commit a binding for {}",
                ctx.type_name
            )));
        }
        Ok(())
    }

    /// Registers an aspect: advices to weave at every method the pointcut
    /// matches. Rules apply in registration order.
    pub fn register_aspect(&self, pointcut: Pointcut, advices: AdviceSet) {
        self.runtime().advisor.write().unwrap().register_aspect(pointcut, advices);
    }

    /// Adds an observer notified of container events.
    pub fn add_observer(&self, observer: Arc<dyn ContainerObserver>) {
        self.runtime().observers.add(observer);
    }

    /// Reconfigures the resolution pipeline (insert, reorder, replace).
    pub fn configure_resolution(
        &self,
        configure: impl FnOnce(&mut Scope<ResolutionContext>) -> DiResult<()>,
    ) -> DiResult<()> {
        configure(&mut self.runtime().resolution.write().unwrap())
    }

    /// Reconfigures the registration pipeline.
    pub fn configure_registration(
        &self,
        configure: impl FnOnce(&mut Scope<RegistrationContext>) -> DiResult<()>,
    ) -> DiResult<()> {
        configure(&mut self.runtime().registration.write().unwrap())
    }

    /// Read access to the metadata registry.
    pub fn with_metadata<R>(&self, read: impl FnOnce(&MetadataRegistry) -> R) -> R {
        read(&self.runtime().metadata.read().unwrap())
    }

    /// Write access to the metadata registry, for bootstrap code that
    /// attaches facts without a [`TypeDecl`].
    pub fn with_metadata_mut<R>(&self, write: impl FnOnce(&mut MetadataRegistry) -> R) -> R {
        write(&mut self.runtime().metadata.write().unwrap())
    }

    // ----- Lookup -----

    /// Local-or-ancestor presence check; never constructs.
    pub fn has(&self, token: &Token) -> bool {
        self.find_exact(token).is_some()
    }

    /// Introspection view of this injector's own bindings, in
    /// registration order.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        self.inner
            .table
            .read()
            .unwrap()
            .iter()
            .map(|(token, binding)| BindingDescriptor::of(token, binding))
            .collect()
    }

    #[cfg(feature = "diagnostics")]
    pub fn debug_dump(&self) -> String {
        let mut out = String::from("=== Injector bindings ===\n");
        for (token, binding) in self.inner.table.read().unwrap().iter() {
            out.push_str(&format!(
                "  {:?}: {:?}\n",
                token.display_name(),
                binding.provider.lifetime
            ));
        }
        out
    }

    fn registration_snapshot(&self) -> Scope<RegistrationContext> {
        self.runtime().registration.read().unwrap().clone()
    }

    fn resolution_snapshot(&self) -> Scope<ResolutionContext> {
        self.runtime().resolution.read().unwrap().clone()
    }

    /// Closest-first exact lookup: this injector, then ancestors.
    pub(crate) fn find_exact(&self, token: &Token) -> Option<(Injector, Arc<Binding>)> {
        let mut current = Some(self.clone());
        while let Some(injector) = current {
            if let Some(binding) = injector.inner.table.read().unwrap().get(token) {
                return Some((injector.clone(), binding.clone()));
            }
            current = injector.inner.parent.clone();
        }
        None
    }

    fn chain_root_first(&self) -> Vec<Injector> {
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(injector) = current {
            current = injector.inner.parent.clone();
            chain.push(injector);
        }
        chain.reverse();
        chain
    }

    /// Fan-out discovery: every binding whose token matches exactly or
    /// that advertises the token via `provides`. Order is ancestor-first;
    /// a closer injector's binding for the same token replaces the
    /// ancestor's entry at its discovered position.
    pub(crate) fn discover(&self, token: &Token) -> Vec<(Injector, Token, Arc<Binding>)> {
        let mut slots: Vec<(Token, Injector, Arc<Binding>)> = Vec::new();
        for injector in self.chain_root_first() {
            let table = injector.inner.table.read().unwrap();
            for (bound_token, binding) in table.iter() {
                let matched =
                    bound_token == token || binding.provider.provides.contains(token);
                if !matched {
                    continue;
                }
                match slots.iter().position(|(t, _, _)| t == bound_token) {
                    Some(pos) => {
                        slots[pos] = (bound_token.clone(), injector.clone(), binding.clone())
                    }
                    None => slots.push((bound_token.clone(), injector.clone(), binding.clone())),
                }
            }
        }
        slots.into_iter().map(|(t, i, b)| (i, t, b)).collect()
    }

    // ----- Resolution -----

    /// Resolves the token to a type-erased instance.
    ///
    /// Tries the direct binding (this injector, then ancestors), then the
    /// assignable-service search, and fails with [`DiError::Unresolved`]
    /// when nothing matches — never a silent `None`.
    pub fn resolve(&self, token: &Token) -> DiResult<AnyArc> {
        self.ensure_live()?;
        let observers = &self.runtime().observers;
        let watched = observers.has_observers();
        let start = if watched {
            observers.resolving(token);
            Some(Instant::now())
        } else {
            None
        };

        let state = Arc::new(Mutex::new(ResolveState::new(false)));
        let result = self.resolve_one_with_state(token, &state);

        if let Some(start) = start {
            match &result {
                Ok(_) => observers.resolved(token, start.elapsed()),
                Err(error) => observers.resolve_failed(token, error),
            }
        }
        result
    }

    /// Async variant of [`resolve`](Self::resolve): additionally awaits
    /// pending async lifecycle hooks sequentially, in construction order,
    /// before committing singleton caches and returning.
    pub async fn resolve_async(&self, token: &Token) -> DiResult<AnyArc> {
        self.ensure_live()?;
        let state = Arc::new(Mutex::new(ResolveState::new(true)));
        let mut value = self.resolve_one_with_state(token, &state)?;

        let pending: Vec<PendingAsyncInit> = {
            let mut st = state.lock().unwrap();
            st.pending.drain(..).collect()
        };
        for entry in pending {
            Self::await_hooks(&entry).await?;
            if let Some(ticket) = &entry.commit {
                let committed = Self::commit_singleton(
                    &ticket.owner,
                    &ticket.binding,
                    entry.value.clone(),
                    &entry.raw,
                );
                if entry.token == *token {
                    value = committed;
                }
            }
        }
        Ok(value)
    }

    async fn await_hooks(entry: &PendingAsyncInit) -> DiResult<()> {
        let wrap = |e: DiError| DiError::Lifecycle {
            token: entry.display,
            source: Box::new(e),
        };
        entry.hooks.before_init().await.map_err(wrap)?;
        entry.hooks.on_init().await.map_err(wrap)?;
        entry.hooks.after_init().await.map_err(wrap)?;
        Ok(())
    }

    /// Resolves every matching binding, in fan-out order (ancestor-first
    /// discovery, closer-injector-wins). Empty when nothing matches.
    pub fn resolve_all(&self, token: &Token) -> DiResult<Vec<AnyArc>> {
        self.ensure_live()?;
        let state = Arc::new(Mutex::new(ResolveState::new(false)));
        self.resolve_many_with_state(token, &state)
    }

    /// Async variant of [`resolve_all`](Self::resolve_all): awaits pending
    /// async lifecycle hooks of every constructed member before returning.
    pub async fn resolve_all_async(&self, token: &Token) -> DiResult<Vec<AnyArc>> {
        self.ensure_live()?;
        let state = Arc::new(Mutex::new(ResolveState::new(true)));
        let values = self.resolve_many_with_state(token, &state)?;

        let pending: Vec<PendingAsyncInit> = {
            let mut st = state.lock().unwrap();
            st.pending.drain(..).collect()
        };
        for entry in pending {
            Self::await_hooks(&entry).await?;
            if let Some(ticket) = &entry.commit {
                Self::commit_singleton(
                    &ticket.owner,
                    &ticket.binding,
                    entry.value.clone(),
                    &entry.raw,
                );
            }
        }
        Ok(values)
    }

    /// Typed async resolution: [`resolve_async`](Self::resolve_async) plus
    /// the downcast.
    pub async fn get_async<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_async(&token_of::<T>()).await?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub(crate) fn resolve_one_with_state(
        &self,
        token: &Token,
        state: &Arc<Mutex<ResolveState>>,
    ) -> DiResult<AnyArc> {
        let scope = self.resolution_snapshot();
        let mut ctx =
            ResolutionContext::new(self.clone(), token.clone(), ResolveMode::One, state.clone());
        scope.execute(&mut ctx)?;
        ctx.result.ok_or(DiError::Unresolved(token.display_name()))
    }

    pub(crate) fn resolve_many_with_state(
        &self,
        token: &Token,
        state: &Arc<Mutex<ResolveState>>,
    ) -> DiResult<Vec<AnyArc>> {
        let scope = self.resolution_snapshot();
        let mut ctx =
            ResolutionContext::new(self.clone(), token.clone(), ResolveMode::All, state.clone());
        scope.execute(&mut ctx)?;
        Ok(ctx.results)
    }

    /// Resolves the token and returns its interception surface. For
    /// advised instances this is the proceeding wrapper; for unmatched
    /// dispatchable bindings, the bare instance.
    pub fn get_dispatch(&self, token: &Token) -> DiResult<Arc<dyn Dispatch>> {
        let value = self.resolve(token)?;
        self.dispatch_surface(token, value)
    }

    /// Async variant of [`get_dispatch`](Self::get_dispatch).
    pub async fn get_dispatch_async(&self, token: &Token) -> DiResult<Arc<dyn Dispatch>> {
        let value = self.resolve_async(token).await?;
        self.dispatch_surface(token, value)
    }

    fn dispatch_surface(&self, token: &Token, value: AnyArc) -> DiResult<Arc<dyn Dispatch>> {
        if let Ok(advised) = value.clone().downcast::<Advised>() {
            return Ok(advised as Arc<dyn Dispatch>);
        }
        let binding = self
            .find_exact(token)
            .map(|(_, b)| b)
            .or_else(|| self.discover(token).into_iter().next().map(|(_, _, b)| b))
            .ok_or(DiError::Unresolved(token.display_name()))?;
        let binder = binding
            .provider
            .dispatch
            .as_ref()
            .ok_or(DiError::TypeMismatch(token.display_name()))?;
        binder(&value).ok_or(DiError::TypeMismatch(token.display_name()))
    }

    // ----- Construction -----

    /// Constructs (or fetches the cached value of) one binding. Called by
    /// the resolution pipeline's actions.
    pub(crate) fn construct_binding(
        &self,
        owner: &Injector,
        binding: &Arc<Binding>,
        token: &Token,
        state: &Arc<Mutex<ResolveState>>,
    ) -> DiResult<AnyArc> {
        let provider = &binding.provider;

        // Existing instances skip construction and lifecycle entirely.
        if let ProviderStrategy::Instance(value) = &provider.strategy {
            return Ok(value.clone());
        }

        let singleton = provider.lifetime == crate::Lifetime::Singleton;
        if singleton {
            if let Some(value) = binding.slot.get() {
                return Ok(value.clone());
            }
            if let Some(value) = state.lock().unwrap().staged.get(token) {
                return Ok(value.clone());
            }
        }

        if provider.has_async_hooks() && !state.lock().unwrap().async_ok {
            return Err(DiError::AsyncLifecycle(token.display_name()));
        }

        let display = token.display_name();
        {
            let mut st = state.lock().unwrap();
            if st.in_progress.iter().any(|name| *name == display) {
                let mut path = st.in_progress.clone();
                path.push(display);
                return Err(DiError::Circular(path));
            }
            if st.in_progress.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(st.in_progress.len()));
            }
            st.in_progress.push(display);
        }

        let built = self.run_strategy(provider, state);

        {
            let mut st = state.lock().unwrap();
            let popped = st.in_progress.pop();
            debug_assert_eq!(popped, Some(display));
        }

        let raw = built?;

        // Weave: a matched dispatchable instance is replaced by its
        // proceeding wrapper before caching, so every consumer sees it.
        let mut value = raw.clone();
        if let (Some(binder), Some(owner_type)) = (&provider.dispatch, provider.owner_type) {
            let chains = self.runtime().advise_type(owner_type);
            if !chains.is_empty() {
                if let Some(dispatch) = binder(&raw) {
                    value = Arc::new(Advised::new(dispatch, token.clone(), chains)) as AnyArc;
                }
            }
        }

        if let Some(binder) = &provider.lifecycle {
            if let Some(hooks) = binder(&raw) {
                Self::run_sync_hooks(hooks.as_ref()).map_err(|e| DiError::Lifecycle {
                    token: display,
                    source: Box::new(e),
                })?;
            }
        }

        let async_hooks = provider
            .async_lifecycle
            .as_ref()
            .and_then(|binder| binder(&raw));
        match async_hooks {
            Some(hooks) => {
                let mut st = state.lock().unwrap();
                if singleton {
                    st.staged.insert(token.clone(), value.clone());
                }
                st.pending.push(PendingAsyncInit {
                    token: token.clone(),
                    display,
                    value: value.clone(),
                    raw,
                    hooks,
                    commit: singleton.then(|| CommitTicket {
                        owner: owner.clone(),
                        binding: binding.clone(),
                    }),
                });
                Ok(value)
            }
            None => {
                if singleton {
                    let committed = Self::commit_singleton(owner, binding, value, &raw);
                    state
                        .lock()
                        .unwrap()
                        .staged
                        .insert(token.clone(), committed.clone());
                    Ok(committed)
                } else {
                    Ok(value)
                }
            }
        }
    }

    fn run_sync_hooks(hooks: &dyn Lifecycle) -> DiResult<()> {
        hooks.before_init()?;
        hooks.on_init()?;
        hooks.after_init()
    }

    fn run_strategy(
        &self,
        provider: &Provider,
        state: &Arc<Mutex<ResolveState>>,
    ) -> DiResult<AnyArc> {
        match &provider.strategy {
            ProviderStrategy::Instance(value) => Ok(value.clone()),
            ProviderStrategy::Factory(factory) => {
                let ctx = ResolverContext::new(self.clone(), state.clone());
                factory(&ctx)
            }
            ProviderStrategy::Alias(target) => {
                let ctx = ResolverContext::new(self.clone(), state.clone());
                ctx.resolve_any(target)
            }
            ProviderStrategy::Construct(recipe) => {
                let ctx = ResolverContext::new(self.clone(), state.clone());
                let mut args = Vec::with_capacity(recipe.params.len());
                for param in &recipe.params {
                    args.push(Self::resolve_or_default(
                        &ctx,
                        &param.token,
                        param.default.clone(),
                    )?);
                }
                let mut instance = (recipe.ctor)(&crate::provider::CtorArgs::new(&args))?;
                for property in &recipe.properties {
                    let value = Self::resolve_or_default(
                        &ctx,
                        &property.token,
                        property.default.clone(),
                    )?;
                    (property.setter)(&mut *instance, value)?;
                }
                Ok(Arc::from(instance))
            }
        }
    }

    fn resolve_or_default(
        ctx: &ResolverContext,
        token: &Token,
        default: Option<AnyArc>,
    ) -> DiResult<AnyArc> {
        match ctx.resolve_any(token) {
            Ok(value) => Ok(value),
            Err(DiError::Unresolved(name)) => default.ok_or(DiError::Unresolved(name)),
            Err(error) => Err(error),
        }
    }

    /// At-most-once singleton commit: the first value wins; later racers
    /// observe it. Disposal binders register only for the winning value;
    /// they bind the raw instance, not its proceeding wrapper.
    fn commit_singleton(
        owner: &Injector,
        binding: &Arc<Binding>,
        value: AnyArc,
        raw: &AnyArc,
    ) -> AnyArc {
        match binding.slot.set(value.clone()) {
            Ok(()) => {
                let provider = &binding.provider;
                if let Some(binder) = &provider.dispose {
                    if let Some(hook) = binder(raw) {
                        owner.add_sync_disposer(hook);
                    }
                }
                if let Some(binder) = &provider.async_dispose {
                    if let Some(hook) = binder(raw) {
                        owner.add_async_disposer(hook);
                    }
                }
                value
            }
            Err(_) => binding.slot.get().cloned().unwrap_or(value),
        }
    }

    pub(crate) fn add_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.inner.disposers.lock().unwrap().push_sync(f);
    }

    pub(crate) fn add_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.inner.disposers.lock().unwrap().push_async(f);
    }

    // ----- Disposal -----

    /// Disposes this injector: runs every disposal hook in reverse
    /// construction order (async hooks first), then clears the provider
    /// table and caches.
    ///
    /// Children must be disposed before their parent; disposing a parent
    /// with live children fails with [`DiError::ChildrenAlive`] instead of
    /// being silently ignored.
    pub async fn dispose(&self) -> DiResult<()> {
        if self.is_disposed() {
            return Ok(());
        }

        let live_children = {
            let mut children = self.inner.children.lock().unwrap();
            children.retain(|weak| weak.upgrade().is_some());
            children
                .iter()
                .filter_map(|weak| weak.upgrade())
                .filter(|child| !child.disposed.load(Ordering::SeqCst))
                .count()
        };
        if live_children > 0 {
            return Err(DiError::ChildrenAlive(live_children));
        }

        self.inner.disposed.store(true, Ordering::SeqCst);

        // Take the bag out of the lock; hooks may take arbitrarily long.
        let mut bag = {
            let mut guard = self.inner.disposers.lock().unwrap();
            std::mem::take(&mut *guard)
        };
        bag.run_all_async_reverse().await;
        bag.run_all_sync_reverse();

        self.inner.table.write().unwrap().clear();
        self.runtime().observers.disposed();
        Ok(())
    }
}

impl ResolverCore for Injector {
    fn resolve_any(&self, token: &Token) -> DiResult<AnyArc> {
        self.resolve(token)
    }

    fn resolve_all_any(&self, token: &Token) -> DiResult<Vec<AnyArc>> {
        self.resolve_all(token)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.add_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.add_async_disposer(f);
    }
}

impl Resolver for Injector {}

impl Drop for InjectorInner {
    fn drop(&mut self) {
        if !self.disposed.load(Ordering::SeqCst) {
            if let Ok(bag) = self.disposers.try_lock() {
                if !bag.is_empty() {
                    eprintln!(
                        "[weave-di] Injector dropped with undisposed resources. Call dispose().await before dropping."
                    );
                }
            }
        }
    }
}
