//! Action pipelines: named chain-of-responsibility steps over a shared
//! context.
//!
//! A [`Scope`] is an ordered, mutable list of [`Action`]s. Each action
//! receives the context and a `next` continuation bound to the remaining
//! chain; not invoking `next` stops the chain, which is how the resolution
//! pipeline short-circuits once a binding is found. Scopes are themselves
//! actions, so pipelines nest.

pub mod registration;
pub mod resolution;

use std::sync::Arc;

use crate::error::{DiError, DiResult};

pub use registration::{default_registration_scope, RegistrationContext};
pub use resolution::{default_resolution_scope, ResolutionContext, ResolveMode};

/// Continuation handed to an action: runs the remainder of the chain.
pub type Next<'n, C> = dyn FnMut(&mut C) -> DiResult<()> + 'n;

/// Context shared by the actions of one scope.
pub trait PipelineContext {
    /// True once the chain's goal is reached; a nested scope completing
    /// with this set does not continue its outer chain.
    fn short_circuited(&self) -> bool {
        false
    }
}

/// A named step in a pipeline.
///
/// Names identify actions for relative insertion (`use_before` /
/// `use_after` / `replace`); they are compared exactly.
pub trait Action<C: PipelineContext>: Send + Sync {
    /// Identity of this action within its scope.
    fn name(&self) -> &'static str;

    /// Executes the step. Call `next(ctx)` to continue the chain — zero or
    /// more times, normally exactly once; omit the call to stop it.
    fn execute(&self, ctx: &mut C, next: &mut Next<'_, C>) -> DiResult<()>;
}

/// Wraps a closure as a named action.
pub struct FnAction<C> {
    name: &'static str,
    #[allow(clippy::type_complexity)]
    body: Box<dyn Fn(&mut C, &mut Next<'_, C>) -> DiResult<()> + Send + Sync>,
}

/// Builds an action from a name and a closure.
///
/// # Examples
///
/// ```
/// use weave_di::pipeline::{action, PipelineContext, Scope};
///
/// struct Counter(usize);
/// impl PipelineContext for Counter {}
///
/// let mut scope = Scope::new("demo");
/// scope.use_action(action("add-one", |ctx: &mut Counter, next| {
///     ctx.0 += 1;
///     next(ctx)
/// }));
/// scope.use_action(action("double", |ctx: &mut Counter, next| {
///     ctx.0 *= 2;
///     next(ctx)
/// }));
///
/// let mut ctx = Counter(1);
/// scope.execute(&mut ctx).unwrap();
/// assert_eq!(ctx.0, 4);
/// ```
pub fn action<C: PipelineContext>(
    name: &'static str,
    body: impl Fn(&mut C, &mut Next<'_, C>) -> DiResult<()> + Send + Sync + 'static,
) -> FnAction<C> {
    FnAction { name, body: Box::new(body) }
}

impl<C: PipelineContext> Action<C> for FnAction<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, ctx: &mut C, next: &mut Next<'_, C>) -> DiResult<()> {
        (self.body)(ctx, next)
    }
}

/// An ordered sequence of actions sharing one context type.
pub struct Scope<C> {
    name: &'static str,
    actions: Vec<Arc<dyn Action<C>>>,
}

// Cheap snapshot: actions are shared, the ordering is copied. Execution
// runs on a snapshot so pipelines can be reconfigured between runs.
impl<C> Clone for Scope<C> {
    fn clone(&self) -> Self {
        Self { name: self.name, actions: self.actions.clone() }
    }
}

impl<C> std::fmt::Debug for Scope<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl<C: PipelineContext + 'static> Scope<C> {
    pub fn new(name: &'static str) -> Self {
        Self { name, actions: Vec::new() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Appends an action to the end of the chain.
    pub fn use_action(&mut self, action: impl Action<C> + 'static) -> &mut Self {
        self.actions.push(Arc::new(action));
        self
    }

    /// Inserts an action immediately before the named anchor.
    pub fn use_before(
        &mut self,
        action: impl Action<C> + 'static,
        anchor: &'static str,
    ) -> DiResult<&mut Self> {
        let position = self.position_of(anchor)?;
        self.actions.insert(position, Arc::new(action));
        Ok(self)
    }

    /// Inserts an action immediately after the named anchor.
    pub fn use_after(
        &mut self,
        action: impl Action<C> + 'static,
        anchor: &'static str,
    ) -> DiResult<&mut Self> {
        let position = self.position_of(anchor)?;
        self.actions.insert(position + 1, Arc::new(action));
        Ok(self)
    }

    /// Replaces the named anchor with another action.
    pub fn replace(
        &mut self,
        action: impl Action<C> + 'static,
        anchor: &'static str,
    ) -> DiResult<&mut Self> {
        let position = self.position_of(anchor)?;
        self.actions[position] = Arc::new(action);
        Ok(self)
    }

    /// True when the scope contains an action with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.iter().any(|a| a.name() == name)
    }

    /// Action names in execution order.
    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Runs the chain against the context.
    pub fn execute(&self, ctx: &mut C) -> DiResult<()> {
        run_from(&self.actions, 0, ctx)
    }

    fn position_of(&self, anchor: &'static str) -> DiResult<usize> {
        self.actions
            .iter()
            .position(|a| a.name() == anchor)
            .ok_or(DiError::AnchorNotFound(anchor))
    }
}

fn run_from<C: PipelineContext>(
    actions: &[Arc<dyn Action<C>>],
    index: usize,
    ctx: &mut C,
) -> DiResult<()> {
    let Some(current) = actions.get(index) else {
        return Ok(());
    };
    let mut next = |c: &mut C| run_from(actions, index + 1, c);
    current.execute(ctx, &mut next)
}

// A scope is itself an action, so pipelines nest. The inner chain runs to
// completion or short-circuit; only an un-short-circuited completion
// continues the outer chain.
impl<C: PipelineContext + 'static> Action<C> for Scope<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, ctx: &mut C, next: &mut Next<'_, C>) -> DiResult<()> {
        Scope::execute(self, ctx)?;
        if ctx.short_circuited() {
            Ok(())
        } else {
            next(ctx)
        }
    }
}
