//! Initialization hooks driven by the injector around first construction.

use crate::error::DiResult;

/// Phases a managed instance moves through.
///
/// The injector drives every freshly constructed instance through this
/// sequence: `Constructed` → `PropertiesInjected` → `BeforeInit` →
/// `OnInit` → `AfterInit` → `Ready`, and finally `Disposed` when the
/// owning injector is torn down. Each hook phase only fires when the
/// instance implements the corresponding method; cached singletons skip
/// all phases on later resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Constructed,
    PropertiesInjected,
    BeforeInit,
    OnInit,
    AfterInit,
    Ready,
    Disposed,
}

/// Synchronous initialization hooks.
///
/// All three methods default to no-ops; implement the ones the service
/// needs. A hook returning an error aborts the resolution — the instance
/// is discarded and never cached.
///
/// Bindings opt in at registration time with
/// [`Provider::with_lifecycle`](crate::Provider::with_lifecycle), since a
/// type-erased container cannot discover trait implementations on its own.
///
/// # Examples
///
/// ```
/// use weave_di::{DiResult, Lifecycle};
///
/// struct Pool {
///     size: usize,
/// }
///
/// impl Lifecycle for Pool {
///     fn on_init(&self) -> DiResult<()> {
///         println!("warming {} connections", self.size);
///         Ok(())
///     }
/// }
/// ```
pub trait Lifecycle: Send + Sync + 'static {
    /// Runs after properties are injected, before `on_init`.
    fn before_init(&self) -> DiResult<()> {
        Ok(())
    }

    /// Main initialization step.
    fn on_init(&self) -> DiResult<()> {
        Ok(())
    }

    /// Runs after `on_init`, before the instance is handed out.
    fn after_init(&self) -> DiResult<()> {
        Ok(())
    }
}

/// Asynchronous initialization hooks.
///
/// Same contract and ordering as [`Lifecycle`], awaited sequentially by
/// `resolve_async` — each hook completes before the next starts, and all
/// complete before the instance is returned from its first construction.
/// A binding carrying these hooks cannot be resolved through the sync
/// path; `resolve` fails with `DiError::AsyncLifecycle` instead of
/// blocking.
#[async_trait::async_trait]
pub trait AsyncLifecycle: Send + Sync + 'static {
    /// Runs after properties are injected, before `on_init`.
    async fn before_init(&self) -> DiResult<()> {
        Ok(())
    }

    /// Main initialization step.
    async fn on_init(&self) -> DiResult<()> {
        Ok(())
    }

    /// Runs after `on_init`, before the instance is handed out.
    async fn after_init(&self) -> DiResult<()> {
        Ok(())
    }
}
