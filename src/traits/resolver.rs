//! Resolver traits for typed access over the type-erased container core.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::BoxFutureUnit;
use crate::provider::AnyArc;
use crate::token::{token_of, Token};
use crate::traits::{AsyncDispose, Dispose};

/// Object-safe core of service resolution.
///
/// Implemented by [`Injector`](crate::Injector) and by the
/// [`ResolverContext`](crate::ResolverContext) handed to factories. The
/// context implementation threads the per-resolution circular-detection
/// stack through nested constructions; prefer it inside factories.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single binding to its type-erased instance.
    fn resolve_any(&self, token: &Token) -> DiResult<AnyArc>;

    /// Resolves every binding matching the token, in fan-out order
    /// (ancestor-first, closer-injector-wins). Empty when nothing matches.
    fn resolve_all_any(&self, token: &Token) -> DiResult<Vec<AnyArc>>;

    /// Registers a synchronous disposal hook with the owning injector.
    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>);

    /// Registers an asynchronous disposal hook with the owning injector.
    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>);
}

/// Typed resolution sugar over [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use weave_di::{Injector, Provider, Resolver, token_of};
///
/// struct Config {
///     port: u16,
/// }
///
/// let injector = Injector::root();
/// injector
///     .register(token_of::<Config>(), Provider::instance(Config { port: 8080 }))
///     .unwrap();
///
/// let config = injector.get_required::<Config>();
/// assert_eq!(config.port, 8080);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete type registered under its type-identity token.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.get_by::<T>(&token_of::<T>())
    }

    /// Resolves a concrete type registered under an explicit token
    /// (string name, symbol, or a foreign type token).
    fn get_by<T: 'static + Send + Sync>(&self, token: &Token) -> DiResult<Arc<T>> {
        let any = self.resolve_any(token)?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a trait object registered under its trait token.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let any = self.resolve_any(&Token::of_trait::<T>())?;
        // Trait instances are stored double-wrapped as Arc<Arc<dyn T>>.
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves every binding matching the token as `T`.
    fn get_all_by<T: 'static + Send + Sync>(&self, token: &Token) -> DiResult<Vec<Arc<T>>> {
        let anys = self.resolve_all_any(token)?;
        let mut out = Vec::with_capacity(anys.len());
        for any in anys {
            out.push(
                any.downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?,
            );
        }
        Ok(out)
    }

    /// Resolves every trait binding matching the trait token.
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>>
    where
        Arc<T>: 'static,
    {
        let anys = self.resolve_all_any(&Token::of_trait::<T>())?;
        let mut out = Vec::with_capacity(anys.len());
        for any in anys {
            out.push(
                any.downcast::<Arc<T>>()
                    .map(|boxed| (*boxed).clone())
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?,
            );
        }
        Ok(out)
    }

    /// Resolves a concrete type, panicking on failure. For wiring code
    /// where a missing binding is a fatal configuration error.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait object, panicking on failure.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T>
    where
        Arc<T>: 'static,
    {
        self.get_trait::<T>().unwrap_or_else(|e| {
            panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e)
        })
    }

    /// Registers a service for synchronous disposal with the owning
    /// injector. Hooks run in reverse construction order at `dispose`.
    fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.push_sync_disposer(Box::new(move || service.dispose()));
    }

    /// Registers a service for asynchronous disposal. Async hooks run
    /// before sync hooks, also reversed.
    fn register_async_disposer<T: AsyncDispose>(&self, service: Arc<T>) {
        self.push_async_disposer(Box::new(move || {
            Box::pin(async move {
                service.dispose().await;
            })
        }));
    }
}
