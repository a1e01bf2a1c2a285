//! Providers: the binding strategies tokens resolve through.

use std::any::{Any, TypeId};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::aspect::Dispatch;
use crate::error::{DiError, DiResult};
use crate::injector::ResolverContext;
use crate::internal::BoxFutureUnit;
use crate::lifetime::Lifetime;
use crate::token::Token;
use crate::traits::{AsyncDispose, AsyncLifecycle, Dispose, Lifecycle};

/// Type-erased shared instance, the unit of storage and exchange.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Factory signature: receives the resolver context of the current
/// resolution to pull dependencies.
pub type FactoryFn = Arc<dyn Fn(&ResolverContext) -> DiResult<AnyArc> + Send + Sync>;

pub(crate) type CtorFn =
    Arc<dyn Fn(&CtorArgs<'_>) -> DiResult<Box<dyn Any + Send + Sync>> + Send + Sync>;
pub(crate) type SetterFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), AnyArc) -> DiResult<()> + Send + Sync>;

pub(crate) type LifecycleBinder = Arc<dyn Fn(&AnyArc) -> Option<Arc<dyn Lifecycle>> + Send + Sync>;
pub(crate) type AsyncLifecycleBinder =
    Arc<dyn Fn(&AnyArc) -> Option<Arc<dyn AsyncLifecycle>> + Send + Sync>;
pub(crate) type DispatchBinder = Arc<dyn Fn(&AnyArc) -> Option<Arc<dyn Dispatch>> + Send + Sync>;
pub(crate) type DisposeBinder =
    Arc<dyn Fn(&AnyArc) -> Option<Box<dyn FnOnce() + Send>> + Send + Sync>;
pub(crate) type AsyncDisposeBinder =
    Arc<dyn Fn(&AnyArc) -> Option<Box<dyn FnOnce() -> BoxFutureUnit + Send>> + Send + Sync>;

/// Resolved constructor arguments, in declared parameter order.
pub struct CtorArgs<'a> {
    values: &'a [AnyArc],
}

impl<'a> CtorArgs<'a> {
    pub(crate) fn new(values: &'a [AnyArc]) -> Self {
        Self { values }
    }

    /// Typed access to the parameter at `index`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let any = self
            .values
            .get(index)
            .ok_or_else(|| DiError::failed(format!("missing constructor argument {}", index)))?;
        any.clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Constructor parameter: the token to resolve, with an optional fallback
/// used when no binding exists.
pub(crate) struct ParamSpec {
    pub(crate) token: Token,
    pub(crate) default: Option<AnyArc>,
}

/// Property injection: resolved after construction, applied through the
/// setter before any lifecycle hook runs.
pub(crate) struct PropertySpec {
    pub(crate) name: &'static str,
    pub(crate) token: Token,
    pub(crate) default: Option<AnyArc>,
    pub(crate) setter: SetterFn,
}

/// Metadata-driven construction recipe assembled by the registration
/// pipeline.
pub(crate) struct ConstructRecipe {
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) ctor: CtorFn,
    pub(crate) properties: Vec<PropertySpec>,
}

/// How a binding produces its value.
pub(crate) enum ProviderStrategy {
    /// Hand out an existing instance
    Instance(AnyArc),
    /// Call a factory per construction
    Factory(FactoryFn),
    /// Construct from metadata: resolve params, call ctor, inject props
    Construct(ConstructRecipe),
    /// Forward to another token
    Alias(Token),
}

/// A binding recipe: strategy, lifetime, and the optional capability
/// binders the container applies around construction.
///
/// # Examples
///
/// ```
/// use weave_di::{Injector, Provider, Resolver, Token};
///
/// let injector = Injector::root();
/// injector
///     .register(
///         Token::name("logger"),
///         Provider::factory(|_| Ok(String::from("log"))).singleton(),
///     )
///     .unwrap();
///
/// let a = injector.get_by::<String>(&Token::name("logger")).unwrap();
/// let b = injector.get_by::<String>(&Token::name("logger")).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
pub struct Provider {
    pub(crate) strategy: ProviderStrategy,
    pub(crate) lifetime: Lifetime,
    pub(crate) unique: bool,
    pub(crate) provides: Vec<Token>,
    pub(crate) owner_type: Option<TypeId>,
    pub(crate) lifecycle: Option<LifecycleBinder>,
    pub(crate) async_lifecycle: Option<AsyncLifecycleBinder>,
    pub(crate) dispatch: Option<DispatchBinder>,
    pub(crate) dispose: Option<DisposeBinder>,
    pub(crate) async_dispose: Option<AsyncDisposeBinder>,
}

impl Provider {
    fn with_strategy(strategy: ProviderStrategy, lifetime: Lifetime) -> Self {
        Self {
            strategy,
            lifetime,
            unique: false,
            provides: Vec::new(),
            owner_type: None,
            lifecycle: None,
            async_lifecycle: None,
            dispatch: None,
            dispose: None,
            async_dispose: None,
        }
    }

    /// Binds an already-built instance. Always a singleton: the same value
    /// is handed out on every resolve and no lifecycle transitions run.
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        let mut provider = Self::with_strategy(
            ProviderStrategy::Instance(Arc::new(value)),
            Lifetime::Singleton,
        );
        provider.owner_type = Some(TypeId::of::<T>());
        provider
    }

    /// Binds an existing trait object. Stored double-wrapped so
    /// [`Resolver::get_trait`](crate::Resolver::get_trait) can recover it.
    pub fn trait_instance<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::with_strategy(
            ProviderStrategy::Instance(Arc::new(value) as AnyArc),
            Lifetime::Singleton,
        )
    }

    /// Binds a factory. Transient by default; chain
    /// [`singleton`](Self::singleton) to cache the first construction.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> DiResult<T> + Send + Sync + 'static,
    {
        let mut provider = Self::with_strategy(
            ProviderStrategy::Factory(Arc::new(move |ctx| {
                Ok(Arc::new(factory(ctx)?) as AnyArc)
            })),
            Lifetime::Transient,
        );
        provider.owner_type = Some(TypeId::of::<T>());
        provider
    }

    /// Binds a factory producing a trait object.
    pub fn trait_factory<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::with_strategy(
            ProviderStrategy::Factory(Arc::new(move |ctx| {
                Ok(Arc::new(factory(ctx)?) as AnyArc)
            })),
            Lifetime::Transient,
        )
    }

    /// Binds the token as an alias: resolving it resolves `target`.
    pub fn alias(target: Token) -> Self {
        Self::with_strategy(ProviderStrategy::Alias(target), Lifetime::Transient)
    }

    pub(crate) fn construct(recipe: ConstructRecipe, owner_type: TypeId) -> Self {
        let mut provider =
            Self::with_strategy(ProviderStrategy::Construct(recipe), Lifetime::Singleton);
        provider.owner_type = Some(owner_type);
        provider
    }

    /// Caches the first constructed value in the owning injector.
    pub fn singleton(mut self) -> Self {
        self.lifetime = Lifetime::Singleton;
        self
    }

    /// Constructs fresh on every resolve.
    pub fn transient(mut self) -> Self {
        self.lifetime = Lifetime::Transient;
        self
    }

    /// Makes re-registration of the same token in the same injector fail
    /// with [`DiError::DuplicateBinding`] instead of overriding.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Advertises that this binding also satisfies `token`; picked up by
    /// the assignable-service search and resolve-all fan-out.
    pub fn provides(mut self, token: Token) -> Self {
        if !self.provides.contains(&token) {
            self.provides.push(token);
        }
        self
    }

    /// Runs `T`'s synchronous [`Lifecycle`] hooks around first
    /// construction.
    pub fn with_lifecycle<T: Lifecycle>(mut self) -> Self {
        self.lifecycle = Some(Arc::new(|any: &AnyArc| {
            any.clone().downcast::<T>().ok().map(|a| a as Arc<dyn Lifecycle>)
        }));
        self
    }

    /// Runs `T`'s [`AsyncLifecycle`] hooks around first construction;
    /// such a binding must be resolved through `resolve_async`.
    pub fn with_async_lifecycle<T: AsyncLifecycle>(mut self) -> Self {
        self.async_lifecycle = Some(Arc::new(|any: &AnyArc| {
            any.clone().downcast::<T>().ok().map(|a| a as Arc<dyn AsyncLifecycle>)
        }));
        self
    }

    /// Exposes constructed instances through the [`Dispatch`] surface so
    /// the advisor can wrap matched methods.
    pub fn with_dispatch<T: Dispatch>(mut self) -> Self {
        self.dispatch = Some(Arc::new(|any: &AnyArc| {
            any.clone().downcast::<T>().ok().map(|a| a as Arc<dyn Dispatch>)
        }));
        self
    }

    /// Registers committed singletons for synchronous disposal.
    pub fn with_dispose<T: Dispose>(mut self) -> Self {
        self.dispose = Some(Arc::new(|any: &AnyArc| {
            any.clone()
                .downcast::<T>()
                .ok()
                .map(|a| Box::new(move || a.dispose()) as Box<dyn FnOnce() + Send>)
        }));
        self
    }

    /// Registers committed singletons for asynchronous disposal.
    pub fn with_async_dispose<T: AsyncDispose>(mut self) -> Self {
        self.async_dispose = Some(Arc::new(|any: &AnyArc| {
            any.clone().downcast::<T>().ok().map(|a| {
                Box::new(move || {
                    Box::pin(async move { a.dispose().await }) as BoxFutureUnit
                }) as Box<dyn FnOnce() -> BoxFutureUnit + Send>
            })
        }));
        self
    }

    pub(crate) fn has_async_hooks(&self) -> bool {
        self.async_lifecycle.is_some()
    }
}

/// A provider installed in an injector, with its singleton slot.
pub(crate) struct Binding {
    pub(crate) provider: Provider,
    /// Set-once commit cell; at-most-once under concurrent first resolve.
    pub(crate) slot: OnceCell<AnyArc>,
}

impl Binding {
    pub(crate) fn new(provider: Provider) -> Self {
        Self { provider, slot: OnceCell::new() }
    }
}

/// Introspection view of one installed binding.
#[derive(Clone)]
pub struct BindingDescriptor {
    pub token: Token,
    pub lifetime: Lifetime,
    pub unique: bool,
    pub provides: Vec<Token>,
    pub has_lifecycle: bool,
    pub dispatchable: bool,
}

impl BindingDescriptor {
    pub(crate) fn of(token: &Token, binding: &Binding) -> Self {
        Self {
            token: token.clone(),
            lifetime: binding.provider.lifetime,
            unique: binding.provider.unique,
            provides: binding.provider.provides.clone(),
            has_lifecycle: binding.provider.lifecycle.is_some()
                || binding.provider.async_lifecycle.is_some(),
            dispatchable: binding.provider.dispatch.is_some(),
        }
    }
}
