//! The registration scope: turns declared metadata into a provider
//! binding.

use std::any::TypeId;

use crate::error::DiError;
use crate::injector::Injector;
use crate::lifetime::Lifetime;
use crate::metadata::{ClassRole, Fact, FactKind, MarkerBinder, MetadataRegistry, Site};
use crate::pipeline::{action, PipelineContext, Scope};
use crate::provider::{
    AsyncDisposeBinder, AsyncLifecycleBinder, ConstructRecipe, CtorFn, DisposeBinder,
    DispatchBinder, LifecycleBinder, ParamSpec, PropertySpec, Provider,
};
use crate::token::Token;

/// Draft binding assembled by the registration actions before commit.
#[derive(Default)]
pub(crate) struct BindingDraft {
    pub(crate) lifetime: Option<Lifetime>,
    pub(crate) unique: bool,
    pub(crate) ctor: Option<CtorFn>,
    pub(crate) provides: Vec<Token>,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) properties: Vec<PropertySpec>,
    pub(crate) lifecycle: Option<LifecycleBinder>,
    pub(crate) async_lifecycle: Option<AsyncLifecycleBinder>,
    pub(crate) dispatch: Option<DispatchBinder>,
    pub(crate) dispose: Option<DisposeBinder>,
    pub(crate) async_dispose: Option<AsyncDisposeBinder>,
}

/// Context shared by the registration scope's actions.
pub struct RegistrationContext {
    /// Injector the binding lands in
    pub injector: Injector,
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Token the binding registers under
    pub token: Token,
    pub(crate) draft: BindingDraft,
    /// Set by the commit action once the binding is installed
    pub committed: bool,
}

impl RegistrationContext {
    pub(crate) fn new(
        injector: Injector,
        type_id: TypeId,
        type_name: &'static str,
        token: Token,
    ) -> Self {
        Self {
            injector,
            type_id,
            type_name,
            token,
            draft: BindingDraft::default(),
            committed: false,
        }
    }

    fn with_metadata<R>(&self, read: impl FnOnce(&MetadataRegistry) -> R) -> R {
        self.injector.with_metadata(read)
    }
}

impl PipelineContext for RegistrationContext {}

/// Builds the default registration scope:
///
/// `class-role` → `param-binding` → `property-binding` →
/// `lifecycle-binding` → `pointcut-registration` → `commit-binding`.
///
/// Every action merges facts across the type's declared ancestry
/// (last-one-wins scalars, union sets) before applying them.
pub fn default_registration_scope() -> Scope<RegistrationContext> {
    let mut scope = Scope::new("registration");

    scope.use_action(action(
        "class-role",
        |ctx: &mut RegistrationContext, next| {
            let merged = ctx.with_metadata(|m| m.merged_query(ctx.type_id, FactKind::ClassRole));
            let Some(Fact::ClassRole { role, lifetime, unique, ctor, provides }) = merged else {
                return Err(DiError::failed(format!(
                    "no class-role metadata declared for {}",
                    ctx.type_name
                )));
            };
            let Some(role) = role else {
                return Err(DiError::failed(format!(
                    "no class role declared for {} (role facts along its ancestry are empty)",
                    ctx.type_name
                )));
            };
            ctx.draft.lifetime = Some(lifetime);
            ctx.draft.unique = unique;
            ctx.draft.ctor = ctor;
            // Only services advertise into the assignable search.
            if role == ClassRole::Service {
                ctx.draft.provides = provides;
            }
            next(ctx)
        },
    ));

    scope.use_action(action(
        "param-binding",
        |ctx: &mut RegistrationContext, next| {
            let params = ctx.with_metadata(|m| {
                let mut params = Vec::new();
                for index in m.param_indices(ctx.type_id) {
                    let facts = m.ancestral_query(ctx.type_id, FactKind::ParamInject, |t| {
                        Site::Param(t, index)
                    });
                    if let Some(Fact::ParamInject { token, default, .. }) =
                        MetadataRegistry::merge(FactKind::ParamInject, &facts)
                    {
                        params.push(ParamSpec { token, default });
                    }
                }
                params
            });
            ctx.draft.params = params;
            next(ctx)
        },
    ));

    scope.use_action(action(
        "property-binding",
        |ctx: &mut RegistrationContext, next| {
            let properties = ctx.with_metadata(|m| {
                let mut properties = Vec::new();
                for name in m.property_names(ctx.type_id) {
                    let facts = m.ancestral_query(ctx.type_id, FactKind::PropertyInject, |t| {
                        Site::Property(t, name)
                    });
                    if let Some(Fact::PropertyInject { name, token, default, setter }) =
                        MetadataRegistry::merge(FactKind::PropertyInject, &facts)
                    {
                        properties.push(PropertySpec { name, token, default, setter });
                    }
                }
                properties
            });
            ctx.draft.properties = properties;
            next(ctx)
        },
    ));

    scope.use_action(action(
        "lifecycle-binding",
        |ctx: &mut RegistrationContext, next| {
            let markers = ctx.with_metadata(|m| {
                m.ancestral_query(ctx.type_id, FactKind::LifecycleMarker, Site::Type)
            });
            for fact in markers {
                let Fact::LifecycleMarker { binder } = fact else { continue };
                match binder {
                    MarkerBinder::Lifecycle(b) => ctx.draft.lifecycle = Some(b),
                    MarkerBinder::AsyncLifecycle(b) => ctx.draft.async_lifecycle = Some(b),
                    MarkerBinder::Dispatch(b) => ctx.draft.dispatch = Some(b),
                    MarkerBinder::Dispose(b) => ctx.draft.dispose = Some(b),
                    MarkerBinder::AsyncDispose(b) => ctx.draft.async_dispose = Some(b),
                }
            }
            next(ctx)
        },
    ));

    scope.use_action(action(
        "pointcut-registration",
        |ctx: &mut RegistrationContext, next| {
            let rules = ctx.with_metadata(|m| {
                m.ancestral_query(ctx.type_id, FactKind::PointcutRule, Site::Type)
            });
            if !rules.is_empty() {
                let runtime = ctx.injector.runtime().clone();
                let mut advisor = runtime.advisor.write().unwrap();
                // Re-registering a type in a child scope must not double
                // its declared aspects.
                if advisor.claim_declaring_type(ctx.type_id) {
                    for fact in rules {
                        if let Fact::PointcutRule { pointcut, advices } = fact {
                            advisor.register_aspect(pointcut, advices);
                        }
                    }
                }
            }
            next(ctx)
        },
    ));

    scope.use_action(action(
        "commit-binding",
        |ctx: &mut RegistrationContext, next| {
            let ctor = ctx.draft.ctor.take().ok_or_else(|| {
                DiError::failed(format!("no constructor declared for {}", ctx.type_name))
            })?;
            let recipe = ConstructRecipe {
                params: std::mem::take(&mut ctx.draft.params),
                ctor,
                properties: std::mem::take(&mut ctx.draft.properties),
            };
            let mut provider = Provider::construct(recipe, ctx.type_id);
            provider = match ctx.draft.lifetime.unwrap_or(Lifetime::Singleton) {
                Lifetime::Singleton => provider.singleton(),
                Lifetime::Transient => provider.transient(),
            };
            if ctx.draft.unique {
                provider = provider.unique();
            }
            for token in std::mem::take(&mut ctx.draft.provides) {
                provider = provider.provides(token);
            }
            provider.lifecycle = ctx.draft.lifecycle.take();
            provider.async_lifecycle = ctx.draft.async_lifecycle.take();
            provider.dispatch = ctx.draft.dispatch.take();
            provider.dispose = ctx.draft.dispose.take();
            provider.async_dispose = ctx.draft.async_dispose.take();

            ctx.injector.register(ctx.token.clone(), provider)?;
            ctx.committed = true;
            next(ctx)
        },
    ));

    scope
}
