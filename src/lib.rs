//! # weave-di
//!
//! Metadata-driven inversion-of-control container with an action-pipeline
//! runtime and an aspect-weaving layer.
//!
//! ## Features
//!
//! - **Hierarchical injectors**: parent/child scopes, child shadows parent,
//!   singleton caches per injector with proper disposal
//! - **Metadata-driven registration**: declare class roles, constructor
//!   parameters, property injections, and pointcut rules once at startup;
//!   the registration pipeline turns them into bindings
//! - **Extensible pipelines**: named actions with `execute(ctx, next)`;
//!   insert before/after/replace any step of the registration or
//!   resolution chain
//! - **Aspect weaving**: pointcut rules (within/without/annotation) build
//!   per-method advice chains; matched instances are wrapped in a
//!   proceeding wrapper at construction
//! - **Lifecycle hooks**: before-init/on-init/after-init around first
//!   construction, sync or async, plus LIFO disposal
//! - **Circular dependency detection**: per-resolution in-progress stack
//!   failing fast with the full path
//!
//! ## Quick Start
//!
//! ```rust
//! use weave_di::{Injector, Provider, Resolver, token_of};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let injector = Injector::root();
//! injector
//!     .register(
//!         token_of::<Database>(),
//!         Provider::instance(Database {
//!             connection_string: "postgres://localhost".to_string(),
//!         }),
//!     )
//!     .unwrap();
//! injector
//!     .register(
//!         token_of::<UserService>(),
//!         Provider::factory(|ctx| {
//!             Ok(UserService { db: ctx.get::<Database>()? })
//!         }),
//!     )
//!     .unwrap();
//!
//! let service = injector.get_required::<UserService>();
//! assert_eq!(service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Metadata-driven registration
//!
//! ```rust
//! use weave_di::{declare, ClassRole, Injector, Resolver, Token};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let injector = Injector::root();
//! injector
//!     .register(Token::name("greeting"), weave_di::Provider::instance("hello".to_string()))
//!     .unwrap();
//! injector
//!     .install(
//!         declare::<Greeter>()
//!             .role(ClassRole::Injectable)
//!             .constructor(|args| {
//!                 Ok(Greeter { greeting: (*args.get::<String>(0)?).clone() })
//!             })
//!             .param(0, Token::name("greeting")),
//!     )
//!     .unwrap();
//!
//! assert_eq!(injector.get_required::<Greeter>().greeting, "hello");
//! ```
//!
//! ## Aspect weaving
//!
//! Cross-cutting behavior attaches to methods matched by structural rules,
//! without touching the target type:
//!
//! ```rust
//! use weave_di::{
//!     declare, AdviceSet, Args, ClassRole, DiResult, Dispatch, Injector, Pointcut, token_of,
//! };
//! use std::sync::Arc;
//!
//! struct Audit;
//!
//! impl Dispatch for Audit {
//!     fn dispatch(&self, method: &'static str, _args: &Args) -> DiResult<Arc<dyn std::any::Any + Send + Sync>> {
//!         match method {
//!             "run" => Ok(Arc::new("ran".to_string())),
//!             other => Err(weave_di::DiError::failed(format!("no method {}", other))),
//!         }
//!     }
//! }
//!
//! let injector = Injector::root();
//! injector.register_aspect(
//!     Pointcut::new().annotated("Audited"),
//!     AdviceSet::new().before(|jp| {
//!         println!("audit: {}", jp.method());
//!         Ok(())
//!     }),
//! );
//! injector
//!     .install(
//!         declare::<Audit>()
//!             .role(ClassRole::Injectable)
//!             .constructor(|_| Ok(Audit))
//!             .method("run")
//!             .annotate_method("run", "Audited")
//!             .dispatchable(),
//!     )
//!     .unwrap();
//!
//! let audit = injector.get_dispatch(&token_of::<Audit>()).unwrap();
//! let out = audit.dispatch("run", &Args::empty()).unwrap();
//! assert_eq!(&*out.downcast::<String>().unwrap(), "ran");
//! ```

// Module declarations
pub mod aspect;
pub mod error;
pub mod injector;
pub mod lifetime;
pub mod metadata;
pub mod observer;
pub mod options;
pub mod pipeline;
pub mod provider;
pub mod token;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use aspect::{
    Advice, AdviceChain, AdviceFn, AdvicePhase, AdviceSet, Advised, Advisor, Args, AroundFn,
    Dispatch, Joinpoint, MethodCandidate, Pointcut, Proceed,
};
pub use error::{DiError, DiResult};
pub use injector::{Injector, ResolverContext};
pub use internal::BoxFutureUnit;
pub use lifetime::Lifetime;
pub use metadata::{declare, ClassRole, Fact, FactKind, MetadataRegistry, Site, TypeDecl};
pub use observer::{ContainerObserver, LoggingObserver};
pub use options::{Options, OptionsBuilder};
pub use pipeline::{
    action, RegistrationContext, ResolutionContext, ResolveMode, Scope,
};
pub use provider::{AnyArc, BindingDescriptor, CtorArgs, Provider};
pub use token::{token_of, Token};
pub use traits::{
    AsyncDispose, AsyncLifecycle, Dispose, Lifecycle, LifecyclePhase, Resolver, ResolverCore,
};
