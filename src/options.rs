//! Typed in-memory configuration resolved through the container.
//!
//! Configuration files and parsing live in the bootstrap layer; what
//! reaches the container is an immutable, validated snapshot registered
//! as a singleton and resolved like any other binding.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::injector::{Injector, ResolverContext};
use crate::provider::Provider;
use crate::token::token_of;

type ConfigureFn<T> = Arc<dyn Fn(&ResolverContext, &mut T) + Send + Sync>;
type ValidateFn<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Immutable configuration snapshot.
///
/// Built once on first resolve of `Options<T>`, after every configure and
/// post-configure step ran and validation passed.
pub struct Options<T> {
    inner: Arc<T>,
}

impl<T> Options<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Arc::new(value) }
    }

    /// The configured snapshot.
    pub fn get(&self) -> Arc<T> {
        self.inner.clone()
    }
}

/// Builder registering `Options<T>` as a singleton factory binding.
///
/// Steps run in order on first resolve: default value, configure
/// callbacks (may pull other services), post-configure callbacks, then
/// validation. A failed validation fails the resolution — it is never
/// swallowed and nothing is cached.
///
/// # Examples
///
/// ```
/// use weave_di::{Injector, Options, OptionsBuilder, Resolver};
///
/// #[derive(Default)]
/// struct ServerConfig {
///     host: String,
///     port: u16,
/// }
///
/// let injector = Injector::root();
/// OptionsBuilder::<ServerConfig>::new()
///     .default_with(|| ServerConfig { host: "0.0.0.0".into(), port: 8080 })
///     .validate(|c| if c.port == 0 { Err("port must be set".into()) } else { Ok(()) })
///     .register(&injector)
///     .unwrap();
///
/// let options = injector.get_required::<Options<ServerConfig>>();
/// assert_eq!(options.get().port, 8080);
/// ```
pub struct OptionsBuilder<T>
where
    T: Default + Send + Sync + 'static,
{
    default_maker: Option<Arc<dyn Fn() -> T + Send + Sync>>,
    configures: Vec<ConfigureFn<T>>,
    post_configures: Vec<ConfigureFn<T>>,
    validates: Vec<ValidateFn<T>>,
}

impl<T> Default for OptionsBuilder<T>
where
    T: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OptionsBuilder<T>
where
    T: Default + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            default_maker: None,
            configures: Vec::new(),
            post_configures: Vec::new(),
            validates: Vec::new(),
        }
    }

    /// Custom initial value (otherwise `T::default()`).
    pub fn default_with(mut self, f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.default_maker = Some(Arc::new(f));
        self
    }

    /// Configuration step; runs in registration order and may resolve
    /// other services through the context.
    pub fn configure(
        mut self,
        f: impl Fn(&ResolverContext, &mut T) + Send + Sync + 'static,
    ) -> Self {
        self.configures.push(Arc::new(f));
        self
    }

    /// Runs after every configure step, for computed or normalized
    /// fields.
    pub fn post_configure(
        mut self,
        f: impl Fn(&ResolverContext, &mut T) + Send + Sync + 'static,
    ) -> Self {
        self.post_configures.push(Arc::new(f));
        self
    }

    /// Validation of the final snapshot; an error fails the resolution.
    pub fn validate(mut self, f: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.validates.push(Arc::new(f));
        self
    }

    /// Registers `Options<T>` as a singleton binding in the injector.
    pub fn register(self, injector: &Injector) -> DiResult<()> {
        let default_maker = self.default_maker;
        let configures = self.configures;
        let post_configures = self.post_configures;
        let validates = self.validates;

        let provider = Provider::factory(move |ctx| {
            let mut value = match &default_maker {
                Some(make) => make(),
                None => T::default(),
            };
            for configure in &configures {
                configure(ctx, &mut value);
            }
            for post_configure in &post_configures {
                post_configure(ctx, &mut value);
            }
            for validate in &validates {
                if let Err(message) = validate(&value) {
                    return Err(DiError::failed(format!(
                        "Options<{}> validation failed: {}",
                        std::any::type_name::<T>(),
                        message
                    )));
                }
            }
            Ok(Options::new(value))
        })
        .singleton();

        injector.register(token_of::<Options<T>>(), provider)
    }
}
