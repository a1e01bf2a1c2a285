//! Disposal traits for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this for services that need structured teardown (flushing
/// caches, closing handles). When the owning injector is disposed, hooks
/// run in reverse construction order. Committed singletons implementing
/// this trait are picked up automatically when their provider was built
/// with `with_dispose`; factories can also register instances explicitly
/// through [`Resolver::register_disposer`](crate::Resolver::register_disposer).
///
/// # Examples
///
/// ```
/// use weave_di::Dispose;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous resource disposal.
///
/// For services requiring async teardown (graceful connection shutdown,
/// async I/O flush). Async hooks run before sync hooks, both in reverse
/// construction order, and `Injector::dispose` awaits each one.
///
/// # Examples
///
/// ```
/// use weave_di::AsyncDispose;
/// use async_trait::async_trait;
///
/// struct Client {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for Client {
///     async fn dispose(&self) {
///         println!("Closing connection: {}", self.connection_id);
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}
