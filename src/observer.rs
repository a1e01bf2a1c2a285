//! Observer seam for container events.
//!
//! No logging facade is imposed; observers receive structured events and
//! decide what to do with them. [`LoggingObserver`] writes to stderr for
//! quick diagnostics.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::DiError;
use crate::token::Token;

/// Receives container events. All methods default to no-ops so observers
/// implement only what they care about.
pub trait ContainerObserver: Send + Sync {
    /// A resolution is starting.
    fn resolving(&self, token: &Token) {
        let _ = token;
    }

    /// A resolution completed successfully.
    fn resolved(&self, token: &Token, duration: Duration) {
        let _ = (token, duration);
    }

    /// A resolution failed.
    fn resolve_failed(&self, token: &Token, error: &DiError) {
        let _ = (token, error);
    }

    /// A provider was registered.
    fn registered(&self, token: &Token) {
        let _ = token;
    }

    /// The injector was disposed.
    fn disposed(&self) {}
}

/// Stderr observer for development diagnostics.
///
/// # Examples
///
/// ```
/// use weave_di::{Injector, LoggingObserver};
/// use std::sync::Arc;
///
/// let injector = Injector::root();
/// injector.add_observer(Arc::new(LoggingObserver));
/// ```
pub struct LoggingObserver;

impl ContainerObserver for LoggingObserver {
    fn resolving(&self, token: &Token) {
        eprintln!("[weave-di] resolving {}", token.display_name());
    }

    fn resolved(&self, token: &Token, duration: Duration) {
        eprintln!(
            "[weave-di] resolved {} in {:.2}ms",
            token.display_name(),
            duration.as_secs_f64() * 1000.0
        );
    }

    fn resolve_failed(&self, token: &Token, error: &DiError) {
        eprintln!("[weave-di] failed {}: {}", token.display_name(), error);
    }

    fn registered(&self, token: &Token) {
        eprintln!("[weave-di] registered {}", token.display_name());
    }

    fn disposed(&self) {
        eprintln!("[weave-di] injector disposed");
    }
}

/// Fan-out holder living on the root runtime.
pub(crate) struct Observers {
    list: RwLock<Vec<Arc<dyn ContainerObserver>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self { list: RwLock::new(Vec::new()) }
    }

    pub(crate) fn add(&self, observer: Arc<dyn ContainerObserver>) {
        self.list.write().unwrap().push(observer);
    }

    pub(crate) fn has_observers(&self) -> bool {
        !self.list.read().unwrap().is_empty()
    }

    pub(crate) fn resolving(&self, token: &Token) {
        for observer in self.list.read().unwrap().iter() {
            observer.resolving(token);
        }
    }

    pub(crate) fn resolved(&self, token: &Token, duration: Duration) {
        for observer in self.list.read().unwrap().iter() {
            observer.resolved(token, duration);
        }
    }

    pub(crate) fn resolve_failed(&self, token: &Token, error: &DiError) {
        for observer in self.list.read().unwrap().iter() {
            observer.resolve_failed(token, error);
        }
    }

    pub(crate) fn registered(&self, token: &Token) {
        for observer in self.list.read().unwrap().iter() {
            observer.registered(token);
        }
    }

    pub(crate) fn disposed(&self) {
        for observer in self.list.read().unwrap().iter() {
            observer.disposed();
        }
    }
}
