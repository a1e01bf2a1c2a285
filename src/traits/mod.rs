//! Public traits: disposal, lifecycle hooks, and resolution.

mod dispose;
mod lifecycle;
mod resolver;

pub use dispose::{AsyncDispose, Dispose};
pub use lifecycle::{AsyncLifecycle, Lifecycle, LifecyclePhase};
pub use resolver::{Resolver, ResolverCore};
