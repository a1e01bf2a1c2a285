//! Binding lifetime definitions.

/// Controls instance caching for a provider.
///
/// A singleton binding constructs once per owning injector and returns the
/// same `Arc` from every subsequent resolve until that injector is
/// disposed. A transient binding constructs on every request and is never
/// cached; the container runs no disposal hooks for transients.
///
/// Request-style scoping is expressed with child injectors: register the
/// binding as a singleton in a child created per unit of work and dispose
/// the child when the work ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Single instance per owning injector, cached until disposal
    Singleton,
    /// New instance per resolution, never cached
    Transient,
}
