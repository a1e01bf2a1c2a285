//! Token identities for binding lookup.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity used to request a binding from an injector.
///
/// Tokens are opaque and comparable; equal tokens resolve to the same
/// binding within a given injector. Three families exist: Rust type
/// identity (concrete types and traits), plain string names, and explicit
/// symbols that are unique per creation.
///
/// # Examples
///
/// ```rust
/// use weave_di::{Token, token_of};
///
/// struct Database;
///
/// let by_type = token_of::<Database>();
/// assert_eq!(by_type, token_of::<Database>());
///
/// let by_name = Token::name("logger");
/// assert_eq!(by_name, Token::name("logger"));
///
/// // Symbols are distinct even under the same label
/// let a = Token::symbol("cache");
/// let b = Token::symbol("cache");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone)]
pub enum Token {
    /// Concrete type identity with the type name kept for diagnostics
    Type(TypeId, &'static str),
    /// Trait object identity, keyed by the trait's type name
    ///
    /// Trait objects have no `TypeId` of their own, so the name is the key.
    Trait(&'static str),
    /// Plain string token ("logger", "transport", ...)
    Name(&'static str),
    /// Explicit symbol: unique per creation, label kept for diagnostics
    Symbol(&'static str, u64),
}

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

impl Token {
    /// Creates a string-named token. Equal names compare equal.
    pub fn name(name: &'static str) -> Self {
        Token::Name(name)
    }

    /// Creates a fresh symbol token. Every call yields a distinct identity,
    /// even under the same label.
    pub fn symbol(label: &'static str) -> Self {
        Token::Symbol(label, NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed))
    }

    /// Trait-object token for `dyn T`, keyed by the trait's type name.
    pub fn of_trait<T: ?Sized + 'static>() -> Self {
        Token::Trait(std::any::type_name::<T>())
    }

    /// Human-readable name for diagnostics and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Token::Type(_, name) => name,
            Token::Trait(name) => name,
            Token::Name(name) => name,
            Token::Symbol(label, _) => label,
        }
    }
}

// TypeId-only comparison on the hot path; the display string is ignored.
impl PartialEq for Token {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Type(a, _), Token::Type(b, _)) => a == b,
            (Token::Trait(a), Token::Trait(b)) => a == b,
            (Token::Name(a), Token::Name(b)) => a == b,
            (Token::Symbol(_, a), Token::Symbol(_, b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Token::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Token::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Token::Name(name) => {
                2u8.hash(state);
                name.hash(state);
            }
            Token::Symbol(_, id) => {
                3u8.hash(state);
                id.hash(state);
            }
        }
    }
}

/// Type-identity token for `T`.
#[inline(always)]
pub fn token_of<T: 'static>() -> Token {
    Token::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}
