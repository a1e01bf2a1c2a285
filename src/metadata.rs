//! Declarative metadata attached to types, properties, parameters, and
//! methods.
//!
//! Declarations are made once at startup through [`TypeDecl`] builders and
//! are immutable afterwards. Facts are keyed by the exact declaration
//! site; inherited facts are merged explicitly by the registration
//! pipeline through [`MetadataRegistry::merged_query`], never implicitly.

use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::aspect::{AdviceSet, Dispatch, MethodCandidate, Pointcut};
use crate::error::{DiError, DiResult};
use crate::internal::BoxFutureUnit;
use crate::lifetime::Lifetime;
use crate::provider::{AnyArc, CtorArgs, CtorFn, SetterFn};
use crate::token::Token;
use crate::traits::{AsyncDispose, AsyncLifecycle, Dispose, Lifecycle};

/// A declaration site facts attach to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Site {
    /// The type itself
    Type(TypeId),
    /// A named property of the type
    Property(TypeId, &'static str),
    /// A constructor parameter by position
    Param(TypeId, usize),
    /// A named method of the type
    Method(TypeId, &'static str),
}

/// Kind discriminant of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    ClassRole,
    PropertyInject,
    ParamInject,
    PointcutRule,
    LifecycleMarker,
    Annotation,
}

impl FactKind {
    /// Singular kinds replace on re-attach; the rest accumulate.
    pub fn is_singular(&self) -> bool {
        matches!(self, FactKind::ClassRole)
    }
}

/// Role a declared class plays in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRole {
    /// Resolvable by its own token only
    Injectable,
    /// Also offered to the assignable-service search and resolve-all
    /// fan-out through its `provides` advertisements
    Service,
}

/// Capability binder carried by a lifecycle-marker fact.
#[derive(Clone)]
pub enum MarkerBinder {
    Lifecycle(crate::provider::LifecycleBinder),
    AsyncLifecycle(crate::provider::AsyncLifecycleBinder),
    Dispatch(crate::provider::DispatchBinder),
    Dispose(crate::provider::DisposeBinder),
    AsyncDispose(crate::provider::AsyncDisposeBinder),
}

/// A declarative fact attached to a site.
///
/// Multiple facts of the same kind accumulate in attach order; only
/// singular kinds (class-role) replace. Scalar fields merge last-one-wins,
/// set fields merge by union — see [`MetadataRegistry::merge`].
#[derive(Clone)]
pub enum Fact {
    ClassRole {
        role: Option<ClassRole>,
        lifetime: Lifetime,
        unique: bool,
        ctor: Option<CtorFn>,
        provides: Vec<Token>,
    },
    PropertyInject {
        name: &'static str,
        token: Token,
        default: Option<AnyArc>,
        setter: SetterFn,
    },
    ParamInject {
        index: usize,
        token: Token,
        default: Option<AnyArc>,
    },
    PointcutRule {
        pointcut: Pointcut,
        advices: AdviceSet,
    },
    LifecycleMarker {
        binder: MarkerBinder,
    },
    Annotation {
        name: &'static str,
    },
}

impl Fact {
    pub fn kind(&self) -> FactKind {
        match self {
            Fact::ClassRole { .. } => FactKind::ClassRole,
            Fact::PropertyInject { .. } => FactKind::PropertyInject,
            Fact::ParamInject { .. } => FactKind::ParamInject,
            Fact::PointcutRule { .. } => FactKind::PointcutRule,
            Fact::LifecycleMarker { .. } => FactKind::LifecycleMarker,
            Fact::Annotation { .. } => FactKind::Annotation,
        }
    }
}

/// Registry of declarative facts, keyed by exact declaration site.
#[derive(Default)]
pub struct MetadataRegistry {
    records: HashMap<Site, Vec<Fact>>,
    // Enumeration indices, in declaration order
    methods: HashMap<TypeId, Vec<&'static str>>,
    params: HashMap<TypeId, Vec<usize>>,
    properties: HashMap<TypeId, Vec<&'static str>>,
    inherits: HashMap<TypeId, TypeId>,
    type_names: HashMap<TypeId, &'static str>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fact at the site. Singular kinds replace any earlier fact
    /// of the same kind; other kinds accumulate in attach order.
    pub fn attach(&mut self, site: Site, fact: Fact) {
        match &site {
            Site::Method(owner, name) => {
                let methods = self.methods.entry(*owner).or_default();
                if !methods.contains(name) {
                    methods.push(name);
                }
            }
            Site::Param(owner, index) => {
                let params = self.params.entry(*owner).or_default();
                if !params.contains(index) {
                    params.push(*index);
                }
            }
            Site::Property(owner, name) => {
                let properties = self.properties.entry(*owner).or_default();
                if !properties.contains(name) {
                    properties.push(name);
                }
            }
            Site::Type(_) => {}
        }

        let facts = self.records.entry(site).or_default();
        if fact.kind().is_singular() {
            facts.retain(|f| f.kind() != fact.kind());
        }
        facts.push(fact);
    }

    /// All facts of a kind at the exact site, in attach order. Empty when
    /// nothing is attached — never an error.
    pub fn query(&self, site: &Site, kind: FactKind) -> Vec<Fact> {
        self.records
            .get(site)
            .map(|facts| facts.iter().filter(|f| f.kind() == kind).cloned().collect())
            .unwrap_or_default()
    }

    /// Records that `derived` cumulates metadata from `base`.
    pub fn set_inherits(&mut self, derived: TypeId, base: TypeId) {
        self.inherits.insert(derived, base);
    }

    pub(crate) fn set_type_name(&mut self, type_id: TypeId, name: &'static str) {
        self.type_names.insert(type_id, name);
    }

    pub fn type_name(&self, type_id: TypeId) -> Option<&'static str> {
        self.type_names.get(&type_id).copied()
    }

    /// Inheritance chain of a type, root-most ancestor first, the type
    /// itself last.
    pub fn ancestry(&self, type_id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![type_id];
        let mut current = type_id;
        while let Some(base) = self.inherits.get(&current) {
            // A declaration cycle would loop forever; stop at first repeat.
            if chain.contains(base) {
                break;
            }
            chain.push(*base);
            current = *base;
        }
        chain.reverse();
        chain
    }

    /// Facts of a kind along the ancestry for the site selected by
    /// `site_for` per ancestor, root-first. The registration pipeline
    /// merges the result.
    pub fn ancestral_query(
        &self,
        type_id: TypeId,
        kind: FactKind,
        site_for: impl Fn(TypeId) -> Site,
    ) -> Vec<Fact> {
        let mut facts = Vec::new();
        for ancestor in self.ancestry(type_id) {
            facts.extend(self.query(&site_for(ancestor), kind));
        }
        facts
    }

    /// Merged view of `query` over the ancestry chain for a type site.
    pub fn merged_query(&self, type_id: TypeId, kind: FactKind) -> Option<Fact> {
        let facts = self.ancestral_query(type_id, kind, Site::Type);
        Self::merge(kind, &facts)
    }

    /// Merge strategy: last-one-wins for scalar fields, union for set
    /// fields. Returns `None` for an empty slice.
    pub fn merge(kind: FactKind, facts: &[Fact]) -> Option<Fact> {
        let mut iter = facts.iter().filter(|f| f.kind() == kind);
        let first = iter.next()?.clone();
        Some(iter.fold(first, |acc, next| match (acc, next.clone()) {
            (
                Fact::ClassRole { role: acc_role, ctor: acc_ctor, provides: acc_provides, .. },
                Fact::ClassRole { role, lifetime, unique, ctor, mut provides },
            ) => {
                for token in acc_provides {
                    if !provides.contains(&token) {
                        provides.push(token);
                    }
                }
                Fact::ClassRole {
                    role: role.or(acc_role),
                    lifetime,
                    unique,
                    ctor: ctor.or(acc_ctor),
                    provides,
                }
            }
            (
                Fact::PointcutRule { pointcut: mut acc_pointcut, advices: acc_advices },
                Fact::PointcutRule { pointcut, advices },
            ) => {
                acc_pointcut.union(&pointcut);
                let mut merged = acc_advices;
                for advice in advices.iter() {
                    merged = merged.push_advice(advice.clone());
                }
                Fact::PointcutRule { pointcut: acc_pointcut, advices: merged }
            }
            // Remaining kinds are scalar records: the later fact wins.
            (_, next) => next,
        }))
    }

    /// Constructor parameter indices declared across the ancestry.
    pub(crate) fn param_indices(&self, type_id: TypeId) -> Vec<usize> {
        let mut indices = Vec::new();
        for ancestor in self.ancestry(type_id) {
            for index in self.params.get(&ancestor).cloned().unwrap_or_default() {
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }
        indices.sort_unstable();
        indices
    }

    /// Property names declared across the ancestry, base-first.
    pub(crate) fn property_names(&self, type_id: TypeId) -> Vec<&'static str> {
        let mut names = Vec::new();
        for ancestor in self.ancestry(type_id) {
            for name in self.properties.get(&ancestor).cloned().unwrap_or_default() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Candidate methods of a type offered to pointcut matching: declared
    /// methods across the ancestry, with class-level markers merged into
    /// each method's own.
    pub fn method_candidates(&self, type_id: TypeId) -> Vec<MethodCandidate> {
        let chain = self.ancestry(type_id);
        let owner_name = self.type_name(type_id).unwrap_or("<undeclared>");

        let mut class_annotations = Vec::new();
        for ancestor in &chain {
            for fact in self.query(&Site::Type(*ancestor), FactKind::Annotation) {
                if let Fact::Annotation { name } = fact {
                    if !class_annotations.contains(&name) {
                        class_annotations.push(name);
                    }
                }
            }
        }

        let mut method_names = Vec::new();
        for ancestor in &chain {
            for name in self.methods.get(ancestor).cloned().unwrap_or_default() {
                if !method_names.contains(&name) {
                    method_names.push(name);
                }
            }
        }

        method_names
            .into_iter()
            .map(|method| {
                let mut annotations = class_annotations.clone();
                for ancestor in &chain {
                    for fact in self.query(&Site::Method(*ancestor, method), FactKind::Annotation)
                    {
                        if let Fact::Annotation { name } = fact {
                            // `method` records its site with an empty marker.
                            if !name.is_empty() && !annotations.contains(&name) {
                                annotations.push(name);
                            }
                        }
                    }
                }
                MethodCandidate { owner: type_id, owner_name, method, annotations }
            })
            .collect()
    }
}

/// Builder attaching a type's declarative metadata, called once at
/// startup per type.
///
/// # Examples
///
/// ```
/// use weave_di::{declare, ClassRole, MetadataRegistry};
///
/// struct Greeter {
///     prefix: String,
/// }
///
/// let mut registry = MetadataRegistry::new();
/// declare::<Greeter>()
///     .role(ClassRole::Injectable)
///     .constructor(|_| Ok(Greeter { prefix: "hi".into() }))
///     .method("greet")
///     .annotate_method("greet", "Audited")
///     .commit(&mut registry);
/// ```
pub struct TypeDecl<T> {
    role: Option<ClassRole>,
    lifetime: Lifetime,
    unique: bool,
    ctor: Option<CtorFn>,
    provides: Vec<Token>,
    facts: Vec<(Site, Fact)>,
    inherits: Option<TypeId>,
    _marker: PhantomData<fn() -> T>,
}

/// Starts a declaration for `T`.
pub fn declare<T: Send + Sync + 'static>() -> TypeDecl<T> {
    TypeDecl {
        role: None,
        lifetime: Lifetime::Singleton,
        unique: false,
        ctor: None,
        provides: Vec::new(),
        facts: Vec::new(),
        inherits: None,
        _marker: PhantomData,
    }
}

impl<T: Send + Sync + 'static> TypeDecl<T> {
    fn type_id() -> TypeId {
        TypeId::of::<T>()
    }

    /// Declares the class role. Without a role the registration pipeline
    /// refuses to create a binding.
    pub fn role(mut self, role: ClassRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn singleton(mut self) -> Self {
        self.lifetime = Lifetime::Singleton;
        self
    }

    pub fn transient(mut self) -> Self {
        self.lifetime = Lifetime::Transient;
        self
    }

    /// Re-registration of this type's token becomes an error instead of an
    /// override.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The construction body. Receives resolved constructor arguments in
    /// declared parameter order.
    pub fn constructor(
        mut self,
        ctor: impl Fn(&CtorArgs<'_>) -> DiResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.ctor = Some(Arc::new(move |args| {
            Ok(Box::new(ctor(args)?) as Box<dyn std::any::Any + Send + Sync>)
        }));
        self
    }

    /// Declares the token injected at constructor parameter `index`.
    pub fn param(mut self, index: usize, token: Token) -> Self {
        self.facts.push((
            Site::Param(Self::type_id(), index),
            Fact::ParamInject { index, token, default: None },
        ));
        self
    }

    /// Like [`param`](Self::param) with a fallback used when the token has
    /// no binding anywhere.
    pub fn param_or<V: Send + Sync + 'static>(
        mut self,
        index: usize,
        token: Token,
        default: V,
    ) -> Self {
        self.facts.push((
            Site::Param(Self::type_id(), index),
            Fact::ParamInject { index, token, default: Some(Arc::new(default)) },
        ));
        self
    }

    /// Declares a property injection applied after construction, before
    /// any lifecycle hook.
    pub fn property<V: Send + Sync + 'static>(
        self,
        name: &'static str,
        token: Token,
        set: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> Self {
        self.property_fact(name, token, None, set)
    }

    /// Like [`property`](Self::property) with a fallback value.
    pub fn property_or<V: Send + Sync + 'static>(
        self,
        name: &'static str,
        token: Token,
        default: V,
        set: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> Self {
        let default: AnyArc = Arc::new(default);
        self.property_fact(name, token, Some(default), set)
    }

    fn property_fact<V: Send + Sync + 'static>(
        mut self,
        name: &'static str,
        token: Token,
        default: Option<AnyArc>,
        set: impl Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    ) -> Self {
        let setter: SetterFn = Arc::new(move |any, value| {
            let target = any
                .downcast_mut::<T>()
                .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
            let value = value
                .downcast::<V>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<V>()))?;
            set(target, value);
            Ok(())
        });
        self.facts.push((
            Site::Property(Self::type_id(), name),
            Fact::PropertyInject { name, token, default, setter },
        ));
        self
    }

    /// Declares a method so pointcut rules can match it.
    pub fn method(mut self, name: &'static str) -> Self {
        // An annotation-free method still needs its site on record; an
        // empty marker list is expressed by attaching nothing else.
        self.facts
            .push((Site::Method(Self::type_id(), name), Fact::Annotation { name: "" }));
        self
    }

    /// Attaches a declarative marker to a method.
    pub fn annotate_method(mut self, method: &'static str, marker: &'static str) -> Self {
        self.facts
            .push((Site::Method(Self::type_id(), method), Fact::Annotation { name: marker }));
        self
    }

    /// Attaches a declarative marker to the class; inherited by every
    /// method candidate.
    pub fn annotate(mut self, marker: &'static str) -> Self {
        self.facts
            .push((Site::Type(Self::type_id()), Fact::Annotation { name: marker }));
        self
    }

    /// Declares an aspect owned by this type: the rule and advices are
    /// pushed into the advisor when the type registers.
    pub fn aspect(mut self, pointcut: Pointcut, advices: AdviceSet) -> Self {
        self.facts.push((
            Site::Type(Self::type_id()),
            Fact::PointcutRule { pointcut, advices },
        ));
        self
    }

    /// Declares that this type cumulates metadata from `B`'s declaration.
    pub fn extends<B: 'static>(mut self) -> Self {
        self.inherits = Some(TypeId::of::<B>());
        self
    }

    /// Advertises an extra token this type satisfies.
    pub fn provides(mut self, token: Token) -> Self {
        if !self.provides.contains(&token) {
            self.provides.push(token);
        }
        self
    }

    /// Runs `T`'s synchronous lifecycle hooks around first construction.
    pub fn lifecycle(mut self) -> Self
    where
        T: Lifecycle,
    {
        self.facts.push((
            Site::Type(Self::type_id()),
            Fact::LifecycleMarker {
                binder: MarkerBinder::Lifecycle(Arc::new(|any: &AnyArc| {
                    any.clone().downcast::<T>().ok().map(|a| a as Arc<dyn Lifecycle>)
                })),
            },
        ));
        self
    }

    /// Runs `T`'s asynchronous lifecycle hooks; resolution must go through
    /// `resolve_async`.
    pub fn async_lifecycle(mut self) -> Self
    where
        T: AsyncLifecycle,
    {
        self.facts.push((
            Site::Type(Self::type_id()),
            Fact::LifecycleMarker {
                binder: MarkerBinder::AsyncLifecycle(Arc::new(|any: &AnyArc| {
                    any.clone().downcast::<T>().ok().map(|a| a as Arc<dyn AsyncLifecycle>)
                })),
            },
        ));
        self
    }

    /// Exposes instances through the dispatch surface for interception.
    pub fn dispatchable(mut self) -> Self
    where
        T: Dispatch,
    {
        self.facts.push((
            Site::Type(Self::type_id()),
            Fact::LifecycleMarker {
                binder: MarkerBinder::Dispatch(Arc::new(|any: &AnyArc| {
                    any.clone().downcast::<T>().ok().map(|a| a as Arc<dyn Dispatch>)
                })),
            },
        ));
        self
    }

    /// Registers committed singletons of this type for sync disposal.
    pub fn disposable(mut self) -> Self
    where
        T: Dispose,
    {
        self.facts.push((
            Site::Type(Self::type_id()),
            Fact::LifecycleMarker {
                binder: MarkerBinder::Dispose(Arc::new(|any: &AnyArc| {
                    any.clone()
                        .downcast::<T>()
                        .ok()
                        .map(|a| Box::new(move || a.dispose()) as Box<dyn FnOnce() + Send>)
                })),
            },
        ));
        self
    }

    /// Registers committed singletons of this type for async disposal.
    pub fn async_disposable(mut self) -> Self
    where
        T: AsyncDispose,
    {
        self.facts.push((
            Site::Type(Self::type_id()),
            Fact::LifecycleMarker {
                binder: MarkerBinder::AsyncDispose(Arc::new(|any: &AnyArc| {
                    any.clone().downcast::<T>().ok().map(|a| {
                        Box::new(move || {
                            Box::pin(async move { a.dispose().await }) as BoxFutureUnit
                        })
                            as Box<dyn FnOnce() -> BoxFutureUnit + Send>
                    })
                })),
            },
        ));
        self
    }

    /// Writes every collected fact into the registry.
    pub fn commit(self, registry: &mut MetadataRegistry) {
        let type_id = Self::type_id();
        registry.set_type_name(type_id, std::any::type_name::<T>());
        if let Some(base) = self.inherits {
            registry.set_inherits(type_id, base);
        }
        let has_binding_facts = self.role.is_some()
            || self.ctor.is_some()
            || self.unique
            || !self.provides.is_empty();
        if has_binding_facts {
            registry.attach(
                Site::Type(type_id),
                Fact::ClassRole {
                    role: self.role,
                    lifetime: self.lifetime,
                    unique: self.unique,
                    ctor: self.ctor,
                    provides: self.provides,
                },
            );
        }
        for (site, fact) in self.facts {
            registry.attach(site, fact);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base;
    struct Derived;

    #[test]
    fn query_on_empty_site_is_empty_not_an_error() {
        let registry = MetadataRegistry::new();
        let facts = registry.query(&Site::Type(TypeId::of::<Base>()), FactKind::Annotation);
        assert!(facts.is_empty());
    }

    #[test]
    fn facts_accumulate_in_attach_order() {
        let mut registry = MetadataRegistry::new();
        let site = Site::Type(TypeId::of::<Base>());
        registry.attach(site.clone(), Fact::Annotation { name: "first" });
        registry.attach(site.clone(), Fact::Annotation { name: "second" });

        let facts = registry.query(&site, FactKind::Annotation);
        assert_eq!(facts.len(), 2);
        assert!(matches!(facts[0], Fact::Annotation { name: "first" }));
        assert!(matches!(facts[1], Fact::Annotation { name: "second" }));
    }

    #[test]
    fn singular_kind_replaces() {
        let mut registry = MetadataRegistry::new();
        let site = Site::Type(TypeId::of::<Base>());
        registry.attach(
            site.clone(),
            Fact::ClassRole {
                role: Some(ClassRole::Injectable),
                lifetime: Lifetime::Singleton,
                unique: false,
                ctor: None,
                provides: vec![],
            },
        );
        registry.attach(
            site.clone(),
            Fact::ClassRole {
                role: Some(ClassRole::Service),
                lifetime: Lifetime::Transient,
                unique: false,
                ctor: None,
                provides: vec![],
            },
        );

        let facts = registry.query(&site, FactKind::ClassRole);
        assert_eq!(facts.len(), 1);
        assert!(matches!(facts[0], Fact::ClassRole { role: Some(ClassRole::Service), .. }));
    }

    #[test]
    fn merge_unions_provides_and_takes_last_scalars() {
        let base = Fact::ClassRole {
            role: Some(ClassRole::Service),
            lifetime: Lifetime::Singleton,
            unique: false,
            ctor: None,
            provides: vec![Token::name("base")],
        };
        let derived = Fact::ClassRole {
            role: None,
            lifetime: Lifetime::Transient,
            unique: true,
            ctor: None,
            provides: vec![Token::name("derived")],
        };

        let merged = MetadataRegistry::merge(FactKind::ClassRole, &[base, derived]).unwrap();
        match merged {
            Fact::ClassRole { role, lifetime, unique, provides, .. } => {
                assert_eq!(role, Some(ClassRole::Service));
                assert_eq!(lifetime, Lifetime::Transient);
                assert!(unique);
                assert!(provides.contains(&Token::name("base")));
                assert!(provides.contains(&Token::name("derived")));
            }
            _ => panic!("wrong fact kind"),
        }
    }

    #[test]
    fn ancestry_is_root_first() {
        let mut registry = MetadataRegistry::new();
        registry.set_inherits(TypeId::of::<Derived>(), TypeId::of::<Base>());
        assert_eq!(
            registry.ancestry(TypeId::of::<Derived>()),
            vec![TypeId::of::<Base>(), TypeId::of::<Derived>()]
        );
    }

    #[test]
    fn method_candidates_include_inherited_and_class_markers() {
        let mut registry = MetadataRegistry::new();
        registry.set_inherits(TypeId::of::<Derived>(), TypeId::of::<Base>());
        registry.set_type_name(TypeId::of::<Derived>(), "Derived");
        registry.attach(
            Site::Method(TypeId::of::<Base>(), "run"),
            Fact::Annotation { name: "Audited" },
        );
        registry.attach(
            Site::Type(TypeId::of::<Derived>()),
            Fact::Annotation { name: "Traced" },
        );

        let candidates = registry.method_candidates(TypeId::of::<Derived>());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].method, "run");
        assert_eq!(candidates[0].owner, TypeId::of::<Derived>());
        assert!(candidates[0].annotations.contains(&"Audited"));
        assert!(candidates[0].annotations.contains(&"Traced"));
    }
}
