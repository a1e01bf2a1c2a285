//! Structural predicates selecting which methods receive advice.

use std::any::TypeId;

/// A candidate method offered to pointcut matching.
///
/// Candidates are derived from the metadata registry: one per declared
/// method, with class-level annotations merged into the method's own.
#[derive(Debug, Clone)]
pub struct MethodCandidate {
    /// Type that declares the method
    pub owner: TypeId,
    /// Owner's type name, for diagnostics
    pub owner_name: &'static str,
    /// Method name
    pub method: &'static str,
    /// Declarative markers on the method plus its class
    pub annotations: Vec<&'static str>,
}

/// A structural rule over candidate methods.
///
/// A rule matches a candidate iff:
/// - `within` is empty or contains the candidate's owner, and
/// - no `without` entry contains the owner (`without` wins over `within`),
///   and
/// - `annotation`, when set, appears among the candidate's markers.
///
/// # Examples
///
/// ```
/// use weave_di::Pointcut;
///
/// struct Billing;
/// struct Reporting;
///
/// let rule = Pointcut::new()
///     .within::<Billing>()
///     .annotated("Audited");
/// ```
#[derive(Clone, Default)]
pub struct Pointcut {
    within: Vec<TypeId>,
    without: Vec<TypeId>,
    annotation: Option<&'static str>,
}

impl Pointcut {
    /// Rule with no constraints; matches every candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matching to methods declared on `T`. Additive: multiple
    /// calls widen the allowed set.
    pub fn within<T: 'static>(mut self) -> Self {
        self.within.push(TypeId::of::<T>());
        self
    }

    /// Excludes methods declared on `T`, even when `within` includes it.
    pub fn without<T: 'static>(mut self) -> Self {
        self.without.push(TypeId::of::<T>());
        self
    }

    /// Requires the method (or its class) to carry the named marker.
    pub fn annotated(mut self, annotation: &'static str) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Tests the rule against a candidate.
    pub fn matches(&self, candidate: &MethodCandidate) -> bool {
        if self.without.contains(&candidate.owner) {
            return false;
        }
        if !self.within.is_empty() && !self.within.contains(&candidate.owner) {
            return false;
        }
        match self.annotation {
            Some(marker) => candidate.annotations.contains(&marker),
            None => true,
        }
    }

    pub(crate) fn union(&mut self, other: &Pointcut) {
        for id in &other.within {
            if !self.within.contains(id) {
                self.within.push(*id);
            }
        }
        for id in &other.without {
            if !self.without.contains(id) {
                self.without.push(*id);
            }
        }
        if other.annotation.is_some() {
            self.annotation = other.annotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Matched;
    struct Other;

    fn candidate_on<T: 'static>(method: &'static str, annotations: &[&'static str]) -> MethodCandidate {
        MethodCandidate {
            owner: TypeId::of::<T>(),
            owner_name: std::any::type_name::<T>(),
            method,
            annotations: annotations.to_vec(),
        }
    }

    #[test]
    fn empty_rule_matches_everything() {
        let rule = Pointcut::new();
        assert!(rule.matches(&candidate_on::<Matched>("run", &[])));
    }

    #[test]
    fn within_limits_to_listed_types() {
        let rule = Pointcut::new().within::<Matched>();
        assert!(rule.matches(&candidate_on::<Matched>("run", &[])));
        assert!(!rule.matches(&candidate_on::<Other>("run", &[])));
    }

    #[test]
    fn without_wins_over_within() {
        let rule = Pointcut::new().within::<Matched>().without::<Matched>();
        assert!(!rule.matches(&candidate_on::<Matched>("run", &[])));
    }

    #[test]
    fn annotation_must_be_present() {
        let rule = Pointcut::new().annotated("Audited");
        assert!(rule.matches(&candidate_on::<Matched>("run", &["Audited"])));
        assert!(!rule.matches(&candidate_on::<Matched>("run", &["Traced"])));
    }
}
