use std::sync::Arc;

use weave_di::{token_of, DiError, Injector, Provider, Resolver, Token};

struct ServiceA;
struct ServiceB;
struct ServiceC;

#[test]
fn test_two_service_cycle_fails_fast() {
    let injector = Injector::root();
    injector
        .register(
            token_of::<ServiceA>(),
            Provider::factory(|ctx| {
                let _b = ctx.get::<ServiceB>()?;
                Ok(ServiceA)
            })
            .singleton(),
        )
        .unwrap();
    injector
        .register(
            token_of::<ServiceB>(),
            Provider::factory(|ctx| {
                let _a = ctx.get::<ServiceA>()?;
                Ok(ServiceB)
            })
            .singleton(),
        )
        .unwrap();

    let error = injector.resolve(&token_of::<ServiceA>()).unwrap_err();
    match error {
        DiError::Circular(path) => {
            assert_eq!(path.len(), 3);
            assert_eq!(path.first(), path.last());
            assert!(path.iter().any(|n| n.contains("ServiceB")));
        }
        other => panic!("expected Circular, got {}", other),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let injector = Injector::root();
    injector
        .register(
            Token::name("recursive"),
            Provider::factory(|ctx| {
                let _me: Arc<usize> = ctx.get_by(&Token::name("recursive"))?;
                Ok(1usize)
            }),
        )
        .unwrap();

    let error = injector.resolve(&Token::name("recursive")).unwrap_err();
    assert!(matches!(error, DiError::Circular(path) if path == vec!["recursive", "recursive"]));
}

#[test]
fn test_alias_cycle_is_detected() {
    let injector = Injector::root();
    injector
        .register(Token::name("a"), Provider::alias(Token::name("b")))
        .unwrap();
    injector
        .register(Token::name("b"), Provider::alias(Token::name("a")))
        .unwrap();

    let error = injector.resolve(&Token::name("a")).unwrap_err();
    assert!(matches!(error, DiError::Circular(_)));
}

#[test]
fn test_diamond_dependency_is_not_a_cycle() {
    // A depends on B and C; both depend on D. D is constructed once and
    // must not be reported as circular on the second path.
    struct D;
    struct B(#[allow(dead_code)] Arc<D>);
    struct C(#[allow(dead_code)] Arc<D>);
    struct A(#[allow(dead_code)] Arc<B>, #[allow(dead_code)] Arc<C>);

    let injector = Injector::root();
    injector
        .register(token_of::<D>(), Provider::factory(|_| Ok(D)).singleton())
        .unwrap();
    injector
        .register(
            token_of::<B>(),
            Provider::factory(|ctx| Ok(B(ctx.get::<D>()?))).singleton(),
        )
        .unwrap();
    injector
        .register(
            token_of::<C>(),
            Provider::factory(|ctx| Ok(C(ctx.get::<D>()?))).singleton(),
        )
        .unwrap();
    injector
        .register(
            token_of::<A>(),
            Provider::factory(|ctx| Ok(A(ctx.get::<B>()?, ctx.get::<C>()?))).singleton(),
        )
        .unwrap();

    assert!(injector.resolve(&token_of::<A>()).is_ok());
}

#[test]
fn test_resolution_recovers_after_cycle_error() {
    let injector = Injector::root();
    injector
        .register(
            token_of::<ServiceC>(),
            Provider::factory(|ctx| {
                let _self_ref = ctx.get::<ServiceC>()?;
                Ok(ServiceC)
            }),
        )
        .unwrap();
    injector
        .register(Token::name("healthy"), Provider::instance(1usize))
        .unwrap();

    assert!(matches!(
        injector.resolve(&token_of::<ServiceC>()),
        Err(DiError::Circular(_))
    ));
    // The failed resolution left no residue; unrelated tokens resolve.
    assert_eq!(*injector.get_by::<usize>(&Token::name("healthy")).unwrap(), 1);
}
