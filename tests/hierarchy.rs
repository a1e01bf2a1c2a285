use std::sync::{Arc, Mutex};

use weave_di::{token_of, DiError, Injector, Provider, Resolver, Token};

#[test]
fn test_child_sees_parent_bindings() {
    struct Config {
        name: &'static str,
    }

    let root = Injector::root();
    root.register(token_of::<Config>(), Provider::instance(Config { name: "root" }))
        .unwrap();

    let child = root.create_child();
    assert_eq!(child.get_required::<Config>().name, "root");
}

#[test]
fn test_child_shadowing_leaves_parent_unaffected() {
    struct Config {
        name: &'static str,
    }

    let root = Injector::root();
    root.register(token_of::<Config>(), Provider::instance(Config { name: "root" }))
        .unwrap();

    let child = root.create_child();
    child
        .register(token_of::<Config>(), Provider::instance(Config { name: "child" }))
        .unwrap();

    assert_eq!(child.get_required::<Config>().name, "child");
    assert_eq!(root.get_required::<Config>().name, "root");
}

#[test]
fn test_parent_does_not_see_child_bindings() {
    let root = Injector::root();
    let child = root.create_child();
    child
        .register(Token::name("only-child"), Provider::instance(1usize))
        .unwrap();

    assert!(child.has(&Token::name("only-child")));
    assert!(!root.has(&Token::name("only-child")));
    assert!(matches!(
        root.resolve(&Token::name("only-child")),
        Err(DiError::Unresolved(_))
    ));
}

#[test]
fn test_singleton_cached_in_owning_injector() {
    let calls = Arc::new(Mutex::new(0));
    let calls_clone = calls.clone();

    let root = Injector::root();
    root.register(
        token_of::<String>(),
        Provider::factory(move |_| {
            *calls_clone.lock().unwrap() += 1;
            Ok("shared".to_string())
        })
        .singleton(),
    )
    .unwrap();

    let child = root.create_child();
    let from_child = child.get_required::<String>();
    let from_root = root.get_required::<String>();

    // Both paths land on the parent's cache.
    assert!(Arc::ptr_eq(&from_child, &from_root));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn test_independent_roots_get_independent_singletons() {
    let make_root = || {
        let injector = Injector::root();
        injector
            .register(
                token_of::<String>(),
                Provider::factory(|_| Ok("value".to_string())).singleton(),
            )
            .unwrap();
        injector
    };

    let a = make_root();
    let b = make_root();
    assert!(!Arc::ptr_eq(
        &a.get_required::<String>(),
        &b.get_required::<String>()
    ));
}

#[test]
fn test_shadowed_singleton_has_own_cache() {
    struct Service {
        origin: &'static str,
    }

    let root = Injector::root();
    root.register(
        token_of::<Service>(),
        Provider::factory(|_| Ok(Service { origin: "root" })).singleton(),
    )
    .unwrap();

    let child = root.create_child();
    child
        .register(
            token_of::<Service>(),
            Provider::factory(|_| Ok(Service { origin: "child" })).singleton(),
        )
        .unwrap();

    let from_root = root.get_required::<Service>();
    let from_child = child.get_required::<Service>();

    assert_eq!(from_root.origin, "root");
    assert_eq!(from_child.origin, "child");
    assert!(!Arc::ptr_eq(&from_root, &from_child));
}

#[test]
fn test_fan_out_is_ancestor_first() {
    struct Plugin {
        name: &'static str,
    }

    let root = Injector::root();
    root.register(
        Token::symbol("plugin-a"),
        Provider::factory(|_| Ok(Plugin { name: "root-a" }))
            .singleton()
            .provides(Token::name("plugin")),
    )
    .unwrap();

    let child = root.create_child();
    child
        .register(
            Token::symbol("plugin-b"),
            Provider::factory(|_| Ok(Plugin { name: "child-b" }))
                .singleton()
                .provides(Token::name("plugin")),
        )
        .unwrap();

    let plugins = child.get_all_by::<Plugin>(&Token::name("plugin")).unwrap();
    let names: Vec<_> = plugins.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["root-a", "child-b"]);
}

#[test]
fn test_fan_out_shadowing_keeps_discovery_position() {
    struct Plugin {
        name: &'static str,
    }

    let shared = Token::symbol("shared-plugin");

    let root = Injector::root();
    root.register(
        shared.clone(),
        Provider::factory(|_| Ok(Plugin { name: "from-root" }))
            .singleton()
            .provides(Token::name("plugin")),
    )
    .unwrap();
    root.register(
        Token::symbol("tail-plugin"),
        Provider::factory(|_| Ok(Plugin { name: "tail" }))
            .singleton()
            .provides(Token::name("plugin")),
    )
    .unwrap();

    let child = root.create_child();
    child
        .register(
            shared.clone(),
            Provider::factory(|_| Ok(Plugin { name: "from-child" }))
                .singleton()
                .provides(Token::name("plugin")),
        )
        .unwrap();

    // The closer injector wins the shared slot but keeps the ancestor's
    // discovery position.
    let plugins = child.get_all_by::<Plugin>(&Token::name("plugin")).unwrap();
    let names: Vec<_> = plugins.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["from-child", "tail"]);
}

#[test]
fn test_assignable_search_after_direct_miss() {
    struct Codec {
        format: &'static str,
    }

    let injector = Injector::root();
    injector
        .register(
            Token::symbol("json-codec"),
            Provider::factory(|_| Ok(Codec { format: "json" }))
                .singleton()
                .provides(Token::name("codec")),
        )
        .unwrap();

    // No direct binding for "codec"; the assignable search finds the
    // advertising provider.
    let codec = injector.get_by::<Codec>(&Token::name("codec")).unwrap();
    assert_eq!(codec.format, "json");
}

#[test]
fn test_resolve_all_empty_when_nothing_matches() {
    let injector = Injector::root();
    let all = injector.resolve_all(&Token::name("nothing")).unwrap();
    assert!(all.is_empty());
}

#[test]
fn test_grandchild_resolves_through_two_levels() {
    let root = Injector::root();
    root.register(Token::name("depth"), Provider::instance(0usize))
        .unwrap();

    let child = root.create_child();
    let grandchild = child.create_child();

    assert_eq!(*grandchild.get_by::<usize>(&Token::name("depth")).unwrap(), 0);
}
