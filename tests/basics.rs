use std::sync::{Arc, Mutex};

use weave_di::{token_of, DiError, Injector, Provider, Resolver, Token};

#[test]
fn test_instance_provider_returns_same_value() {
    struct Config {
        port: u16,
    }

    let injector = Injector::root();
    injector
        .register(token_of::<Config>(), Provider::instance(Config { port: 8080 }))
        .unwrap();

    let a = injector.get_required::<Config>();
    let b = injector.get_required::<Config>();

    assert_eq!(a.port, 8080);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_factory_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let injector = Injector::root();
    injector
        .register(token_of::<Config>(), Provider::instance(Config { port: 8080 }))
        .unwrap();
    injector
        .register(
            token_of::<Server>(),
            Provider::factory(|ctx| {
                Ok(Server {
                    config: ctx.get::<Config>()?,
                    name: "MyServer".to_string(),
                })
            })
            .singleton(),
        )
        .unwrap();

    let server = injector.get_required::<Server>();
    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn test_transient_creates_new_instances() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let injector = Injector::root();
    injector
        .register(
            token_of::<String>(),
            Provider::factory(move |_| {
                let mut c = counter_clone.lock().unwrap();
                *c += 1;
                Ok(format!("instance-{}", *c))
            }),
        )
        .unwrap();

    let a = injector.get_required::<String>();
    let b = injector.get_required::<String>();
    let c = injector.get_required::<String>();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert_eq!(*c, "instance-3");
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&b, &c));
}

// The "logger" scenario: one factory, singleton vs transient marking.
#[test]
fn test_named_factory_singleton_vs_transient() {
    struct Logger {
        id: usize,
    }

    let next = Arc::new(Mutex::new(0usize));

    let singleton_root = Injector::root();
    let next_clone = next.clone();
    singleton_root
        .register(
            Token::name("logger"),
            Provider::factory(move |_| {
                let mut n = next_clone.lock().unwrap();
                *n += 1;
                Ok(Logger { id: *n })
            })
            .singleton(),
        )
        .unwrap();

    let a = singleton_root.get_by::<Logger>(&Token::name("logger")).unwrap();
    let b = singleton_root.get_by::<Logger>(&Token::name("logger")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.id, 1);

    let transient_root = Injector::root();
    let next_clone = next.clone();
    transient_root
        .register(
            Token::name("logger"),
            Provider::factory(move |_| {
                let mut n = next_clone.lock().unwrap();
                *n += 1;
                Ok(Logger { id: *n })
            })
            .transient(),
        )
        .unwrap();

    let a = transient_root.get_by::<Logger>(&Token::name("logger")).unwrap();
    let b = transient_root.get_by::<Logger>(&Token::name("logger")).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(a.id, b.id);
}

#[test]
fn test_alias_forwards_to_target() {
    let injector = Injector::root();
    injector
        .register(Token::name("primary"), Provider::instance(7usize))
        .unwrap();
    injector
        .register(Token::name("secondary"), Provider::alias(Token::name("primary")))
        .unwrap();

    let value = injector.get_by::<usize>(&Token::name("secondary")).unwrap();
    assert_eq!(*value, 7);
}

#[test]
fn test_trait_binding() {
    trait Transport: Send + Sync {
        fn scheme(&self) -> &'static str;
    }

    struct Tcp;
    impl Transport for Tcp {
        fn scheme(&self) -> &'static str {
            "tcp"
        }
    }

    let injector = Injector::root();
    injector
        .register(
            Token::of_trait::<dyn Transport>(),
            Provider::trait_instance::<dyn Transport>(Arc::new(Tcp)),
        )
        .unwrap();

    let transport = injector.get_required_trait::<dyn Transport>();
    assert_eq!(transport.scheme(), "tcp");
}

#[test]
fn test_unresolved_token_never_silent() {
    let injector = Injector::root();
    let error = injector.resolve(&Token::name("missing")).unwrap_err();
    assert!(matches!(error, DiError::Unresolved("missing")));
}

#[test]
fn test_has_checks_without_constructing() {
    let calls = Arc::new(Mutex::new(0));
    let calls_clone = calls.clone();

    let injector = Injector::root();
    injector
        .register(
            token_of::<String>(),
            Provider::factory(move |_| {
                *calls_clone.lock().unwrap() += 1;
                Ok("built".to_string())
            })
            .singleton(),
        )
        .unwrap();

    assert!(injector.has(&token_of::<String>()));
    assert!(!injector.has(&Token::name("missing")));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn test_later_registration_overrides() {
    let injector = Injector::root();
    injector
        .register(Token::name("value"), Provider::instance(1usize))
        .unwrap();
    injector
        .register(Token::name("value"), Provider::instance(2usize))
        .unwrap();

    assert_eq!(*injector.get_by::<usize>(&Token::name("value")).unwrap(), 2);
}

#[test]
fn test_unique_binding_rejects_reregistration() {
    let injector = Injector::root();
    injector
        .register(Token::name("value"), Provider::instance(1usize).unique())
        .unwrap();

    let error = injector
        .register(Token::name("value"), Provider::instance(2usize))
        .unwrap_err();
    assert!(matches!(error, DiError::DuplicateBinding("value")));

    // The original binding is untouched.
    assert_eq!(*injector.get_by::<usize>(&Token::name("value")).unwrap(), 1);
}

#[test]
fn test_descriptors_reflect_registrations() {
    let injector = Injector::root();
    injector
        .register(Token::name("a"), Provider::instance(1usize))
        .unwrap();
    injector
        .register(
            Token::name("b"),
            Provider::factory(|_| Ok(2usize)).provides(Token::name("numbers")),
        )
        .unwrap();

    let descriptors = injector.descriptors();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].token, Token::name("a"));
    assert_eq!(descriptors[1].token, Token::name("b"));
    assert!(descriptors[1].provides.contains(&Token::name("numbers")));
}

#[test]
fn test_symbol_tokens_do_not_collide() {
    let injector = Injector::root();
    let first = Token::symbol("cache");
    let second = Token::symbol("cache");

    injector.register(first.clone(), Provider::instance(1usize)).unwrap();
    injector.register(second.clone(), Provider::instance(2usize)).unwrap();

    assert_eq!(*injector.get_by::<usize>(&first).unwrap(), 1);
    assert_eq!(*injector.get_by::<usize>(&second).unwrap(), 2);
}
