use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use weave_di::{
    declare, token_of, AsyncLifecycle, ClassRole, DiError, DiResult, Injector, Lifecycle,
    Provider, Resolver, Token,
};

type Log = Arc<Mutex<Vec<&'static str>>>;

struct Booting {
    log: Log,
}

impl Lifecycle for Booting {
    fn before_init(&self) -> DiResult<()> {
        self.log.lock().unwrap().push("before_init");
        Ok(())
    }

    fn on_init(&self) -> DiResult<()> {
        self.log.lock().unwrap().push("on_init");
        Ok(())
    }

    fn after_init(&self) -> DiResult<()> {
        self.log.lock().unwrap().push("after_init");
        Ok(())
    }
}

#[test]
fn test_sync_hooks_run_in_order_before_first_return() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let injector = Injector::root();
    let l = log.clone();
    injector
        .register(
            token_of::<Booting>(),
            Provider::factory(move |_| {
                l.lock().unwrap().push("constructed");
                Ok(Booting { log: l.clone() })
            })
            .singleton()
            .with_lifecycle::<Booting>(),
        )
        .unwrap();

    let _ = injector.get_required::<Booting>();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["constructed", "before_init", "on_init", "after_init"]
    );
}

#[test]
fn test_cached_singleton_skips_hooks_on_later_resolves() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let injector = Injector::root();
    let l = log.clone();
    injector
        .register(
            token_of::<Booting>(),
            Provider::factory(move |_| Ok(Booting { log: l.clone() }))
                .singleton()
                .with_lifecycle::<Booting>(),
        )
        .unwrap();

    let a = injector.get_required::<Booting>();
    let b = injector.get_required::<Booting>();

    assert!(Arc::ptr_eq(&a, &b));
    // Three transitions total: hooks ran exactly once.
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn test_transient_runs_hooks_per_construction() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let injector = Injector::root();
    let l = log.clone();
    injector
        .register(
            token_of::<Booting>(),
            Provider::factory(move |_| Ok(Booting { log: l.clone() }))
                .transient()
                .with_lifecycle::<Booting>(),
        )
        .unwrap();

    let _ = injector.get_required::<Booting>();
    let _ = injector.get_required::<Booting>();
    assert_eq!(log.lock().unwrap().len(), 6);
}

struct Flaky {
    healthy: Arc<AtomicBool>,
}

impl Lifecycle for Flaky {
    fn on_init(&self) -> DiResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DiError::failed("init exploded"))
        }
    }
}

#[test]
fn test_failed_hook_aborts_and_nothing_is_cached() {
    let healthy = Arc::new(AtomicBool::new(false));
    let constructions = Arc::new(Mutex::new(0));

    let injector = Injector::root();
    let h = healthy.clone();
    let c = constructions.clone();
    injector
        .register(
            token_of::<Flaky>(),
            Provider::factory(move |_| {
                *c.lock().unwrap() += 1;
                Ok(Flaky { healthy: h.clone() })
            })
            .singleton()
            .with_lifecycle::<Flaky>(),
        )
        .unwrap();

    let error = injector.resolve(&token_of::<Flaky>()).unwrap_err();
    assert!(matches!(error, DiError::Lifecycle { .. }));

    // The failed instance was discarded; recovery constructs a new one.
    healthy.store(true, Ordering::SeqCst);
    let _ = injector.get_required::<Flaky>();
    let _ = injector.get_required::<Flaky>();
    assert_eq!(*constructions.lock().unwrap(), 2);
}

struct AsyncBoot {
    log: Log,
}

#[async_trait]
impl AsyncLifecycle for AsyncBoot {
    async fn before_init(&self) -> DiResult<()> {
        self.log.lock().unwrap().push("before_init");
        Ok(())
    }

    async fn on_init(&self) -> DiResult<()> {
        self.log.lock().unwrap().push("on_init");
        Ok(())
    }

    async fn after_init(&self) -> DiResult<()> {
        self.log.lock().unwrap().push("after_init");
        Ok(())
    }
}

fn register_async_boot(injector: &Injector, log: Log) {
    injector
        .register(
            token_of::<AsyncBoot>(),
            Provider::factory(move |_| Ok(AsyncBoot { log: log.clone() }))
                .singleton()
                .with_async_lifecycle::<AsyncBoot>(),
        )
        .unwrap();
}

#[test]
fn test_sync_resolve_refuses_async_hooked_binding() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let injector = Injector::root();
    register_async_boot(&injector, log);

    let error = injector.resolve(&token_of::<AsyncBoot>()).unwrap_err();
    assert!(matches!(error, DiError::AsyncLifecycle(_)));
}

#[tokio::test]
async fn test_async_hooks_awaited_before_return() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let injector = Injector::root();
    register_async_boot(&injector, log.clone());

    let value = injector.resolve_async(&token_of::<AsyncBoot>()).await.unwrap();
    assert!(value.downcast::<AsyncBoot>().is_ok());
    assert_eq!(
        *log.lock().unwrap(),
        vec!["before_init", "on_init", "after_init"]
    );
}

#[tokio::test]
async fn test_async_singleton_commits_after_hooks() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let injector = Injector::root();
    register_async_boot(&injector, log.clone());

    let first = injector.resolve_async(&token_of::<AsyncBoot>()).await.unwrap();
    // Once committed, even the sync path serves the cached value.
    let second = injector.resolve(&token_of::<AsyncBoot>()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(log.lock().unwrap().len(), 3);
}

struct FlakyAsync {
    healthy: Arc<AtomicBool>,
}

#[async_trait]
impl AsyncLifecycle for FlakyAsync {
    async fn on_init(&self) -> DiResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DiError::failed("async init exploded"))
        }
    }
}

#[tokio::test]
async fn test_failed_async_hook_discards_instance() {
    let healthy = Arc::new(AtomicBool::new(false));
    let constructions = Arc::new(Mutex::new(0));

    let injector = Injector::root();
    let h = healthy.clone();
    let c = constructions.clone();
    injector
        .register(
            token_of::<FlakyAsync>(),
            Provider::factory(move |_| {
                *c.lock().unwrap() += 1;
                Ok(FlakyAsync { healthy: h.clone() })
            })
            .singleton()
            .with_async_lifecycle::<FlakyAsync>(),
        )
        .unwrap();

    let error = injector
        .resolve_async(&token_of::<FlakyAsync>())
        .await
        .unwrap_err();
    assert!(matches!(error, DiError::Lifecycle { .. }));

    healthy.store(true, Ordering::SeqCst);
    injector.resolve_async(&token_of::<FlakyAsync>()).await.unwrap();
    assert_eq!(*constructions.lock().unwrap(), 2);
}

// Properties are injected before any hook fires.
#[test]
fn test_properties_injected_before_hooks() {
    struct Labeled {
        label: String,
        log: Log,
    }

    impl Lifecycle for Labeled {
        fn on_init(&self) -> DiResult<()> {
            assert_eq!(self.label, "from-container");
            self.log.lock().unwrap().push("on_init");
            Ok(())
        }
    }

    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let injector = Injector::root();
    injector
        .register(
            Token::name("label"),
            Provider::instance("from-container".to_string()),
        )
        .unwrap();

    let l = log.clone();
    injector
        .install(
            declare::<Labeled>()
                .role(ClassRole::Injectable)
                .constructor(move |_| Ok(Labeled { label: String::new(), log: l.clone() }))
                .property("label", Token::name("label"), |svc: &mut Labeled, v: Arc<String>| {
                    svc.label = (*v).clone();
                })
                .lifecycle(),
        )
        .unwrap();

    let labeled = injector.get_required::<Labeled>();
    assert_eq!(labeled.label, "from-container");
    assert_eq!(*log.lock().unwrap(), vec!["on_init"]);
}
