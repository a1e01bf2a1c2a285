use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use weave_di::{token_of, Injector, Provider, Resolver, Token};

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let injector = Injector::root();
    injector
        .register(token_of::<u64>(), Provider::instance(42u64))
        .unwrap();

    // Prime the cache
    let _ = injector.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = injector.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_transient_factory(c: &mut Criterion) {
    struct Request {
        id: u64,
    }

    let injector = Injector::root();
    injector
        .register(
            token_of::<Request>(),
            Provider::factory(|_| Ok(Request { id: 7 })),
        )
        .unwrap();

    c.bench_function("transient_factory", |b| {
        b.iter(|| {
            let v = injector.get::<Request>().unwrap();
            black_box(v.id);
        })
    });
}

fn bench_child_chain_lookup(c: &mut Criterion) {
    let root = Injector::root();
    root.register(token_of::<u64>(), Provider::instance(42u64))
        .unwrap();
    let child = root.create_child();
    let grandchild = child.create_child();

    let _ = grandchild.get::<u64>().unwrap();

    c.bench_function("grandchild_resolves_root_singleton", |b| {
        b.iter(|| {
            let v = grandchild.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_dependency_graph(c: &mut Criterion) {
    struct Config {
        url: &'static str,
    }
    struct Database {
        url: &'static str,
    }
    struct Repo {
        #[allow(dead_code)]
        db: Arc<Database>,
    }

    c.bench_function("three_level_transient_graph", |b| {
        let injector = Injector::root();
        injector
            .register(token_of::<Config>(), Provider::instance(Config { url: "mem://" }))
            .unwrap();
        injector
            .register(
                token_of::<Database>(),
                Provider::factory(|ctx| Ok(Database { url: ctx.get::<Config>()?.url })),
            )
            .unwrap();
        injector
            .register(
                token_of::<Repo>(),
                Provider::factory(|ctx| Ok(Repo { db: ctx.get::<Database>()? })),
            )
            .unwrap();

        b.iter(|| {
            let v = injector.get::<Repo>().unwrap();
            black_box(v);
        })
    });
}

fn bench_fan_out(c: &mut Criterion) {
    struct Plugin {
        #[allow(dead_code)]
        id: usize,
    }

    let injector = Injector::root();
    for id in 0..8 {
        injector
            .register(
                Token::symbol("plugin"),
                Provider::factory(move |_| Ok(Plugin { id }))
                    .singleton()
                    .provides(Token::name("plugins")),
            )
            .unwrap();
    }
    let _ = injector.get_all_by::<Plugin>(&Token::name("plugins")).unwrap();

    c.bench_function("resolve_all_eight_plugins", |b| {
        b.iter(|| {
            let v = injector.get_all_by::<Plugin>(&Token::name("plugins")).unwrap();
            black_box(v.len());
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_transient_factory,
    bench_child_chain_lookup,
    bench_dependency_graph,
    bench_fan_out
);
criterion_main!(benches);
