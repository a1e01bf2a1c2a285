/// Property-based tests for token identity and binding invariants.
///
/// These use proptest to generate random registration sequences and check
/// invariants that must hold for any of them.

use proptest::prelude::*;
use std::sync::Arc;

use weave_di::{Injector, Provider, Resolver, Token};

#[derive(Debug, Clone)]
struct Payload {
    id: u32,
}

proptest! {
    // Any sequence of registrations for one token: the last one wins.
    #[test]
    fn last_registration_wins(ids in prop::collection::vec(0u32..1000, 1..10)) {
        let injector = Injector::root();
        for id in &ids {
            injector
                .register(Token::name("subject"), Provider::instance(Payload { id: *id }))
                .unwrap();
        }

        let resolved = injector.get_by::<Payload>(&Token::name("subject")).unwrap();
        prop_assert_eq!(resolved.id, *ids.last().unwrap());
    }
}

proptest! {
    // A singleton factory resolves to one instance, whatever the seed.
    #[test]
    fn singleton_factory_identity(seed in 0u32..1000) {
        let injector = Injector::root();
        injector
            .register(
                Token::name("seeded"),
                Provider::factory(move |_| Ok(Payload { id: seed })).singleton(),
            )
            .unwrap();

        let a = injector.get_by::<Payload>(&Token::name("seeded")).unwrap();
        let b = injector.get_by::<Payload>(&Token::name("seeded")).unwrap();

        prop_assert_eq!(a.id, seed);
        prop_assert!(Arc::ptr_eq(&a, &b));
    }
}

proptest! {
    // Symbol tokens never collide, whatever the count.
    #[test]
    fn symbols_are_distinct(count in 1usize..32) {
        let injector = Injector::root();
        let tokens: Vec<Token> = (0..count).map(|_| Token::symbol("entry")).collect();

        for (index, token) in tokens.iter().enumerate() {
            injector
                .register(token.clone(), Provider::instance(Payload { id: index as u32 }))
                .unwrap();
        }

        for (index, token) in tokens.iter().enumerate() {
            let resolved = injector.get_by::<Payload>(token).unwrap();
            prop_assert_eq!(resolved.id, index as u32);
        }
    }
}

proptest! {
    // Fan-out preserves registration order for any provider count.
    #[test]
    fn fan_out_preserves_registration_order(count in 1usize..16) {
        let injector = Injector::root();
        for index in 0..count {
            injector
                .register(
                    Token::symbol("member"),
                    Provider::instance(Payload { id: index as u32 })
                        .provides(Token::name("members")),
                )
                .unwrap();
        }

        let all = injector.get_all_by::<Payload>(&Token::name("members")).unwrap();
        let ids: Vec<u32> = all.iter().map(|p| p.id).collect();
        let expected: Vec<u32> = (0..count as u32).collect();
        prop_assert_eq!(ids, expected);
    }
}
