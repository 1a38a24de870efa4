//! Builds против одного locator сериализуются, разные locators независимы

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use objectbuilder::{Builder, LifetimeContainer, Object};

const THREADS: usize = 8;

#[test]
fn test_parallel_singleton_builds_share_one_instance() {
    init_tracing();
    let builder = Arc::new(Builder::new(fixture_registry(&EventLog::default())));
    let (locator, lifetime) = scope();
    make_singleton::<ConsoleLogger>(&builder, None);

    let built: Vec<Object> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let builder = builder.clone();
                let locator = locator.clone();
                s.spawn(move || {
                    builder
                        .build::<ConsoleLogger>(Some(&locator), None)
                        .expect("singleton build should succeed")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("build thread should not panic"))
            .collect()
    });

    assert!(built.iter().all(|object| object.ptr_eq(&built[0])));
    assert_eq!(
        lifetime.read::<LifetimeContainer>().map(|c| c.count()),
        Some(1)
    );
}

#[test]
fn test_independent_locators_build_in_parallel() {
    init_tracing();
    let builder = Arc::new(Builder::new(fixture_registry(&EventLog::default())));
    make_singleton::<NodeA>(&builder, None);
    make_singleton::<NodeB>(&builder, None);

    let results: Vec<bool> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let builder = builder.clone();
                s.spawn(move || {
                    let (locator, _lifetime) = scope();
                    let a = builder
                        .build::<NodeA>(Some(&locator), None)
                        .expect("cycle build should succeed");
                    let b = a.read::<NodeA>().map(|node| node.b.clone());
                    b.and_then(|b| b.read::<NodeB>().map(|node| node.a.ptr_eq(&a)))
                        .unwrap_or(false)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("build thread should not panic"))
            .collect()
    });

    assert_eq!(results, vec![true; THREADS]);
}
