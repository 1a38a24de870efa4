//! Циклы между singletons разрешаются через раннюю регистрацию shell

mod common;

use common::*;
use objectbuilder::{BuildError, BuildResult, Builder, LifetimeContainer, LocatorKey, ReadableLocator, TypeKey};

#[test]
fn test_singleton_cycle_shares_identity() -> BuildResult<()> {
    init_tracing();
    let log = EventLog::default();
    let builder = Builder::new(fixture_registry(&log));
    let (locator, lifetime) = scope();
    make_singleton::<NodeA>(&builder, None);
    make_singleton::<NodeB>(&builder, None);

    let a = builder.build::<NodeA>(Some(&locator), None)?;

    let b = a.read::<NodeA>().expect("NodeA should be initialized").b.clone();
    let back = b.read::<NodeB>().expect("NodeB should be initialized").a.clone();
    assert!(back.ptr_eq(&a));

    let located_b = locator
        .get(&LocatorKey::build(TypeKey::of::<NodeB>(), None))
        .expect("NodeB should be registered");
    assert!(located_b.ptr_eq(&b));

    let container = lifetime
        .read::<LifetimeContainer>()
        .expect("lifetime object should hold a container");
    assert_eq!(container.count(), 2);
    assert!(container.contains(&a));
    assert!(container.contains(&b));
    Ok(())
}

#[test]
fn test_cycle_entered_from_other_side() -> BuildResult<()> {
    init_tracing();
    let builder = Builder::new(fixture_registry(&EventLog::default()));
    let (locator, _lifetime) = scope();
    make_singleton::<NodeA>(&builder, None);
    make_singleton::<NodeB>(&builder, None);

    let b = builder.build::<NodeB>(Some(&locator), None)?;
    let a = builder.build::<NodeA>(Some(&locator), None)?;

    let inner_a = b.read::<NodeB>().expect("NodeB should be initialized").a.clone();
    assert!(inner_a.ptr_eq(&a));
    assert!(a.is_initialized());
    Ok(())
}

#[test]
fn test_failed_constructor_leaves_registered_shell() {
    init_tracing();
    let builder = Builder::new(fixture_registry(&EventLog::default()));
    let (locator, lifetime) = scope();
    make_singleton::<Repository>(&builder, None);

    // dyn Logger без mapping: constructor Repository так и не вызывается
    let error = builder
        .build::<Repository>(Some(&locator), None)
        .err()
        .expect("dyn Logger cannot be created");
    assert!(matches!(error, BuildError::CannotCreateInstance { .. }));

    let shell = locator
        .get(&LocatorKey::build(TypeKey::of::<Repository>(), None))
        .expect("shell stays registered after the failure");
    assert!(!shell.is_initialized());
    assert_eq!(
        lifetime.read::<LifetimeContainer>().map(|c| c.count()),
        Some(1)
    );
}
