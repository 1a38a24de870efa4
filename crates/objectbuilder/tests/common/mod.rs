//! Общие fixtures для integration tests:
//! - tracing subscriber для тестов
//! - набор типов с metadata (logger, repository, service, циклы, tracked)
//! - locator + lifetime container scope

#![allow(dead_code)]

use std::sync::Arc;

use objectbuilder::{
    Builder, BuilderAware, ConstructorInfo, Disposable, Locator, Marker, MethodInfo, Object,
    PropertyInfo, SingletonPolicy, TypeDescriptor, TypeKey, TypeRegistry,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub trait Logger: Send + Sync {
    fn prefix(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleLogger {
    pub prefix: String,
}

impl Logger for ConsoleLogger {
    fn prefix(&self) -> &str {
        &self.prefix
    }
}

pub struct Repository {
    pub logger: Object,
}

pub struct Service {
    pub repository: Object,
    pub name: String,
    pub retries: i32,
    pub attached: Option<Object>,
}

pub struct NodeA {
    pub b: Object,
}

pub struct NodeB {
    pub a: Object,
}

/// Тип с read-only property, помеченной для injection
pub struct Frozen {
    pub value: i32,
}

/// Журнал событий BuilderAware/Disposable объектов
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn push(&self, event: String) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

pub struct Tracked {
    pub label: String,
    log: EventLog,
}

impl BuilderAware for Tracked {
    fn on_built_up(&mut self, id: Option<&str>) {
        self.label = id.unwrap_or("default").to_string();
        self.log.push(format!("built:{}", self.label));
    }

    fn on_tearing_down(&mut self) {
        self.log.push(format!("tearing_down:{}", self.label));
    }
}

impl Disposable for Tracked {
    fn dispose(&mut self) {
        self.log.push(format!("disposed:{}", self.label));
    }
}

/// Registry со всеми fixture типами
pub fn fixture_registry(log: &EventLog) -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();

    registry.register(TypeDescriptor::abstract_type::<dyn Logger>().named("Logger"));
    registry.register(
        TypeDescriptor::class::<ConsoleLogger>()
            .named("ConsoleLogger")
            .constructor(ConstructorInfo::new(|_| {
                Ok(ConsoleLogger {
                    prefix: "console".to_string(),
                })
            }))
            .implements::<dyn Logger>(|logger| logger)
            .cloneable(),
    );

    registry.register(
        TypeDescriptor::class::<Repository>()
            .named("Repository")
            .constructor(
                ConstructorInfo::new(|args| {
                    Ok(Repository {
                        logger: args.object(0)?,
                    })
                })
                .param::<dyn Logger>("logger"),
            ),
    );

    registry.register(
        TypeDescriptor::class::<Service>()
            .named("Service")
            .constructor(
                ConstructorInfo::new(|args| {
                    Ok(Service {
                        repository: args.object(0)?,
                        name: String::new(),
                        retries: -1,
                        attached: None,
                    })
                })
                .param::<Repository>("repository"),
            )
            .property(
                PropertyInfo::writable::<Service, String, _>("name", |service, value| {
                    service.name = value.and_then(|v| v.get::<String>()).unwrap_or_default();
                    Ok(())
                })
                .marker(Marker::value("primary".to_string())),
            )
            .property(
                PropertyInfo::writable::<Service, i32, _>("retries", |service, value| {
                    service.retries = value.and_then(|v| v.get::<i32>()).unwrap_or(-1);
                    Ok(())
                })
                .marker(Marker::dependency()),
            )
            .method(
                MethodInfo::new::<Service, _>("attach", |service, args| {
                    service.attached = Some(args.object(0)?);
                    Ok(())
                })
                .param::<ConsoleLogger>("logger")
                .injection_method(),
            ),
    );

    registry.register(
        TypeDescriptor::class::<NodeA>().named("NodeA").constructor(
            ConstructorInfo::new(|args| Ok(NodeA { b: args.object(0)? })).param::<NodeB>("b"),
        ),
    );
    registry.register(
        TypeDescriptor::class::<NodeB>().named("NodeB").constructor(
            ConstructorInfo::new(|args| Ok(NodeB { a: args.object(0)? })).param::<NodeA>("a"),
        ),
    );

    registry.register(
        TypeDescriptor::class::<Frozen>()
            .named("Frozen")
            .constructor(ConstructorInfo::new(|_| Ok(Frozen { value: 1 })))
            .property(PropertyInfo::read_only::<i32>("value").marker(Marker::dependency())),
    );

    let tracked_log = log.clone();
    registry.register(
        TypeDescriptor::class::<Tracked>()
            .named("Tracked")
            .constructor(ConstructorInfo::new(move |_| {
                Ok(Tracked {
                    label: String::new(),
                    log: tracked_log.clone(),
                })
            }))
            .builder_aware()
            .disposable(),
    );

    Arc::new(registry)
}

/// Locator с lifetime container; handle container'а держит scope живым
pub fn scope() -> (Locator, Object) {
    let locator = Locator::new();
    let lifetime = locator
        .add_lifetime_container(Default::default())
        .expect("lifetime container registration should succeed");
    (locator, lifetime)
}

pub fn make_singleton<T: ?Sized + 'static>(builder: &Builder, id: Option<&str>) {
    builder
        .policies()
        .set(Arc::new(SingletonPolicy::new(true)), &TypeKey::of::<T>(), id);
}
