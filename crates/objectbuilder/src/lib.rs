//! ObjectBuilder: policy-driven построение объектов
//!
//! Запрошенный тип (и необязательный id) проходит через упорядоченную
//! цепочку strategies. Каждая strategy читает policies для (тип, id) и
//! решает, как отобразить тип, вернуть singleton, выбрать constructor,
//! заполнить properties, вызвать methods и уведомить объект. Teardown
//! прогоняет ту же цепочку в обратном порядке.
//!
//! - `builder` - [`Builder`]/[`BuilderBase`], точка входа
//! - `strategy` - trait стратегии, стадии, цепочка, build context
//! - `strategies` - стандартные strategies и их policies
//! - `policy` - [`PolicyList`] с fallback на default policy
//! - `location` - locators со слабыми ссылками и search modes
//! - `lifetime` - [`LifetimeContainer`], владеющий singletons
//! - `metadata` - описание типов вместо runtime reflection
//! - `config` - declarative configuration (TOML/YAML)

pub mod builder;
pub mod config;
pub mod errors;
pub mod guard;
pub mod keys;
pub mod lifetime;
pub mod location;
pub mod metadata;
pub mod object;
pub mod parameters;
pub mod policy;
pub mod resolver;
pub mod strategies;
pub mod strategy;
pub mod trace;

pub use builder::{Builder, BuilderBase, BuilderConfigurator};
pub use config::{BuilderConfiguration, ConfigurationLoader, MappingEntry, SingletonEntry};
pub use errors::{BuildContextExt, BuildError, BuildResult};
pub use keys::{BuildKey, TypeKey};
pub use lifetime::LifetimeContainer;
pub use location::{
    Locator, LocatorKey, ReadOnlyLocator, ReadWriteLocator, ReadableLocator, SearchMode,
};
pub use metadata::{
    Args, ConstructorInfo, DependencyMarker, Marker, MetadataProvider, MethodInfo, ParameterInfo,
    PropertyInfo, TypeDescriptor, TypeRegistry, TypeShape,
};
pub use object::{BuilderAware, Capabilities, Disposable, Object, WeakObject};
pub use parameters::{
    CloneParameter, CreationParameter, DependencyParameter, Parameter, ValueParameter,
};
pub use policy::{Policy, PolicyKind, PolicyList};
pub use resolver::{DependencyResolver, NotPresentBehavior};
pub use strategies::*;
pub use strategy::{BuildContext, BuilderStage, BuilderStrategy, Stage, StrategyChain, StrategyList};
pub use trace::{RecordingTracePolicy, TracePolicy, TracingTracePolicy};
