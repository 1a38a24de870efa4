//! Metadata: явное описание типов вместо runtime reflection.
//!
//! Reflection strategies читают constructors/properties/methods и их
//! parameter markers через [`MetadataProvider`]. Поставляемая реализация -
//! [`TypeRegistry`], обычная таблица регистраций.
//!
//! ```ignore
//! registry.register(
//!     TypeDescriptor::class::<Service>()
//!         .constructor(ConstructorInfo::new(|args| Ok(Service::new(args.object(0)?))).param::<Repo>("repo"))
//!         .implements::<dyn Api>(|s| s)
//!         .disposable(),
//! );
//! ```

mod registry;

pub use registry::TypeRegistry;

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;

use crate::errors::{BuildError, BuildResult};
use crate::keys::TypeKey;
use crate::location::SearchMode;
use crate::object::{BuilderAware, Capabilities, Disposable, DynValue, Object};
use crate::resolver::NotPresentBehavior;

/// Источник метаданных о типах
pub trait MetadataProvider: Send + Sync {
    fn describe(&self, type_key: &TypeKey) -> Option<Arc<TypeDescriptor>>;

    /// Поиск типа по имени регистрации (для declarative configuration)
    fn find_by_name(&self, name: &str) -> Option<TypeKey>;

    /// Можно ли использовать значение типа `provided` там, где ожидается `target`
    fn is_assignable(&self, target: &TypeKey, provided: &TypeKey) -> bool {
        if target == provided {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([*provided]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(descriptor) = self.describe(&current) else {
                continue;
            };
            for base in descriptor.implements() {
                if base == target {
                    return true;
                }
                queue.push_back(*base);
            }
        }
        false
    }

    /// Выделить storage для типа без вызова constructor
    fn allocate(&self, type_key: &TypeKey) -> BuildResult<Object> {
        match self.describe(type_key) {
            Some(descriptor) => descriptor.allocate(),
            None => Err(BuildError::cannot_create(
                type_key.name(),
                "type is not registered with the metadata provider",
            )),
        }
    }

    /// Прикрепить capabilities к объекту, пришедшему снаружи pipeline
    fn attach_capabilities(&self, object: &Object) {
        if object.capabilities().is_none() {
            if let Some(descriptor) = self.describe(&object.type_key()) {
                object.attach_capabilities(descriptor.capabilities().clone());
            }
        }
    }
}

/// Форма типа с точки зрения allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// Shell без значения, требует constructor
    Class,
    /// Аллоцируется через `Default`, constructor не обязателен
    Value,
    /// Trait object или иная abstraction; не аллоцируется
    Abstract,
}

/// Declarative marker на parameter/property: откуда брать значение
#[derive(Clone)]
pub enum Marker {
    Dependency(DependencyMarker),
    /// Всегда новый экземпляр под свежим уникальным id
    CreateNew,
    /// Константа
    Value(Object),
}

impl Marker {
    pub fn dependency() -> Self {
        Marker::Dependency(DependencyMarker::default())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Marker::Dependency(DependencyMarker::default().name(name))
    }

    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Marker::Value(Object::new(value))
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Dependency(dependency) => f.debug_tuple("Dependency").field(dependency).finish(),
            Marker::CreateNew => f.write_str("CreateNew"),
            Marker::Value(object) => f.debug_tuple("Value").field(&object.type_key()).finish(),
        }
    }
}

/// Параметры dependency marker; по умолчанию: без имени, CreateNew, SearchMode::Up
#[derive(Debug, Clone, Default)]
pub struct DependencyMarker {
    pub name: Option<String>,
    pub create_type: Option<TypeKey>,
    pub not_present: NotPresentBehavior,
    pub search_mode: SearchMode,
}

impl DependencyMarker {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn create_type<T: ?Sized + 'static>(mut self) -> Self {
        self.create_type = Some(TypeKey::of::<T>());
        self
    }

    pub fn not_present(mut self, behavior: NotPresentBehavior) -> Self {
        self.not_present = behavior;
        self
    }

    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }
}

impl From<DependencyMarker> for Marker {
    fn from(marker: DependencyMarker) -> Self {
        Marker::Dependency(marker)
    }
}

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    name: String,
    type_key: TypeKey,
    markers: Vec<Marker>,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, type_key: TypeKey) -> Self {
        Self {
            name: name.into(),
            type_key,
            markers: Vec::new(),
        }
    }

    pub fn of<P: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(name, TypeKey::of::<P>())
    }

    pub fn marker(mut self, marker: impl Into<Marker>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// Аргументы, передаваемые в host constructor/method closures
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<Option<Object>>,
}

impl Args {
    pub fn new(values: Vec<Option<Object>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn optional(&self, index: usize) -> Option<Object> {
        self.get(index).cloned()
    }

    pub fn object(&self, index: usize) -> anyhow::Result<Object> {
        self.optional(index)
            .ok_or_else(|| anyhow!("argument {} is missing or null", index))
    }

    pub fn value<T: Any + Clone>(&self, index: usize) -> anyhow::Result<T> {
        let object = self.object(index)?;
        object.get::<T>().ok_or_else(|| {
            anyhow!(
                "argument {} of type {} cannot be read as {}",
                index,
                object.type_key(),
                std::any::type_name::<T>()
            )
        })
    }
}

pub type ConstructorFn = Arc<dyn Fn(&Args) -> anyhow::Result<DynValue> + Send + Sync>;
pub type SetterFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Option<Object>) -> anyhow::Result<()> + Send + Sync>;
pub type MethodFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), &Args) -> anyhow::Result<()> + Send + Sync>;

pub struct ConstructorInfo {
    produces: TypeKey,
    parameters: Vec<ParameterInfo>,
    injection: bool,
    invoke: ConstructorFn,
}

impl ConstructorInfo {
    pub fn new<T, F>(constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Args) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            produces: TypeKey::of::<T>(),
            parameters: Vec::new(),
            injection: false,
            invoke: Arc::new(move |args: &Args| -> anyhow::Result<DynValue> {
                Ok(Box::new(constructor(args)?))
            }),
        }
    }

    pub fn param<P: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterInfo::of::<P>(name))
    }

    pub fn param_with<P: ?Sized + 'static>(
        self,
        name: impl Into<String>,
        marker: impl Into<Marker>,
    ) -> Self {
        self.parameter(ParameterInfo::of::<P>(name).marker(marker))
    }

    pub fn parameter(mut self, parameter: ParameterInfo) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Пометить constructor как выбранный для injection
    pub fn injection_constructor(mut self) -> Self {
        self.injection = true;
        self
    }

    pub fn produces(&self) -> TypeKey {
        self.produces
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn parameter_types(&self) -> Vec<TypeKey> {
        self.parameters.iter().map(ParameterInfo::type_key).collect()
    }

    pub fn is_injection_constructor(&self) -> bool {
        self.injection
    }

    pub(crate) fn invoke(&self, args: &Args) -> anyhow::Result<DynValue> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("produces", &self.produces)
            .field("parameters", &self.parameters)
            .field("injection", &self.injection)
            .finish()
    }
}

pub struct PropertyInfo {
    name: String,
    type_key: TypeKey,
    markers: Vec<Marker>,
    setter: Option<SetterFn>,
}

impl PropertyInfo {
    pub fn writable<T, P, F>(name: impl Into<String>, setter: F) -> Self
    where
        T: Any,
        P: ?Sized + 'static,
        F: Fn(&mut T, Option<Object>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let property = name.clone();
        let setter: SetterFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), value: Option<Object>| -> anyhow::Result<()> {
                let target = target.downcast_mut::<T>().ok_or_else(|| {
                    anyhow!(
                        "property '{}' belongs to {}",
                        property,
                        std::any::type_name::<T>()
                    )
                })?;
                setter(target, value)
            },
        );
        Self {
            name,
            type_key: TypeKey::of::<P>(),
            markers: Vec::new(),
            setter: Some(setter),
        }
    }

    pub fn read_only<P: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_key: TypeKey::of::<P>(),
            markers: Vec::new(),
            setter: None,
        }
    }

    pub fn marker(mut self, marker: impl Into<Marker>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Как parameter: для reflection strategies property = один parameter
    pub fn as_parameter(&self) -> ParameterInfo {
        ParameterInfo {
            name: self.name.clone(),
            type_key: self.type_key,
            markers: self.markers.clone(),
        }
    }

    pub(crate) fn set(
        &self,
        target: &mut (dyn Any + Send + Sync),
        value: Option<Object>,
    ) -> anyhow::Result<()> {
        match &self.setter {
            Some(setter) => setter(target, value),
            None => Err(anyhow!("property '{}' is read-only", self.name)),
        }
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("type", &self.type_key)
            .field("markers", &self.markers)
            .field("writable", &self.is_writable())
            .finish()
    }
}

pub struct MethodInfo {
    name: String,
    parameters: Vec<ParameterInfo>,
    injection: bool,
    invoke: MethodFn,
}

impl MethodInfo {
    pub fn new<T, F>(name: impl Into<String>, method: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let method_name = name.clone();
        let invoke: MethodFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), args: &Args| -> anyhow::Result<()> {
                let target = target.downcast_mut::<T>().ok_or_else(|| {
                    anyhow!(
                        "method '{}' belongs to {}",
                        method_name,
                        std::any::type_name::<T>()
                    )
                })?;
                method(target, args)
            },
        );
        Self {
            name,
            parameters: Vec::new(),
            injection: false,
            invoke,
        }
    }

    pub fn param<P: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterInfo::of::<P>(name))
    }

    pub fn param_with<P: ?Sized + 'static>(
        self,
        name: impl Into<String>,
        marker: impl Into<Marker>,
    ) -> Self {
        self.parameter(ParameterInfo::of::<P>(name).marker(marker))
    }

    pub fn parameter(mut self, parameter: ParameterInfo) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Метод вызывается автоматически после создания объекта
    pub fn injection_method(mut self) -> Self {
        self.injection = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn parameter_types(&self) -> Vec<TypeKey> {
        self.parameters.iter().map(ParameterInfo::type_key).collect()
    }

    pub fn is_injection_method(&self) -> bool {
        self.injection
    }

    pub(crate) fn invoke(
        &self,
        target: &mut (dyn Any + Send + Sync),
        args: &Args,
    ) -> anyhow::Result<()> {
        (self.invoke)(target, args)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("injection", &self.injection)
            .finish()
    }
}

/// Полное описание типа для pipeline
pub struct TypeDescriptor {
    type_key: TypeKey,
    shape: TypeShape,
    registered_name: String,
    implements: Vec<TypeKey>,
    constructors: Vec<Arc<ConstructorInfo>>,
    properties: Vec<Arc<PropertyInfo>>,
    methods: Vec<Arc<MethodInfo>>,
    capabilities: Arc<Capabilities>,
    default_value: Option<fn() -> DynValue>,
}

fn default_value<T: Default + Any + Send + Sync>() -> DynValue {
    Box::new(T::default())
}

impl TypeDescriptor {
    fn empty(type_key: TypeKey, shape: TypeShape) -> Self {
        Self {
            type_key,
            shape,
            registered_name: type_key.name().to_string(),
            implements: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            capabilities: Arc::new(Capabilities::new()),
            default_value: None,
        }
    }

    pub fn class<T: Any + Send + Sync>() -> TypeBuilder<T> {
        TypeBuilder::new(Self::empty(TypeKey::of::<T>(), TypeShape::Class))
    }

    pub fn value<T: Any + Send + Sync + Default>() -> TypeBuilder<T> {
        let mut descriptor = Self::empty(TypeKey::of::<T>(), TypeShape::Value);
        descriptor.default_value = Some(default_value::<T>);
        TypeBuilder::new(descriptor)
    }

    pub fn abstract_type<T: ?Sized + 'static>() -> Self {
        Self::empty(TypeKey::of::<T>(), TypeShape::Abstract)
    }

    /// Abstraction, которая сама расширяет другую (`dyn Admin` -> `dyn User`)
    pub fn extends<U: ?Sized + 'static>(mut self) -> Self {
        self.implements.push(TypeKey::of::<U>());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.registered_name = name.into();
        self
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    pub fn registered_name(&self) -> &str {
        &self.registered_name
    }

    pub fn implements(&self) -> &[TypeKey] {
        &self.implements
    }

    pub fn constructors(&self) -> &[Arc<ConstructorInfo>] {
        &self.constructors
    }

    pub fn properties(&self) -> &[Arc<PropertyInfo>] {
        &self.properties
    }

    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    pub fn capabilities(&self) -> &Arc<Capabilities> {
        &self.capabilities
    }

    /// Constructor с точно совпадающими типами parameters
    pub fn find_constructor(&self, parameter_types: &[TypeKey]) -> Option<Arc<ConstructorInfo>> {
        self.constructors
            .iter()
            .find(|ctor| ctor.parameter_types() == parameter_types)
            .cloned()
    }

    pub fn find_property(&self, name: &str) -> Option<Arc<PropertyInfo>> {
        self.properties
            .iter()
            .find(|property| property.name() == name)
            .cloned()
    }

    pub fn find_method(&self, name: &str, parameter_types: &[TypeKey]) -> Option<Arc<MethodInfo>> {
        self.methods
            .iter()
            .find(|method| method.name() == name && method.parameter_types() == parameter_types)
            .cloned()
    }

    /// Выделение storage без вызова constructor
    pub fn allocate(&self) -> BuildResult<Object> {
        let object = match self.shape {
            TypeShape::Abstract => {
                return Err(BuildError::cannot_create(
                    self.type_key.name(),
                    "abstract types cannot be allocated",
                ))
            }
            TypeShape::Class => Object::uninitialized(self.type_key),
            TypeShape::Value => {
                let make = self.default_value.ok_or_else(|| {
                    BuildError::cannot_create(self.type_key.name(), "value type has no default")
                })?;
                Object::from_boxed(self.type_key, make())?
            }
        };
        object.attach_capabilities(self.capabilities.clone());
        Ok(object)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.type_key)
            .field("shape", &self.shape)
            .field("name", &self.registered_name)
            .field("implements", &self.implements)
            .field("constructors", &self.constructors.len())
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Typed builder для [`TypeDescriptor`] конкретного типа
pub struct TypeBuilder<T> {
    descriptor: TypeDescriptor,
    capabilities: Capabilities,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
    fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            capabilities: Capabilities::new(),
            _marker: PhantomData,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.descriptor.registered_name = name.into();
        self
    }

    pub fn constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.descriptor.constructors.push(Arc::new(constructor));
        self
    }

    pub fn property(mut self, property: PropertyInfo) -> Self {
        self.descriptor.properties.push(Arc::new(property));
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.descriptor.methods.push(Arc::new(method));
        self
    }

    /// Объявить view `&T -> &U`; заодно делает `T` assignable к `U`
    pub fn implements<U: ?Sized + 'static>(mut self, view: fn(&T) -> &U) -> Self {
        self.descriptor.implements.push(TypeKey::of::<U>());
        self.capabilities = self.capabilities.with_view(view);
        self
    }

    pub fn disposable(mut self) -> Self
    where
        T: Disposable,
    {
        self.capabilities = self.capabilities.with_dispose::<T>();
        self
    }

    pub fn builder_aware(mut self) -> Self
    where
        T: BuilderAware,
    {
        self.capabilities = self.capabilities.with_builder_aware::<T>();
        self
    }

    pub fn cloneable(mut self) -> Self
    where
        T: Clone,
    {
        self.capabilities = self.capabilities.with_clone::<T>();
        self
    }

    pub fn build(self) -> TypeDescriptor {
        let mut descriptor = self.descriptor;
        descriptor.capabilities = Arc::new(self.capabilities);
        descriptor
    }
}

impl<T: Any + Send + Sync> From<TypeBuilder<T>> for TypeDescriptor {
    fn from(builder: TypeBuilder<T>) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn area(&self) -> f64;
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Square {
        side: f64,
    }

    impl Shape for Square {
        fn area(&self) -> f64 {
            self.side * self.side
        }
    }

    fn square_descriptor() -> TypeDescriptor {
        TypeDescriptor::class::<Square>()
            .constructor(ConstructorInfo::new(|_| Ok(Square { side: 1.0 })))
            .constructor(
                ConstructorInfo::new(|args| {
                    Ok(Square {
                        side: args.value::<f64>(0)?,
                    })
                })
                .param::<f64>("side"),
            )
            .property(PropertyInfo::writable::<Square, f64, _>("side", |s, v| {
                s.side = v.and_then(|v| v.get::<f64>()).unwrap_or_default();
                Ok(())
            }))
            .property(PropertyInfo::read_only::<f64>("area"))
            .method(
                MethodInfo::new::<Square, _>("grow", |s, args| {
                    s.side += args.value::<f64>(0)?;
                    Ok(())
                })
                .param::<f64>("by"),
            )
            .implements::<dyn Shape>(|s| s)
            .cloneable()
            .build()
    }

    #[test]
    fn test_find_members_by_signature() {
        let descriptor = square_descriptor();
        let f64_key = TypeKey::of::<f64>();

        assert!(descriptor.find_constructor(&[]).is_some());
        assert!(descriptor.find_constructor(&[f64_key]).is_some());
        assert!(descriptor.find_constructor(&[f64_key, f64_key]).is_none());

        assert!(descriptor.find_property("side").map(|p| p.is_writable()).unwrap_or(false));
        assert!(!descriptor.find_property("area").map(|p| p.is_writable()).unwrap_or(true));
        assert!(descriptor.find_method("grow", &[f64_key]).is_some());
        assert!(descriptor.find_method("grow", &[]).is_none());
    }

    #[test]
    fn test_allocation_by_shape() {
        let class = square_descriptor().allocate().expect("class allocation should succeed");
        assert!(!class.is_initialized());
        assert!(class.capabilities().map(|c| c.is_cloneable()).unwrap_or(false));

        let value = TypeDescriptor::value::<u32>()
            .build()
            .allocate()
            .expect("value allocation should succeed");
        assert_eq!(value.get::<u32>(), Some(0));

        let error = TypeDescriptor::abstract_type::<dyn Shape>()
            .allocate()
            .expect_err("abstract allocation must fail");
        assert!(matches!(error, BuildError::CannotCreateInstance { .. }));
    }

    #[test]
    fn test_constructor_and_method_invocation() {
        let descriptor = square_descriptor();
        let ctor = descriptor
            .find_constructor(&[TypeKey::of::<f64>()])
            .expect("constructor should exist");

        let args = Args::new(vec![Some(Object::new(3.0_f64))]);
        let value = ctor.invoke(&args).expect("constructor should succeed");
        let object = Object::from_boxed(TypeKey::of::<Square>(), value).expect("init should succeed");

        let grow = descriptor
            .find_method("grow", &[TypeKey::of::<f64>()])
            .expect("method should exist");
        object
            .with_value_mut(|target| grow.invoke(target, &Args::new(vec![Some(Object::new(1.0_f64))])))
            .expect("object should be initialized")
            .expect("method should succeed");

        assert_eq!(object.get::<Square>(), Some(Square { side: 4.0 }));
    }

    #[test]
    fn test_args_report_missing_values() {
        let args = Args::new(vec![None, Some(Object::new("text".to_string()))]);

        assert!(args.object(0).is_err());
        assert!(args.optional(0).is_none());
        assert_eq!(args.value::<String>(1).ok(), Some("text".to_string()));
        assert!(args.value::<i32>(1).is_err());
        assert!(args.object(5).is_err());
    }
}
