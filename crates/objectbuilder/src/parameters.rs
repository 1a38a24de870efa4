//! Value sources: откуда strategies берут аргументы constructors, methods и
//! значения properties.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::BuildResult;
use crate::keys::TypeKey;
use crate::location::SearchMode;
use crate::metadata::{DependencyMarker, Marker};
use crate::object::Object;
use crate::resolver::{DependencyResolver, NotPresentBehavior};
use crate::strategy::BuildContext;

pub trait Parameter: Send + Sync + fmt::Debug {
    fn parameter_type(&self, context: &BuildContext) -> TypeKey;

    fn value(&self, context: &mut BuildContext) -> BuildResult<Option<Object>>;
}

/// Константа (в том числе null)
#[derive(Debug, Clone)]
pub struct ValueParameter {
    type_key: TypeKey,
    value: Option<Object>,
}

impl ValueParameter {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_key: TypeKey::of::<T>(),
            value: Some(Object::new(value)),
        }
    }

    pub fn from_object(type_key: TypeKey, value: Object) -> Self {
        Self {
            type_key,
            value: Some(value),
        }
    }

    pub fn null<T: ?Sized + 'static>() -> Self {
        Self {
            type_key: TypeKey::of::<T>(),
            value: None,
        }
    }
}

impl Parameter for ValueParameter {
    fn parameter_type(&self, _context: &BuildContext) -> TypeKey {
        self.type_key
    }

    fn value(&self, _context: &mut BuildContext) -> BuildResult<Option<Object>> {
        Ok(self.value.clone())
    }
}

/// Строит значение с головы цепочки под заданным id
#[derive(Debug, Clone)]
pub struct CreationParameter {
    type_key: TypeKey,
    id: Option<String>,
}

impl CreationParameter {
    pub fn new(type_key: TypeKey, id: Option<&str>) -> Self {
        Self {
            type_key,
            id: id.map(str::to_string),
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), None)
    }

    /// Всегда новый экземпляр: уникальный id не совпадает ни с одним singleton
    pub fn unique(type_key: TypeKey) -> Self {
        Self {
            type_key,
            id: Some(Uuid::new_v4().to_string()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Parameter for CreationParameter {
    fn parameter_type(&self, _context: &BuildContext) -> TypeKey {
        self.type_key
    }

    fn value(&self, context: &mut BuildContext) -> BuildResult<Option<Object>> {
        context.build_from_head(&self.type_key, None, self.id.as_deref())
    }
}

/// Dependency: locator lookup с fallback по `NotPresentBehavior`
#[derive(Debug, Clone)]
pub struct DependencyParameter {
    type_key: TypeKey,
    name: Option<String>,
    create_type: Option<TypeKey>,
    not_present: NotPresentBehavior,
    search_mode: SearchMode,
}

impl DependencyParameter {
    pub fn new(
        type_key: TypeKey,
        name: Option<&str>,
        create_type: Option<TypeKey>,
        not_present: NotPresentBehavior,
        search_mode: SearchMode,
    ) -> Self {
        Self {
            type_key,
            name: name.map(str::to_string),
            create_type,
            not_present,
            search_mode,
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(
            TypeKey::of::<T>(),
            None,
            None,
            NotPresentBehavior::CreateNew,
            SearchMode::Up,
        )
    }

    fn from_marker(type_key: TypeKey, marker: &DependencyMarker) -> Self {
        Self::new(
            type_key,
            marker.name.as_deref(),
            marker.create_type,
            marker.not_present,
            marker.search_mode,
        )
    }
}

impl Parameter for DependencyParameter {
    fn parameter_type(&self, _context: &BuildContext) -> TypeKey {
        self.type_key
    }

    fn value(&self, context: &mut BuildContext) -> BuildResult<Option<Object>> {
        DependencyResolver::new(context).resolve(
            &self.type_key,
            self.create_type.as_ref(),
            self.name.as_deref(),
            self.not_present,
            self.search_mode,
        )
    }
}

/// Копия значения другого source, если тип объявлен cloneable
#[derive(Debug, Clone)]
pub struct CloneParameter {
    inner: Arc<dyn Parameter>,
}

impl CloneParameter {
    pub fn new(inner: Arc<dyn Parameter>) -> Self {
        Self { inner }
    }
}

impl Parameter for CloneParameter {
    fn parameter_type(&self, context: &BuildContext) -> TypeKey {
        self.inner.parameter_type(context)
    }

    fn value(&self, context: &mut BuildContext) -> BuildResult<Option<Object>> {
        let Some(object) = self.inner.value(context)? else {
            return Ok(None);
        };
        // Constants и внешние объекты получают capabilities из registry здесь
        context.metadata().attach_capabilities(&object);
        Ok(Some(object.try_clone_value().unwrap_or(object)))
    }
}

/// Value source для member с одним marker
pub(crate) fn from_marker(marker: &Marker, member_type: TypeKey) -> Arc<dyn Parameter> {
    match marker {
        Marker::Dependency(dependency) => {
            Arc::new(DependencyParameter::from_marker(member_type, dependency))
        }
        Marker::CreateNew => Arc::new(CreationParameter::unique(member_type)),
        Marker::Value(value) => Arc::new(ValueParameter::from_object(member_type, value.clone())),
    }
}

/// Значения для набора sources по порядку
pub(crate) fn resolve_all(
    parameters: &[Arc<dyn Parameter>],
    context: &mut BuildContext,
) -> BuildResult<Vec<Option<Object>>> {
    parameters
        .iter()
        .map(|parameter| parameter.value(context))
        .collect()
}
