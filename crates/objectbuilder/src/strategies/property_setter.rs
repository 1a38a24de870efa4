use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::{BuildError, BuildResult};
use crate::guard;
use crate::keys::TypeKey;
use crate::metadata::PropertyInfo;
use crate::object::Object;
use crate::parameters::Parameter;
use crate::strategy::{BuildContext, BuilderStrategy};

/// Что и откуда записать в одну property
#[derive(Debug, Clone)]
pub struct PropertySetterInfo {
    name: String,
    property: Option<Arc<PropertyInfo>>,
    value: Arc<dyn Parameter>,
}

impl PropertySetterInfo {
    /// Property ищется по имени в metadata конкретного типа
    pub fn new(name: impl Into<String>, value: impl Parameter + 'static) -> Self {
        Self {
            name: name.into(),
            property: None,
            value: Arc::new(value),
        }
    }

    pub fn for_property(property: Arc<PropertyInfo>, value: Arc<dyn Parameter>) -> Self {
        Self {
            name: property.name().to_string(),
            property: Some(property),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select_property(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
    ) -> Option<Arc<PropertyInfo>> {
        if let Some(property) = &self.property {
            return Some(property.clone());
        }
        context
            .metadata()
            .describe(type_to_build)
            .and_then(|descriptor| descriptor.find_property(&self.name))
    }

    pub fn value(&self, context: &mut BuildContext) -> BuildResult<Option<Object>> {
        self.value.value(context)
    }
}

/// Properties для inject, в порядке добавления
#[derive(Debug, Default, Clone)]
pub struct PropertySetterPolicy {
    properties: IndexMap<String, PropertySetterInfo>,
}

impl PropertySetterPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, info: PropertySetterInfo) -> Self {
        self.insert(info);
        self
    }

    pub fn insert(&mut self, info: PropertySetterInfo) {
        self.properties.insert(info.name.clone(), info);
    }

    /// Существующая запись с тем же именем сохраняется
    pub fn insert_if_absent(&mut self, info: PropertySetterInfo) {
        self.properties.entry(info.name.clone()).or_insert(info);
    }

    pub fn get(&self, name: &str) -> Option<&PropertySetterInfo> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertySetterInfo> {
        self.properties.values()
    }
}

/// Записывает properties по policy конкретного runtime типа объекта
#[derive(Debug, Default)]
pub struct PropertySetterStrategy;

impl PropertySetterStrategy {
    fn inject_properties(
        &self,
        context: &mut BuildContext,
        object: &Object,
        id_to_build: Option<&str>,
    ) -> BuildResult<()> {
        let concrete = object.type_key();
        let Some(policy) = context
            .policies()
            .get::<PropertySetterPolicy>(&concrete, id_to_build)
        else {
            return Ok(());
        };

        for info in policy.iter() {
            let Some(property) = info.select_property(context, &concrete) else {
                continue;
            };
            if !property.is_writable() {
                return Err(BuildError::ReadOnlyProperty {
                    type_name: concrete.name().to_string(),
                    property: property.name().to_string(),
                });
            }

            let value = info.value(context)?;
            if let Some(value) = &value {
                guard::type_is_assignable(
                    context.metadata().as_ref(),
                    &property.type_key(),
                    &value.type_key(),
                    &concrete,
                )?;
            }

            self.trace_build_up(
                context,
                &concrete,
                id_to_build,
                format_args!("Setting property {} ({})", property.name(), property.type_key()),
            );
            object
                .with_value_mut(|target| property.set(target, value))?
                .map_err(|error| BuildError::invocation(concrete.name(), property.name(), &error))?;
        }
        Ok(())
    }
}

impl BuilderStrategy for PropertySetterStrategy {
    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        if let Some(object) = &existing {
            self.inject_properties(context, object, id_to_build)?;
        }
        context.build_next(type_to_build, existing, id_to_build)
    }
}
