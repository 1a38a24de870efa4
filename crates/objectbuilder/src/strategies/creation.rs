//! Creation: выделение shell, регистрация singleton и вызов constructor.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{BuildError, BuildResult};
use crate::guard;
use crate::keys::TypeKey;
use crate::lifetime::LifetimeContainer;
use crate::location::{LocatorKey, ReadableLocator, SearchMode};
use crate::metadata::{Args, ConstructorInfo, TypeShape};
use crate::object::Object;
use crate::parameters::{self, Parameter};
use crate::strategies::singleton::SingletonPolicy;
use crate::strategy::{BuildContext, BuilderStrategy};

/// Выбор constructor и его аргументов
pub trait CreationPolicy: Send + Sync + fmt::Debug {
    fn select_constructor(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Arc<ConstructorInfo>>>;

    fn get_parameters(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        constructor: &ConstructorInfo,
    ) -> BuildResult<Vec<Option<Object>>>;

    /// Policy по умолчанию; constructor reflection заменяет её на
    /// явный `ConstructorPolicy`
    fn is_default(&self) -> bool {
        false
    }
}

/// Первый объявленный constructor, каждый аргумент строится с головы цепочки
/// под тем же id
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCreationPolicy;

impl CreationPolicy for DefaultCreationPolicy {
    fn select_constructor(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        _id_to_build: Option<&str>,
    ) -> BuildResult<Option<Arc<ConstructorInfo>>> {
        Ok(context
            .metadata()
            .describe(type_to_build)
            .and_then(|descriptor| descriptor.constructors().first().cloned()))
    }

    fn get_parameters(
        &self,
        context: &mut BuildContext,
        _type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        constructor: &ConstructorInfo,
    ) -> BuildResult<Vec<Option<Object>>> {
        constructor
            .parameters()
            .iter()
            .map(|parameter| context.build_from_head(&parameter.type_key(), None, id_to_build))
            .collect()
    }

    fn is_default(&self) -> bool {
        true
    }
}

/// Явный список value sources; constructor либо задан, либо ищется по
/// типам этих sources
#[derive(Debug, Default, Clone)]
pub struct ConstructorPolicy {
    constructor: Option<Arc<ConstructorInfo>>,
    parameters: Vec<Arc<dyn Parameter>>,
}

impl ConstructorPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: Vec<Arc<dyn Parameter>>) -> Self {
        Self {
            constructor: None,
            parameters,
        }
    }

    pub fn for_constructor(
        constructor: Arc<ConstructorInfo>,
        parameters: Vec<Arc<dyn Parameter>>,
    ) -> Self {
        Self {
            constructor: Some(constructor),
            parameters,
        }
    }

    pub fn parameter(mut self, parameter: impl Parameter + 'static) -> Self {
        self.parameters.push(Arc::new(parameter));
        self
    }

    pub fn parameters(&self) -> &[Arc<dyn Parameter>] {
        &self.parameters
    }
}

impl CreationPolicy for ConstructorPolicy {
    fn select_constructor(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        _id_to_build: Option<&str>,
    ) -> BuildResult<Option<Arc<ConstructorInfo>>> {
        if let Some(constructor) = &self.constructor {
            return Ok(Some(constructor.clone()));
        }

        let types: Vec<TypeKey> = self
            .parameters
            .iter()
            .map(|parameter| parameter.parameter_type(context))
            .collect();
        Ok(context
            .metadata()
            .describe(type_to_build)
            .and_then(|descriptor| descriptor.find_constructor(&types)))
    }

    fn get_parameters(
        &self,
        context: &mut BuildContext,
        _type_to_build: &TypeKey,
        _id_to_build: Option<&str>,
        _constructor: &ConstructorInfo,
    ) -> BuildResult<Vec<Option<Object>>> {
        parameters::resolve_all(&self.parameters, context)
    }
}

/// Создаёт объект (или регистрирует переданный существующий) и передаёт его дальше
#[derive(Debug, Default)]
pub struct CreationStrategy;

impl CreationStrategy {
    fn build_up_new_object(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
    ) -> BuildResult<Object> {
        let policy = context
            .policies()
            .get::<dyn CreationPolicy>(type_to_build, id_to_build)
            .ok_or_else(|| BuildError::MissingCreationPolicy {
                type_name: type_to_build.name().to_string(),
                id: id_to_build.map(str::to_string),
            })?;

        let object = context
            .metadata()
            .allocate(type_to_build)
            .map_err(|error| match error {
                BuildError::CannotCreateInstance { .. } => error,
                other => BuildError::cannot_create(type_to_build.name(), other.to_string()),
            })?;

        self.register_object(context, type_to_build, &object, id_to_build)?;
        self.initialize_object(context, &object, id_to_build, policy.as_ref())?;
        Ok(object)
    }

    /// Singleton регистрируется до вызова constructor: циклические
    /// зависимости разрешаются в ещё не инициализированный shell
    fn register_object(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        object: &Object,
        id_to_build: Option<&str>,
    ) -> BuildResult<()> {
        let Some(locator) = context.locator() else {
            return Ok(());
        };
        let Some(lifetime) = locator.lifetime_container() else {
            return Ok(());
        };

        let is_singleton = context
            .policies()
            .get::<SingletonPolicy>(type_to_build, id_to_build)
            .map(|policy| policy.is_singleton())
            .unwrap_or(false);
        if !is_singleton {
            return Ok(());
        }

        let key = LocatorKey::build(*type_to_build, id_to_build);
        let already_registered = locator
            .get_in(&key, SearchMode::Local)
            .map(|found| found.ptr_eq(object))
            .unwrap_or(false);
        if !already_registered {
            locator.add(key, object)?;
        }
        if let Some(container) = lifetime.read::<LifetimeContainer>() {
            container.add(object);
        }

        debug!("Registered singleton {} ({:?})", type_to_build, id_to_build);
        self.trace_build_up(
            context,
            type_to_build,
            id_to_build,
            format_args!("Singleton registered"),
        );
        Ok(())
    }

    fn initialize_object(
        &self,
        context: &mut BuildContext,
        object: &Object,
        id_to_build: Option<&str>,
        policy: &dyn CreationPolicy,
    ) -> BuildResult<()> {
        let concrete = object.type_key();
        let Some(constructor) = policy.select_constructor(context, &concrete, id_to_build)? else {
            let is_value = context
                .metadata()
                .describe(&concrete)
                .map(|descriptor| descriptor.shape() == TypeShape::Value)
                .unwrap_or(false);
            if is_value {
                return Ok(());
            }
            return Err(BuildError::NoAppropriateConstructor {
                type_name: concrete.name().to_string(),
            });
        };

        let values = policy.get_parameters(context, &concrete, id_to_build, &constructor)?;
        guard::validate_parameters(
            context.metadata().as_ref(),
            constructor.parameters(),
            &values,
            &concrete,
            "constructor",
        )?;

        self.trace_build_up(
            context,
            &concrete,
            id_to_build,
            format_args!("Calling constructor ({} parameters)", values.len()),
        );
        let value = constructor
            .invoke(&Args::new(values))
            .map_err(|error| BuildError::invocation(concrete.name(), "constructor", &error))?;
        object.initialize(value)
    }
}

impl BuilderStrategy for CreationStrategy {
    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        let object = match existing {
            Some(existing) => {
                context.metadata().attach_capabilities(&existing);
                self.register_object(context, type_to_build, &existing, id_to_build)?;
                existing
            }
            None => self.build_up_new_object(context, type_to_build, id_to_build)?,
        };

        context.build_next(type_to_build, Some(object), id_to_build)
    }
}
