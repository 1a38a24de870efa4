use std::fmt;

use crate::errors::BuildResult;
use crate::guard;
use crate::keys::{BuildKey, TypeKey};
use crate::object::Object;
use crate::strategy::{BuildContext, BuilderStrategy};

/// Отображение запрошенного (тип, id) на другой (тип, id)
pub trait TypeMappingPolicy: Send + Sync + fmt::Debug {
    fn map(&self, incoming: BuildKey) -> BuildKey;
}

/// Фиксированное отображение на конкретный тип и id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    target: BuildKey,
}

impl TypeMapping {
    pub fn new(type_key: TypeKey, id: Option<&str>) -> Self {
        Self {
            target: BuildKey::new(type_key, id),
        }
    }

    pub fn to<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), None)
    }

    pub fn to_named<T: ?Sized + 'static>(id: &str) -> Self {
        Self::new(TypeKey::of::<T>(), Some(id))
    }
}

impl TypeMappingPolicy for TypeMapping {
    fn map(&self, _incoming: BuildKey) -> BuildKey {
        self.target.clone()
    }
}

/// Подменяет запрошенный тип по mapping policy; результат обязан быть
/// assignable к запрошенному типу
#[derive(Debug, Default)]
pub struct TypeMappingStrategy;

impl BuilderStrategy for TypeMappingStrategy {
    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        let Some(policy) = context
            .policies()
            .get::<dyn TypeMappingPolicy>(type_to_build, id_to_build)
        else {
            return context.build_next(type_to_build, existing, id_to_build);
        };

        let mapped = policy.map(BuildKey::new(*type_to_build, id_to_build));
        self.trace_build_up(
            context,
            type_to_build,
            id_to_build,
            format_args!("Mapped to {}", mapped),
        );
        guard::type_is_assignable(
            context.metadata().as_ref(),
            type_to_build,
            &mapped.type_key,
            type_to_build,
        )?;

        context.build_next(&mapped.type_key, existing, mapped.id())
    }
}
