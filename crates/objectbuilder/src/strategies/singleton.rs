use crate::errors::BuildResult;
use crate::keys::TypeKey;
use crate::location::{LocatorKey, ReadableLocator, SearchMode};
use crate::object::Object;
use crate::strategy::{BuildContext, BuilderStrategy};

/// Нужно ли регистрировать созданный объект в locator и lifetime container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingletonPolicy {
    is_singleton: bool,
}

impl SingletonPolicy {
    pub fn new(is_singleton: bool) -> Self {
        Self { is_singleton }
    }

    pub fn is_singleton(&self) -> bool {
        self.is_singleton
    }
}

/// Возвращает уже зарегистрированный в текущем locator объект и обрывает цепочку
#[derive(Debug, Default)]
pub struct SingletonStrategy;

impl BuilderStrategy for SingletonStrategy {
    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        let key = LocatorKey::build(*type_to_build, id_to_build);
        let found = context
            .locator()
            .and_then(|locator| locator.get_in(&key, SearchMode::Local));

        if let Some(found) = found {
            self.trace_build_up(
                context,
                type_to_build,
                id_to_build,
                format_args!("Singleton returned"),
            );
            return Ok(Some(found));
        }

        context.build_next(type_to_build, existing, id_to_build)
    }
}
