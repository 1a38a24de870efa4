use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BuildError, BuildResult};
use crate::keys::TypeKey;
use crate::location::{LocatorKey, ReadableLocator, SearchMode};
use crate::object::Object;
use crate::strategy::BuildContext;

/// Что делать, если dependency не найдена в locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NotPresentBehavior {
    /// Построить с головы цепочки
    #[default]
    CreateNew,
    ReturnNull,
    Throw,
}

impl FromStr for NotPresentBehavior {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "createnew" => Ok(NotPresentBehavior::CreateNew),
            "returnnull" => Ok(NotPresentBehavior::ReturnNull),
            "throw" => Ok(NotPresentBehavior::Throw),
            _ => Err(BuildError::InvalidEnumerationValue {
                enumeration: "NotPresentBehavior".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for NotPresentBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Разрешение dependency: сначала locator, потом по `NotPresentBehavior`
pub struct DependencyResolver<'a> {
    context: &'a mut BuildContext,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(context: &'a mut BuildContext) -> Self {
        Self { context }
    }

    /// Ищет `(type_to_resolve, id)` в locator; при промахе строит
    /// `type_to_create` (по умолчанию тот же тип) под тем же id,
    /// возвращает `None` или падает с `DependencyMissing`.
    pub fn resolve(
        &mut self,
        type_to_resolve: &TypeKey,
        type_to_create: Option<&TypeKey>,
        id: Option<&str>,
        not_present: NotPresentBehavior,
        search_mode: SearchMode,
    ) -> BuildResult<Option<Object>> {
        let key = LocatorKey::build(*type_to_resolve, id);
        if let Some(found) = self
            .context
            .locator()
            .and_then(|locator| locator.get_in(&key, search_mode))
        {
            return Ok(Some(found));
        }

        match not_present {
            NotPresentBehavior::CreateNew => {
                let type_to_create = type_to_create.unwrap_or(type_to_resolve);
                self.context.build_from_head(type_to_create, None, id)
            }
            NotPresentBehavior::ReturnNull => Ok(None),
            NotPresentBehavior::Throw => Err(BuildError::DependencyMissing {
                type_name: type_to_resolve.name().to_string(),
                id: id.map(str::to_string),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Locator;
    use crate::metadata::TypeRegistry;
    use crate::policy::PolicyList;
    use crate::strategy::{BuilderStrategy, StrategyChain};
    use std::sync::Arc;

    /// Терминальная стратегия: строит значение-маркер под запрошенный id
    struct Fabricate;

    impl BuilderStrategy for Fabricate {
        fn build_up(
            &self,
            _context: &mut BuildContext,
            _type_to_build: &TypeKey,
            _existing: Option<Object>,
            id_to_build: Option<&str>,
        ) -> BuildResult<Option<Object>> {
            Ok(Some(Object::new(format!("built:{}", id_to_build.unwrap_or("-")))))
        }
    }

    fn context(locator: &Locator) -> BuildContext {
        BuildContext::new(
            StrategyChain::new(vec![Arc::new(Fabricate)]),
            Some(locator.clone()),
            PolicyList::new(),
            Arc::new(TypeRegistry::new()),
        )
    }

    #[test]
    fn test_locator_hit_wins() {
        let locator = Locator::new();
        let stored = Object::new("stored".to_string());
        locator
            .add(LocatorKey::build(TypeKey::of::<String>(), Some("main")), &stored)
            .expect("add should succeed");

        let mut context = context(&locator);
        let resolved = DependencyResolver::new(&mut context)
            .resolve(
                &TypeKey::of::<String>(),
                None,
                Some("main"),
                NotPresentBehavior::Throw,
                SearchMode::Local,
            )
            .expect("resolve should succeed");

        assert!(resolved.map(|r| r.ptr_eq(&stored)).unwrap_or(false));
    }

    #[test]
    fn test_not_present_behaviors() {
        let locator = Locator::new();
        let mut context = context(&locator);
        let string_key = TypeKey::of::<String>();
        let mut resolver = DependencyResolver::new(&mut context);

        let created = resolver
            .resolve(&string_key, None, Some("x"), NotPresentBehavior::CreateNew, SearchMode::Up)
            .expect("create should succeed");
        assert_eq!(created.and_then(|o| o.get::<String>()), Some("built:x".to_string()));

        let missing = resolver
            .resolve(&string_key, None, None, NotPresentBehavior::ReturnNull, SearchMode::Up)
            .expect("return null should succeed");
        assert!(missing.is_none());

        let error = resolver
            .resolve(&string_key, None, Some("x"), NotPresentBehavior::Throw, SearchMode::Up)
            .expect_err("throw must fail");
        assert!(matches!(error, BuildError::DependencyMissing { .. }));
    }

    #[test]
    fn test_local_search_ignores_parent() {
        let parent = Locator::new();
        let child = parent.create_child();
        let stored = Object::new(9_u64);
        parent
            .add(LocatorKey::build(TypeKey::of::<u64>(), None), &stored)
            .expect("add should succeed");

        let mut context = context(&child);
        let mut resolver = DependencyResolver::new(&mut context);
        let local = resolver
            .resolve(&TypeKey::of::<u64>(), None, None, NotPresentBehavior::ReturnNull, SearchMode::Local)
            .expect("resolve should succeed");
        let up = resolver
            .resolve(&TypeKey::of::<u64>(), None, None, NotPresentBehavior::ReturnNull, SearchMode::Up)
            .expect("resolve should succeed");

        assert!(local.is_none());
        assert!(up.map(|o| o.ptr_eq(&stored)).unwrap_or(false));
    }

    #[test]
    fn test_behavior_parsing() {
        assert_eq!("return_null".parse(), Ok(NotPresentBehavior::ReturnNull));
        assert_eq!("CreateNew".parse(), Ok(NotPresentBehavior::CreateNew));
        assert!("explode".parse::<NotPresentBehavior>().is_err());
    }
}
