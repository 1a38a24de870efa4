//! Locators: иерархическое хранилище построенных объектов.
//!
//! Locator держит объекты по weak reference: он не продлевает их жизнь,
//! этим занимается [`LifetimeContainer`](crate::lifetime::LifetimeContainer).
//! Поиск идёт либо только в текущем locator (`SearchMode::Local`), либо
//! вверх по цепочке parents (`SearchMode::Up`).

mod locator;
mod read_only;
mod weak_ref_map;

pub use locator::Locator;
pub use read_only::ReadOnlyLocator;
pub use weak_ref_map::WeakRefMap;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{BuildError, BuildResult};
use crate::keys::{BuildKey, TypeKey};
use crate::object::Object;

/// Область поиска в locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Текущий locator, затем parents
    #[default]
    Up,
    /// Только текущий locator
    Local,
}

impl FromStr for SearchMode {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "up" => Ok(SearchMode::Up),
            "local" => Ok(SearchMode::Local),
            _ => Err(BuildError::InvalidEnumerationValue {
                enumeration: "SearchMode".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Ключ записи в locator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocatorKey {
    /// Построенный объект: тип + id
    Build(BuildKey),
    /// Сервис, зарегистрированный по типу (например, lifetime container)
    Type(TypeKey),
    Name(String),
}

impl LocatorKey {
    pub fn build(type_key: TypeKey, id: Option<&str>) -> Self {
        LocatorKey::Build(BuildKey::new(type_key, id))
    }

    pub fn of_type<T: ?Sized + 'static>() -> Self {
        LocatorKey::Type(TypeKey::of::<T>())
    }
}

impl From<BuildKey> for LocatorKey {
    fn from(key: BuildKey) -> Self {
        LocatorKey::Build(key)
    }
}

impl From<&str> for LocatorKey {
    fn from(name: &str) -> Self {
        LocatorKey::Name(name.to_string())
    }
}

impl fmt::Display for LocatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorKey::Build(key) => write!(f, "{}", key),
            LocatorKey::Type(type_key) => write!(f, "type {}", type_key),
            LocatorKey::Name(name) => write!(f, "'{}'", name),
        }
    }
}

pub type LocatorPredicate<'a> = &'a dyn Fn(&LocatorKey, &Object) -> bool;

/// Read-only интерфейс locator
pub trait ReadableLocator: Send + Sync {
    /// Оценка количества живых записей (без parents)
    fn count(&self) -> usize;

    fn parent_locator(&self) -> Option<Arc<dyn ReadableLocator>>;

    fn read_only(&self) -> bool;

    fn contains_in(&self, key: &LocatorKey, mode: SearchMode) -> bool;

    fn get_in(&self, key: &LocatorKey, mode: SearchMode) -> Option<Object>;

    /// Snapshot живых записей текущего locator
    fn entries(&self) -> Vec<(LocatorKey, Object)>;

    fn contains(&self, key: &LocatorKey) -> bool {
        self.contains_in(key, SearchMode::Up)
    }

    fn get(&self, key: &LocatorKey) -> Option<Object> {
        self.get_in(key, SearchMode::Up)
    }

    /// Все записи, удовлетворяющие predicate. При `SearchMode::Up` записи
    /// child перекрывают записи parent с тем же ключом.
    fn find_by(&self, mode: SearchMode, predicate: LocatorPredicate<'_>) -> ReadOnlyLocator {
        let results = Locator::new();
        collect_matches(&results, self.entries(), predicate);

        if mode == SearchMode::Up {
            let mut current = self.parent_locator();
            while let Some(locator) = current {
                collect_matches(&results, locator.entries(), predicate);
                current = locator.parent_locator();
            }
        }

        ReadOnlyLocator::new(Arc::new(results))
    }
}

fn collect_matches(
    results: &Locator,
    entries: Vec<(LocatorKey, Object)>,
    predicate: LocatorPredicate<'_>,
) {
    for (key, value) in entries {
        if results.contains_in(&key, SearchMode::Local) || !predicate(&key, &value) {
            continue;
        }
        // ключ только что проверен, дубликат невозможен
        let _ = results.add(key, &value);
    }
}

/// Read-write интерфейс locator
pub trait ReadWriteLocator: ReadableLocator {
    fn add(&self, key: LocatorKey, value: &Object) -> BuildResult<()>;

    fn remove(&self, key: &LocatorKey) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_parsing() {
        assert_eq!("up".parse::<SearchMode>(), Ok(SearchMode::Up));
        assert_eq!("Local".parse::<SearchMode>(), Ok(SearchMode::Local));
        assert!(matches!(
            "sideways".parse::<SearchMode>(),
            Err(BuildError::InvalidEnumerationValue { .. })
        ));
        assert_eq!(SearchMode::default(), SearchMode::Up);
    }

    #[test]
    fn test_locator_key_display() {
        assert_eq!(LocatorKey::from("config").to_string(), "'config'");
        assert_eq!(
            LocatorKey::build(TypeKey::of::<u8>(), Some("x")).to_string(),
            "u8[x]"
        );
    }
}
