use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::trace;

use super::{LocatorKey, ReadWriteLocator, ReadableLocator, SearchMode, WeakRefMap};
use crate::errors::BuildResult;
use crate::lifetime::LifetimeContainer;
use crate::object::Object;

struct LocatorInner {
    references: WeakRefMap<LocatorKey>,
    parent: Option<Arc<dyn ReadableLocator>>,
    build_lock: ReentrantMutex<()>,
}

/// Read-write locator с необязательным parent.
///
/// `Locator` - дешёвый handle (`Arc` внутри), клоны указывают на одно хранилище.
/// Каждый locator несёт собственный reentrant build lock: builder сериализует
/// build/teardown операции против одного locator, а рекурсивные builds того же
/// потока проходят без deadlock.
#[derive(Clone)]
pub struct Locator {
    inner: Arc<LocatorInner>,
}

impl Locator {
    pub fn new() -> Self {
        Self::from_parent(None)
    }

    pub fn with_parent(parent: Arc<dyn ReadableLocator>) -> Self {
        Self::from_parent(Some(parent))
    }

    /// Дочерний locator поверх этого
    pub fn create_child(&self) -> Self {
        Self::with_parent(Arc::new(self.clone()))
    }

    fn from_parent(parent: Option<Arc<dyn ReadableLocator>>) -> Self {
        Self {
            inner: Arc::new(LocatorInner {
                references: WeakRefMap::new(),
                parent,
                build_lock: ReentrantMutex::new(()),
            }),
        }
    }

    pub fn ptr_eq(&self, other: &Locator) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn lock_for_build(&self) -> ReentrantMutexGuard<'_, ()> {
        self.inner.build_lock.lock()
    }

    pub fn add(&self, key: impl Into<LocatorKey>, value: &Object) -> BuildResult<()> {
        let key = key.into();
        trace!("Locator add {} -> {:?}", key, value);
        self.inner.references.add(key, value)
    }

    pub fn remove(&self, key: &LocatorKey) -> bool {
        self.inner.references.remove(key)
    }

    /// Зарегистрировать lifetime container под его типом.
    ///
    /// Locator хранит weak reference: caller удерживает возвращённый handle
    /// так долго, как нужен scope.
    pub fn add_lifetime_container(&self, container: LifetimeContainer) -> BuildResult<Object> {
        let object = Object::new(container);
        self.add(LocatorKey::of_type::<LifetimeContainer>(), &object)?;
        Ok(object)
    }

    /// Lifetime container, зарегистрированный непосредственно в этом locator
    pub fn lifetime_container(&self) -> Option<Object> {
        self.get_in(&LocatorKey::of_type::<LifetimeContainer>(), SearchMode::Local)
            .filter(|object| object.is::<LifetimeContainer>())
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadableLocator for Locator {
    fn count(&self) -> usize {
        self.inner.references.count()
    }

    fn parent_locator(&self) -> Option<Arc<dyn ReadableLocator>> {
        self.inner.parent.clone()
    }

    fn read_only(&self) -> bool {
        false
    }

    fn contains_in(&self, key: &LocatorKey, mode: SearchMode) -> bool {
        if self.inner.references.contains_key(key) {
            return true;
        }
        match (mode, &self.inner.parent) {
            (SearchMode::Up, Some(parent)) => parent.contains_in(key, SearchMode::Up),
            _ => false,
        }
    }

    fn get_in(&self, key: &LocatorKey, mode: SearchMode) -> Option<Object> {
        if let Some(found) = self.inner.references.get(key) {
            return Some(found);
        }
        match (mode, &self.inner.parent) {
            (SearchMode::Up, Some(parent)) => parent.get_in(key, SearchMode::Up),
            _ => None,
        }
    }

    fn entries(&self) -> Vec<(LocatorKey, Object)> {
        self.inner.references.entries()
    }
}

impl ReadWriteLocator for Locator {
    fn add(&self, key: LocatorKey, value: &Object) -> BuildResult<()> {
        Locator::add(self, key, value)
    }

    fn remove(&self, key: &LocatorKey) -> bool {
        Locator::remove(self, key)
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("count", &self.count())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::TypeKey;

    fn key(name: &str) -> LocatorKey {
        LocatorKey::from(name)
    }

    #[test]
    fn test_search_modes() {
        let parent = Locator::new();
        let child = parent.create_child();
        let value = Object::new(5_i32);

        parent.add(key("shared"), &value).expect("add should succeed");

        assert!(child.contains(&key("shared")));
        assert!(!child.contains_in(&key("shared"), SearchMode::Local));
        assert!(child
            .get(&key("shared"))
            .map(|found| found.ptr_eq(&value))
            .unwrap_or(false));
        assert!(child.get_in(&key("shared"), SearchMode::Local).is_none());
        assert!(child.parent_locator().is_some());
        assert!(!child.read_only());
    }

    #[test]
    fn test_locator_does_not_keep_objects_alive() {
        let locator = Locator::new();
        let value = Object::new("temp".to_string());
        locator.add(key("temp"), &value).expect("add should succeed");
        assert_eq!(locator.count(), 1);

        drop(value);
        assert!(!locator.contains(&key("temp")));
        assert_eq!(locator.count(), 0);
    }

    #[test]
    fn test_find_by_prefers_child_entries() {
        let parent = Locator::new();
        let child = parent.create_child();
        let parent_value = Object::new(1_i32);
        let parent_only = Object::new(2_i32);
        let child_value = Object::new(10_i32);
        let text = Object::new("skip".to_string());

        parent.add(key("a"), &parent_value).expect("add should succeed");
        parent.add(key("b"), &parent_only).expect("add should succeed");
        child.add(key("a"), &child_value).expect("add should succeed");
        child.add(key("t"), &text).expect("add should succeed");

        let is_int = |_: &LocatorKey, value: &Object| value.is::<i32>();

        let up = child.find_by(SearchMode::Up, &is_int);
        assert_eq!(up.count(), 2);
        assert!(up
            .get(&key("a"))
            .map(|found| found.ptr_eq(&child_value))
            .unwrap_or(false));
        assert!(up.contains(&key("b")));
        assert!(up.read_only());

        let local = child.find_by(SearchMode::Local, &is_int);
        assert_eq!(local.count(), 1);
        assert!(!local.contains(&key("b")));
    }

    #[test]
    fn test_lifetime_container_registration() {
        let locator = Locator::new();
        assert!(locator.lifetime_container().is_none());

        let lifetime = locator
            .add_lifetime_container(LifetimeContainer::new())
            .expect("registration should succeed");
        assert!(locator
            .lifetime_container()
            .map(|found| found.ptr_eq(&lifetime))
            .unwrap_or(false));
        assert!(locator.contains(&LocatorKey::Type(TypeKey::of::<LifetimeContainer>())));

        // child не видит parent container в Local режиме
        let child = locator.create_child();
        assert!(child.lifetime_container().is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let locator = Locator::new();
        let alias = locator.clone();
        let value = Object::new(0_u8);

        alias.add(key("x"), &value).expect("add should succeed");
        assert!(locator.contains(&key("x")));
        assert!(locator.ptr_eq(&alias));
        assert!(locator.remove(&key("x")));
        assert!(!alias.contains(&key("x")));
    }
}
