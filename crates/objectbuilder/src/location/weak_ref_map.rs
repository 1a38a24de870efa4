use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::errors::{BuildError, BuildResult};
use crate::object::{Object, WeakObject};

/// Map с weak values: записи исчезают, когда объект больше никем не удерживается.
///
/// Мёртвые записи вычищаются лениво: при `count`, `add` и `entries`.
pub struct WeakRefMap<K> {
    inner: RwLock<HashMap<K, WeakObject>>,
}

impl<K> WeakRefMap<K>
where
    K: Eq + Hash + Clone + Display,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Добавить запись; живой дубликат ключа - ошибка
    pub fn add(&self, key: K, value: &Object) -> BuildResult<()> {
        let mut inner = self.inner.write();
        if inner.get(&key).is_some_and(WeakObject::is_alive) {
            return Err(BuildError::DuplicateLocatorKey {
                key: key.to_string(),
            });
        }
        inner.retain(|_, weak| weak.is_alive());
        inner.insert(key, value.downgrade());
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<Object> {
        self.inner.read().get(key).and_then(WeakObject::upgrade)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&self, key: &K) -> bool {
        self.inner
            .write()
            .remove(key)
            .is_some_and(|weak| weak.is_alive())
    }

    pub fn count(&self) -> usize {
        let mut inner = self.inner.write();
        inner.retain(|_, weak| weak.is_alive());
        inner.len()
    }

    pub fn entries(&self) -> Vec<(K, Object)> {
        self.inner
            .read()
            .iter()
            .filter_map(|(key, weak)| weak.upgrade().map(|object| (key.clone(), object)))
            .collect()
    }
}

impl<K> Default for WeakRefMap<K>
where
    K: Eq + Hash + Clone + Display,
{
    fn default() -> Self {
        Self::new()
    }
}
