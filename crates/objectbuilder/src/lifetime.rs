use std::fmt;

use parking_lot::RwLock;
use tracing::debug;

use crate::object::Object;

/// Удерживает singleton объекты scope'а сильными ссылками и освобождает их
/// в обратном порядке добавления.
///
/// Регистрируется в locator под ключом `LocatorKey::of_type::<LifetimeContainer>()`
/// (см. [`Locator::add_lifetime_container`](crate::location::Locator::add_lifetime_container)).
/// При drop выполняет [`dispose`](Self::dispose) автоматически.
pub struct LifetimeContainer {
    items: RwLock<Vec<Object>>,
}

impl LifetimeContainer {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Добавить объект; повторное добавление того же объекта игнорируется
    pub fn add(&self, item: &Object) {
        let mut items = self.items.write();
        if items.iter().any(|existing| existing.ptr_eq(item)) {
            return;
        }
        items.push(item.clone());
    }

    /// Удалить объект без dispose; отсутствующий объект - no-op
    pub fn remove(&self, item: &Object) -> bool {
        let mut items = self.items.write();
        match items.iter().position(|existing| existing.ptr_eq(item)) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &Object) -> bool {
        self.items.read().iter().any(|existing| existing.ptr_eq(item))
    }

    pub fn count(&self) -> usize {
        self.items.read().len()
    }

    /// Snapshot в порядке добавления
    pub fn items(&self) -> Vec<Object> {
        self.items.read().clone()
    }

    /// Dispose всех disposable объектов в обратном порядке, затем очистка
    pub fn dispose(&self) {
        let items = std::mem::take(&mut *self.items.write());
        if items.is_empty() {
            return;
        }

        let mut disposed = 0;
        for item in items.iter().rev() {
            if item.dispose() {
                disposed += 1;
            }
        }
        debug!(
            "Lifetime container released {} objects ({} disposable)",
            items.len(),
            disposed
        );
    }
}

impl Default for LifetimeContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LifetimeContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for LifetimeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifetimeContainer")
            .field("count", &self.count())
            .finish()
    }
}
