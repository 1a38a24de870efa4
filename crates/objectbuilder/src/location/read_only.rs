use std::fmt;
use std::sync::Arc;

use super::{LocatorKey, ReadableLocator, SearchMode};
use crate::object::Object;

/// Read-only обёртка над locator; parent тоже отдаётся read-only
#[derive(Clone)]
pub struct ReadOnlyLocator {
    inner: Arc<dyn ReadableLocator>,
}

impl ReadOnlyLocator {
    pub fn new(inner: Arc<dyn ReadableLocator>) -> Self {
        Self { inner }
    }
}

impl ReadableLocator for ReadOnlyLocator {
    fn count(&self) -> usize {
        self.inner.count()
    }

    fn parent_locator(&self) -> Option<Arc<dyn ReadableLocator>> {
        self.inner
            .parent_locator()
            .map(|parent| Arc::new(ReadOnlyLocator::new(parent)) as Arc<dyn ReadableLocator>)
    }

    fn read_only(&self) -> bool {
        true
    }

    fn contains_in(&self, key: &LocatorKey, mode: SearchMode) -> bool {
        self.inner.contains_in(key, mode)
    }

    fn get_in(&self, key: &LocatorKey, mode: SearchMode) -> Option<Object> {
        self.inner.get_in(key, mode)
    }

    fn entries(&self) -> Vec<(LocatorKey, Object)> {
        self.inner.entries()
    }
}

impl fmt::Debug for ReadOnlyLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyLocator")
            .field("count", &self.inner.count())
            .finish()
    }
}
