use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Policy, PolicyFamily, PolicyKind};
use crate::keys::TypeKey;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PolicyKey {
    kind: PolicyKind,
    type_key: Option<TypeKey>,
    id: Option<String>,
}

impl PolicyKey {
    fn specific(kind: PolicyKind, type_key: &TypeKey, id: Option<&str>) -> Self {
        Self {
            kind,
            type_key: Some(*type_key),
            id: id.map(str::to_string),
        }
    }

    fn default_for(kind: PolicyKind) -> Self {
        Self {
            kind,
            type_key: None,
            id: None,
        }
    }
}

/// Набор policies с ключом (kind, тип, id) и fallback на default policy kind'а.
///
/// Все операции защищены одним lock; `get` сначала ищет точный ключ, затем
/// default для того же kind.
pub struct PolicyList {
    policies: RwLock<HashMap<PolicyKey, Policy>>,
}

impl PolicyList {
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }

    /// Новый список, наполненный по порядку; более поздние списки перекрывают ранние
    pub fn from_lists(lists: &[&PolicyList]) -> Self {
        let result = Self::new();
        for list in lists {
            result.add_policies(list);
        }
        result
    }

    pub fn add_policies(&self, other: &PolicyList) {
        let snapshot = other.policies.read().clone();
        self.policies.write().extend(snapshot);
    }

    pub fn count(&self) -> usize {
        self.policies.read().len()
    }

    pub fn set<P: PolicyFamily + ?Sized>(&self, policy: Arc<P>, type_key: &TypeKey, id: Option<&str>) {
        self.policies
            .write()
            .insert(PolicyKey::specific(P::KIND, type_key, id), P::wrap(policy));
    }

    pub fn set_default<P: PolicyFamily + ?Sized>(&self, policy: Arc<P>) {
        self.policies
            .write()
            .insert(PolicyKey::default_for(P::KIND), P::wrap(policy));
    }

    /// Policy для (тип, id), иначе default policy этого kind
    pub fn get<P: PolicyFamily + ?Sized>(&self, type_key: &TypeKey, id: Option<&str>) -> Option<Arc<P>> {
        let policies = self.policies.read();
        policies
            .get(&PolicyKey::specific(P::KIND, type_key, id))
            .or_else(|| policies.get(&PolicyKey::default_for(P::KIND)))
            .and_then(P::unwrap)
    }

    /// Только policy, заданная именно для (тип, id), без fallback
    pub fn get_specific<P: PolicyFamily + ?Sized>(
        &self,
        type_key: &TypeKey,
        id: Option<&str>,
    ) -> Option<Arc<P>> {
        self.policies
            .read()
            .get(&PolicyKey::specific(P::KIND, type_key, id))
            .and_then(P::unwrap)
    }

    pub fn get_default<P: PolicyFamily + ?Sized>(&self) -> Option<Arc<P>> {
        self.policies
            .read()
            .get(&PolicyKey::default_for(P::KIND))
            .and_then(P::unwrap)
    }

    pub fn clear<P: PolicyFamily + ?Sized>(&self, type_key: &TypeKey, id: Option<&str>) {
        self.policies
            .write()
            .remove(&PolicyKey::specific(P::KIND, type_key, id));
    }

    pub fn clear_default<P: PolicyFamily + ?Sized>(&self) {
        self.policies
            .write()
            .remove(&PolicyKey::default_for(P::KIND));
    }

    pub fn clear_all(&self) {
        self.policies.write().clear();
    }
}

impl Default for PolicyList {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PolicyList {
    fn clone(&self) -> Self {
        Self {
            policies: RwLock::new(self.policies.read().clone()),
        }
    }
}

impl fmt::Debug for PolicyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyList")
            .field("count", &self.count())
            .finish()
    }
}
