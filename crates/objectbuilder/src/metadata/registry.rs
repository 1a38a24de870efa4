use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{MetadataProvider, TypeDescriptor};
use crate::keys::TypeKey;

/// Таблица регистраций типов; реализация [`MetadataProvider`] по умолчанию
pub struct TypeRegistry {
    types: RwLock<HashMap<TypeKey, Arc<TypeDescriptor>>>,
    names: RwLock<HashMap<String, TypeKey>>,
}

impl TypeRegistry {
    /// Registry с предрегистрированными primitive value types
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register_primitives();
        registry
    }

    pub fn empty() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
        }
    }

    fn register_primitives(&self) {
        macro_rules! value_types {
            ($registry:expr; $($ty:ty => $name:literal),* $(,)?) => {
                $($registry.register(TypeDescriptor::value::<$ty>().named($name).cloneable());)*
            };
        }

        value_types! {
            self;
            i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64", i128 => "i128", isize => "isize",
            u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64", u128 => "u128", usize => "usize",
            f32 => "f32", f64 => "f64", bool => "bool", char => "char", String => "String",
        }
    }

    /// Зарегистрировать (или заменить) описание типа
    pub fn register(&self, descriptor: impl Into<TypeDescriptor>) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor.into());
        let type_key = descriptor.type_key();

        {
            let mut names = self.names.write();
            names.insert(type_key.name().to_string(), type_key);
            names.insert(descriptor.registered_name().to_string(), type_key);
        }

        let replaced = self
            .types
            .write()
            .insert(type_key, descriptor.clone())
            .is_some();
        if replaced {
            debug!("Replaced type registration for {}", type_key);
        } else {
            debug!(
                "Registered type {} as '{}' ({:?})",
                type_key,
                descriptor.registered_name(),
                descriptor.shape()
            );
        }

        descriptor
    }

    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.types.read().contains_key(type_key)
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for TypeRegistry {
    fn describe(&self, type_key: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(type_key).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<TypeKey> {
        self.names.read().get(name).copied()
    }
}
