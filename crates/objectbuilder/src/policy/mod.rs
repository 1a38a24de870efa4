//! Policies: параметры, которыми strategies управляются для конкретного
//! (тип, id) или по умолчанию.
//!
//! Набор policy kinds закрыт: каждый kind - вариант [`Policy`], а
//! [`PolicyFamily`] связывает kind с его trait/struct, чтобы
//! `PolicyList::get::<dyn CreationPolicy>(..)` возвращал типизированный handle.

mod policy_list;

pub use policy_list::PolicyList;

use std::fmt;
use std::sync::Arc;

use crate::strategies::creation::CreationPolicy;
use crate::strategies::method_execution::MethodPolicy;
use crate::strategies::property_setter::PropertySetterPolicy;
use crate::strategies::singleton::SingletonPolicy;
use crate::strategies::type_mapping::TypeMappingPolicy;
use crate::trace::TracePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolicyKind {
    Creation,
    Singleton,
    TypeMapping,
    PropertySetter,
    Method,
    Trace,
}

/// Policy любого kind
#[derive(Clone)]
pub enum Policy {
    Creation(Arc<dyn CreationPolicy>),
    Singleton(Arc<SingletonPolicy>),
    TypeMapping(Arc<dyn TypeMappingPolicy>),
    PropertySetter(Arc<PropertySetterPolicy>),
    Method(Arc<MethodPolicy>),
    Trace(Arc<dyn TracePolicy>),
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Creation(_) => PolicyKind::Creation,
            Policy::Singleton(_) => PolicyKind::Singleton,
            Policy::TypeMapping(_) => PolicyKind::TypeMapping,
            Policy::PropertySetter(_) => PolicyKind::PropertySetter,
            Policy::Method(_) => PolicyKind::Method,
            Policy::Trace(_) => PolicyKind::Trace,
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Policy::{:?}", self.kind())
    }
}

/// Связь между policy kind и типом handle этого kind
pub trait PolicyFamily: Send + Sync + 'static {
    const KIND: PolicyKind;

    fn wrap(policy: Arc<Self>) -> Policy;

    fn unwrap(policy: &Policy) -> Option<Arc<Self>>;
}

macro_rules! policy_family {
    ($target:ty, $variant:ident) => {
        impl PolicyFamily for $target {
            const KIND: PolicyKind = PolicyKind::$variant;

            fn wrap(policy: Arc<Self>) -> Policy {
                Policy::$variant(policy)
            }

            fn unwrap(policy: &Policy) -> Option<Arc<Self>> {
                match policy {
                    Policy::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

policy_family!(dyn CreationPolicy, Creation);
policy_family!(SingletonPolicy, Singleton);
policy_family!(dyn TypeMappingPolicy, TypeMapping);
policy_family!(PropertySetterPolicy, PropertySetter);
policy_family!(MethodPolicy, Method);
policy_family!(dyn TracePolicy, Trace);
