//! Стратегии по умолчанию и их policies.
//!
//! Порядок в [`Builder`](crate::builder::Builder):
//!
//! - **PreCreation**: TypeMapping, Singleton, ConstructorReflection,
//!   PropertyReflection, MethodReflection
//! - **Creation**: Creation
//! - **Initialization**: PropertySetter, MethodExecution
//! - **PostInitialization**: BuilderAware

pub mod builder_aware;
pub mod creation;
pub mod method_execution;
pub mod property_setter;
pub mod reflection;
pub mod singleton;
pub mod type_mapping;

pub use builder_aware::BuilderAwareStrategy;
pub use creation::{ConstructorPolicy, CreationPolicy, CreationStrategy, DefaultCreationPolicy};
pub use method_execution::{MethodCallInfo, MethodExecutionStrategy, MethodPolicy};
pub use property_setter::{PropertySetterInfo, PropertySetterPolicy, PropertySetterStrategy};
pub use reflection::{
    ConstructorReflectionStrategy, MethodReflectionStrategy, PropertyReflectionStrategy,
    ReflectionStrategy,
};
pub use singleton::{SingletonPolicy, SingletonStrategy};
pub use type_mapping::{TypeMapping, TypeMappingPolicy, TypeMappingStrategy};
