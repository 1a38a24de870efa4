//! Ошибки build pipeline
//!
//! Единый error type для всех операций ObjectBuilder: strategies, policies,
//! locator, lifetime container и configuration loader.
//!
//! # Категории
//!
//! - **configuration**: wiring ошибки (нет creation policy, два injection
//!   constructor, несколько markers на одном parameter, нет strategies)
//! - **type_compatibility**: значение не assignable к целевому типу
//! - **missing_dependency**: dependency не найдена и behavior = Throw
//! - **allocation**: не удалось выделить shell или вызвать constructor
//! - **caller_misuse**: null argument, неинициализированный объект
//! - **locator**: конфликт ключей в locator
//!
//! Host closures (constructors, setters, methods) возвращают `anyhow::Result`,
//! pipeline превращает их ошибки в [`BuildError::InvocationFailed`].

use anyhow::Context;
use thiserror::Error;

/// Основной error type для build/teardown операций
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// BuildUp/TearDown вызван на builder без strategies
    #[error("There are no strategies in the chain")]
    NoStrategies,

    #[error("{}", missing_creation_policy_message(.type_name, .id.as_deref()))]
    MissingCreationPolicy {
        type_name: String,
        id: Option<String>,
    },

    /// Больше одного constructor помечено как injection constructor
    #[error("Type {type_name} has multiple constructors marked for injection")]
    AmbiguousInjectionConstructor { type_name: String },

    #[error("Member '{member}' of {type_name} carries more than one parameter marker")]
    InvalidAttributeCombination { type_name: String, member: String },

    #[error("Invalid value '{value}' for enumeration {enumeration}")]
    InvalidEnumerationValue { enumeration: String, value: String },

    #[error(
        "Type {provided} is not compatible with type {expected} (while building {building})"
    )]
    IncompatibleTypes {
        expected: String,
        provided: String,
        building: String,
    },

    #[error("Member '{member}' of {type_name} expects {expected} arguments, got {provided}")]
    ParameterCountMismatch {
        type_name: String,
        member: String,
        expected: usize,
        provided: usize,
    },

    #[error("Could not resolve dependency {type_name}{}", describe_id(.id.as_deref()))]
    DependencyMissing {
        type_name: String,
        id: Option<String>,
    },

    #[error("Cannot create an instance of {type_name}: {reason}")]
    CannotCreateInstance { type_name: String, reason: String },

    #[error("Could not find an appropriate constructor for {type_name}")]
    NoAppropriateConstructor { type_name: String },

    #[error("Cannot inject read-only property '{property}' of {type_name}")]
    ReadOnlyProperty { type_name: String, property: String },

    #[error("Argument '{argument}' must not be null")]
    NullArgument { argument: String },

    /// Host constructor/setter/method вернул ошибку
    #[error("Invocation of {type_name}::{member} failed: {message}")]
    InvocationFailed {
        type_name: String,
        member: String,
        message: String,
    },

    #[error("Object of type {type_name} is not initialized")]
    UninitializedObject { type_name: String },

    #[error("Key {key} is already present in the locator")]
    DuplicateLocatorKey { key: String },

    #[error("Type '{name}' is not registered with the metadata provider")]
    UnknownType { name: String },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },
}

pub type BuildResult<T> = Result<T, BuildError>;

fn missing_creation_policy_message(type_name: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!(
            "Missing creation policy for type {} with id '{}'",
            type_name, id
        ),
        None => format!("Missing creation policy for type {}", type_name),
    }
}

fn describe_id(id: Option<&str>) -> String {
    id.map(|id| format!(" with id '{}'", id))
        .unwrap_or_default()
}

impl BuildError {
    pub fn incompatible_types(
        expected: impl Into<String>,
        provided: impl Into<String>,
        building: impl Into<String>,
    ) -> Self {
        BuildError::IncompatibleTypes {
            expected: expected.into(),
            provided: provided.into(),
            building: building.into(),
        }
    }

    pub fn cannot_create(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        BuildError::CannotCreateInstance {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Обернуть ошибку host closure, сохранив всю anyhow chain
    pub fn invocation(
        type_name: impl Into<String>,
        member: impl Into<String>,
        error: &anyhow::Error,
    ) -> Self {
        BuildError::InvocationFailed {
            type_name: type_name.into(),
            member: member.into(),
            message: format!("{:#}", error),
        }
    }

    pub fn null_argument(argument: impl Into<String>) -> Self {
        BuildError::NullArgument {
            argument: argument.into(),
        }
    }

    pub fn configuration(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        BuildError::Configuration {
            message: message.into(),
            field: field.map(|f| f.into()),
        }
    }

    /// Ошибка wiring, которую должен исправить caller (а не retry)
    pub fn is_configuration_error(&self) -> bool {
        matches!(self.category(), "configuration")
    }

    /// Get error category for diagnostics
    pub fn category(&self) -> &'static str {
        match self {
            BuildError::NoStrategies => "configuration",
            BuildError::MissingCreationPolicy { .. } => "configuration",
            BuildError::AmbiguousInjectionConstructor { .. } => "configuration",
            BuildError::InvalidAttributeCombination { .. } => "configuration",
            BuildError::InvalidEnumerationValue { .. } => "configuration",
            BuildError::UnknownType { .. } => "configuration",
            BuildError::Configuration { .. } => "configuration",
            BuildError::IncompatibleTypes { .. } => "type_compatibility",
            BuildError::ParameterCountMismatch { .. } => "type_compatibility",
            BuildError::ReadOnlyProperty { .. } => "type_compatibility",
            BuildError::DependencyMissing { .. } => "missing_dependency",
            BuildError::CannotCreateInstance { .. } => "allocation",
            BuildError::NoAppropriateConstructor { .. } => "allocation",
            BuildError::InvocationFailed { .. } => "allocation",
            BuildError::NullArgument { .. } => "caller_misuse",
            BuildError::UninitializedObject { .. } => "caller_misuse",
            BuildError::DuplicateLocatorKey { .. } => "locator",
        }
    }
}

/// Extension trait для добавления anyhow context к BuildResult
pub trait BuildContextExt<T> {
    fn with_build_context<F>(self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce() -> String;

    fn build_context(self, msg: &'static str) -> anyhow::Result<T>;
}

impl<T> BuildContextExt<T> for BuildResult<T> {
    fn with_build_context<F>(self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(anyhow::Error::from).with_context(f)
    }

    fn build_context(self, msg: &'static str) -> anyhow::Result<T> {
        self.map_err(anyhow::Error::from).context(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_creation_policy_message_distinguishes_ids() {
        let unnamed = BuildError::MissingCreationPolicy {
            type_name: "Foo".to_string(),
            id: None,
        };
        let named = BuildError::MissingCreationPolicy {
            type_name: "Foo".to_string(),
            id: Some("primary".to_string()),
        };

        assert_eq!(unnamed.to_string(), "Missing creation policy for type Foo");
        assert_eq!(
            named.to_string(),
            "Missing creation policy for type Foo with id 'primary'"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(BuildError::NoStrategies.category(), "configuration");
        assert!(BuildError::NoStrategies.is_configuration_error());

        let incompatible = BuildError::incompatible_types("A", "B", "C");
        assert_eq!(incompatible.category(), "type_compatibility");
        assert!(!incompatible.is_configuration_error());

        let missing = BuildError::DependencyMissing {
            type_name: "Repo".to_string(),
            id: Some("main".to_string()),
        };
        assert_eq!(missing.category(), "missing_dependency");
        assert_eq!(
            missing.to_string(),
            "Could not resolve dependency Repo with id 'main'"
        );
    }

    #[test]
    fn test_invocation_keeps_anyhow_chain() {
        let source = anyhow::anyhow!("disk full").context("opening store");
        let error = BuildError::invocation("Store", "new", &source);

        match &error {
            BuildError::InvocationFailed { message, .. } => {
                assert!(message.contains("opening store"));
                assert!(message.contains("disk full"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_context_extension() {
        let result: BuildResult<()> = Err(BuildError::NoStrategies);
        let error = result
            .build_context("building root service")
            .expect_err("error should propagate");

        assert_eq!(error.to_string(), "building root service");
        assert!(error.downcast_ref::<BuildError>().is_some());
    }
}
