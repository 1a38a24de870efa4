//! Проверки совместимости типов перед вызовом host members

use crate::errors::{BuildError, BuildResult};
use crate::keys::TypeKey;
use crate::metadata::{MetadataProvider, ParameterInfo};
use crate::object::Object;

pub fn type_is_assignable(
    metadata: &dyn MetadataProvider,
    assignee: &TypeKey,
    provided: &TypeKey,
    building: &TypeKey,
) -> BuildResult<()> {
    if metadata.is_assignable(assignee, provided) {
        Ok(())
    } else {
        Err(BuildError::incompatible_types(
            assignee.name(),
            provided.name(),
            building.name(),
        ))
    }
}

/// Количество и типы аргументов против объявленных parameters; null пропускается
pub fn validate_parameters(
    metadata: &dyn MetadataProvider,
    parameters: &[ParameterInfo],
    values: &[Option<Object>],
    building: &TypeKey,
    member: &str,
) -> BuildResult<()> {
    if parameters.len() != values.len() {
        return Err(BuildError::ParameterCountMismatch {
            type_name: building.name().to_string(),
            member: member.to_string(),
            expected: parameters.len(),
            provided: values.len(),
        });
    }

    for (parameter, value) in parameters.iter().zip(values) {
        let Some(value) = value else {
            continue;
        };
        let (expected, provided) = (parameter.type_key(), value.type_key());
        if !metadata.is_assignable(&expected, &provided) {
            return Err(BuildError::incompatible_types(
                expected.name(),
                provided.name(),
                format!(
                    "{}, parameter '{}' of '{}'",
                    building.name(),
                    parameter.name(),
                    member
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeRegistry;

    #[test]
    fn test_null_values_skip_type_check() {
        let registry = TypeRegistry::new();
        let parameters = vec![ParameterInfo::of::<i32>("a"), ParameterInfo::of::<String>("b")];
        let building = TypeKey::of::<()>();

        validate_parameters(
            &registry,
            &parameters,
            &[Some(Object::new(1_i32)), None],
            &building,
            "new",
        )
        .expect("null argument should be accepted");

        let error = validate_parameters(
            &registry,
            &parameters,
            &[Some(Object::new(1_i32)), Some(Object::new(2_i32))],
            &building,
            "new",
        )
        .expect_err("i32 is not a String");
        assert_eq!(
            error,
            BuildError::incompatible_types(
                TypeKey::of::<String>().name(),
                TypeKey::of::<i32>().name(),
                format!("{}, parameter 'b' of 'new'", building.name()),
            )
        );
        assert!(error.to_string().contains("parameter 'b'"));
    }

    #[test]
    fn test_argument_count_must_match() {
        let registry = TypeRegistry::new();
        let parameters = vec![ParameterInfo::of::<i32>("a")];
        let error = validate_parameters(&registry, &parameters, &[], &TypeKey::of::<()>(), "new")
            .expect_err("missing argument must fail");

        assert!(matches!(
            error,
            BuildError::ParameterCountMismatch {
                expected: 1,
                provided: 0,
                ..
            }
        ));
    }
}
