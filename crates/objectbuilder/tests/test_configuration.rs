//! Declarative configuration, загруженная из файла и применённая к builder

mod common;

use std::io::Write;

use anyhow::Result;
use common::*;
use objectbuilder::{
    BuildError, Builder, ConfigurationLoader, LifetimeContainer, NotPresentBehavior, SearchMode,
};

#[test]
fn test_toml_file_configures_mapping_and_singletons() -> Result<()> {
    init_tracing();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    write!(
        file,
        r#"
trace = true

[[singletons]]
type = "ConsoleLogger"

[[mappings]]
from = "Logger"
to = "ConsoleLogger"
"#
    )?;

    let config = ConfigurationLoader::new().load_from_file(file.path())?;
    let builder = Builder::with_configurator(fixture_registry(&EventLog::default()), &config)?;
    let (locator, lifetime) = scope();

    let first = builder.build::<dyn Logger>(Some(&locator), None)?;
    let second = builder.build::<ConsoleLogger>(Some(&locator), None)?;

    assert!(first.ptr_eq(&second));
    assert_eq!(
        lifetime.read::<LifetimeContainer>().map(|c| c.count()),
        Some(1)
    );
    Ok(())
}

#[test]
fn test_yaml_with_unknown_type_fails_on_apply() -> Result<()> {
    init_tracing();
    let config = ConfigurationLoader::new().load_from_yaml("singletons:\n  - type: Ghost\n")?;

    let error = Builder::with_configurator(fixture_registry(&EventLog::default()), &config)
        .err()
        .expect("Ghost is not registered");
    assert_eq!(
        error,
        BuildError::UnknownType {
            name: "Ghost".to_string()
        }
    );
    assert!(error.is_configuration_error());
    Ok(())
}

#[test]
fn test_enumeration_values_parse_from_text() {
    assert_eq!("return_null".parse::<NotPresentBehavior>(), Ok(NotPresentBehavior::ReturnNull));
    assert_eq!("Create-New".parse::<NotPresentBehavior>(), Ok(NotPresentBehavior::CreateNew));
    assert_eq!("local".parse::<SearchMode>(), Ok(SearchMode::Local));

    let error = "sometimes"
        .parse::<NotPresentBehavior>()
        .expect_err("unknown behavior should fail");
    assert_eq!(
        error,
        BuildError::InvalidEnumerationValue {
            enumeration: "NotPresentBehavior".to_string(),
            value: "sometimes".to_string(),
        }
    );
}
