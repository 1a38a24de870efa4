//! Declarative configuration builder'а
//!
//! Singleton флаги, type mappings и trace настраиваются из TOML или YAML.
//! Типы указываются по имени регистрации в metadata provider:
//!
//! ```toml
//! trace = true
//!
//! [[singletons]]
//! type = "Database"
//!
//! [[mappings]]
//! from = "Storage"
//! to = "FileStorage"
//! to_id = "primary"
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::builder::{BuilderBase, BuilderConfigurator};
use crate::errors::{BuildError, BuildResult};
use crate::keys::TypeKey;
use crate::metadata::MetadataProvider;
use crate::strategies::{SingletonPolicy, TypeMapping, TypeMappingPolicy};
use crate::strategy::BuilderStage;
use crate::trace::{TracePolicy, TracingTracePolicy};

fn default_true() -> bool {
    true
}

/// Singleton флаг для (тип, id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingletonEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_true")]
    pub is_singleton: bool,
}

/// Отображение запрошенного (тип, id) на другой (тип, id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub from: String,
    #[serde(default)]
    pub from_id: Option<String>,
    pub to: String,
    #[serde(default)]
    pub to_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfiguration {
    /// Установить `TracingTracePolicy` как trace sink
    pub trace: bool,
    pub singletons: Vec<SingletonEntry>,
    pub mappings: Vec<MappingEntry>,
}

impl BuilderConfiguration {
    /// Структурная проверка без обращения к metadata
    pub fn validate(&self) -> BuildResult<()> {
        for (index, entry) in self.singletons.iter().enumerate() {
            if entry.type_name.trim().is_empty() {
                return Err(BuildError::configuration(
                    "singleton type name must not be empty",
                    Some(format!("singletons[{}].type", index)),
                ));
            }
        }

        for (index, entry) in self.mappings.iter().enumerate() {
            if entry.from.trim().is_empty() {
                return Err(BuildError::configuration(
                    "mapping source type must not be empty",
                    Some(format!("mappings[{}].from", index)),
                ));
            }
            if entry.to.trim().is_empty() {
                return Err(BuildError::configuration(
                    "mapping target type must not be empty",
                    Some(format!("mappings[{}].to", index)),
                ));
            }
            if entry.from == entry.to && entry.from_id == entry.to_id {
                return Err(BuildError::configuration(
                    format!("type '{}' is mapped onto itself", entry.from),
                    Some(format!("mappings[{}]", index)),
                ));
            }
        }
        Ok(())
    }
}

fn resolve_type(metadata: &dyn MetadataProvider, name: &str) -> BuildResult<TypeKey> {
    metadata
        .find_by_name(name)
        .ok_or_else(|| BuildError::UnknownType {
            name: name.to_string(),
        })
}

impl BuilderConfigurator<BuilderStage> for BuilderConfiguration {
    fn apply_configuration(&self, builder: &mut BuilderBase<BuilderStage>) -> BuildResult<()> {
        self.validate()?;
        let metadata = builder.metadata().clone();

        for entry in &self.singletons {
            let type_key = resolve_type(metadata.as_ref(), &entry.type_name)?;
            builder.policies().set(
                Arc::new(SingletonPolicy::new(entry.is_singleton)),
                &type_key,
                entry.id.as_deref(),
            );
            debug!(
                "Configured singleton {} ({:?}) = {}",
                type_key, entry.id, entry.is_singleton
            );
        }

        for entry in &self.mappings {
            let from = resolve_type(metadata.as_ref(), &entry.from)?;
            let to = resolve_type(metadata.as_ref(), &entry.to)?;
            builder.policies().set::<dyn TypeMappingPolicy>(
                Arc::new(TypeMapping::new(to, entry.to_id.as_deref())),
                &from,
                entry.from_id.as_deref(),
            );
            debug!("Configured mapping {} -> {}", from, to);
        }

        if self.trace {
            builder
                .policies()
                .set_default::<dyn TracePolicy>(Arc::new(TracingTracePolicy));
        }

        info!(
            "Applied builder configuration: {} singletons, {} mappings",
            self.singletons.len(),
            self.mappings.len()
        );
        Ok(())
    }
}

/// Загрузка [`BuilderConfiguration`] из строки или файла
#[derive(Debug, Clone)]
pub struct ConfigurationLoader {
    validate_on_load: bool,
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self {
            validate_on_load: true,
        }
    }

    /// Включить/выключить проверку после загрузки (по умолчанию включена)
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate_on_load = enabled;
        self
    }

    /// Формат определяется по расширению: `toml`, `yaml`/`yml`
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<BuilderConfiguration> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        debug!("Loading builder configuration from {}", path.display());
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => self.load_from_toml(&content),
            Some("yaml") | Some("yml") => self.load_from_yaml(&content),
            _ => Err(anyhow!(
                "Unsupported configuration file format: {:?}",
                path.extension()
            )),
        }
    }

    pub fn load_from_toml(&self, content: &str) -> Result<BuilderConfiguration> {
        let config: BuilderConfiguration =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        self.finish(config)
    }

    pub fn load_from_yaml(&self, content: &str) -> Result<BuilderConfiguration> {
        let config: BuilderConfiguration =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        self.finish(config)
    }

    fn finish(&self, config: BuilderConfiguration) -> Result<BuilderConfiguration> {
        if self.validate_on_load {
            config.validate()?;
        }
        Ok(config)
    }
}
