//! Builder: точка входа в pipeline.
//!
//! [`BuilderBase`] держит strategies по стадиям, builder-level policies и
//! metadata provider. Каждый `build_up`/`tear_down` создаёт свежий
//! [`BuildContext`] с копией policies, поэтому изменения одной операции не
//! видны следующей.

use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::{BuildError, BuildResult};
use crate::keys::{display_id, TypeKey};
use crate::location::Locator;
use crate::metadata::MetadataProvider;
use crate::object::Object;
use crate::policy::PolicyList;
use crate::strategies::{
    BuilderAwareStrategy, ConstructorReflectionStrategy, CreationPolicy, CreationStrategy,
    DefaultCreationPolicy, MethodExecutionStrategy, MethodReflectionStrategy,
    PropertyReflectionStrategy, PropertySetterStrategy, SingletonStrategy, TypeMappingStrategy,
};
use crate::strategy::{BuildContext, BuilderStage, Stage, StrategyList};

/// Настройка builder'а после создания (strategies, policies)
pub trait BuilderConfigurator<S: Stage = BuilderStage> {
    fn apply_configuration(&self, builder: &mut BuilderBase<S>) -> BuildResult<()>;
}

/// Builder без strategies по умолчанию
pub struct BuilderBase<S: Stage = BuilderStage> {
    policies: PolicyList,
    strategies: StrategyList<S>,
    metadata: Arc<dyn MetadataProvider>,
}

impl<S: Stage> BuilderBase<S> {
    pub fn new(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            policies: PolicyList::new(),
            strategies: StrategyList::new(),
            metadata,
        }
    }

    pub fn with_configurator(
        metadata: Arc<dyn MetadataProvider>,
        configurator: &dyn BuilderConfigurator<S>,
    ) -> BuildResult<Self> {
        let mut builder = Self::new(metadata);
        configurator.apply_configuration(&mut builder)?;
        Ok(builder)
    }

    pub fn policies(&self) -> &PolicyList {
        &self.policies
    }

    pub fn strategies(&self) -> &StrategyList<S> {
        &self.strategies
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataProvider> {
        &self.metadata
    }

    /// Построить (или проинициализировать `existing`) объект типа `type_to_build`.
    ///
    /// Transient policies накладываются поверх builder-level policies только
    /// на время этой операции. Если передан locator, вся операция, включая
    /// рекурсивные builds зависимостей, выполняется под его build lock.
    pub fn build_up(
        &self,
        locator: Option<&Locator>,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        existing: Option<Object>,
        transient_policies: &[&PolicyList],
    ) -> BuildResult<Option<Object>> {
        let chain = self.strategies.make_strategy_chain();
        if chain.is_empty() {
            return Err(BuildError::NoStrategies);
        }

        let _guard = locator.map(Locator::lock_for_build);

        let mut lists = Vec::with_capacity(transient_policies.len() + 1);
        lists.push(&self.policies);
        lists.extend_from_slice(transient_policies);

        let mut context = BuildContext::new(
            chain,
            locator.cloned(),
            PolicyList::from_lists(&lists),
            self.metadata.clone(),
        );

        debug!("Build up {} ({})", type_to_build, display_id(id_to_build));
        if let Some(trace_policy) = context.trace_policy() {
            trace_policy.trace(format_args!(
                "Building {} ({})",
                type_to_build,
                display_id(id_to_build)
            ));
        }

        let result = context.build_from_head(type_to_build, existing, id_to_build);

        match &result {
            Ok(Some(object)) => trace!("Built {} -> {:?}", type_to_build, object),
            Ok(None) => trace!("Build of {} produced no object", type_to_build),
            Err(error) => debug!("Build of {} failed: {}", type_to_build, error),
        }
        if let Some(trace_policy) = context.trace_policy() {
            trace_policy.trace(format_args!(
                "Finished building {} ({})",
                type_to_build,
                display_id(id_to_build)
            ));
        }
        result
    }

    /// Typed вариант `build_up` без existing и transient policies
    pub fn build<T: ?Sized + 'static>(
        &self,
        locator: Option<&Locator>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Object> {
        let type_key = TypeKey::of::<T>();
        self.build_up(locator, &type_key, id_to_build, None, &[])?
            .ok_or_else(|| BuildError::cannot_create(type_key.name(), "pipeline returned no object"))
    }

    /// Передать готовое значение через pipeline (register + inject + notify)
    pub fn build_existing<T: Any + Send + Sync>(
        &self,
        locator: Option<&Locator>,
        id_to_build: Option<&str>,
        value: T,
    ) -> BuildResult<Object> {
        let type_key = TypeKey::of::<T>();
        let object = Object::new(value);
        self.build_up(locator, &type_key, id_to_build, Some(object.clone()), &[])
            .map(|built| built.unwrap_or(object))
    }

    /// Прогнать объект через обратную цепочку
    pub fn tear_down(&self, locator: Option<&Locator>, item: Option<Object>) -> BuildResult<Object> {
        let item = item.ok_or_else(|| BuildError::null_argument("item"))?;

        let chain = self.strategies.make_reverse_strategy_chain();
        if chain.is_empty() {
            return Err(BuildError::NoStrategies);
        }

        let _guard = locator.map(Locator::lock_for_build);

        let mut context = BuildContext::new(
            chain,
            locator.cloned(),
            self.policies.clone(),
            self.metadata.clone(),
        );

        debug!("Tear down {}", item.type_key());
        context.tear_down_from_head(item)
    }
}

/// Builder со стандартными strategies и `DefaultCreationPolicy`
pub struct Builder {
    base: BuilderBase<BuilderStage>,
}

impl Builder {
    pub fn new(metadata: Arc<dyn MetadataProvider>) -> Self {
        let base = BuilderBase::new(metadata);

        let strategies = base.strategies();
        strategies.add_new::<TypeMappingStrategy>(BuilderStage::PreCreation);
        strategies.add_new::<SingletonStrategy>(BuilderStage::PreCreation);
        strategies.add_new::<ConstructorReflectionStrategy>(BuilderStage::PreCreation);
        strategies.add_new::<PropertyReflectionStrategy>(BuilderStage::PreCreation);
        strategies.add_new::<MethodReflectionStrategy>(BuilderStage::PreCreation);
        strategies.add_new::<CreationStrategy>(BuilderStage::Creation);
        strategies.add_new::<PropertySetterStrategy>(BuilderStage::Initialization);
        strategies.add_new::<MethodExecutionStrategy>(BuilderStage::Initialization);
        strategies.add_new::<BuilderAwareStrategy>(BuilderStage::PostInitialization);

        base.policies()
            .set_default::<dyn CreationPolicy>(Arc::new(DefaultCreationPolicy));

        Self { base }
    }

    /// Стандартный builder + configurator поверх него
    pub fn with_configurator(
        metadata: Arc<dyn MetadataProvider>,
        configurator: &dyn BuilderConfigurator<BuilderStage>,
    ) -> BuildResult<Self> {
        let mut builder = Self::new(metadata);
        configurator.apply_configuration(&mut builder.base)?;
        Ok(builder)
    }
}

impl Deref for Builder {
    type Target = BuilderBase<BuilderStage>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for Builder {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeRegistry;
    use crate::strategies::SingletonPolicy;
    use crate::trace::RecordingTracePolicy;
    use crate::trace::TracePolicy;

    #[test]
    fn test_empty_builder_reports_no_strategies() {
        let builder: BuilderBase = BuilderBase::new(Arc::new(TypeRegistry::new()));
        let locator = Locator::new();

        let error = builder
            .build_up(Some(&locator), &TypeKey::of::<i32>(), None, None, &[])
            .expect_err("empty chain should fail");
        assert_eq!(error, BuildError::NoStrategies);
    }

    #[test]
    fn test_default_builder_stage_order() {
        let builder = Builder::new(Arc::new(TypeRegistry::new()));
        assert_eq!(
            builder.strategies().make_strategy_chain().names(),
            vec![
                "TypeMappingStrategy",
                "SingletonStrategy",
                "ConstructorReflectionStrategy",
                "PropertyReflectionStrategy",
                "MethodReflectionStrategy",
                "CreationStrategy",
                "PropertySetterStrategy",
                "MethodExecutionStrategy",
                "BuilderAwareStrategy",
            ]
        );
    }

    #[test]
    fn test_value_type_builds_without_locator() {
        let builder = Builder::new(Arc::new(TypeRegistry::new()));

        let object = builder
            .build::<i32>(None, None)
            .expect("building i32 should succeed");
        assert_eq!(object.get::<i32>(), Some(0));
    }

    #[test]
    fn test_transient_policies_do_not_leak() {
        let builder = Builder::new(Arc::new(TypeRegistry::new()));
        let locator = Locator::new();
        let _lifetime = locator
            .add_lifetime_container(Default::default())
            .expect("lifetime container registration should succeed");

        let transient = PolicyList::new();
        transient.set(Arc::new(SingletonPolicy::new(true)), &TypeKey::of::<String>(), None);

        let first = builder
            .build_up(Some(&locator), &TypeKey::of::<String>(), None, None, &[&transient])
            .expect("singleton build should succeed")
            .expect("object should be produced");
        assert!(builder
            .policies()
            .get::<SingletonPolicy>(&TypeKey::of::<String>(), None)
            .is_none());

        let again = builder
            .build_up(Some(&locator), &TypeKey::of::<String>(), None, None, &[])
            .expect("build should succeed")
            .expect("object should be produced");
        assert!(again.ptr_eq(&first));
    }

    #[test]
    fn test_trace_brackets_build() {
        let builder = Builder::new(Arc::new(TypeRegistry::new()));
        let recorder = Arc::new(RecordingTracePolicy::new());
        builder
            .policies()
            .set_default::<dyn TracePolicy>(recorder.clone());

        builder
            .build::<bool>(None, Some("flag"))
            .expect("building bool should succeed");

        let messages = recorder.messages();
        assert_eq!(messages.first().map(String::as_str), Some("Building bool (flag)"));
        assert_eq!(messages.last().map(String::as_str), Some("Finished building bool (flag)"));
    }

    #[test]
    fn test_tear_down_rejects_null_item() {
        let builder = Builder::new(Arc::new(TypeRegistry::new()));

        let error = builder
            .tear_down(None, None)
            .expect_err("tear down of nothing should fail");
        assert_eq!(error, BuildError::null_argument("item"));
    }
}
