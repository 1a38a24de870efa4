use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::{BuildError, BuildResult};
use crate::guard;
use crate::keys::TypeKey;
use crate::metadata::{Args, MethodInfo};
use crate::object::Object;
use crate::parameters::{self, Parameter};
use crate::strategy::{BuildContext, BuilderStrategy};

/// Вызов одного method: member handle или имя + value sources
#[derive(Debug, Clone)]
pub struct MethodCallInfo {
    name: String,
    method: Option<Arc<MethodInfo>>,
    parameters: Vec<Arc<dyn Parameter>>,
}

impl MethodCallInfo {
    /// Method ищется по имени и типам value sources
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: None,
            parameters: Vec::new(),
        }
    }

    pub fn for_method(method: Arc<MethodInfo>, parameters: Vec<Arc<dyn Parameter>>) -> Self {
        Self {
            name: method.name().to_string(),
            method: Some(method),
            parameters,
        }
    }

    pub fn parameter(mut self, parameter: impl Parameter + 'static) -> Self {
        self.parameters.push(Arc::new(parameter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select_method(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
    ) -> Option<Arc<MethodInfo>> {
        if let Some(method) = &self.method {
            return Some(method.clone());
        }
        let types: Vec<TypeKey> = self
            .parameters
            .iter()
            .map(|parameter| parameter.parameter_type(context))
            .collect();
        context
            .metadata()
            .describe(type_to_build)
            .and_then(|descriptor| descriptor.find_method(&self.name, &types))
    }

    pub fn get_parameters(&self, context: &mut BuildContext) -> BuildResult<Vec<Option<Object>>> {
        parameters::resolve_all(&self.parameters, context)
    }
}

/// Methods для вызова после создания, в порядке добавления
#[derive(Debug, Default, Clone)]
pub struct MethodPolicy {
    methods: IndexMap<String, MethodCallInfo>,
}

impl MethodPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, call: MethodCallInfo) -> Self {
        self.insert(call);
        self
    }

    pub fn insert(&mut self, call: MethodCallInfo) {
        self.methods.insert(call.name.clone(), call);
    }

    pub fn insert_if_absent(&mut self, call: MethodCallInfo) {
        self.methods.entry(call.name.clone()).or_insert(call);
    }

    pub fn get(&self, name: &str) -> Option<&MethodCallInfo> {
        self.methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodCallInfo> {
        self.methods.values()
    }
}

/// Вызывает methods по policy конкретного runtime типа; method, который не
/// удалось найти, пропускается
#[derive(Debug, Default)]
pub struct MethodExecutionStrategy;

impl MethodExecutionStrategy {
    fn apply_policy(
        &self,
        context: &mut BuildContext,
        object: &Object,
        id_to_build: Option<&str>,
    ) -> BuildResult<()> {
        let concrete = object.type_key();
        let Some(policy) = context.policies().get::<MethodPolicy>(&concrete, id_to_build) else {
            return Ok(());
        };

        for call in policy.iter() {
            let Some(method) = call.select_method(context, &concrete) else {
                continue;
            };

            let values = call.get_parameters(context)?;
            guard::validate_parameters(
                context.metadata().as_ref(),
                method.parameters(),
                &values,
                &concrete,
                method.name(),
            )?;

            self.trace_build_up(
                context,
                &concrete,
                id_to_build,
                format_args!("Calling method {} ({} parameters)", method.name(), values.len()),
            );
            let args = Args::new(values);
            object
                .with_value_mut(|target| method.invoke(target, &args))?
                .map_err(|error| BuildError::invocation(concrete.name(), method.name(), &error))?;
        }
        Ok(())
    }
}

impl BuilderStrategy for MethodExecutionStrategy {
    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        if let Some(object) = &existing {
            self.apply_policy(context, object, id_to_build)?;
        }
        context.build_next(type_to_build, existing, id_to_build)
    }
}
