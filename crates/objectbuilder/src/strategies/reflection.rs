//! Reflection strategies: читают members типа из metadata и превращают
//! их parameter markers в policies для последующих стратегий.
//!
//! Общий алгоритм живёт в [`ReflectionStrategy`]; что именно считается
//! member'ом и куда записывается policy, решает [`MemberReflection`].

use std::sync::Arc;

use crate::errors::{BuildError, BuildResult};
use crate::keys::TypeKey;
use crate::metadata::{ConstructorInfo, MethodInfo, ParameterInfo, PropertyInfo};
use crate::object::Object;
use crate::parameters::{self, DependencyParameter, Parameter};
use crate::strategies::creation::{ConstructorPolicy, CreationPolicy};
use crate::strategies::method_execution::{MethodCallInfo, MethodPolicy};
use crate::strategies::property_setter::{PropertySetterInfo, PropertySetterPolicy};
use crate::strategy::{BuildContext, BuilderStrategy};

/// Member, у которого есть parameters с markers
pub trait ReflectionMember: Send + Sync {
    fn member_name(&self) -> &str;

    fn member_parameters(&self) -> Vec<ParameterInfo>;
}

impl ReflectionMember for ConstructorInfo {
    fn member_name(&self) -> &str {
        "constructor"
    }

    fn member_parameters(&self) -> Vec<ParameterInfo> {
        self.parameters().to_vec()
    }
}

impl ReflectionMember for PropertyInfo {
    fn member_name(&self) -> &str {
        self.name()
    }

    fn member_parameters(&self) -> Vec<ParameterInfo> {
        vec![self.as_parameter()]
    }
}

impl ReflectionMember for MethodInfo {
    fn member_name(&self) -> &str {
        self.name()
    }

    fn member_parameters(&self) -> Vec<ParameterInfo> {
        self.parameters().to_vec()
    }
}

pub trait MemberReflection: Send + Sync {
    type Member: ReflectionMember;

    const NAME: &'static str;

    fn members(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        existing: Option<&Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Vec<Arc<Self::Member>>>;

    fn requires_processing(&self, member: &Self::Member) -> bool;

    fn add_parameters_to_policy(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        member: &Arc<Self::Member>,
        parameters: Vec<Arc<dyn Parameter>>,
    );
}

#[derive(Debug, Default)]
pub struct ReflectionStrategy<R> {
    reflection: R,
}

impl<R: MemberReflection> ReflectionStrategy<R> {
    pub fn new(reflection: R) -> Self {
        Self { reflection }
    }
}

/// 0 markers - dependency по типу, 1 marker - его source, больше - ошибка
fn generate_parameters(
    type_to_build: &TypeKey,
    member: &dyn ReflectionMember,
) -> BuildResult<Vec<Arc<dyn Parameter>>> {
    member
        .member_parameters()
        .iter()
        .map(|parameter| match parameter.markers() {
            [] => Ok(Arc::new(DependencyParameter::new(
                parameter.type_key(),
                None,
                None,
                Default::default(),
                Default::default(),
            )) as Arc<dyn Parameter>),
            [marker] => Ok(parameters::from_marker(marker, parameter.type_key())),
            _ => Err(BuildError::InvalidAttributeCombination {
                type_name: type_to_build.name().to_string(),
                member: format!("{}({})", member.member_name(), parameter.name()),
            }),
        })
        .collect()
}

impl<R: MemberReflection> BuilderStrategy for ReflectionStrategy<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        let members = self
            .reflection
            .members(context, type_to_build, existing.as_ref(), id_to_build)?;

        for member in members {
            if !self.reflection.requires_processing(&member) {
                continue;
            }
            let parameters = generate_parameters(type_to_build, member.as_ref())?;
            self.reflection.add_parameters_to_policy(
                context,
                type_to_build,
                id_to_build,
                &member,
                parameters,
            );
        }

        context.build_next(type_to_build, existing, id_to_build)
    }
}

/// Выбирает injection constructor, пока creation policy не задана явно
#[derive(Debug, Default)]
pub struct ConstructorReflection;

impl MemberReflection for ConstructorReflection {
    type Member = ConstructorInfo;

    const NAME: &'static str = "ConstructorReflectionStrategy";

    fn members(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        existing: Option<&Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Vec<Arc<ConstructorInfo>>> {
        if existing.is_some() {
            return Ok(Vec::new());
        }
        let replaceable = context
            .policies()
            .get::<dyn CreationPolicy>(type_to_build, id_to_build)
            .map(|policy| policy.is_default())
            .unwrap_or(true);
        if !replaceable {
            return Ok(Vec::new());
        }

        let Some(descriptor) = context.metadata().describe(type_to_build) else {
            return Ok(Vec::new());
        };

        let constructors = descriptor.constructors();
        if constructors.len() == 1 {
            return Ok(constructors.to_vec());
        }

        let mut marked = constructors
            .iter()
            .filter(|constructor| constructor.is_injection_constructor());
        match (marked.next(), marked.next()) {
            (Some(_), Some(_)) => Err(BuildError::AmbiguousInjectionConstructor {
                type_name: type_to_build.name().to_string(),
            }),
            (Some(constructor), None) => Ok(vec![constructor.clone()]),
            _ => Ok(Vec::new()),
        }
    }

    fn requires_processing(&self, _member: &ConstructorInfo) -> bool {
        true
    }

    fn add_parameters_to_policy(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        member: &Arc<ConstructorInfo>,
        parameters: Vec<Arc<dyn Parameter>>,
    ) {
        let policy = ConstructorPolicy::for_constructor(member.clone(), parameters);
        context
            .policies()
            .set::<dyn CreationPolicy>(Arc::new(policy), type_to_build, id_to_build);
    }
}

/// Properties с хотя бы одним marker
#[derive(Debug, Default)]
pub struct PropertyReflection;

impl MemberReflection for PropertyReflection {
    type Member = PropertyInfo;

    const NAME: &'static str = "PropertyReflectionStrategy";

    fn members(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        _existing: Option<&Object>,
        _id_to_build: Option<&str>,
    ) -> BuildResult<Vec<Arc<PropertyInfo>>> {
        Ok(context
            .metadata()
            .describe(type_to_build)
            .map(|descriptor| descriptor.properties().to_vec())
            .unwrap_or_default())
    }

    fn requires_processing(&self, member: &PropertyInfo) -> bool {
        !member.markers().is_empty()
    }

    fn add_parameters_to_policy(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        member: &Arc<PropertyInfo>,
        parameters: Vec<Arc<dyn Parameter>>,
    ) {
        let mut policy = context
            .policies()
            .get::<PropertySetterPolicy>(type_to_build, id_to_build)
            .map(|existing| (*existing).clone())
            .unwrap_or_default();

        for parameter in parameters {
            policy.insert_if_absent(PropertySetterInfo::for_property(member.clone(), parameter));
        }

        context
            .policies()
            .set::<PropertySetterPolicy>(Arc::new(policy), type_to_build, id_to_build);
    }
}

/// Methods, помеченные как injection methods
#[derive(Debug, Default)]
pub struct MethodReflection;

impl MemberReflection for MethodReflection {
    type Member = MethodInfo;

    const NAME: &'static str = "MethodReflectionStrategy";

    fn members(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        _existing: Option<&Object>,
        _id_to_build: Option<&str>,
    ) -> BuildResult<Vec<Arc<MethodInfo>>> {
        Ok(context
            .metadata()
            .describe(type_to_build)
            .map(|descriptor| descriptor.methods().to_vec())
            .unwrap_or_default())
    }

    fn requires_processing(&self, member: &MethodInfo) -> bool {
        member.is_injection_method()
    }

    fn add_parameters_to_policy(
        &self,
        context: &BuildContext,
        type_to_build: &TypeKey,
        id_to_build: Option<&str>,
        member: &Arc<MethodInfo>,
        parameters: Vec<Arc<dyn Parameter>>,
    ) {
        let mut policy = context
            .policies()
            .get::<MethodPolicy>(type_to_build, id_to_build)
            .map(|existing| (*existing).clone())
            .unwrap_or_default();

        policy.insert_if_absent(MethodCallInfo::for_method(member.clone(), parameters));

        context
            .policies()
            .set::<MethodPolicy>(Arc::new(policy), type_to_build, id_to_build);
    }
}

pub type ConstructorReflectionStrategy = ReflectionStrategy<ConstructorReflection>;
pub type PropertyReflectionStrategy = ReflectionStrategy<PropertyReflection>;
pub type MethodReflectionStrategy = ReflectionStrategy<MethodReflection>;
