//! Strategy pipeline: trait стратегии, стадии, цепочка и build context.

mod chain;
mod context;

pub use chain::{StrategyChain, StrategyList};
pub use context::BuildContext;

use std::fmt;
use std::hash::Hash;

use crate::errors::BuildResult;
use crate::keys::{display_id, short_type_name, TypeKey};
use crate::object::Object;

/// Шаг build pipeline.
///
/// Реализация по умолчанию просто передаёт управление следующей стратегии,
/// поэтому стратегия переопределяет только ту фазу, которая ей нужна.
pub trait BuilderStrategy: Send + Sync {
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        context.build_next(type_to_build, existing, id_to_build)
    }

    fn tear_down(&self, context: &mut BuildContext, item: Object) -> BuildResult<Object> {
        context.tear_down_next(item)
    }

    /// Trace сообщение вида `Strategy(type, id): message`
    fn trace_build_up(
        &self,
        context: &BuildContext,
        type_key: &TypeKey,
        id: Option<&str>,
        message: fmt::Arguments<'_>,
    ) {
        if let Some(trace) = context.trace_policy() {
            trace.trace(format_args!(
                "{}({}, {}): {}",
                self.name(),
                type_key,
                display_id(id),
                message
            ));
        }
    }

    fn trace_tear_down(&self, context: &BuildContext, item: &Object, message: fmt::Arguments<'_>) {
        if let Some(trace) = context.trace_policy() {
            trace.trace(format_args!(
                "{}({}): {}",
                self.name(),
                item.type_key(),
                message
            ));
        }
    }
}

/// Упорядоченный набор стадий pipeline
pub trait Stage: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Все стадии в порядке выполнения build up
    fn ordered() -> &'static [Self];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuilderStage {
    PreCreation,
    Creation,
    Initialization,
    PostInitialization,
}

impl Stage for BuilderStage {
    fn ordered() -> &'static [Self] {
        &[
            BuilderStage::PreCreation,
            BuilderStage::Creation,
            BuilderStage::Initialization,
            BuilderStage::PostInitialization,
        ]
    }
}
