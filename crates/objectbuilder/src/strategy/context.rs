use std::fmt;
use std::sync::Arc;

use super::StrategyChain;
use crate::errors::BuildResult;
use crate::keys::TypeKey;
use crate::location::Locator;
use crate::metadata::MetadataProvider;
use crate::object::Object;
use crate::policy::PolicyList;
use crate::trace::TracePolicy;

/// Состояние одной build/teardown операции.
///
/// Хранит цепочку и курсор (индекс выполняющейся стратегии), locator,
/// собственную копию policies и metadata provider. Рекурсивные builds
/// (`build_from_head`) сохраняют и восстанавливают курсор, поэтому один
/// context обслуживает всё дерево зависимостей.
pub struct BuildContext {
    chain: StrategyChain,
    cursor: usize,
    locator: Option<Locator>,
    policies: PolicyList,
    metadata: Arc<dyn MetadataProvider>,
}

impl BuildContext {
    pub fn new(
        chain: StrategyChain,
        locator: Option<Locator>,
        policies: PolicyList,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            chain,
            cursor: 0,
            locator,
            policies,
            metadata,
        }
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Индекс стратегии, которая сейчас выполняется
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    /// Копия policies этой операции; изменения не видны builder'у
    pub fn policies(&self) -> &PolicyList {
        &self.policies
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataProvider> {
        &self.metadata
    }

    pub fn trace_policy(&self) -> Option<Arc<dyn TracePolicy>> {
        self.policies.get_default::<dyn TracePolicy>()
    }

    /// Передать build следующей стратегии
    pub fn build_next(
        &mut self,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        self.invoke_build(self.cursor + 1, type_to_build, existing, id_to_build)
    }

    /// Построить зависимость с начала цепочки (рекурсивный build)
    pub fn build_from_head(
        &mut self,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        self.invoke_build(0, type_to_build, existing, id_to_build)
    }

    pub fn tear_down_next(&mut self, item: Object) -> BuildResult<Object> {
        self.invoke_tear_down(self.cursor + 1, item)
    }

    pub fn tear_down_from_head(&mut self, item: Object) -> BuildResult<Object> {
        self.invoke_tear_down(0, item)
    }

    fn invoke_build(
        &mut self,
        index: usize,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        // конец цепочки: отдаём то, что построено
        let Some(strategy) = self.chain.get(index).cloned() else {
            return Ok(existing);
        };

        let saved = std::mem::replace(&mut self.cursor, index);
        let result = strategy.build_up(self, type_to_build, existing, id_to_build);
        self.cursor = saved;
        result
    }

    fn invoke_tear_down(&mut self, index: usize, item: Object) -> BuildResult<Object> {
        let Some(strategy) = self.chain.get(index).cloned() else {
            return Ok(item);
        };

        let saved = std::mem::replace(&mut self.cursor, index);
        let result = strategy.tear_down(self, item);
        self.cursor = saved;
        result
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("chain", &self.chain)
            .field("position", &self.cursor)
            .field("locator", &self.locator)
            .field("policies", &self.policies)
            .finish()
    }
}
