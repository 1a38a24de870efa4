use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{BuilderStage, BuilderStrategy, Stage};

/// Неизменяемая упорядоченная цепочка стратегий.
///
/// Позиция стратегии - её индекс; `get_next(i)` возвращает стратегию `i + 1`.
#[derive(Clone)]
pub struct StrategyChain {
    strategies: Arc<[Arc<dyn BuilderStrategy>]>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Arc<dyn BuilderStrategy>>) -> Self {
        Self {
            strategies: strategies.into(),
        }
    }

    pub fn head(&self) -> Option<&Arc<dyn BuilderStrategy>> {
        self.strategies.first()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn BuilderStrategy>> {
        self.strategies.get(index)
    }

    pub fn get_next(&self, index: usize) -> Option<&Arc<dyn BuilderStrategy>> {
        self.strategies.get(index + 1)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn reverse(&self) -> StrategyChain {
        StrategyChain::new(self.strategies.iter().rev().cloned().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BuilderStrategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }
}

impl fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Стратегии, сгруппированные по стадиям
pub struct StrategyList<S: Stage = BuilderStage> {
    stages: RwLock<HashMap<S, Vec<Arc<dyn BuilderStrategy>>>>,
}

impl<S: Stage> StrategyList<S> {
    pub fn new() -> Self {
        Self {
            stages: RwLock::new(HashMap::new()),
        }
    }

    pub fn add(&self, strategy: Arc<dyn BuilderStrategy>, stage: S) {
        self.stages.write().entry(stage).or_default().push(strategy);
    }

    pub fn add_new<T: BuilderStrategy + Default + 'static>(&self, stage: S) {
        self.add(Arc::new(T::default()), stage);
    }

    pub fn clear(&self) {
        self.stages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.stages.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Цепочка: стадии по порядку, внутри стадии - порядок добавления
    pub fn make_strategy_chain(&self) -> StrategyChain {
        let stages = self.stages.read();
        let strategies = S::ordered()
            .iter()
            .filter_map(|stage| stages.get(stage))
            .flat_map(|strategies| strategies.iter().cloned())
            .collect();
        StrategyChain::new(strategies)
    }

    pub fn make_reverse_strategy_chain(&self) -> StrategyChain {
        self.make_strategy_chain().reverse()
    }
}

impl<S: Stage> Default for StrategyList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Stage> fmt::Debug for StrategyList<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyList")
            .field("chain", &self.make_strategy_chain())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct First;
    impl BuilderStrategy for First {}

    #[derive(Default)]
    struct Second;
    impl BuilderStrategy for Second {}

    struct Labeled(&'static str);
    impl BuilderStrategy for Labeled {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn test_chain_follows_stage_order() {
        let list = StrategyList::<BuilderStage>::new();
        list.add_new::<Second>(BuilderStage::PostInitialization);
        list.add_new::<First>(BuilderStage::PreCreation);
        list.add(Arc::new(Labeled("Middle")), BuilderStage::Creation);

        let chain = list.make_strategy_chain();
        assert_eq!(chain.names(), vec!["First", "Middle", "Second"]);
        assert_eq!(chain.head().map(|s| s.name()), Some("First"));
        assert_eq!(chain.get_next(0).map(|s| s.name()), Some("Middle"));
        assert!(chain.get_next(2).is_none());

        let reversed = list.make_reverse_strategy_chain();
        assert_eq!(reversed.names(), vec!["Second", "Middle", "First"]);
    }

    #[test]
    fn test_clear_empties_list() {
        let list = StrategyList::<BuilderStage>::new();
        list.add_new::<First>(BuilderStage::Creation);
        assert_eq!(list.len(), 1);

        list.clear();
        assert!(list.is_empty());
        assert!(list.make_strategy_chain().is_empty());
    }

    const LABELS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

    fn stage_strategy() -> impl Strategy<Value = (usize, usize)> {
        (0..4_usize, 0..LABELS.len())
    }

    proptest! {
        #[test]
        fn prop_chain_is_stable_sort_by_stage(entries in proptest::collection::vec(stage_strategy(), 0..12)) {
            let list = StrategyList::<BuilderStage>::new();
            for (stage, label) in &entries {
                list.add(Arc::new(Labeled(LABELS[*label])), BuilderStage::ordered()[*stage]);
            }

            let mut expected = entries.clone();
            expected.sort_by_key(|(stage, _)| *stage);
            let expected: Vec<&str> = expected.iter().map(|(_, label)| LABELS[*label]).collect();

            prop_assert_eq!(list.make_strategy_chain().names(), expected.clone());

            let mut reversed = expected;
            reversed.reverse();
            prop_assert_eq!(list.make_reverse_strategy_chain().names(), reversed);
        }
    }
}
