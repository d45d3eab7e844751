//! Runtime game state, separate from the immutable [`Catalog`].
//!
//! Everything in here is either persisted by the save codec (amounts,
//! producer amounts, milestone actives, globals, active tab) or derived and
//! rebuilt on load (tab text overrides). Visibility and enablement are never
//! stored here; they are recomputed from conditions on demand.

use crate::catalog::Catalog;
use crate::id::{FlagId, MilestoneId, ProducerId, ResourceId, TabId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named global switch. Narrative/unlock state that is not naturally a
/// resource: "ocean drained", "has bucket", "debug mode".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GlobalValue {
    Bool(bool),
    Num(f64),
}

impl GlobalValue {
    /// Truthiness used by flag conditions: `true`, or any non-zero number.
    pub fn is_set(self) -> bool {
        match self {
            GlobalValue::Bool(b) => b,
            GlobalValue::Num(n) => n != 0.0,
        }
    }
}

/// The mutable progression state driven by the engine.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Resource amounts, indexed by [`ResourceId`]. Kept at >= 0.
    amounts: Vec<f64>,

    /// Owned amount per production unit (scaling factor), indexed by
    /// [`ProducerId`].
    producer_amounts: Vec<f64>,

    /// Whether each milestone is still armed, indexed by [`MilestoneId`].
    milestone_active: Vec<bool>,

    /// Global flag values, indexed by [`FlagId`].
    globals: Vec<GlobalValue>,

    /// The tab the presentation layer currently shows. `None` when no tab
    /// is visible at all.
    active_tab: Option<TabId>,

    /// Milestone-applied tab text replacements. Not persisted; check-on-load
    /// milestones reapply them after a restore.
    tab_text: HashMap<TabId, String>,
}

impl EngineState {
    /// Fresh state for a catalog: zero amounts, all milestones armed,
    /// catalog-default globals, the catalog's starting tab.
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            amounts: vec![0.0; catalog.resource_count()],
            producer_amounts: vec![0.0; catalog.producer_count()],
            milestone_active: vec![true; catalog.milestone_count()],
            globals: catalog.default_globals(),
            active_tab: catalog.default_tab(),
            tab_text: HashMap::new(),
        }
    }

    // -- Reads --

    pub fn amount(&self, id: ResourceId) -> f64 {
        self.amounts[id.0 as usize]
    }

    pub fn producer_amount(&self, id: ProducerId) -> f64 {
        self.producer_amounts[id.0 as usize]
    }

    pub fn milestone_active(&self, id: MilestoneId) -> bool {
        self.milestone_active[id.0 as usize]
    }

    pub fn global(&self, id: FlagId) -> GlobalValue {
        self.globals[id.0 as usize]
    }

    pub fn flag_set(&self, id: FlagId) -> bool {
        self.global(id).is_set()
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active_tab
    }

    /// Milestone-applied text override for a tab, if any.
    pub fn tab_text_override(&self, id: TabId) -> Option<&str> {
        self.tab_text.get(&id).map(String::as_str)
    }

    // -- Writes (engine-internal; all external mutation goes through the
    //    engine so the cascade and persistence contracts hold) --

    pub(crate) fn set_amount(&mut self, id: ResourceId, amount: f64) {
        self.amounts[id.0 as usize] = amount;
    }

    pub(crate) fn add_producer_amount(&mut self, id: ProducerId, delta: f64) {
        self.producer_amounts[id.0 as usize] += delta;
    }

    pub(crate) fn set_producer_amount(&mut self, id: ProducerId, amount: f64) {
        self.producer_amounts[id.0 as usize] = amount;
    }

    pub(crate) fn set_milestone_active(&mut self, id: MilestoneId, active: bool) {
        self.milestone_active[id.0 as usize] = active;
    }

    pub(crate) fn set_global(&mut self, id: FlagId, value: GlobalValue) {
        self.globals[id.0 as usize] = value;
    }

    pub(crate) fn set_active_tab(&mut self, tab: Option<TabId>) {
        self.active_tab = tab;
    }

    pub(crate) fn set_tab_text(&mut self, id: TabId, text: String) {
        self.tab_text.insert(id, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_truthiness() {
        assert!(GlobalValue::Bool(true).is_set());
        assert!(!GlobalValue::Bool(false).is_set());
    }

    #[test]
    fn numeric_truthiness() {
        assert!(GlobalValue::Num(3.0).is_set());
        assert!(GlobalValue::Num(-1.0).is_set());
        assert!(!GlobalValue::Num(0.0).is_set());
    }

    #[test]
    fn global_value_serializes_untagged() {
        let b = serde_json::to_string(&GlobalValue::Bool(true)).unwrap();
        assert_eq!(b, "true");
        let n = serde_json::to_string(&GlobalValue::Num(2.5)).unwrap();
        assert_eq!(n, "2.5");
    }

    #[test]
    fn global_value_deserializes_untagged() {
        let b: GlobalValue = serde_json::from_str("false").unwrap();
        assert_eq!(b, GlobalValue::Bool(false));
        let n: GlobalValue = serde_json::from_str("7").unwrap();
        assert_eq!(n, GlobalValue::Num(7.0));
    }
}
