//! Milestone definitions: one-shot (or deliberately re-firing) condition →
//! effect rules.
//!
//! A milestone is armed (`active`) until its effect list runs
//! [`Effect::Deactivate`]. The engine evaluates milestones after every
//! mutation and once per tick; see `Engine::cascade` for the re-entry
//! contract.

use crate::condition::Condition;
use crate::effect::Effect;

/// A registered milestone.
#[derive(Debug, Clone)]
pub struct MilestoneDef {
    /// Stable save key.
    pub key: String,

    /// Fires while armed and this test passes.
    pub test: Condition,

    /// Run exactly once per firing, in order. By convention ends with
    /// [`Effect::Deactivate`]; omitting it makes the milestone re-fire every
    /// evaluation round in which its test holds.
    pub effects: Vec<Effect>,

    /// Also evaluated immediately after a save is restored, ignoring the
    /// persisted armed flag. Used to rebuild derived presentation such as
    /// tab text that the codec deliberately does not store.
    pub check_on_load: bool,
}

impl MilestoneDef {
    pub fn new(key: impl Into<String>, test: Condition, effects: Vec<Effect>) -> Self {
        Self {
            key: key.into(),
            test,
            effects,
            check_on_load: false,
        }
    }

    pub fn checked_on_load(mut self) -> Self {
        self.check_on_load = true;
        self
    }
}
