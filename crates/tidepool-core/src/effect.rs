//! The effect vocabulary shared by action handlers and milestones.
//!
//! Effects are data, executed in order by the engine's effect runner. They
//! never call back into milestone evaluation themselves; mutations mark the
//! cascade dirty and the engine settles it afterwards, so any effect is safe
//! to run from inside a milestone firing.

use crate::id::{FlagId, PriceId, ProducerId, ResourceId, TabId};
use crate::state::GlobalValue;

/// One step of an action or milestone effect list.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Add (or with a negative amount, remove) resource units.
    Grant { resource: ResourceId, amount: f64 },

    /// Grant with probability `chance` per execution; on success the message
    /// is pushed to the narrative feed.
    GrantRandom {
        resource: ResourceId,
        amount: f64,
        chance: f64,
        message: String,
    },

    /// Charge a registered price. Acts as a guard: if the price cannot be
    /// paid in full, nothing is charged and the remaining effects of this
    /// list are skipped.
    Spend(PriceId),

    /// Set a global flag.
    SetFlag { flag: FlagId, value: GlobalValue },

    /// Replace a tab's intro text. The override is derived state: it is not
    /// persisted, and check-on-load milestones reapply it after a restore.
    SetTabText { tab: TabId, text: String },

    /// Grow a production unit's owned amount.
    AddProducer { producer: ProducerId, amount: f64 },

    /// Push a narrative message to the event feed.
    Log(String),

    /// Disarm the milestone currently firing. The conventional final step of
    /// a one-shot milestone; a milestone that omits it re-fires whenever its
    /// test holds. Ignored outside a milestone context.
    Deactivate,
}

impl Effect {
    pub fn set_flag(flag: FlagId, value: bool) -> Self {
        Effect::SetFlag {
            flag,
            value: GlobalValue::Bool(value),
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Effect::Log(message.into())
    }
}
