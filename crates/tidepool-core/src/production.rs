//! Passive production units, run once per tick in registration order.
//!
//! A unit's op is pure arithmetic over its owned amount and the current
//! ledger; the engine applies the resulting deltas through the same entry
//! point as every other mutation, so production feeds the milestone cascade
//! like any user action would.

use crate::id::ResourceId;
use crate::state::EngineState;

/// What a production unit does on each tick, scaled by its owned amount.
#[derive(Debug, Clone, PartialEq)]
pub enum ProducerOp {
    /// Emit `per_unit` of a resource per owned unit per tick.
    Emit { resource: ResourceId, per_unit: f64 },

    /// Move up to `per_unit` per owned unit per tick from one resource to
    /// another, limited by what is actually available.
    Convert {
        from: ResourceId,
        to: ResourceId,
        per_unit: f64,
    },
}

impl ProducerOp {
    /// The ledger deltas for one tick at the given owned amount. Pure.
    pub fn deltas(&self, amount: f64, state: &EngineState) -> Vec<(ResourceId, f64)> {
        if amount <= 0.0 {
            return Vec::new();
        }
        match self {
            ProducerOp::Emit { resource, per_unit } => {
                vec![(*resource, per_unit * amount)]
            }
            ProducerOp::Convert { from, to, per_unit } => {
                let moved = (per_unit * amount).min(state.amount(*from));
                if moved <= 0.0 {
                    return Vec::new();
                }
                vec![(*from, -moved), (*to, moved)]
            }
        }
    }
}

/// A registered production unit.
#[derive(Debug, Clone)]
pub struct ProducerDef {
    /// Stable save key.
    pub key: String,
    /// Display name.
    pub name: String,
    pub op: ProducerOp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogBuilder};
    use crate::condition::Condition;

    fn fixture() -> (Catalog, EngineState) {
        let mut b = CatalogBuilder::new();
        b.register_resource("sand", "Sand", "Sand", Condition::Always);
        b.register_resource("wet", "Wet", "Wet", Condition::Always);
        let catalog = b.build().unwrap();
        let state = EngineState::new(&catalog);
        (catalog, state)
    }

    #[test]
    fn emit_scales_with_owned_amount() {
        let (catalog, state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let op = ProducerOp::Emit {
            resource: sand,
            per_unit: 0.05,
        };
        assert!(op.deltas(0.0, &state).is_empty());
        assert_eq!(op.deltas(4.0, &state), vec![(sand, 0.2)]);
    }

    #[test]
    fn convert_is_limited_by_availability() {
        let (catalog, mut state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let wet = catalog.resource_id("wet").unwrap();
        let op = ProducerOp::Convert {
            from: wet,
            to: sand,
            per_unit: 2.0,
        };

        // Nothing to draw from: no deltas at all.
        assert!(op.deltas(3.0, &state).is_empty());

        state.set_amount(wet, 1.5);
        assert_eq!(op.deltas(3.0, &state), vec![(wet, -1.5), (sand, 1.5)]);

        state.set_amount(wet, 100.0);
        assert_eq!(op.deltas(3.0, &state), vec![(wet, -6.0), (sand, 6.0)]);
    }
}
