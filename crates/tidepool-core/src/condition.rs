//! Visibility, enablement, and milestone predicates.
//!
//! Conditions are a closed data enum evaluated against explicit state, never
//! closures over ambient mutables. Evaluation is pure: the same state always
//! yields the same answer, so the presentation layer may re-query as often as
//! it likes.

use crate::catalog::Catalog;
use crate::cost;
use crate::id::{FlagId, PriceId, ResourceId};
use crate::state::EngineState;

/// A boolean test over current engine state.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Unconditionally true.
    Always,

    /// The resource's current amount is at least `min`.
    AmountAtLeast { resource: ResourceId, min: f64 },

    /// The global flag is truthy (boolean `true` or non-zero number).
    FlagSet(FlagId),

    /// The registered price is currently affordable.
    CanAfford(PriceId),

    /// Negation.
    Not(Box<Condition>),

    /// Conjunction. Empty means true.
    All(Vec<Condition>),

    /// Disjunction. Empty means false.
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate against the current state. Read-only.
    pub fn eval(&self, state: &EngineState, catalog: &Catalog) -> bool {
        match self {
            Condition::Always => true,
            Condition::AmountAtLeast { resource, min } => state.amount(*resource) >= *min,
            Condition::FlagSet(flag) => state.flag_set(*flag),
            Condition::CanAfford(price) => cost::can_afford(*price, state, catalog),
            Condition::Not(inner) => !inner.eval(state, catalog),
            Condition::All(inner) => inner.iter().all(|c| c.eval(state, catalog)),
            Condition::Any(inner) => inner.iter().any(|c| c.eval(state, catalog)),
        }
    }

    /// Shorthand for `Not(FlagSet(flag))`, the most common gate in practice.
    pub fn flag_clear(flag: FlagId) -> Self {
        Condition::Not(Box::new(Condition::FlagSet(flag)))
    }
}
