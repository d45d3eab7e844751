//! Scaling cost model: growth strategies, cost terms, and multi-resource
//! prices.
//!
//! A [`Price`] has no stored state. Every query recomputes each term from its
//! base value, its [`Growth`] strategy, and the current [`Iterations`] count,
//! so displayed and charged prices always agree with the live state.

use crate::catalog::Catalog;
use crate::id::{PriceId, ProducerId, ResourceId};
use crate::state::EngineState;

// ---------------------------------------------------------------------------
// Growth strategies
// ---------------------------------------------------------------------------

/// How a cost term's price moves on each iteration. A closed strategy enum:
/// growth is data, not a closure.
#[derive(Debug, Clone, PartialEq)]
pub enum Growth {
    /// Identity: the price never changes.
    Constant,

    /// Raise the running price to a fixed exponent (e.g. `x^1.05`).
    Power(f64),

    /// Add `per` for every unit of `resource` currently owned. The ambient
    /// read happens on every application, so the result can depend on state
    /// entirely unrelated to this term's own resource.
    AddOwned { resource: ResourceId, per: f64 },
}

impl Growth {
    fn apply(&self, current: f64, state: &EngineState) -> f64 {
        match self {
            Growth::Constant => current,
            Growth::Power(exponent) => current.powf(*exponent),
            Growth::AddOwned { resource, per } => current + per * state.amount(*resource),
        }
    }
}

// ---------------------------------------------------------------------------
// Iteration count source
// ---------------------------------------------------------------------------

/// Where a price's iteration count comes from at evaluation time. Usually a
/// proxy for "how many have been purchased so far".
#[derive(Debug, Clone, PartialEq)]
pub enum Iterations {
    /// A fixed count (0 for flat prices).
    Constant(u32),

    /// The current whole amount of a resource.
    ResourceAmount(ResourceId),

    /// The current whole amount of a production unit.
    ProducerAmount(ProducerId),
}

impl Iterations {
    pub fn resolve(&self, state: &EngineState) -> u32 {
        match self {
            Iterations::Constant(n) => *n,
            Iterations::ResourceAmount(id) => whole(state.amount(*id)),
            Iterations::ProducerAmount(id) => whole(state.producer_amount(*id)),
        }
    }
}

fn whole(amount: f64) -> u32 {
    if amount <= 0.0 {
        0
    } else {
        amount.floor().min(u32::MAX as f64) as u32
    }
}

// ---------------------------------------------------------------------------
// Cost terms
// ---------------------------------------------------------------------------

/// One resource's share of a price: a base value plus a growth strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTerm {
    pub resource: ResourceId,
    pub base: f64,
    pub growth: Growth,
}

impl CostTerm {
    pub fn new(resource: ResourceId, base: f64, growth: Growth) -> Self {
        Self {
            resource,
            base,
            growth,
        }
    }

    /// Start at `base`, apply the growth strategy `iterations` times, floor
    /// the result to a whole price.
    pub fn calculate(&self, iterations: u32, state: &EngineState) -> f64 {
        let mut price = self.base;
        for _ in 0..iterations {
            price = self.growth.apply(price, state);
        }
        price.floor()
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// An ordered collection of cost terms sharing one iteration count.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub terms: Vec<CostTerm>,
    pub iterations: Iterations,
}

impl Price {
    pub fn new(terms: Vec<CostTerm>, iterations: Iterations) -> Self {
        Self { terms, iterations }
    }

    /// A flat price: every term at its base value, forever.
    pub fn flat(terms: Vec<CostTerm>) -> Self {
        Self::new(terms, Iterations::Constant(0))
    }

    /// The current (resource, due amount) pairs, in term order.
    pub fn amounts_due(&self, state: &EngineState) -> Vec<(ResourceId, f64)> {
        let iterations = self.iterations.resolve(state);
        self.terms
            .iter()
            .map(|term| (term.resource, term.calculate(iterations, state)))
            .collect()
    }

    /// True iff every term's resource amount covers its calculated price.
    pub fn can_afford(&self, state: &EngineState) -> bool {
        self.amounts_due(state)
            .iter()
            .all(|(resource, due)| state.amount(*resource) >= *due)
    }

    /// Human-readable form: `"<amount> <name>"` per term, joined with
    /// `", "`. The singular display name is used iff the amount equals 1.
    pub fn format(&self, state: &EngineState, catalog: &Catalog) -> String {
        self.amounts_due(state)
            .iter()
            .map(|(resource, due)| {
                let def = catalog.resource(*resource);
                let name = if *due == 1.0 {
                    &def.singular
                } else {
                    &def.name
                };
                format!("{due} {name}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Convenience for conditions and displays: resolve a registered price.
pub fn can_afford(price: PriceId, state: &EngineState, catalog: &Catalog) -> bool {
    catalog.price(price).can_afford(state)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::condition::Condition;

    fn fixture() -> (Catalog, EngineState) {
        let mut b = CatalogBuilder::new();
        b.register_resource("sand", "Sand", "Sand", Condition::Always);
        b.register_resource("sandcastles", "Sandcastles", "Sandcastle", Condition::Always);
        let catalog = b.build().unwrap();
        let state = EngineState::new(&catalog);
        (catalog, state)
    }

    #[test]
    fn constant_growth_ignores_iterations() {
        let (catalog, mut state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let term = CostTerm::new(sand, 10.0, Growth::Constant);
        // Owned amounts must not matter for a constant-growth term.
        state.set_amount(sand, 500.0);
        assert_eq!(term.calculate(0, &state), 10.0);
        assert_eq!(term.calculate(7, &state), 10.0);
    }

    #[test]
    fn power_growth_compounds_and_floors() {
        let (catalog, state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let term = CostTerm::new(sand, 10.0, Growth::Power(2.0));
        assert_eq!(term.calculate(0, &state), 10.0);
        assert_eq!(term.calculate(1, &state), 100.0);
        assert_eq!(term.calculate(2, &state), 10_000.0);
    }

    #[test]
    fn add_owned_reads_ambient_state_each_call() {
        let (catalog, mut state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let castles = catalog.resource_id("sandcastles").unwrap();
        let term = CostTerm::new(sand, 10.0, Growth::AddOwned {
            resource: castles,
            per: 2.0,
        });
        assert_eq!(term.calculate(1, &state), 10.0);
        state.set_amount(castles, 3.0);
        assert_eq!(term.calculate(1, &state), 16.0);
        assert_eq!(term.calculate(2, &state), 22.0);
    }

    #[test]
    fn iterations_resolve_from_resource_amount() {
        let (catalog, mut state) = fixture();
        let castles = catalog.resource_id("sandcastles").unwrap();
        let iterations = Iterations::ResourceAmount(castles);
        assert_eq!(iterations.resolve(&state), 0);
        state.set_amount(castles, 4.9);
        assert_eq!(iterations.resolve(&state), 4);
    }

    #[test]
    fn can_afford_requires_every_term() {
        let (catalog, mut state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let castles = catalog.resource_id("sandcastles").unwrap();
        let price = Price::flat(vec![
            CostTerm::new(sand, 20.0, Growth::Constant),
            CostTerm::new(castles, 4.0, Growth::Constant),
        ]);
        state.set_amount(sand, 25.0);
        state.set_amount(castles, 3.0);
        assert!(!price.can_afford(&state));
        state.set_amount(castles, 4.0);
        assert!(price.can_afford(&state));
    }

    #[test]
    fn format_pluralizes_by_amount() {
        let (catalog, state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let castles = catalog.resource_id("sandcastles").unwrap();
        let price = Price::flat(vec![
            CostTerm::new(sand, 20.0, Growth::Constant),
            CostTerm::new(castles, 1.0, Growth::Constant),
        ]);
        assert_eq!(price.format(&state, &catalog), "20 Sand, 1 Sandcastle");
    }

    #[test]
    fn scaled_price_tracks_owned_count() {
        let (catalog, mut state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        let castles = catalog.resource_id("sandcastles").unwrap();
        let price = Price::new(
            vec![CostTerm::new(sand, 10.0, Growth::Power(1.5))],
            Iterations::ResourceAmount(castles),
        );
        let first = price.amounts_due(&state)[0].1;
        state.set_amount(castles, 2.0);
        let third = price.amounts_due(&state)[0].1;
        assert_eq!(first, 10.0);
        assert!(third > first);
    }

    // -----------------------------------------------------------------------
    // Property: monotone growth => monotone calculated cost
    // -----------------------------------------------------------------------

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn power_cost_is_nondecreasing(
                base in 1.0f64..1000.0,
                exponent in 1.0f64..1.2,
                n in 0u32..40,
            ) {
                let (catalog, state) = fixture();
                let sand = catalog.resource_id("sand").unwrap();
                let term = CostTerm::new(sand, base, Growth::Power(exponent));
                prop_assert!(term.calculate(n, &state) <= term.calculate(n + 1, &state));
            }

            #[test]
            fn constant_cost_is_flat(base in 0.0f64..10_000.0, n in 0u32..64) {
                let (catalog, state) = fixture();
                let sand = catalog.resource_id("sand").unwrap();
                let term = CostTerm::new(sand, base, Growth::Constant);
                prop_assert_eq!(term.calculate(n, &state), base.floor());
            }
        }
    }
}
