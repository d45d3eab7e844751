//! Resource definitions. Amounts live in `EngineState`; the engine's grant
//! entry point is the only mutator, so the ledger contract (mutate, then
//! cascade, then persist) holds for every write.

use crate::condition::Condition;

/// A registered resource: a named counter with a visibility predicate.
/// Created at startup as part of the fixed catalog, never destroyed.
#[derive(Debug, Clone)]
pub struct ResourceDef {
    /// Stable save key.
    pub key: String,

    /// Plural display name.
    pub name: String,

    /// Singular display name, used when a displayed amount equals 1.
    pub singular: String,

    /// Re-evaluated on demand against current state; never stored.
    pub visible: Condition,
}
