//! The beach game: you are a crab.
//!
//! Assembles the full content catalog -- resources, prices, producers, tabs,
//! actions, milestones -- on top of `tidepool-core` and hands back a ready
//! engine. A presentation layer only needs [`new_game`], the query surface on
//! the engine, and the id lookups on the catalog.
//!
//! ```rust,ignore
//! let mut engine = tidepool_beach::new_game(Box::new(MemoryStore::new()), seed)?;
//! engine.load_game()?;
//! // drive ticks, render state, submit commands
//! ```

pub mod content;

pub use content::build_catalog;

use tidepool_core::catalog::CatalogError;
use tidepool_core::engine::Engine;
use tidepool_core::save::SaveStore;

/// The single persisted slot name.
pub const SAVE_SLOT: &str = "tidepool-beach";

/// Build an engine over the beach catalog. Call `load_game` next, then start
/// the tick driver.
pub fn new_game(store: Box<dyn SaveStore>, seed: u64) -> Result<Engine, CatalogError> {
    Ok(Engine::new(build_catalog()?, store, SAVE_SLOT, seed))
}
