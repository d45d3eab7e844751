//! Tidepool Core -- the progression engine for incremental games.
//!
//! This crate provides the reactive rule system that ties resource amounts,
//! scaling prices, passive producers, one-shot milestones, and derived
//! visibility together, plus the persistence codec that carries a session
//! across restarts. It renders nothing: a presentation layer observes engine
//! state through pure queries and forwards user intents as typed commands.
//!
//! # Evaluation Pipeline
//!
//! Each call to [`engine::Engine::tick`] advances the game through four
//! phases:
//!
//! 1. **Produce** -- every production unit applies its per-tick deltas.
//! 2. **Milestones** -- armed milestones fire while their tests pass; the
//!    cascade settles through an explicit work loop, never recursion.
//! 3. **Reroute** -- a hidden active tab hands over to the first visible one.
//! 4. **Persist** -- the save slot is rewritten iff anything changed.
//!
//! User commands ([`command::Command`]) run phases 2-4 synchronously, so a
//! button press observes exactly the rules a tick does.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- orchestrator; owns catalog, state, store, rng.
//! - [`catalog::Catalog`] / [`catalog::CatalogBuilder`] -- immutable game
//!   content, registered once at startup and validated on freeze.
//! - [`condition::Condition`] -- pure predicates over explicit state.
//! - [`effect::Effect`] -- the mutation vocabulary of actions and milestones.
//! - [`cost::Price`] -- stateless scaling costs, recomputed on every query.
//! - [`save::SaveData`] -- versioned, key-addressed JSON persistence.
//! - [`event::EngineEvent`] -- the drained feed the presentation layer shows.

pub mod catalog;
pub mod command;
pub mod condition;
pub mod cost;
pub mod effect;
pub mod engine;
pub mod event;
pub mod id;
pub mod milestone;
pub mod production;
pub mod resource;
pub mod save;
pub mod state;
pub mod tab;
