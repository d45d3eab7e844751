//! The progression engine: owns the catalog, the runtime state, the save
//! store, and orchestrates the evaluation pipeline.
//!
//! # Pipeline
//!
//! Each `tick()` runs:
//! 1. **Produce** -- every production unit applies its per-tick deltas, in
//!    registration order.
//! 2. **Milestones** -- the cascade settles (see [`Engine::cascade`]).
//! 3. **Reroute** -- if the active tab is no longer visible, the first
//!    visible tab in registration order takes over.
//! 4. **Persist** -- one write to the save slot, only if anything changed.
//!
//! User commands run phases 2-4 synchronously after their own mutations, so
//! a click observes exactly the same rules as the tick.
//!
//! # Re-entry contract
//!
//! Effects never invoke milestone evaluation themselves. Every mutation
//! marks the cascade dirty; `cascade()` then re-runs evaluation rounds until
//! no milestone fires, bounded by [`MAX_CASCADE_ROUNDS`]. A milestone whose
//! effects leave its test true and itself armed re-fires once per round --
//! that is the documented replacement for the unbounded recursion of
//! classic `addResource -> checkMilestones` designs.

use crate::catalog::Catalog;
use crate::command::Command;
use crate::effect::Effect;
use crate::event::EngineEvent;
use crate::id::{ActionId, MilestoneId, PriceId, ProducerId, ResourceId, TabId};
use crate::save::{SaveData, SaveError, SaveStore};
use crate::state::{EngineState, GlobalValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Nominal tick period the embedder's driver should aim for.
pub const TICK_PERIOD_MS: u64 = 100;

/// Upper bound on milestone evaluation rounds per cascade settle.
pub const MAX_CASCADE_ROUNDS: usize = 32;

/// Well-known key of the debug-mode flag, if the catalog registers one.
pub const DEBUG_FLAG: &str = "debug";

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core progression engine.
pub struct Engine {
    catalog: Catalog,
    state: EngineState,
    store: Box<dyn SaveStore>,
    slot: String,
    rng: StdRng,
    events: Vec<EngineEvent>,

    /// Set by `debug_reset`; a halted engine ignores ticks and commands
    /// until the embedder rebuilds it.
    halted: bool,

    /// Unpersisted changes exist.
    dirty: bool,

    ticks: u64,
}

impl Engine {
    /// Build an engine over a frozen catalog. The rng seed feeds chance
    /// effects; fix it in tests.
    pub fn new(catalog: Catalog, store: Box<dyn SaveStore>, slot: &str, seed: u64) -> Self {
        let state = EngineState::new(&catalog);
        Self {
            catalog,
            state,
            store,
            slot: slot.to_string(),
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
            halted: false,
            dirty: false,
            ticks: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Restore the saved session, or start fresh if the slot is empty.
    ///
    /// A malformed or wrong-version blob is surfaced as an error and leaves
    /// the fresh defaults in place; a missing blob is not an error. After a
    /// restore, check-on-load milestones re-derive presentational state,
    /// then the cascade settles and the slot is rewritten.
    pub fn load_game(&mut self) -> Result<(), SaveError> {
        self.state = EngineState::new(&self.catalog);
        let fresh = match self.store.load(&self.slot) {
            Some(blob) => {
                let data = SaveData::from_json(&blob)?;
                let unknown = data.apply(&mut self.state, &self.catalog);
                for key in unknown {
                    self.events
                        .push(EngineEvent::Debug(format!("save references unknown {key}; skipped")));
                }
                false
            }
            None => true,
        };
        self.events.push(EngineEvent::GameLoaded { fresh });
        if !fresh {
            self.check_on_load_milestones();
        }
        self.cascade();
        self.reroute_active_tab();
        self.persist();
        Ok(())
    }

    /// Advance one tick: produce, settle milestones, reroute, persist.
    pub fn tick(&mut self) {
        if self.halted {
            return;
        }
        self.ticks += 1;

        for index in 0..self.catalog.producer_count() {
            let id = ProducerId(index as u32);
            let amount = self.state.producer_amount(id);
            let deltas = self.catalog.producer(id).op.deltas(amount, &self.state);
            for (resource, delta) in deltas {
                self.grant_raw(resource, delta);
            }
        }

        self.cascade();
        self.reroute_active_tab();
        self.persist_if_dirty();
    }

    /// Clear the persisted slot, reset to catalog defaults, and halt.
    ///
    /// Halting first means no tick can observe or rewrite the cleared slot;
    /// the embedder stops its driver and rebuilds the engine.
    pub fn debug_reset(&mut self) {
        self.halted = true;
        self.store.clear(&self.slot);
        self.state = EngineState::new(&self.catalog);
        self.dirty = false;
        self.events
            .push(EngineEvent::Debug("save slot cleared; engine halted".to_string()));
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Ticks advanced since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Execute a user intent synchronously. Silent no-op when the engine is
    /// halted or the command's gate fails (hidden/disabled action, hidden
    /// tab, unregistered debug flag).
    pub fn execute(&mut self, command: Command) {
        if self.halted {
            return;
        }
        match command {
            Command::Invoke(action) => {
                if !self.action_visible(action) || !self.action_enabled(action) {
                    return;
                }
                let effects = self.catalog.action(action).effects.clone();
                self.run_effects(None, &effects);
                self.cascade();
                self.reroute_active_tab();
                self.persist_if_dirty();
            }
            Command::SwitchTab(tab) => {
                if !self.tab_visible(tab) || self.state.active_tab() == Some(tab) {
                    return;
                }
                self.state.set_active_tab(Some(tab));
                self.events.push(EngineEvent::ActiveTabChanged(Some(tab)));
                self.dirty = true;
                self.persist_if_dirty();
            }
            Command::ToggleDebug => {
                let Some(flag) = self.catalog.flag_id(DEBUG_FLAG) else {
                    return;
                };
                let enabled = !self.state.flag_set(flag);
                self.state.set_global(flag, GlobalValue::Bool(enabled));
                self.dirty = true;
                self.events.push(EngineEvent::Message(format!(
                    "Debug mode {}",
                    if enabled { "enabled" } else { "disabled" }
                )));
                self.cascade();
                self.reroute_active_tab();
                self.persist_if_dirty();
            }
            Command::DebugReset => self.debug_reset(),
        }
    }

    /// Mutate a resource through the full pipeline. The single external
    /// entry point to the ledger besides action effects; the player owns
    /// their own state, so this is deliberately public.
    pub fn grant(&mut self, resource: ResourceId, delta: f64) {
        if self.halted {
            return;
        }
        self.grant_raw(resource, delta);
        self.cascade();
        self.reroute_active_tab();
        self.persist_if_dirty();
    }

    /// Charge a registered price. Either every term is charged in full and
    /// this returns true, or nothing changes and it returns false.
    pub fn try_spend(&mut self, price: PriceId) -> bool {
        if self.halted {
            return false;
        }
        let paid = self.spend_raw(price);
        if paid {
            self.cascade();
            self.reroute_active_tab();
            self.persist_if_dirty();
        }
        paid
    }

    // -----------------------------------------------------------------------
    // Queries (all pure reads; recomputed on demand, never cached)
    // -----------------------------------------------------------------------

    pub fn amount(&self, resource: ResourceId) -> f64 {
        self.state.amount(resource)
    }

    pub fn producer_amount(&self, producer: ProducerId) -> f64 {
        self.state.producer_amount(producer)
    }

    pub fn resource_visible(&self, resource: ResourceId) -> bool {
        self.catalog
            .resource(resource)
            .visible
            .eval(&self.state, &self.catalog)
    }

    pub fn tab_visible(&self, tab: TabId) -> bool {
        self.catalog.tab(tab).visible.eval(&self.state, &self.catalog)
    }

    /// Visibility of one pane element. Out-of-range indices are hidden.
    pub fn element_visible(&self, tab: TabId, index: usize) -> bool {
        self.catalog
            .tab(tab)
            .elements
            .get(index)
            .is_some_and(|element| element.visible().eval(&self.state, &self.catalog))
    }

    pub fn action_visible(&self, action: ActionId) -> bool {
        self.catalog
            .action(action)
            .visible
            .eval(&self.state, &self.catalog)
    }

    pub fn action_enabled(&self, action: ActionId) -> bool {
        self.catalog
            .action(action)
            .enabled
            .eval(&self.state, &self.catalog)
    }

    /// Current intro text for a tab: the milestone-applied override if one
    /// exists, the registered default otherwise.
    pub fn tab_text(&self, tab: TabId) -> &str {
        self.state
            .tab_text_override(tab)
            .unwrap_or(&self.catalog.tab(tab).text)
    }

    pub fn format_price(&self, price: PriceId) -> String {
        self.catalog.price(price).format(&self.state, &self.catalog)
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.state.active_tab()
    }

    pub fn debug_enabled(&self) -> bool {
        self.catalog
            .flag_id(DEBUG_FLAG)
            .is_some_and(|flag| self.state.flag_set(flag))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn save_store(&self) -> &dyn SaveStore {
        &*self.store
    }

    /// Take everything emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Mutation internals
    // -----------------------------------------------------------------------

    /// The one place amounts change. Clamps at zero: driving an amount
    /// negative is a content bug, reported on the debug feed.
    fn grant_raw(&mut self, resource: ResourceId, delta: f64) {
        let next = self.state.amount(resource) + delta;
        if next < 0.0 {
            let message = format!(
                "amount of '{}' would go negative ({next}); clamped to zero",
                self.catalog.resource(resource).key
            );
            self.events.push(EngineEvent::Debug(message));
            self.state.set_amount(resource, 0.0);
        } else {
            self.state.set_amount(resource, next);
        }
        self.dirty = true;
    }

    fn spend_raw(&mut self, price: PriceId) -> bool {
        let due = {
            let price = self.catalog.price(price);
            if !price.can_afford(&self.state) {
                return false;
            }
            price.amounts_due(&self.state)
        };
        for (resource, amount) in due {
            self.grant_raw(resource, -amount);
        }
        true
    }

    fn run_effects(&mut self, context: Option<MilestoneId>, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Grant { resource, amount } => self.grant_raw(*resource, *amount),
                Effect::GrantRandom {
                    resource,
                    amount,
                    chance,
                    message,
                } => {
                    if self.rng.gen_range(0.0..1.0) < *chance {
                        self.grant_raw(*resource, *amount);
                        self.events.push(EngineEvent::Message(message.clone()));
                    }
                }
                Effect::Spend(price) => {
                    // Guard: an unaffordable price skips the rest of the list.
                    if !self.spend_raw(*price) {
                        return;
                    }
                }
                Effect::SetFlag { flag, value } => {
                    self.state.set_global(*flag, *value);
                    self.dirty = true;
                }
                Effect::SetTabText { tab, text } => {
                    // Derived presentation; not a persisted change.
                    self.state.set_tab_text(*tab, text.clone());
                }
                Effect::AddProducer { producer, amount } => {
                    self.state.add_producer_amount(*producer, *amount);
                    self.dirty = true;
                }
                Effect::Log(message) => self.events.push(EngineEvent::Message(message.clone())),
                Effect::Deactivate => {
                    if let Some(id) = context {
                        self.state.set_milestone_active(id, false);
                        self.dirty = true;
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Milestone evaluation
    // -----------------------------------------------------------------------

    /// Settle the milestone cascade: run evaluation rounds until a round
    /// fires nothing, bounded by [`MAX_CASCADE_ROUNDS`].
    fn cascade(&mut self) {
        for _ in 0..MAX_CASCADE_ROUNDS {
            if !self.check_milestones_round() {
                return;
            }
        }
        self.events.push(EngineEvent::Debug(format!(
            "milestone cascade still firing after {MAX_CASCADE_ROUNDS} rounds; deferred"
        )));
    }

    /// One pass over all milestones in registration order. Fires every armed
    /// milestone whose test passes against the state as mutated so far.
    fn check_milestones_round(&mut self) -> bool {
        let mut fired = false;
        for index in 0..self.catalog.milestone_count() {
            let id = MilestoneId(index as u32);
            if !self.state.milestone_active(id) {
                continue;
            }
            let def = self.catalog.milestone(id);
            if !def.test.eval(&self.state, &self.catalog) {
                continue;
            }
            let effects = def.effects.clone();
            self.events.push(EngineEvent::MilestoneFired(id));
            self.dirty = true;
            self.run_effects(Some(id), &effects);
            fired = true;
        }
        fired
    }

    /// Fire check-on-load milestones whose test passes, ignoring the armed
    /// flag. Rebuilds derived presentation (tab text) the codec does not
    /// store.
    fn check_on_load_milestones(&mut self) {
        for index in 0..self.catalog.milestone_count() {
            let id = MilestoneId(index as u32);
            let def = self.catalog.milestone(id);
            if !def.check_on_load || !def.test.eval(&self.state, &self.catalog) {
                continue;
            }
            let effects = def.effects.clone();
            self.events.push(EngineEvent::MilestoneFired(id));
            self.run_effects(Some(id), &effects);
        }
    }

    // -----------------------------------------------------------------------
    // Derived-state upkeep
    // -----------------------------------------------------------------------

    /// If the active tab is unset or no longer visible, select the first
    /// visible tab in registration order; `None` when nothing is visible.
    fn reroute_active_tab(&mut self) {
        if let Some(tab) = self.state.active_tab() {
            if self.tab_visible(tab) {
                return;
            }
        }
        let next = self
            .catalog
            .tabs()
            .map(|(id, _)| id)
            .find(|id| self.tab_visible(*id));
        if self.state.active_tab() != next {
            self.state.set_active_tab(next);
            self.events.push(EngineEvent::ActiveTabChanged(next));
            self.dirty = true;
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn persist(&mut self) {
        let blob = SaveData::capture(&self.state, &self.catalog).to_json();
        self.store.store(&self.slot, &blob);
        self.dirty = false;
    }

    fn persist_if_dirty(&mut self) {
        if self.dirty {
            self.persist();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
