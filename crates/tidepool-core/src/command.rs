//! Typed commands: the presentation layer's only write path into the engine.
//!
//! Buttons and keybindings resolve to a [`Command`] by stable identifier and
//! submit it through `Engine::execute`; nothing is ever dispatched by
//! evaluating a string. Commands run synchronously — user intent re-enters
//! the evaluate-then-persist pipeline inline, with no queueing or debounce.

use crate::id::{ActionId, TabId};

/// A single user intent submitted to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Invoke an action (button). A no-op unless the action is currently
    /// both visible and enabled.
    Invoke(ActionId),

    /// Make a tab active. A no-op if the tab is not currently visible.
    SwitchTab(TabId),

    /// Flip the debug flag, if the catalog registers one.
    ToggleDebug,

    /// Clear the persisted slot, reset to catalog defaults, and halt the
    /// engine. The embedder must stop its tick driver and rebuild.
    DebugReset,
}
