//! Tabs, pane content, and actions: the surface the presentation layer
//! renders.
//!
//! Pane content is a closed tagged union matched exhaustively by renderers;
//! there are no runtime type tests. Every tab, element, and action carries
//! its own visibility condition, and actions additionally carry an
//! enablement condition: visible + enabled, visible + disabled, and hidden
//! are the reachable presentation states. A hidden action never executes,
//! whatever its enablement says.

use crate::condition::Condition;
use crate::effect::Effect;
use crate::id::{ActionId, PriceId};

/// One element of a tab's pane, in display order.
#[derive(Debug, Clone)]
pub enum PaneElement {
    /// A block of flavor text.
    Caption { text: String, visible: Condition },

    /// A named image asset. The engine only gates it; the presentation
    /// layer resolves the asset.
    Image { asset: String, visible: Condition },

    /// A row of action buttons.
    Buttons {
        actions: Vec<ActionId>,
        visible: Condition,
    },
}

impl PaneElement {
    pub fn visible(&self) -> &Condition {
        match self {
            PaneElement::Caption { visible, .. } => visible,
            PaneElement::Image { visible, .. } => visible,
            PaneElement::Buttons { visible, .. } => visible,
        }
    }
}

/// A registered tab.
#[derive(Debug, Clone)]
pub struct TabDef {
    /// Stable save key (the active tab is persisted by key).
    pub key: String,

    /// Display name.
    pub name: String,

    /// Default intro text. Milestones may override it at runtime via
    /// [`Effect::SetTabText`]; the override is derived, not persisted.
    pub text: String,

    pub visible: Condition,

    /// Pane content, in display order.
    pub elements: Vec<PaneElement>,
}

/// A registered action (button): the only write path the presentation layer
/// has into the engine, addressed by [`ActionId`].
#[derive(Debug, Clone)]
pub struct ActionDef {
    /// Stable lookup key.
    pub key: String,

    /// Button label.
    pub label: String,

    pub visible: Condition,

    /// Independent of visibility; a visible-but-disabled button renders
    /// greyed out.
    pub enabled: Condition,

    /// Price shown next to the button, if any. Purely display: charging
    /// happens through an [`Effect::Spend`] in the effect list.
    pub price: Option<PriceId>,

    /// Run in order on invocation; `Spend` guards the remainder.
    pub effects: Vec<Effect>,
}
