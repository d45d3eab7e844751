//! Engine event feed.
//!
//! The engine never renders and never logs; everything a presentation layer
//! would show (narrative messages, milestone firings, tab changes) is pushed
//! onto a transient buffer and drained by the embedder each frame. Events are
//! not persisted.

use crate::id::{MilestoneId, TabId};

/// Something the presentation layer may want to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A narrative message for the player-facing log.
    Message(String),

    /// Diagnostic chatter: load-time key mismatches, clamped amounts,
    /// cascade bound hits. Meant for the debug-mode log, not the player.
    Debug(String),

    /// A milestone fired.
    MilestoneFired(MilestoneId),

    /// The active tab changed, whether by command or auto-reroute.
    ActiveTabChanged(Option<TabId>),

    /// A session began. `fresh` is false when a save was restored.
    GameLoaded { fresh: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_compare_by_value() {
        assert_eq!(
            EngineEvent::Message("hi".into()),
            EngineEvent::Message("hi".into())
        );
        assert_ne!(
            EngineEvent::MilestoneFired(MilestoneId(0)),
            EngineEvent::MilestoneFired(MilestoneId(1))
        );
    }
}
