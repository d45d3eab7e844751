//! Persistence codec and storage abstraction.
//!
//! The save blob carries exactly the state that cannot be recomputed:
//! resource amounts, producer amounts, milestone armed flags, globals, and
//! the active tab key — everything keyed by catalog name so saves survive
//! catalog growth. Visibility, enablement, prices, and tab-text overrides
//! are pure functions of this state and are never written.
//!
//! Restores are tolerant in both directions within a version: a saved key
//! the catalog no longer knows is skipped (reported, never fatal), and a
//! catalog entry the save predates keeps its just-initialized default.

use crate::catalog::Catalog;
use crate::state::{EngineState, GlobalValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Current save format version. Increment when breaking the blob layout.
pub const SAVE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding a save blob.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save blob is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("save from future version {0} (this build supports up to {SAVE_VERSION})")]
    FutureVersion(u32),

    #[error("unsupported save version: expected {SAVE_VERSION}, got {0}")]
    UnsupportedVersion(u32),
}

// ---------------------------------------------------------------------------
// Save data
// ---------------------------------------------------------------------------

/// The serialized form of a session. Field order and `BTreeMap` keys are
/// deterministic, so encode → decode → encode is byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default)]
    pub version: u32,
    pub resources: BTreeMap<String, f64>,
    pub producers: BTreeMap<String, f64>,
    pub milestones: BTreeMap<String, bool>,
    pub globals: BTreeMap<String, GlobalValue>,
    pub active_tab: Option<String>,
}

impl SaveData {
    /// Capture the persistable slice of the current state.
    pub fn capture(state: &EngineState, catalog: &Catalog) -> Self {
        Self {
            version: SAVE_VERSION,
            resources: catalog
                .resources()
                .map(|(id, def)| (def.key.clone(), state.amount(id)))
                .collect(),
            producers: catalog
                .producers()
                .map(|(id, def)| (def.key.clone(), state.producer_amount(id)))
                .collect(),
            milestones: catalog
                .milestones()
                .map(|(id, def)| (def.key.clone(), state.milestone_active(id)))
                .collect(),
            globals: (0..catalog.flag_count())
                .map(|i| {
                    let id = crate::id::FlagId(i as u32);
                    (catalog.flag(id).key.clone(), state.global(id))
                })
                .collect(),
            active_tab: state
                .active_tab()
                .map(|id| catalog.tab(id).key.clone()),
        }
    }

    /// Encode to the stored JSON form.
    pub fn to_json(&self) -> String {
        // Serializing maps of primitives cannot fail.
        serde_json::to_string(self).expect("save data serializes")
    }

    /// Decode and version-check a stored blob. The state is untouched on
    /// any error.
    pub fn from_json(blob: &str) -> Result<Self, SaveError> {
        let data: SaveData = serde_json::from_str(blob)?;
        if data.version > SAVE_VERSION {
            return Err(SaveError::FutureVersion(data.version));
        }
        if data.version < SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(data.version));
        }
        Ok(data)
    }

    /// Restore into a freshly-initialized state by key lookup. Returns the
    /// saved keys the catalog did not recognize.
    pub fn apply(&self, state: &mut EngineState, catalog: &Catalog) -> Vec<String> {
        let mut unknown = Vec::new();

        for (key, amount) in &self.resources {
            match catalog.resource_id(key) {
                Some(id) => state.set_amount(id, *amount),
                None => unknown.push(format!("resource '{key}'")),
            }
        }
        for (key, amount) in &self.producers {
            match catalog.producer_id(key) {
                Some(id) => state.set_producer_amount(id, *amount),
                None => unknown.push(format!("producer '{key}'")),
            }
        }
        for (key, active) in &self.milestones {
            match catalog.milestone_id(key) {
                Some(id) => state.set_milestone_active(id, *active),
                None => unknown.push(format!("milestone '{key}'")),
            }
        }
        for (key, value) in &self.globals {
            match catalog.flag_id(key) {
                Some(id) => state.set_global(id, *value),
                None => unknown.push(format!("global '{key}'")),
            }
        }
        match &self.active_tab {
            Some(key) => match catalog.tab_id(key) {
                Some(id) => state.set_active_tab(Some(id)),
                None => unknown.push(format!("tab '{key}'")),
            },
            None => state.set_active_tab(None),
        }

        unknown
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// The single-slot blob store the engine persists through. Browser local
/// storage, a file, or an in-memory map — the engine does not care.
pub trait SaveStore {
    fn load(&self, slot: &str) -> Option<String>;
    fn store(&mut self, slot: &str, blob: &str);
    fn clear(&mut self, slot: &str);
}

/// In-memory store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self, slot: &str) -> Option<String> {
        self.slots.get(slot).cloned()
    }

    fn store(&mut self, slot: &str, blob: &str) {
        self.slots.insert(slot.to_string(), blob.to_string());
    }

    fn clear(&mut self, slot: &str) {
        self.slots.remove(slot);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::condition::Condition;
    use crate::milestone::MilestoneDef;
    use crate::production::ProducerOp;
    use crate::state::GlobalValue;
    use crate::tab::TabDef;

    fn fixture() -> (Catalog, EngineState) {
        let mut b = CatalogBuilder::new();
        let sand = b.register_resource("sand", "Sand", "Sand", Condition::Always);
        b.register_flag("bucket", GlobalValue::Bool(false));
        b.register_flag("tide", GlobalValue::Num(0.0));
        b.register_producer(
            "crabs",
            "Helper crabs",
            ProducerOp::Emit {
                resource: sand,
                per_unit: 0.05,
            },
        );
        b.register_milestone(MilestoneDef::new("pile", Condition::Always, vec![]));
        let beach = b.register_tab(TabDef {
            key: "beach".into(),
            name: "Beach".into(),
            text: "Sand and rocks line the beach".into(),
            visible: Condition::Always,
            elements: vec![],
        });
        b.set_default_tab(beach);
        let catalog = b.build().unwrap();
        let state = EngineState::new(&catalog);
        (catalog, state)
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let (catalog, mut state) = fixture();
        let sand = catalog.resource_id("sand").unwrap();
        state.set_amount(sand, 41.5);
        state.set_global(
            catalog.flag_id("bucket").unwrap(),
            GlobalValue::Bool(true),
        );
        state.set_milestone_active(catalog.milestone_id("pile").unwrap(), false);

        let blob = SaveData::capture(&state, &catalog).to_json();
        let decoded = SaveData::from_json(&blob).unwrap();
        let mut restored = EngineState::new(&catalog);
        let unknown = decoded.apply(&mut restored, &catalog);
        assert!(unknown.is_empty());

        let reblob = SaveData::capture(&restored, &catalog).to_json();
        assert_eq!(blob, reblob);
        assert_eq!(restored.amount(sand), 41.5);
        assert!(!restored.milestone_active(catalog.milestone_id("pile").unwrap()));
    }

    #[test]
    fn unknown_saved_keys_are_skipped_and_reported() {
        let (catalog, mut state) = fixture();
        let mut data = SaveData::capture(&state, &catalog);
        data.resources.insert("kelp".into(), 9.0);
        data.globals.insert("moon_phase".into(), GlobalValue::Num(3.0));

        let unknown = data.apply(&mut state, &catalog);
        assert_eq!(unknown.len(), 2);
        assert!(unknown.iter().any(|k| k.contains("kelp")));
        assert!(unknown.iter().any(|k| k.contains("moon_phase")));
        // Known keys still restored normally.
        assert_eq!(state.amount(catalog.resource_id("sand").unwrap()), 0.0);
    }

    #[test]
    fn missing_keys_keep_initialized_defaults() {
        let (catalog, mut state) = fixture();
        let blob = r#"{"version":1,"resources":{},"producers":{},"milestones":{},"globals":{},"active_tab":"beach"}"#;
        let data = SaveData::from_json(blob).unwrap();
        data.apply(&mut state, &catalog);

        // Nothing in the save: every field keeps its fresh default.
        assert_eq!(state.amount(catalog.resource_id("sand").unwrap()), 0.0);
        assert!(state.milestone_active(catalog.milestone_id("pile").unwrap()));
        assert_eq!(
            state.global(catalog.flag_id("tide").unwrap()),
            GlobalValue::Num(0.0)
        );
    }

    #[test]
    fn unknown_active_tab_keeps_default() {
        let (catalog, mut state) = fixture();
        let mut data = SaveData::capture(&state, &catalog);
        data.active_tab = Some("atlantis".into());
        let unknown = data.apply(&mut state, &catalog);
        assert_eq!(unknown.len(), 1);
        assert_eq!(state.active_tab(), catalog.default_tab());
    }

    #[test]
    fn future_version_is_rejected() {
        let blob = r#"{"version":2,"resources":{},"producers":{},"milestones":{},"globals":{},"active_tab":null}"#;
        match SaveData::from_json(blob) {
            Err(SaveError::FutureVersion(2)) => {}
            other => panic!("expected FutureVersion, got: {other:?}"),
        }
    }

    #[test]
    fn unversioned_blob_is_rejected() {
        let blob = r#"{"resources":{},"producers":{},"milestones":{},"globals":{},"active_tab":null}"#;
        match SaveData::from_json(blob) {
            Err(SaveError::UnsupportedVersion(0)) => {}
            other => panic!("expected UnsupportedVersion, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_blob_is_rejected() {
        assert!(matches!(
            SaveData::from_json("{not json"),
            Err(SaveError::Malformed(_))
        ));
    }

    #[test]
    fn memory_store_slots_are_independent() {
        let mut store = MemoryStore::new();
        store.store("a", "one");
        store.store("b", "two");
        assert_eq!(store.load("a").as_deref(), Some("one"));
        store.clear("a");
        assert_eq!(store.load("a"), None);
        assert_eq!(store.load("b").as_deref(), Some("two"));
    }
}
