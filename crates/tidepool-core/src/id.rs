use serde::{Deserialize, Serialize};

/// Identifies a resource in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Identifies a production unit in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProducerId(pub u32);

/// Identifies a milestone in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MilestoneId(pub u32);

/// Identifies a tab in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u32);

/// Identifies an action (button) in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u32);

/// Identifies a registered price in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceId(pub u32);

/// Identifies a global flag in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_equality() {
        let a = ResourceId(0);
        let b = ResourceId(0);
        let c = ResourceId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(TabId(0), "beach");
        map.insert(TabId(1), "ocean");
        assert_eq!(map[&TabId(0)], "beach");
    }
}
