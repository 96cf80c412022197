//! City Snapshot
//!
//! Read-only view of the player's city handed to both engines every turn.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Flat, typed city-state snapshot supplied by the turn driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub population: u32,
    /// Treasury balance; may be negative when the city is in debt
    pub treasury: f64,
    /// Citizen satisfaction, 0-100
    pub satisfaction: f64,
    /// Structure types that have been built at least once
    #[serde(default)]
    pub structures: BTreeSet<String>,
    /// Researched capability ids
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl Default for CitySnapshot {
    fn default() -> Self {
        Self {
            population: 0,
            treasury: 0.0,
            satisfaction: 50.0,
            structures: BTreeSet::new(),
            capabilities: BTreeSet::new(),
        }
    }
}

impl CitySnapshot {
    pub fn new(population: u32, treasury: f64, satisfaction: f64) -> Self {
        Self {
            population,
            treasury,
            satisfaction,
            ..Default::default()
        }
    }

    pub fn with_structure(mut self, structure: impl Into<String>) -> Self {
        self.structures.insert(structure.into());
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn has_structure(&self, structure: &str) -> bool {
        self.structures.contains(structure)
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_neutral_mood() {
        let snapshot = CitySnapshot::default();
        assert_eq!(snapshot.population, 0);
        assert_eq!(snapshot.satisfaction, 50.0);
        assert!(snapshot.structures.is_empty());
    }

    #[test]
    fn test_builder() {
        let snapshot = CitySnapshot::new(1200, 8000.0, 65.0)
            .with_structure("hospital")
            .with_capability("seismic_engineering");

        assert!(snapshot.has_structure("hospital"));
        assert!(!snapshot.has_structure("school"));
        assert!(snapshot.has_capability("seismic_engineering"));
    }

    #[test]
    fn test_missing_sets_deserialize_empty() {
        let snapshot: CitySnapshot =
            serde_json::from_str(r#"{"population":10,"treasury":5.0,"satisfaction":40.0}"#)
                .unwrap();
        assert!(snapshot.capabilities.is_empty());
    }
}
