//! Effect Maps
//!
//! Numeric deltas the turn driver applies to the economy and population
//! (e.g. `money`, `satisfaction`, `casualties`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known effect keys.
pub mod keys {
    pub const MONEY: &str = "money";
    pub const SATISFACTION: &str = "satisfaction";
    pub const POPULATION: &str = "population";
    pub const CASUALTIES: &str = "casualties";
    pub const BUILDING_DAMAGE: &str = "building_damage";
    pub const TRADE_BONUS: &str = "trade_bonus";
}

/// Ordered map of named numeric deltas.
///
/// Always built through [`EffectMap::new`] or the `with` builder, so no two
/// instances ever share a backing container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectMap(BTreeMap<String, f64>);

impl EffectMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder: sets `key` to `value`.
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Adds `value` onto whatever `key` already holds.
    pub fn add(&mut self, key: impl Into<String>, value: f64) {
        *self.0.entry(key.into()).or_insert(0.0) += value;
    }

    /// Adds every entry of `other` onto this map.
    pub fn merge(&mut self, other: &EffectMap) {
        for (key, value) in &other.0 {
            self.add(key.clone(), *value);
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Value for `key`, or zero if absent.
    pub fn value(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for EffectMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let effects = EffectMap::new()
            .with(keys::SATISFACTION, -20.0)
            .with(keys::CASUALTIES, 100.0);

        assert_eq!(effects.get(keys::SATISFACTION), Some(-20.0));
        assert_eq!(effects.value(keys::MONEY), 0.0);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut total = EffectMap::new().with(keys::MONEY, -500.0);
        total.merge(&EffectMap::new().with(keys::MONEY, -200.0).with(keys::SATISFACTION, 5.0));

        assert_eq!(total.value(keys::MONEY), -700.0);
        assert_eq!(total.value(keys::SATISFACTION), 5.0);
    }

    #[test]
    fn test_separate_instances_do_not_alias() {
        let mut a = EffectMap::default();
        let b = EffectMap::default();
        a.add(keys::MONEY, 1.0);
        assert!(b.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let effects = EffectMap::new().with("money", 3000.0);
        assert_eq!(serde_json::to_string(&effects).unwrap(), r#"{"money":3000.0}"#);
    }
}
