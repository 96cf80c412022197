//! Identifier generation for event instances, missions, and wars.

use crate::Turn;

/// Generates an active event instance ID. At most one event activates per
/// turn, so the pair is unique.
pub fn generate_event_instance_id(definition_id: &str, turn: Turn) -> String {
    format!("{}_{}", definition_id, turn)
}

/// Generates a mission ID with the given sequence number.
pub fn generate_mission_id(sequence: u64, city_id: &str) -> String {
    format!("mission_{:04}_{}", sequence, city_id)
}

/// Sequence number of a mission ID built by [`generate_mission_id`].
pub fn mission_sequence(mission_id: &str) -> Option<u64> {
    let rest = mission_id.strip_prefix("mission_")?;
    let (sequence, _) = rest.split_once('_')?;
    sequence.parse().ok()
}

/// Generates a war ID.
pub fn generate_war_id(turn: Turn, city_id: &str) -> String {
    format!("war_{}_{}", turn, city_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_formats() {
        assert_eq!(generate_event_instance_id("flood", 12), "flood_12");
        assert_eq!(generate_mission_id(7, "steelburg"), "mission_0007_steelburg");
        assert_eq!(generate_war_id(30, "militaria"), "war_30_militaria");
    }

    #[test]
    fn test_mission_sequence() {
        assert_eq!(mission_sequence(&generate_mission_id(7, "steelburg")), Some(7));
        assert_eq!(mission_sequence("mission_12345_tech_city"), Some(12345));
        assert_eq!(mission_sequence("war_3_luxuria"), None);
        assert_eq!(mission_sequence("mission_x_luxuria"), None);
    }
}
