//! Authoritative tower state management utilities.

use tower_mini_core::{Point, TowerId};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Position the tower was built at.
    pub(crate) position: Point,
    /// Seconds until the tower may fire again.
    pub(crate) cooldown: f32,
}

/// Registry that stores towers in placement order and allocates identifiers.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: Vec<TowerState>,
    next_tower_id: u32,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_tower_id: 0,
        }
    }

    /// Removes every tower. Identifiers keep increasing across levels.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stores a ready-to-fire tower at `position`.
    pub(crate) fn insert(&mut self, position: Point) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.saturating_add(1);
        self.entries.push(TowerState {
            id,
            position,
            cooldown: 0.0,
        });
        id
    }

    /// Reports whether any tower stands strictly closer than `spacing`.
    pub(crate) fn crowds(&self, position: Point, spacing: f32) -> bool {
        let limit = spacing * spacing;
        self.entries
            .iter()
            .any(|tower| tower.position.distance_squared(position) < limit)
    }

    /// Counts every tower's cooldown down by `seconds`.
    ///
    /// Cooldowns keep falling below zero while a tower has no target.
    pub(crate) fn cool_down(&mut self, seconds: f32) {
        for tower in &mut self.entries {
            tower.cooldown -= seconds;
        }
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries
            .binary_search_by_key(&id, |tower| tower.id)
            .ok()
            .map(|index| &mut self.entries[index])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert_eq!(registry.iter().count(), 0);
        assert_eq!(registry.next_tower_id, 0);
    }

    #[test]
    fn identifiers_survive_clearing() {
        let mut registry = TowerRegistry::new();
        assert_eq!(registry.insert(Point::new(0.0, 0.0)), TowerId::new(0));
        registry.clear();
        assert_eq!(registry.insert(Point::new(0.0, 0.0)), TowerId::new(1));
        assert!(registry.get_mut(TowerId::new(1)).is_some());
        assert!(registry.get_mut(TowerId::new(0)).is_none());
    }

    #[test]
    fn spacing_is_exclusive_at_the_boundary() {
        let mut registry = TowerRegistry::new();
        let _ = registry.insert(Point::new(100.0, 100.0));
        assert!(registry.crowds(Point::new(139.0, 100.0), 40.0));
        assert!(!registry.crowds(Point::new(140.0, 100.0), 40.0));
    }

    #[test]
    fn cooldowns_run_negative_while_idle() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(Point::new(0.0, 0.0));
        registry.cool_down(0.5);
        registry.cool_down(0.5);
        let tower = registry.get_mut(id).expect("tower exists");
        assert_eq!(tower.cooldown, -1.0);
    }
}
