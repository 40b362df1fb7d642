#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that pairs ready towers with the nearest enemy in range.

use tower_mini_core::{EnemyId, EnemyView, Point, RunPhase, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes targets for every tower whose cooldown has elapsed.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. A candidate must lie strictly inside the tower's range;
    /// when two enemies are equally close the earlier spawned one wins.
    pub fn handle(
        &mut self,
        phase: RunPhase,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if phase != RunPhase::WaveActive {
            return;
        }

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter().filter(|tower| tower.is_ready()) {
            let range_sq = tower.range * tower.range;
            let mut best: Option<(f32, &EnemyCandidate)> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = tower.position.distance_squared(candidate.position);
                if distance_sq >= range_sq {
                    continue;
                }

                match best {
                    Some((best_sq, _)) if distance_sq >= best_sq => {}
                    _ => best = Some((distance_sq, candidate)),
                }
            }

            if let Some((_, candidate)) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: candidate.id,
                    tower_position: tower.position,
                    enemy_position: candidate.position,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace
            .extend(enemies.iter().map(|snapshot| EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            }));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Point,
}

#[cfg(test)]
mod tests {
    use super::TowerTargeting;
    use tower_mini_core::{
        EnemyId, EnemyKind, EnemySnapshot, EnemyView, Point, RunPhase, TowerId, TowerSnapshot,
        TowerView,
    };

    fn tower(id: u32, x: f32, y: f32, cooldown: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            position: Point::new(x, y),
            range: 180.0,
            cooldown,
        }
    }

    fn enemy(id: u32, x: f32, y: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Fast,
            position: Point::new(x, y),
            waypoint: 0,
            speed: 120.0,
            hit_points: 30.0,
        }
    }

    #[test]
    fn targets_nearest_enemy_within_range() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(1, 0.0, 0.0, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(4, 150.0, 0.0),
            enemy(5, 0.0, 90.0),
            enemy(6, 10.0, 400.0),
        ]);

        let mut out = Vec::new();
        system.handle(RunPhase::WaveActive, &towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, TowerId::new(1));
        assert_eq!(out[0].enemy, EnemyId::new(5));
        assert_eq!(out[0].enemy_position, Point::new(0.0, 90.0));
    }

    #[test]
    fn range_boundary_is_exclusive() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(1, 0.0, 0.0, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(2, 180.0, 0.0)]);

        let mut out = Vec::new();
        system.handle(RunPhase::WaveActive, &towers, &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn equidistant_enemies_resolve_to_earliest_spawn() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(1, 0.0, 0.0, -0.3)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(9, -50.0, 0.0), enemy(3, 50.0, 0.0)]);

        let mut out = Vec::new();
        system.handle(RunPhase::WaveActive, &towers, &enemies, &mut out);
        assert_eq!(out[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn cooling_towers_and_inactive_phases_yield_no_targets() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(1, 0.0, 0.0, 0.2)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(2, 10.0, 0.0)]);

        let mut out = Vec::new();
        system.handle(RunPhase::WaveActive, &towers, &enemies, &mut out);
        assert!(out.is_empty());

        let ready = TowerView::from_snapshots(vec![tower(1, 0.0, 0.0, 0.0)]);
        system.handle(RunPhase::Intermission, &ready, &enemies, &mut out);
        assert!(out.is_empty());
    }
}
