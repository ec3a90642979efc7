//! Teacher agents: zone patrol, priority pursuit and escort

use serde::{Deserialize, Serialize};

use crate::agents::agent::{Agent, AgentBody};
use crate::agents::child::Child;
use crate::classroom::WorldView;
use crate::core::types::{ChildId, Direction, Position, StrategyKind, TeacherId, Zone};
use crate::spatial::pathfinding::first_step_to_nearest;

/// x-axis steps are tried before y-axis steps when closing in on a target
const PURSUIT_ORDER: [Direction; 4] =
    [Direction::Right, Direction::Left, Direction::Down, Direction::Up];

/// A teacher patrolling a zone of the classroom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    body: AgentBody,
    zone: Zone,
    captures: u32,
    strategy_priority: Vec<StrategyKind>,
}

impl Agent for Teacher {
    fn body(&self) -> &AgentBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut AgentBody {
        &mut self.body
    }
}

impl Teacher {
    pub fn new(
        id: TeacherId,
        position: Position,
        zone: Zone,
        strategy_priority: Vec<StrategyKind>,
    ) -> Self {
        Self {
            id,
            body: AgentBody::new(position),
            zone,
            captures: 0,
            strategy_priority,
        }
    }

    /// Patrol zone, fixed for the teacher's lifetime
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Number of children this teacher has captured
    pub fn captures(&self) -> u32 {
        self.captures
    }

    pub fn strategy_priority(&self) -> &[StrategyKind] {
        &self.strategy_priority
    }

    /// Orthogonal adjacency only
    pub fn is_adjacent_to(&self, pos: Position) -> bool {
        self.position().grid_distance(&pos) == 1
    }

    /// Patrol anchor used when nobody is in reach
    pub fn area_center(&self) -> Position {
        self.zone.center()
    }

    /// Free children inside the zone that are not sheltering in the safe zone
    pub fn find_children_in_area<'a>(&self, world: &WorldView<'a>) -> Vec<&'a Child> {
        world
            .children()
            .iter()
            .filter(|c| {
                c.is_free() && self.zone.contains(c.position()) && !world.is_safe(c.position())
            })
            .collect()
    }

    /// Rank in the priority list; unlisted kinds come last
    fn priority_rank(&self, kind: StrategyKind) -> usize {
        self.strategy_priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.strategy_priority.len())
    }

    /// Highest-priority child in the zone, nearest first among equals
    pub fn select_target<'a>(&self, world: &WorldView<'a>) -> Option<&'a Child> {
        self.find_children_in_area(world).into_iter().min_by_key(|c| {
            (
                self.priority_rank(c.strategy.kind()),
                self.position().grid_distance(&c.position()),
                c.id,
            )
        })
    }

    /// Decide where to go this tick, or None to stay
    pub fn choose_move(&self, world: &WorldView<'_>) -> Option<Position> {
        if let Some(child) = world.escort_of(self.id) {
            return self.escort_move(world, child);
        }

        let target = match self.select_target(world) {
            Some(child) => child.position(),
            None => self.area_center(),
        };
        self.step_toward(world, target, |p| self.may_patrol_into(world, p))
    }

    /// Outside escort duty a teacher keeps out of the safe zone (unless it is
    /// leaving it) and stays inside its own zone once there
    fn may_patrol_into(&self, world: &WorldView<'_>, dest: Position) -> bool {
        let here = self.position();
        world.is_vacant(dest)
            && (!world.is_safe(dest) || world.is_safe(here))
            && (self.zone.contains(dest) || !self.zone.contains(here))
    }

    /// Neighbor strictly closer to `target`, x-axis first on ties
    fn step_toward(
        &self,
        world: &WorldView<'_>,
        target: Position,
        allowed: impl Fn(Position) -> bool,
    ) -> Option<Position> {
        let here = self.position();
        let mut best = None;
        let mut best_distance = here.grid_distance(&target);
        for direction in PURSUIT_ORDER {
            let candidate = here.step(direction);
            if !world.in_bounds(candidate) || !allowed(candidate) {
                continue;
            }
            let d = candidate.grid_distance(&target);
            if d < best_distance {
                best = Some(candidate);
                best_distance = d;
            }
        }
        best
    }

    /// Walk the escorted child home
    ///
    /// Outside the safe zone: first step of a shortest path to the nearest
    /// vacant safe cell. Inside it: step aside onto any vacant neighbor, safe
    /// cells first, so the child can follow into the cell just left.
    fn escort_move(&self, world: &WorldView<'_>, child: ChildId) -> Option<Position> {
        let here = self.position();

        if world.is_safe(here) {
            let vacant: Vec<Position> = here
                .neighbors()
                .into_iter()
                .filter(|p| world.is_vacant(*p))
                .collect();
            return vacant
                .iter()
                .find(|p| world.is_safe(**p))
                .or_else(|| vacant.first())
                .copied();
        }

        let step = first_step_to_nearest(here, |p| world.is_vacant(p), |p| world.is_safe(p));
        step.or_else(|| {
            // No open route: close in greedily and wait for the way to clear
            let home = world
                .child(child)
                .map(|c| world.nearest_safe_cell(c.position()))
                .unwrap_or_else(|| world.nearest_safe_cell(here));
            self.step_toward(world, home, |p| world.is_vacant(p))
        })
    }

    pub(crate) fn record_capture(&mut self) {
        self.captures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classroom::Classroom;
    use crate::core::config::{ChildCounts, ClassroomConfig};

    fn classroom() -> Classroom {
        let mut config = ClassroomConfig {
            width: 10,
            height: 10,
            safe_zone: Zone::new(0, 2, 0, 2),
            children: ChildCounts::none(),
            ..ClassroomConfig::default()
        };
        config.teachers.count = 0;
        Classroom::empty(config).unwrap()
    }

    #[test]
    fn test_is_adjacent_to_is_orthogonal() {
        let teacher = Teacher::new(TeacherId(0), Position::new(5, 5), Zone::full(10, 10), vec![]);
        assert!(teacher.is_adjacent_to(Position::new(5, 6)));
        assert!(teacher.is_adjacent_to(Position::new(4, 5)));
        assert!(!teacher.is_adjacent_to(Position::new(6, 6)));
        assert!(!teacher.is_adjacent_to(Position::new(5, 5)));
    }

    #[test]
    fn test_pursue_nearest_child() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(5, 5), Zone::full(10, 10)).unwrap();
        let near = Position::new(3, 3);
        classroom.add_child(near, StrategyKind::RandomWalk).unwrap();
        classroom.add_child(Position::new(9, 9), StrategyKind::RandomWalk).unwrap();

        let teacher = &classroom.teachers()[0];
        let dest = teacher.choose_move(&classroom.view()).unwrap();
        assert!(dest.distance_to(&near) < teacher.position().distance_to(&near));
        // x-axis first
        assert_eq!(dest, Position::new(4, 5));
    }

    #[test]
    fn test_priority_beats_distance() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(5, 5), Zone::full(10, 10)).unwrap();
        classroom.add_child(Position::new(5, 7), StrategyKind::RandomWalk).unwrap();
        let hoarder = classroom.add_child(Position::new(9, 5), StrategyKind::CandyHoarder).unwrap();

        let view = classroom.view();
        let target = classroom.teachers()[0].select_target(&view).unwrap();
        assert_eq!(target.id, hoarder);
    }

    #[test]
    fn test_children_in_safe_zone_are_ignored() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(5, 5), Zone::full(10, 10)).unwrap();
        classroom.add_child(Position::new(1, 1), StrategyKind::RandomWalk).unwrap();

        let view = classroom.view();
        assert!(classroom.teachers()[0].find_children_in_area(&view).is_empty());
    }

    #[test]
    fn test_children_outside_zone_are_ignored() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(2, 5), Zone::new(0, 5, 0, 10)).unwrap();
        classroom.add_child(Position::new(8, 5), StrategyKind::RandomWalk).unwrap();

        let view = classroom.view();
        let teacher = &classroom.teachers()[0];
        assert!(teacher.select_target(&view).is_none());
        // Patrols toward the zone center instead
        assert_eq!(teacher.area_center(), Position::new(2, 4));
        assert_eq!(teacher.choose_move(&view), Some(Position::new(2, 4)));
    }

    #[test]
    fn test_patrol_stays_in_zone() {
        let mut classroom = classroom();
        let zone = Zone::new(3, 7, 3, 7);
        classroom.add_teacher(Position::new(3, 3), zone).unwrap();
        classroom.add_child(Position::new(9, 9), StrategyKind::RandomWalk).unwrap();

        let teacher = &classroom.teachers()[0];
        let dest = teacher.choose_move(&classroom.view()).unwrap();
        assert!(zone.contains(dest));
    }

    #[test]
    fn test_centered_teacher_stays() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(4, 4), Zone::full(10, 10)).unwrap();
        assert!(classroom.teachers()[0].choose_move(&classroom.view()).is_none());
    }

    #[test]
    fn test_teacher_does_not_enter_safe_zone_on_patrol() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(2, 1), Zone::new(0, 3, 0, 3)).unwrap();
        // Zone center (1, 1) is a safe cell; the teacher may not step in
        assert!(classroom.teachers()[0].choose_move(&classroom.view()).is_none());
    }

    #[test]
    fn test_teacher_leaves_safe_zone() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(0, 0), Zone::full(10, 10)).unwrap();
        classroom.add_child(Position::new(6, 0), StrategyKind::RandomWalk).unwrap();
        let dest = classroom.teachers()[0].choose_move(&classroom.view());
        assert_eq!(dest, Some(Position::new(1, 0)));
    }
}
