//! Breadth-first pathfinding on the classroom grid
//!
//! Every step costs the same, so BFS finds shortest orthogonal paths.
//! Neighbors are expanded in `Direction::ALL` order, which makes the chosen
//! path deterministic.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::core::types::Position;

/// Find a shortest path from `start` to the nearest cell accepted by `is_goal`
///
/// `passable` decides which cells may be entered; a goal must be passable to
/// be reached. `start` itself is never tested. Returns the path from `start`
/// to the goal inclusive, or None if no goal is reachable.
pub fn find_path_to_nearest(
    start: Position,
    passable: impl Fn(Position) -> bool,
    is_goal: impl Fn(Position) -> bool,
) -> Option<Vec<Position>> {
    if is_goal(start) {
        return Some(vec![start]);
    }

    let mut frontier = VecDeque::from([start]);
    let mut came_from: AHashMap<Position, Position> = AHashMap::new();

    while let Some(current) = frontier.pop_front() {
        for neighbor in current.neighbors() {
            if neighbor == start || came_from.contains_key(&neighbor) || !passable(neighbor) {
                continue;
            }
            came_from.insert(neighbor, current);

            if is_goal(neighbor) {
                return Some(reconstruct_path(&came_from, neighbor));
            }
            frontier.push_back(neighbor);
        }
    }

    None
}

/// First step of the shortest path, or None when already at a goal or stuck
pub fn first_step_to_nearest(
    start: Position,
    passable: impl Fn(Position) -> bool,
    is_goal: impl Fn(Position) -> bool,
) -> Option<Position> {
    find_path_to_nearest(start, passable, is_goal).and_then(|path| path.get(1).copied())
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<Position, Position>,
    mut current: Position,
) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_box(size: i32) -> impl Fn(Position) -> bool {
        move |p: Position| p.x >= 0 && p.y >= 0 && p.x < size && p.y < size
    }

    #[test]
    fn test_start_is_goal() {
        let start = Position::new(1, 1);
        let path = find_path_to_nearest(start, in_box(3), |p| p == start).unwrap();
        assert_eq!(path, vec![start]);
        assert!(first_step_to_nearest(start, in_box(3), |p| p == start).is_none());
    }

    #[test]
    fn test_straight_path_length() {
        let goal = Position::new(4, 0);
        let path = find_path_to_nearest(Position::new(0, 0), in_box(5), |p| p == goal).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert_eq!(pair[0].grid_distance(&pair[1]), 1);
        }
    }

    #[test]
    fn test_routes_around_wall() {
        // Column x = 2 is blocked except at y = 4
        let passable = |p: Position| in_box(5)(p) && (p.x != 2 || p.y == 4);
        let goal = Position::new(4, 0);
        let path = find_path_to_nearest(Position::new(0, 0), passable, |p| p == goal).unwrap();
        assert!(path.contains(&Position::new(2, 4)));
        assert_eq!(path.len(), 13);
    }

    #[test]
    fn test_unreachable_goal() {
        let passable = |p: Position| in_box(5)(p) && p.x != 2;
        let goal = Position::new(4, 0);
        assert!(find_path_to_nearest(Position::new(0, 0), passable, |p| p == goal).is_none());
    }

    #[test]
    fn test_picks_nearest_goal() {
        let near = Position::new(0, 2);
        let far = Position::new(4, 4);
        let step = first_step_to_nearest(Position::new(0, 0), in_box(5), |p| p == near || p == far);
        assert_eq!(step, Some(Position::new(0, 1)));
    }
}
