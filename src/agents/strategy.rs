//! Child movement strategies
//!
//! Each strategy turns the list of valid moves into at most one destination.
//! `None` means the child stays put this tick. Deterministic strategies only
//! move when a neighbor scores strictly better than the current cell, so
//! staying wins ties and earlier neighbors win ties among moves.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agents::Agent;
use crate::classroom::WorldView;
use crate::core::types::{AgentState, ChildId, Direction, Position, SimTime, StrategyKind};

/// A child's strategy, including the switching state of `Unpredictable`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    /// One of the nine concrete kinds, used for the whole run
    Simple(StrategyKind),
    /// Delegates to `active` until `next_switch`, then re-samples
    Unpredictable {
        active: StrategyKind,
        next_switch: SimTime,
    },
}

impl Strategy {
    /// The kind the child was configured with
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Simple(kind) => *kind,
            Strategy::Unpredictable { .. } => StrategyKind::Unpredictable,
        }
    }

    /// The concrete kind currently selecting moves
    pub fn active_kind(&self) -> StrategyKind {
        match self {
            Strategy::Simple(kind) => *kind,
            Strategy::Unpredictable { active, .. } => *active,
        }
    }
}

/// What a strategy knows about the child it moves
#[derive(Debug, Clone, Copy)]
pub struct MoveContext {
    pub id: ChildId,
    pub position: Position,
    pub previous_position: Position,
    pub preferred_direction: Direction,
}

/// Pick a destination among `moves` using a concrete strategy kind
pub fn select_move<R: Rng + ?Sized>(
    kind: StrategyKind,
    ctx: &MoveContext,
    moves: &[Position],
    world: &WorldView<'_>,
    rng: &mut R,
) -> Option<Position> {
    if moves.is_empty() {
        return None;
    }

    match kind {
        // Unpredictable is resolved to its active kind before dispatch
        StrategyKind::RandomWalk | StrategyKind::StrategicTiming | StrategyKind::Unpredictable => {
            random_move(moves, rng)
        }
        StrategyKind::CandySeeker => candy_seeker_move(ctx, moves, world, rng),
        StrategyKind::TeacherAvoidance => safest_move(ctx, moves, world),
        StrategyKind::DirectionalBias => directional_move(ctx, moves, rng),
        StrategyKind::WallHugger => wall_hugging_move(ctx, moves, world),
        StrategyKind::GroupSeeker => group_move(ctx, moves, world, rng),
        StrategyKind::CandyHoarder => candy_rich_area_move(ctx, moves, world, rng),
        StrategyKind::SafeZoneExplorer => safe_exploration_move(ctx, moves, world),
    }
}

fn random_move<R: Rng + ?Sized>(moves: &[Position], rng: &mut R) -> Option<Position> {
    moves.choose(rng).copied()
}

/// First move whose score is strictly below the score of staying
fn best_below<F: Fn(Position) -> f64>(
    current: Position,
    moves: &[Position],
    score: F,
) -> Option<Position> {
    let mut best = None;
    let mut best_score = score(current);
    for &candidate in moves {
        let s = score(candidate);
        if s < best_score {
            best = Some(candidate);
            best_score = s;
        }
    }
    best
}

fn candy_seeker_move<R: Rng + ?Sized>(
    ctx: &MoveContext,
    moves: &[Position],
    world: &WorldView<'_>,
    rng: &mut R,
) -> Option<Position> {
    let candies = world.candies();
    let Some(target) = candies.iter().min_by_key(|c| ctx.position.grid_distance(c)).copied() else {
        return random_move(moves, rng);
    };
    best_below(ctx.position, moves, |p| p.distance_to(&target))
}

/// Maximize the distance to the closest teacher
fn safest_move(ctx: &MoveContext, moves: &[Position], world: &WorldView<'_>) -> Option<Position> {
    let teachers = world.teachers();
    if teachers.is_empty() {
        return None;
    }
    best_below(ctx.position, moves, |p| {
        let nearest = teachers
            .iter()
            .map(|t| p.grid_distance(&t.position()))
            .min()
            .unwrap_or(u64::MAX);
        -(nearest as f64)
    })
}

fn directional_move<R: Rng + ?Sized>(
    ctx: &MoveContext,
    moves: &[Position],
    rng: &mut R,
) -> Option<Position> {
    let mut best: Option<(Position, i32)> = None;
    for &candidate in moves {
        let Some(direction) = ctx.position.direction_to(&candidate) else {
            continue;
        };
        let dot = direction.dot(ctx.preferred_direction);
        if best.map_or(true, |(_, d)| dot > d) {
            best = Some((candidate, dot));
        }
    }

    match best {
        Some((candidate, dot)) if dot > 0 => Some(candidate),
        _ => random_move(moves, rng),
    }
}

/// Steps to the closest edge of the grid
fn wall_distance(pos: Position, world: &WorldView<'_>) -> i32 {
    let right = world.width() as i32 - 1 - pos.x;
    let bottom = world.height() as i32 - 1 - pos.y;
    pos.x.min(pos.y).min(right).min(bottom)
}

fn wall_hugging_move(
    ctx: &MoveContext,
    moves: &[Position],
    world: &WorldView<'_>,
) -> Option<Position> {
    if wall_distance(ctx.position, world) > 0 {
        return best_below(ctx.position, moves, |p| wall_distance(p, world) as f64);
    }

    // On the wall: slide along it, keeping the current heading when possible
    let along: Vec<Position> = moves
        .iter()
        .copied()
        .filter(|p| wall_distance(*p, world) == 0)
        .collect();
    let heading = ctx.previous_position.direction_to(&ctx.position);
    heading
        .map(|d| ctx.position.step(d))
        .filter(|p| along.contains(p))
        .or_else(|| along.first().copied())
}

fn group_move<R: Rng + ?Sized>(
    ctx: &MoveContext,
    moves: &[Position],
    world: &WorldView<'_>,
    rng: &mut R,
) -> Option<Position> {
    let others: Vec<Position> = world
        .children()
        .iter()
        .filter(|c| c.id != ctx.id && c.state() == AgentState::Free)
        .map(|c| c.position())
        .collect();
    if others.is_empty() {
        return random_move(moves, rng);
    }

    let n = others.len() as f64;
    let cx = others.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let cy = others.iter().map(|p| p.y as f64).sum::<f64>() / n;
    best_below(ctx.position, moves, |p| (p.x as f64 - cx).abs() + (p.y as f64 - cy).abs())
}

/// Cell with the most candies within the hoarding radius
///
/// Ties go to the cell nearest the child, then to row-major order.
fn richest_cell(
    ctx: &MoveContext,
    candies: &[Position],
    world: &WorldView<'_>,
) -> Option<Position> {
    let radius = world.config().behavior.hoarder_radius;
    let mut best: Option<(Position, usize, u64)> = None;

    for y in 0..world.height() as i32 {
        for x in 0..world.width() as i32 {
            let cell = Position::new(x, y);
            let density = candies
                .iter()
                .filter(|c| c.x.abs_diff(cell.x) <= radius && c.y.abs_diff(cell.y) <= radius)
                .count();
            if density == 0 {
                continue;
            }
            let distance = ctx.position.grid_distance(&cell);
            let better = match best {
                None => true,
                Some((_, d, dist)) => density > d || (density == d && distance < dist),
            };
            if better {
                best = Some((cell, density, distance));
            }
        }
    }

    best.map(|(cell, _, _)| cell)
}

fn candy_rich_area_move<R: Rng + ?Sized>(
    ctx: &MoveContext,
    moves: &[Position],
    world: &WorldView<'_>,
    rng: &mut R,
) -> Option<Position> {
    let candies = world.candies();
    match richest_cell(ctx, &candies, world) {
        Some(target) => best_below(ctx.position, moves, |p| p.distance_to(&target)),
        None => random_move(moves, rng),
    }
}

/// Head home when far from the safe zone, wander off when close to it
fn safe_exploration_move(
    ctx: &MoveContext,
    moves: &[Position],
    world: &WorldView<'_>,
) -> Option<Position> {
    let threshold = u64::from(world.config().behavior.explorer_threshold);
    if world.distance_to_safe_zone(ctx.position) > threshold {
        best_below(ctx.position, moves, |p| world.distance_to_safe_zone(p) as f64)
    } else {
        best_below(ctx.position, moves, |p| -(world.distance_to_safe_zone(p) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classroom::Classroom;
    use crate::core::config::{ChildCounts, ClassroomConfig};
    use crate::core::types::Zone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

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

    fn ctx_at(pos: Position) -> MoveContext {
        MoveContext {
            id: ChildId(99),
            position: pos,
            previous_position: pos,
            preferred_direction: Direction::Right,
        }
    }

    fn valid(classroom: &Classroom, pos: Position) -> Vec<Position> {
        pos.neighbors()
            .into_iter()
            .filter(|p| classroom.is_vacant(*p))
            .collect()
    }

    #[test]
    fn test_random_walk_picks_a_valid_move() {
        let classroom = classroom();
        let pos = Position::new(5, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            let choice = select_move(
                StrategyKind::RandomWalk,
                &ctx_at(pos),
                &moves,
                &classroom.view(),
                &mut rng,
            );
            assert!(moves.contains(&choice.unwrap()));
        }
    }

    #[test]
    fn test_no_moves_means_stay() {
        let classroom = classroom();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for kind in StrategyKind::ALL {
            let choice = select_move(
                kind,
                &ctx_at(Position::new(5, 5)),
                &[],
                &classroom.view(),
                &mut rng,
            );
            assert!(choice.is_none(), "{:?} moved with no valid moves", kind);
        }
    }

    #[test]
    fn test_candy_seeker_moves_toward_nearest_candy() {
        let mut classroom = classroom();
        classroom.place_candy(Position::new(5, 8)).unwrap();
        classroom.place_candy(Position::new(9, 9)).unwrap();
        let pos = Position::new(5, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::CandySeeker,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(5, 6)));
    }

    #[test]
    fn test_avoidance_moves_away_from_teacher() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(5, 3), Zone::full(10, 10)).unwrap();
        let pos = Position::new(5, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::TeacherAvoidance,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(5, 6)));
    }

    #[test]
    fn test_avoidance_stays_when_cornered_equally() {
        let mut classroom = classroom();
        classroom.add_teacher(Position::new(9, 0), Zone::full(10, 10)).unwrap();
        // In the far corner every neighbor is closer to the teacher
        let pos = Position::new(0, 9);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::TeacherAvoidance,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert!(choice.is_none());
    }

    #[test]
    fn test_directional_bias_prefers_heading() {
        let classroom = classroom();
        let pos = Position::new(5, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::DirectionalBias,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(6, 5)));
    }

    #[test]
    fn test_directional_bias_falls_back_at_wall() {
        let classroom = classroom();
        let pos = Position::new(9, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::DirectionalBias,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert!(moves.contains(&choice.unwrap()));
    }

    #[test]
    fn test_wall_hugger_heads_for_closest_wall() {
        let classroom = classroom();
        let pos = Position::new(7, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::WallHugger,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(8, 5)));
    }

    #[test]
    fn test_wall_hugger_slides_along_wall() {
        let classroom = classroom();
        let pos = Position::new(9, 5);
        let ctx = MoveContext {
            previous_position: Position::new(9, 6),
            ..ctx_at(pos)
        };
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::WallHugger,
            &ctx,
            &moves,
            &classroom.view(),
            &mut rng,
        );
        // Heading up, keeps going up rather than stepping into the room
        assert_eq!(choice, Some(Position::new(9, 4)));
    }

    #[test]
    fn test_group_seeker_moves_toward_others() {
        let mut classroom = classroom();
        classroom.add_child(Position::new(8, 5), StrategyKind::RandomWalk).unwrap();
        classroom.add_child(Position::new(8, 7), StrategyKind::RandomWalk).unwrap();
        let pos = Position::new(3, 6);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::GroupSeeker,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(4, 6)));
    }

    #[test]
    fn test_candy_hoarder_targets_dense_area() {
        let mut classroom = classroom();
        // One lone candy close by, a cluster of three further away
        classroom.place_candy(Position::new(1, 8)).unwrap();
        classroom.place_candy(Position::new(9, 9)).unwrap();
        classroom.place_candy(Position::new(9, 8)).unwrap();
        classroom.place_candy(Position::new(8, 9)).unwrap();
        let pos = Position::new(4, 5);
        let moves = valid(&classroom, pos);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = select_move(
            StrategyKind::CandyHoarder,
            &ctx_at(pos),
            &moves,
            &classroom.view(),
            &mut rng,
        );
        let target_side = [Position::new(4, 6), Position::new(5, 5)];
        assert!(target_side.contains(&choice.unwrap()));
    }

    #[test]
    fn test_safe_zone_explorer_alternates() {
        let classroom = classroom();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        // Far from home: come back
        let far = Position::new(9, 9);
        let choice = select_move(
            StrategyKind::SafeZoneExplorer,
            &ctx_at(far),
            &valid(&classroom, far),
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(9, 8)));

        // Inside the safe zone: explore outward
        let home = Position::new(1, 1);
        let choice = select_move(
            StrategyKind::SafeZoneExplorer,
            &ctx_at(home),
            &valid(&classroom, home),
            &classroom.view(),
            &mut rng,
        );
        assert_eq!(choice, Some(Position::new(1, 2)));
    }

    #[test]
    fn test_strategy_kinds() {
        let simple = Strategy::Simple(StrategyKind::WallHugger);
        assert_eq!(simple.kind(), StrategyKind::WallHugger);
        assert_eq!(simple.active_kind(), StrategyKind::WallHugger);

        let meta = Strategy::Unpredictable {
            active: StrategyKind::CandySeeker,
            next_switch: 5.0,
        };
        assert_eq!(meta.kind(), StrategyKind::Unpredictable);
        assert_eq!(meta.active_kind(), StrategyKind::CandySeeker);
    }
}
