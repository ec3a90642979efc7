//! Child agents: strategy-driven movement, cooldowns and capture state

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agents::agent::{Agent, AgentBody};
use crate::agents::strategy::{select_move, MoveContext, Strategy};
use crate::classroom::WorldView;
use crate::core::config::TimingConfig;
use crate::core::types::{AgentState, ChildId, Direction, Position, SimTime, StrategyKind};

/// A child wandering the classroom in search of candy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    body: AgentBody,
    pub strategy: Strategy,
    state: AgentState,
    /// No moves before this time
    pub cooldown_until: SimTime,
    pub last_move_time: SimTime,
    /// Minimum time between two moves
    pub move_cooldown: f64,
    candies_eaten: u32,
    /// Heading used by the directional-bias strategy
    pub preferred_direction: Direction,
}

impl Agent for Child {
    fn body(&self) -> &AgentBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut AgentBody {
        &mut self.body
    }
}

impl Child {
    /// Create a free child at `position`
    ///
    /// Draws the preferred direction, the strategic-timing cooldown and the
    /// first unpredictable switch time from `rng`.
    pub fn new<R: Rng + ?Sized>(
        id: ChildId,
        position: Position,
        kind: StrategyKind,
        timing: &TimingConfig,
        rng: &mut R,
        now: SimTime,
    ) -> Self {
        let preferred_direction = *Direction::ALL.choose(rng).unwrap_or(&Direction::Down);

        let move_cooldown = if kind == StrategyKind::StrategicTiming {
            draw(rng, timing.strategic_timing_min, timing.strategic_timing_max)
        } else {
            timing.child_move_cooldown
        };

        let strategy = if kind == StrategyKind::Unpredictable {
            Strategy::Unpredictable {
                active: StrategyKind::RandomWalk,
                next_switch: now
                    + draw(rng, timing.strategy_switch_min, timing.strategy_switch_max),
            }
        } else {
            Strategy::Simple(kind)
        };

        Self {
            id,
            body: AgentBody::new(position),
            strategy,
            state: AgentState::Free,
            cooldown_until: now,
            last_move_time: now,
            move_cooldown,
            candies_eaten: 0,
            preferred_direction,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == AgentState::Free
    }

    pub fn candies_eaten(&self) -> u32 {
        self.candies_eaten
    }

    /// Free, out of cooldown, and far enough from the last move
    pub fn can_move(&self, now: SimTime) -> bool {
        self.state == AgentState::Free
            && now >= self.cooldown_until
            && now - self.last_move_time >= self.move_cooldown
    }

    pub fn set_cooldown(&mut self, duration: f64, now: SimTime) {
        self.cooldown_until = now + duration;
    }

    /// Orthogonal neighbors that are in bounds and free of agents
    pub fn valid_moves(&self, world: &WorldView<'_>) -> Vec<Position> {
        self.position()
            .neighbors()
            .into_iter()
            .filter(|p| world.is_vacant(*p))
            .collect()
    }

    /// Decide where to go this tick, or None to stay
    ///
    /// Advances the unpredictable switch timer and redraws the strategic
    /// timing cooldown, so the child is mutated even though the move itself
    /// is applied by the world.
    pub fn choose_move<R: Rng + ?Sized>(
        &mut self,
        world: &WorldView<'_>,
        rng: &mut R,
        now: SimTime,
    ) -> Option<Position> {
        if !self.can_move(now) {
            return None;
        }

        let moves = self.valid_moves(world);
        if moves.is_empty() {
            return None;
        }

        let timing = &world.config().timing;
        let kind = self.refresh_strategy(timing, rng, now);
        let ctx = MoveContext {
            id: self.id,
            position: self.position(),
            previous_position: self.previous_position(),
            preferred_direction: self.preferred_direction,
        };
        let choice = select_move(kind, &ctx, &moves, world, rng);

        if choice.is_some() && kind == StrategyKind::StrategicTiming {
            self.move_cooldown =
                draw(rng, timing.strategic_timing_min, timing.strategic_timing_max);
        }
        choice
    }

    /// Re-sample an unpredictable child's sub-strategy when its timer expires
    ///
    /// Returns the kind that selects this tick's move.
    fn refresh_strategy<R: Rng + ?Sized>(
        &mut self,
        timing: &TimingConfig,
        rng: &mut R,
        now: SimTime,
    ) -> StrategyKind {
        let Strategy::Unpredictable { active, next_switch } = self.strategy else {
            return self.strategy.active_kind();
        };
        if now < next_switch {
            return active;
        }

        // Any concrete kind, the current one included
        let next = StrategyKind::CONCRETE.choose(rng).copied().unwrap_or(active);

        self.strategy = Strategy::Unpredictable {
            active: next,
            next_switch: now + draw(rng, timing.strategy_switch_min, timing.strategy_switch_max),
        };
        self.move_cooldown = if next == StrategyKind::StrategicTiming {
            draw(rng, timing.strategic_timing_min, timing.strategic_timing_max)
        } else {
            timing.child_move_cooldown
        };
        next
    }

    pub(crate) fn record_move(&mut self, now: SimTime) {
        self.last_move_time = now;
    }

    pub(crate) fn eat_candy(&mut self) {
        self.candies_eaten += 1;
    }

    pub(crate) fn capture(&mut self, cooldown: f64, now: SimTime) {
        self.state = AgentState::Captured;
        self.set_cooldown(cooldown, now);
    }

    pub(crate) fn release(&mut self, cooldown: f64, now: SimTime) {
        self.state = AgentState::Free;
        self.set_cooldown(cooldown, now);
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if min >= max {
        min
    } else {
        rng.gen_range(min..max)
    }
}
