//! Tick - the five-phase world update

use rand::seq::SliceRandom;
use tracing::{debug, trace, warn};

use crate::agents::Agent;
use crate::classroom::events::TickEvent;
use crate::classroom::world::{Classroom, WorldView};
use crate::core::types::{ChildId, Position, SimTime, TeacherId};

impl Classroom {
    /// Advance the classroom to `now`
    ///
    /// Phases run in a fixed order: teachers (escorting teachers drag their
    /// child along), captures, children, deliveries, candy spawn. A child
    /// captured this tick therefore never collects candy this tick.
    pub fn tick(&mut self, now: SimTime) -> Vec<TickEvent> {
        if now < self.time {
            warn!(now, last = self.time, "Clock went backwards");
        }

        let mut events = Vec::new();

        self.teacher_phase(&mut events);
        self.capture_phase(now, &mut events);
        self.child_phase(now, &mut events);
        self.delivery_phase(now, &mut events);
        if let Some(at) = self.spawn_candy(now) {
            events.push(TickEvent::CandySpawned { at });
        }

        self.time = now;
        self.tick_count += 1;

        for event in &events {
            if event.is_movement() {
                trace!(tick = self.tick_count, ?event);
            } else {
                debug!(tick = self.tick_count, ?event);
            }
        }
        events
    }

    /// Tick `dt` seconds after the previous tick
    pub fn advance(&mut self, dt: f64) -> Vec<TickEvent> {
        self.tick(self.time + dt)
    }

    /// Place a candy on a random eligible cell if the spawn interval elapsed
    ///
    /// Eligible cells lie outside the safe zone and hold neither an agent nor
    /// a candy. Nothing happens when the cap is reached or no cell qualifies.
    pub fn spawn_candy(&mut self, now: SimTime) -> Option<Position> {
        let timing = &self.config.timing;
        if now - self.last_candy_spawn < timing.candy_spawn_interval {
            return None;
        }
        if timing.max_candies.is_some_and(|max| self.candy_count >= max) {
            return None;
        }

        let eligible: Vec<Position> = self
            .cells
            .iter()
            .filter(|(_, cell)| !cell.safe && !cell.candy && cell.is_vacant())
            .map(|(pos, _)| pos)
            .collect();
        let at = *eligible.choose(&mut self.rng)?;

        if let Some(cell) = self.cells.get_mut(at) {
            cell.candy = true;
        }
        self.candy_count += 1;
        self.last_candy_spawn = now;
        Some(at)
    }

    // === PHASES ===

    fn teacher_phase(&mut self, events: &mut Vec<TickEvent>) {
        for index in 0..self.teachers.len() {
            let id = TeacherId(index);
            let Some(to) = self.teachers[index].choose_move(&self.view()) else {
                continue;
            };
            let from = self.teachers[index].position();
            if !self.is_legal_step(from, to) {
                continue;
            }

            self.move_teacher(id, to);
            events.push(TickEvent::TeacherMoved { teacher: id, from, to });

            if let Some(child) = self.escort_of(id) {
                self.escort_follow(child, id, from, events);
            }
        }
    }

    /// Move an escorted child one step behind its teacher
    ///
    /// A free safe cell next to the child wins; otherwise the child takes the
    /// cell the teacher just left.
    fn escort_follow(
        &mut self,
        child: ChildId,
        teacher: TeacherId,
        vacated: Position,
        events: &mut Vec<TickEvent>,
    ) {
        let here = self.children[child.0].position();
        let into_safety = here
            .neighbors()
            .into_iter()
            .find(|p| self.is_position_safe_zone(*p) && self.is_vacant(*p));

        let to = match into_safety {
            Some(p) => p,
            None if self.is_legal_step(here, vacated) => vacated,
            None => return,
        };

        self.move_child(child, to);
        events.push(TickEvent::ChildEscorted { child, teacher, to });
    }

    fn capture_phase(&mut self, now: SimTime, events: &mut Vec<TickEvent>) {
        let cooldown = self.config.timing.recharge_cooldown;

        for index in 0..self.children.len() {
            let child = &self.children[index];
            let at = child.position();
            if !child.is_free() || self.is_position_safe_zone(at) {
                continue;
            }

            let captor = self
                .teachers
                .iter()
                .find(|t| !self.escorts.contains_key(&t.id) && t.is_adjacent_to(at))
                .map(|t| t.id);
            let Some(teacher) = captor else {
                continue;
            };

            let id = ChildId(index);
            self.children[index].capture(cooldown, now);
            self.teachers[teacher.0].record_capture();
            self.escorts.insert(teacher, id);
            events.push(TickEvent::ChildCaptured { child: id, teacher, at });
        }
    }

    fn child_phase(&mut self, now: SimTime, events: &mut Vec<TickEvent>) {
        for index in 0..self.children.len() {
            if !self.children[index].can_move(now) {
                continue;
            }

            let id = ChildId(index);
            let mut child = self.children[index].clone();
            let before = child.strategy.active_kind();
            let choice = {
                let view = WorldView::new(
                    &self.config,
                    &self.cells,
                    self.safe_zone,
                    &self.children,
                    &self.teachers,
                    &self.escorts,
                );
                child.choose_move(&view, &mut self.rng, now)
            };
            let after = child.strategy.active_kind();
            self.children[index] = child;

            if before != after {
                events.push(TickEvent::StrategySwitched {
                    child: id,
                    from: before,
                    to: after,
                });
            }

            let Some(to) = choice else {
                continue;
            };
            let from = self.children[index].position();
            if !self.is_legal_step(from, to) {
                continue;
            }

            self.move_child(id, to);
            self.children[index].record_move(now);
            events.push(TickEvent::ChildMoved { child: id, from, to });

            if self.take_candy(to) {
                self.children[index].eat_candy();
                events.push(TickEvent::CandyCollected { child: id, at: to });
            }
        }
    }

    fn delivery_phase(&mut self, now: SimTime, events: &mut Vec<TickEvent>) {
        let cooldown = self.config.timing.recharge_cooldown;

        let mut delivered: Vec<(ChildId, TeacherId)> = self
            .escorts
            .iter()
            .filter(|(_, child)| self.is_position_safe_zone(self.children[child.0].position()))
            .map(|(teacher, child)| (*child, *teacher))
            .collect();
        delivered.sort();

        for (child, teacher) in delivered {
            self.escorts.remove(&teacher);
            self.children[child.0].release(cooldown, now);
            let at = self.children[child.0].position();
            events.push(TickEvent::ChildDelivered { child, teacher, at });
        }
    }
}
