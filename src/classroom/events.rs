//! Tick events and the run log

use serde::{Deserialize, Serialize};

use crate::core::types::{ChildId, Position, SimTime, StrategyKind, TeacherId};

/// Something that happened during a tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    // Movement
    TeacherMoved { teacher: TeacherId, from: Position, to: Position },
    ChildMoved { child: ChildId, from: Position, to: Position },
    ChildEscorted { child: ChildId, teacher: TeacherId, to: Position },

    // Capture cycle
    ChildCaptured { child: ChildId, teacher: TeacherId, at: Position },
    ChildDelivered { child: ChildId, teacher: TeacherId, at: Position },

    // Candy
    CandyCollected { child: ChildId, at: Position },
    CandySpawned { at: Position },

    StrategySwitched { child: ChildId, from: StrategyKind, to: StrategyKind },
}

impl TickEvent {
    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            TickEvent::TeacherMoved { .. }
                | TickEvent::ChildMoved { .. }
                | TickEvent::ChildEscorted { .. }
        )
    }
}

/// A tick event stamped with when it happened
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub tick: u64,
    pub time: SimTime,
    pub event: TickEvent,
}

/// Everything that happened over a run, movement excluded by default
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<LoggedEvent>,
    pub keep_movement: bool,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that also keeps every step of every agent
    pub fn with_movement() -> Self {
        Self {
            events: Vec::new(),
            keep_movement: true,
        }
    }

    pub fn record(
        &mut self,
        tick: u64,
        time: SimTime,
        events: impl IntoIterator<Item = TickEvent>,
    ) {
        for event in events {
            if event.is_movement() && !self.keep_movement {
                continue;
            }
            self.events.push(LoggedEvent { tick, time, event });
        }
    }

    pub fn captures(&self) -> usize {
        self.count(|e| matches!(e, TickEvent::ChildCaptured { .. }))
    }

    pub fn deliveries(&self) -> usize {
        self.count(|e| matches!(e, TickEvent::ChildDelivered { .. }))
    }

    pub fn candies_collected(&self) -> usize {
        self.count(|e| matches!(e, TickEvent::CandyCollected { .. }))
    }

    pub fn candies_spawned(&self) -> usize {
        self.count(|e| matches!(e, TickEvent::CandySpawned { .. }))
    }

    pub fn events_for_child(&self, child: ChildId) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter().filter(move |e| match e.event {
            TickEvent::ChildMoved { child: c, .. }
            | TickEvent::ChildEscorted { child: c, .. }
            | TickEvent::ChildCaptured { child: c, .. }
            | TickEvent::ChildDelivered { child: c, .. }
            | TickEvent::CandyCollected { child: c, .. }
            | TickEvent::StrategySwitched { child: c, .. } => c == child,
            TickEvent::TeacherMoved { .. } | TickEvent::CandySpawned { .. } => false,
        })
    }

    fn count(&self, pred: impl Fn(&TickEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.event)).count()
    }
}
