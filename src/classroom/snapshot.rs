//! Serializable snapshots of the classroom for renderers and reports

use serde::{Deserialize, Serialize};

use crate::agents::{Agent, Child, Teacher};
use crate::classroom::world::Classroom;
use crate::core::error::Result;
use crate::core::types::{
    AgentState, CellKind, ChildId, Position, SimTime, StrategyKind, TeacherId, Zone,
};

/// Complete state of the classroom after a tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassroomSnapshot {
    pub tick: u64,
    pub time: SimTime,
    pub width: usize,
    pub height: usize,
    pub safe_zone: Zone,
    /// Row-major cell kinds
    pub cells: Vec<CellKind>,
    pub children: Vec<ChildSnapshot>,
    pub teachers: Vec<TeacherSnapshot>,
    pub candies: Vec<Position>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildSnapshot {
    pub id: ChildId,
    pub position: Position,
    pub strategy: StrategyKind,
    pub active_strategy: StrategyKind,
    pub state: AgentState,
    pub candies_eaten: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeacherSnapshot {
    pub id: TeacherId,
    pub position: Position,
    pub zone: Zone,
    pub captures: u32,
    pub escorting: Option<ChildId>,
}

impl ChildSnapshot {
    fn of(child: &Child) -> Self {
        Self {
            id: child.id,
            position: child.position(),
            strategy: child.strategy.kind(),
            active_strategy: child.strategy.active_kind(),
            state: child.state(),
            candies_eaten: child.candies_eaten(),
        }
    }
}

impl TeacherSnapshot {
    fn of(teacher: &Teacher, escorting: Option<ChildId>) -> Self {
        Self {
            id: teacher.id,
            position: teacher.position(),
            zone: teacher.zone(),
            captures: teacher.captures(),
            escorting,
        }
    }
}

impl ClassroomSnapshot {
    pub fn cell_at(&self, pos: Position) -> Option<CellKind> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return None;
        }
        self.cells.get(pos.y as usize * self.width + pos.x as usize).copied()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One line per grid row using the cell symbols
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter().map(CellKind::symbol));
            out.push('\n');
        }
        out
    }

    pub fn summary(&self) -> String {
        let captured = self.children.iter().filter(|c| c.state == AgentState::Captured).count();
        let eaten: u32 = self.children.iter().map(|c| c.candies_eaten).sum();
        let captures: u32 = self.teachers.iter().map(|t| t.captures).sum();
        format!(
            "Tick {} (t = {:.1}s)\n{} children ({} captured), {} teachers\n\
             {} candies on the floor, {} eaten, {} captures",
            self.tick,
            self.time,
            self.children.len(),
            captured,
            self.teachers.len(),
            self.candies.len(),
            eaten,
            captures,
        )
    }
}

impl Classroom {
    pub fn snapshot(&self) -> ClassroomSnapshot {
        ClassroomSnapshot {
            tick: self.tick_count,
            time: self.time,
            width: self.width(),
            height: self.height(),
            safe_zone: self.safe_zone,
            cells: self.cells.iter().map(|(_, cell)| cell.kind()).collect(),
            children: self.children.iter().map(ChildSnapshot::of).collect(),
            teachers: self
                .teachers
                .iter()
                .map(|t| TeacherSnapshot::of(t, self.escort_of(t.id)))
                .collect(),
            candies: self.candies(),
        }
    }

    pub fn render_ascii(&self) -> String {
        self.snapshot().render_ascii()
    }
}
