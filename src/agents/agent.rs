//! Position bookkeeping shared by children and teachers

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

/// Where an agent is and where it was before its last move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBody {
    pub position: Position,
    pub previous_position: Position,
}

impl AgentBody {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            previous_position: position,
        }
    }
}

/// Anything that occupies a cell on the classroom grid
///
/// The world moves agents through this trait once it has checked that a
/// destination is legal; agents decide their moves elsewhere.
pub trait Agent {
    fn body(&self) -> &AgentBody;

    fn body_mut(&mut self) -> &mut AgentBody;

    fn position(&self) -> Position {
        self.body().position
    }

    fn previous_position(&self) -> Position {
        self.body().previous_position
    }

    /// Unconditional move; the caller has already validated the destination
    fn move_to(&mut self, new_position: Position) {
        let body = self.body_mut();
        body.previous_position = body.position;
        body.position = new_position;
    }
}
