//! Layered cell contents of the classroom grid

use serde::{Deserialize, Serialize};

use crate::core::types::{CellKind, ChildId, TeacherId};

/// Agent standing on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Child(ChildId),
    Teacher(TeacherId),
}

/// One grid cell
///
/// Safe flag, candy and occupant are independent layers. A candy can sit
/// under a teacher or an escorted child; only a free child picks it up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub safe: bool,
    pub candy: bool,
    pub occupant: Option<Occupant>,
}

impl Cell {
    /// What a renderer shows: agents over candy over the safe-zone floor
    pub fn kind(&self) -> CellKind {
        match self.occupant {
            Some(Occupant::Teacher(_)) => CellKind::Teacher,
            Some(Occupant::Child(_)) => CellKind::Child,
            None if self.candy => CellKind::Candy,
            None if self.safe => CellKind::SafeZone,
            None => CellKind::Empty,
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.occupant.is_none()
    }
}
