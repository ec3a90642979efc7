//! Classroom Sim - Candy-chase grid simulation
//!
//! Children roam a classroom grid collecting candy, each following one of ten
//! movement strategies. Teachers patrol their zones, capture adjacent children
//! and escort them back to the safe zone. Every run is deterministic for a
//! given config and seed.

pub mod agents;
pub mod classroom;
pub mod core;
pub mod spatial;

pub use agents::{Agent, Child, Strategy, Teacher};
pub use classroom::{Classroom, ClassroomSnapshot, TickEvent, WorldView};
pub use core::{ClassroomConfig, ClassroomError, Result};
