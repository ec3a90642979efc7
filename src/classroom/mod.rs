//! Classroom - the grid world and its tick
//!
//! Owns the grid, every agent, the escort links between teachers and captured
//! children, and the seeded random source. `tick(now)` runs one step.

pub mod cell;
pub mod events;
pub mod placement;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use cell::{Cell, Occupant};
pub use events::{EventLog, LoggedEvent, TickEvent};
pub use snapshot::{ChildSnapshot, ClassroomSnapshot, TeacherSnapshot};
pub use world::{Classroom, WorldView};
