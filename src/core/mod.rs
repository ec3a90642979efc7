pub mod config;
pub mod error;
pub mod types;

pub use config::ClassroomConfig;
pub use error::{ClassroomError, Result};
pub use types::{
    AgentState, CellKind, ChildId, Direction, Position, SimTime, StrategyKind, TeacherId, Zone,
};
