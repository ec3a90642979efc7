//! Grid storage and pathfinding

pub mod grid;
pub mod pathfinding;

pub use grid::Grid;
