//! Agents - children, teachers and the child strategies

pub mod agent;
pub mod child;
pub mod strategy;
pub mod teacher;

pub use agent::{Agent, AgentBody};
pub use child::Child;
pub use strategy::Strategy;
pub use teacher::Teacher;
