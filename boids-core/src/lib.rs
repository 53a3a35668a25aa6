//! Core spatial types for the boids simulation.
//!
//! The main piece is [`QuadTree`], a region quadtree that stores agent handles
//! (never the agents themselves) and answers approximate neighbourhood queries.

use serde::{Deserialize, Serialize};

pub mod quadtree;
pub mod rect;

pub use quadtree::{Entry, QuadTree};
pub use rect::{Quadrant, Rect};

/// Stable handle of an agent inside the flock's agent arena.
///
/// The index survives tree rebuilds: the same agent keeps the same id for the
/// whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Position of the agent in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena positions are bounded by the configured agent count, which is
/// validated to fit a `u32`.
impl From<usize> for AgentId {
    fn from(index: usize) -> Self {
        debug_assert!(u32::try_from(index).is_ok(), "agent index {index} exceeds u32");
        AgentId(index as u32)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
