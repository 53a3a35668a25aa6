pub mod agent;     // Boid state and the alignment update rule
pub mod flock;     // Agent arena, quadtree rebuild and the tick driver
pub mod snapshot;  // Serializable per-tick view for the outer shell

pub use agent::{Agent, UpdateRules};
pub use flock::Flock;
pub use snapshot::{AgentSnapshot, FrameSnapshot};

// Re-export commonly used items
pub mod prelude {
    pub use crate::{Agent, AgentSnapshot, Flock, FrameSnapshot, UpdateRules};
    pub use boids_config::{ConfigError, SimulationConfig};
    pub use boids_core::{AgentId, QuadTree, Rect};
}
