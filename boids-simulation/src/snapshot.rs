use serde::{Deserialize, Serialize};

/// Drawable state of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub radius: f64,
}

/// Read-only view of the whole flock after a tick, handed to the outer shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub agents: Vec<AgentSnapshot>,
}
