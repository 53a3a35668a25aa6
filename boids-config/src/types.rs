use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Target frames (ticks) per second for the paced runner.
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    pub simulation: SimulationConfig,
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framerate: default_framerate(),
            simulation: SimulationConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// Everything the flock needs at construction time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldSettings,
    pub flock: FlockSettings,
    pub spatial_index: SpatialIndexSettings,
}

/// World extent; also the wraparound bounds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorldSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlockSettings {
    #[serde(default = "default_agent_count")]
    pub agent_count: usize,
    /// Distance between neighbouring agents of the initial grid.
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: f64,
    #[serde(default = "default_agent_radius")]
    pub agent_radius: f64,
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f64,
    /// Agents closer than this (strictly) influence each other's heading.
    #[serde(default = "default_neighbor_distance")]
    pub neighbor_distance: f64,
    /// Fraction of the heading difference applied per neighbour (0.5 = halfway).
    #[serde(default = "default_alignment_factor")]
    pub alignment_factor: f64,
    /// Heading noise per tick, drawn uniformly from `-n..=n` whole degrees.
    #[serde(default = "default_heading_jitter_degrees")]
    pub heading_jitter_degrees: u32,
    /// Fixed RNG seed. When absent the runner picks one and logs it.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fan the per-agent update phase out over rayon's thread pool.
    #[serde(default)]
    pub parallel: bool,
}

// Default values for the flock
fn default_framerate() -> u32 { 60 }
fn default_agent_count() -> usize { 66 }
fn default_grid_spacing() -> f64 { 120.0 }
fn default_agent_radius() -> f64 { 1.0 }
fn default_initial_speed() -> f64 { 1.0 }
fn default_neighbor_distance() -> f64 { 10.0 }
fn default_alignment_factor() -> f64 { 0.5 }
fn default_heading_jitter_degrees() -> u32 { 2 }

impl Default for FlockSettings {
    fn default() -> Self {
        Self {
            agent_count: default_agent_count(),
            grid_spacing: default_grid_spacing(),
            agent_radius: default_agent_radius(),
            initial_speed: default_initial_speed(),
            neighbor_distance: default_neighbor_distance(),
            alignment_factor: default_alignment_factor(),
            heading_jitter_degrees: default_heading_jitter_degrees(),
            seed: None,
            parallel: false,
        }
    }
}

/// Quadtree tuning.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpatialIndexSettings {
    /// Entries a leaf holds before it splits (`MAX_OBJECTS`).
    pub capacity: usize,
    /// Deepest level a node may split to (`MAX_LEVELS`).
    pub max_depth: u32,
}

impl Default for SpatialIndexSettings {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_depth: 5,
        }
    }
}

/// Transport-specific configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Emit a snapshot every N ticks.
    pub output_frequency: u32,
    pub serializer: SerializerConfig,
    pub sender: SenderConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            output_frequency: 1,
            serializer: SerializerConfig::Json,
            sender: SenderConfig::Stdio,
        }
    }
}

// --- Serializer Configuration ---

/// Enum defining the serializer type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "serializer_type", content = "options")]
pub enum SerializerConfig {
    Json,
    Binary,
}

// --- Sender Configuration ---

/// Configuration specific to the File sender
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileSenderConfig {
    pub output_path: PathBuf,
}

/// Enum defining the sender type and its specific configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "sender_type", content = "options")] // Nest options
pub enum SenderConfig {
    Stdio,
    File(FileSenderConfig),
    Null,
}
