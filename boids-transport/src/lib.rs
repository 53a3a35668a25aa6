//! Serialization and delivery of per-tick flock snapshots.

mod sender;
mod serializer;

use boids_config::{SenderConfig, SerializerConfig, TransportConfig};
use boids_simulation::FrameSnapshot;
use thiserror::Error;

// Re-export types
pub use self::sender::{FileSender, NullSender, Sender, StdioSender};
pub use self::serializer::{BinarySerializer, JsonSerializer, Serializer};

/// Error types that can occur while serializing or sending frames.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("Frame of {0} bytes does not fit a u32 length prefix")]
    FrameTooLarge(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Controller for handling serialization and transport of simulation data
pub struct TransportController {
    serializer: Box<dyn Serializer>,
    sender: Box<dyn Sender>,
    output_frequency: u64,
    frames_sent: u64,
}

impl TransportController {
    /// Create a new transport controller with the provided serializer and sender
    pub fn new(serializer: Box<dyn Serializer>, sender: Box<dyn Sender>, output_frequency: u32) -> Self {
        Self {
            serializer,
            sender,
            output_frequency: u64::from(output_frequency.max(1)),
            frames_sent: 0,
        }
    }

    /// Create a transport controller from configuration
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let serializer: Box<dyn Serializer> = match config.serializer {
            SerializerConfig::Json => Box::new(JsonSerializer),
            SerializerConfig::Binary => Box::new(BinarySerializer),
        };

        let sender: Box<dyn Sender> = match &config.sender {
            SenderConfig::Stdio => Box::new(StdioSender::new()),
            SenderConfig::File(options) => Box::new(FileSender::new(&options.output_path)?),
            SenderConfig::Null => Box::new(NullSender::default()),
        };

        Ok(Self::new(serializer, sender, config.output_frequency))
    }

    /// Serialize and send the frame if its tick is due under the output frequency.
    ///
    /// Returns whether the frame was sent.
    pub fn publish(&mut self, frame: &FrameSnapshot) -> Result<bool, TransportError> {
        if frame.tick % self.output_frequency != 0 {
            return Ok(false);
        }

        let data = self.serializer.serialize(frame)?;
        self.sender.send(&data)?;
        self.frames_sent += 1;
        Ok(true)
    }

    /// Flush the sender to ensure data is written
    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.sender.flush()
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}
