//! Destinations for serialized frames.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::TransportError;

/// Sends serialized data to a destination.
pub trait Sender: Send {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Flushes any internal buffers. No-op by default.
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Sends data to standard output.
pub struct StdioSender {
    stdout: io::Stdout,
}

impl StdioSender {
    pub fn new() -> Self {
        StdioSender { stdout: io::stdout() }
    }
}

impl Default for StdioSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdioSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut out = self.stdout.lock();
        out.write_all(data)?;
        out.flush()?; // Ensure it's written immediately
        Ok(())
    }
}

/// Appends records to a file, truncating it on creation.
pub struct FileSender {
    writer: BufWriter<File>,
}

impl FileSender {
    pub fn new(path: &Path) -> Result<Self, TransportError> {
        let file = File::create(path)?;
        info!("Writing frames to {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards everything; counts what it was given.
#[derive(Debug, Default)]
pub struct NullSender {
    pub records: u64,
    pub bytes: u64,
}

impl Sender for NullSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.records += 1;
        self.bytes += data.len() as u64;
        Ok(())
    }
}
