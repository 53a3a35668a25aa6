//! Turns frame snapshots into self-delimiting byte records.

use boids_simulation::FrameSnapshot;

use crate::TransportError;

/// Serializes a frame into one complete record, framing included, so senders
/// can write records back to back.
pub trait Serializer: Send + Sync {
    fn serialize(&self, frame: &FrameSnapshot) -> Result<Vec<u8>, TransportError>;
}

/// One JSON object per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, frame: &FrameSnapshot) -> Result<Vec<u8>, TransportError> {
        let mut data = serde_json::to_vec(frame)?;
        data.push(b'\n');
        Ok(data)
    }
}

/// bincode payload prefixed with its length as a little-endian `u32`:
///
/// - 4 bytes: payload length
/// - payload: `bincode` encoding of the [`FrameSnapshot`]
#[derive(Debug, Default, Clone, Copy)]
pub struct BinarySerializer;

impl BinarySerializer {
    /// Splits one record off the front of `data`, returning the decoded frame
    /// and the remaining bytes. `None` if `data` does not hold a whole record.
    pub fn decode(data: &[u8]) -> Option<Result<(FrameSnapshot, &[u8]), TransportError>> {
        let header: [u8; 4] = data.get(..4)?.try_into().ok()?;
        let len = u32::from_le_bytes(header) as usize;
        let payload = data.get(4..4 + len)?;
        Some(
            bincode::deserialize(payload)
                .map(|frame| (frame, &data[4 + len..]))
                .map_err(TransportError::from),
        )
    }
}

impl Serializer for BinarySerializer {
    fn serialize(&self, frame: &FrameSnapshot) -> Result<Vec<u8>, TransportError> {
        let payload = bincode::serialize(frame)?;
        let len = u32::try_from(payload.len()).map_err(|_| TransportError::FrameTooLarge(payload.len()))?;

        let mut data = Vec::with_capacity(4 + payload.len());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&payload);
        Ok(data)
    }
}
