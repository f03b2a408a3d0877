use serde::Serialize;
use serde::de::DeserializeOwned;

/// Maximum encoded snapshot size in bytes.
pub const MAX_SNAPSHOT_SIZE: usize = 256 * 1024;

/// Wire format for snapshots broadcast by a match session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Json,
    Msgpack,
}

#[derive(Debug)]
pub enum CodecError {
    Empty,
    PayloadTooLarge(usize),
    Serialize(String),
    Deserialize(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_SNAPSHOT_SIZE})"
                )
            },
            Self::Serialize(e) => write!(f, "serialize error: {e}"),
            Self::Deserialize(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {}

fn check_size(buf: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    if buf.len() > MAX_SNAPSHOT_SIZE {
        tracing::warn!(size = buf.len(), "Encoded snapshot exceeds size limit");
        return Err(CodecError::PayloadTooLarge(buf.len()));
    }
    Ok(buf)
}

/// Encode a value in the requested format.
pub fn encode<T: Serialize>(format: SnapshotFormat, value: &T) -> Result<Vec<u8>, CodecError> {
    let buf = match format {
        SnapshotFormat::Json => {
            serde_json::to_vec(value).map_err(|e| CodecError::Serialize(e.to_string()))?
        },
        // Named encoding so struct fields keep their keys like the JSON form.
        SnapshotFormat::Msgpack => rmp_serde::to_vec_named(value)
            .map_err(|e| CodecError::Serialize(e.to_string()))?,
    };
    check_size(buf)
}

/// Decode a value previously produced by [`encode`].
pub fn decode<T: DeserializeOwned>(format: SnapshotFormat, data: &[u8]) -> Result<T, CodecError> {
    if data.is_empty() {
        return Err(CodecError::Empty);
    }
    match format {
        SnapshotFormat::Json => {
            serde_json::from_slice(data).map_err(|e| CodecError::Deserialize(e.to_string()))
        },
        SnapshotFormat::Msgpack => {
            rmp_serde::from_slice(data).map_err(|e| CodecError::Deserialize(e.to_string()))
        },
    }
}
