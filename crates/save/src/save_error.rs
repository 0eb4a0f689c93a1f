// ---------------------------------------------------------------------------
// SaveError: error type for the save/load pipeline
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur inside the save/load pipeline.
///
/// Nothing here escapes the pipeline's public boundary unhandled: the
/// lifecycle manager logs these and converts them into `Option`/`bool`
/// results, except [`SaveError::SaveInProgress`] which is returned to the
/// caller of a non-forced save.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error from a storage backend (permission denied, disk full, ...).
    Io(std::io::Error),
    /// The save document could not be serialized.
    Encode(String),
    /// Stored bytes could not be decoded (bad envelope, corrupt payload,
    /// invalid JSON).
    Decode(String),
    /// The envelope was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// A non-forced save was requested while another save is in flight.
    SaveInProgress,
    /// A storage backend failed for a reason other than plain I/O.
    Storage(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save envelope is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::SaveInProgress => write!(
                f,
                "Received a save request while another one is ongoing, ignoring the new request"
            ),
            SaveError::Storage(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            SaveError::Encode(e.to_string())
        } else {
            SaveError::Decode(e.to_string())
        }
    }
}

impl From<lz4_flex::block::DecompressError> for SaveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        SaveError::Decode(format!("LZ4 decompression failed: {e}"))
    }
}
