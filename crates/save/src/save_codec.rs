// ---------------------------------------------------------------------------
// save_codec – SavedGame <-> stored bytes
// ---------------------------------------------------------------------------
//
// Write path: serialize_save (JSON) -> compress_worker::compress (envelope)
// Read path:  compress_worker::decompress -> deserialize_save, and if the
//             bytes are not a valid envelope, deserialize_save on the raw
//             bytes (legacy uncompressed save).

use bevy::prelude::*;
use simulation::SavedGame;

use crate::compress_worker;
use crate::save_error::SaveError;

/// Serialize a save document to JSON bytes.
pub fn serialize_save(save: &SavedGame) -> Result<Vec<u8>, SaveError> {
    serde_json::to_vec(save).map_err(|e| SaveError::Encode(e.to_string()))
}

/// Deserialize a save document from JSON bytes.
pub fn deserialize_save(bytes: &[u8]) -> Result<SavedGame, SaveError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialize and compress a save for storage.
pub async fn compress_save(save: &SavedGame) -> Result<Vec<u8>, SaveError> {
    let json = serialize_save(save)?;
    Ok(compress_worker::compress(json).await)
}

/// Decompress and deserialize a stored envelope. No legacy fallback.
pub async fn decompress_save(bytes: Vec<u8>) -> Result<SavedGame, SaveError> {
    let json = compress_worker::decompress(bytes).await?;
    deserialize_save(&json)
}

/// Decode whatever is stored under the save key.
///
/// Tries the compressed envelope first; if that fails for any reason, reads
/// the bytes directly as a legacy plain-text save. The error from the legacy
/// attempt is returned if both fail.
pub async fn decode_stored_save(bytes: Vec<u8>) -> Result<SavedGame, SaveError> {
    match compress_worker::decompress(bytes.clone()).await {
        Ok(json) => match deserialize_save(&json) {
            Ok(save) => return Ok(save),
            Err(e) => debug!("Compressed save did not decode ({e}), trying plain text"),
        },
        Err(e) => debug!("Stored save is not a compressed envelope ({e}), trying plain text"),
    }
    let save = deserialize_save(&bytes)?;
    info!("Loaded legacy uncompressed save ({} bytes)", bytes.len());
    Ok(save)
}

#[cfg(test)]
mod tests_roundtrip;
