// ---------------------------------------------------------------------------
// file_header – compressed save envelope
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "CIVI"
//   [4..8]   Envelope format version (u32)
//   [8..12]  Flags (u32: bit 0 = payload is LZ4 compressed)
//   [12..20] Timestamp (Unix epoch seconds, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)
//
// On save: serialized JSON -> LZ4 -> prepend header (checksum of stored bytes)
// On load: check magic -> validate checksum -> strip header -> decompress
// Bytes without the magic are not an envelope; the codec then falls back to
// reading them as a legacy plain-text save.

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a compressed save envelope.
pub const MAGIC: [u8; 4] = *b"CIVI";

/// Size of the envelope header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current envelope layout version. Independent of
/// `GameOptions::version`, which tags the save document itself.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Flag bit: payload is LZ4 block-compressed.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed envelope header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

fn now_unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn wrap(payload: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags,
        timestamp: now_unix_secs(),
        uncompressed_size: uncompressed_size as u32,
        checksum: xxh32(payload, XXHASH_SEED),
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write_to(&mut out);
    out.extend_from_slice(payload);
    out
}

/// Compress `data` and wrap it in an envelope.
pub fn wrap_compressed(data: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::compress(data);
    wrap(&compressed, FLAG_COMPRESSED, data.len())
}

/// Wrap `data` in an envelope without compressing it.
pub fn wrap_uncompressed(data: &[u8]) -> Vec<u8> {
    wrap(data, 0, data.len())
}

/// Returns `true` if `bytes` start with the envelope magic.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.len() >= MAGIC.len() && bytes[..MAGIC.len()] == MAGIC
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and validate the envelope header.
///
/// # Errors
///
/// - `Decode` if the magic is missing, the header is truncated, or the
///   checksum does not match the payload
/// - `VersionMismatch` if the envelope comes from a newer build
pub fn parse_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if !has_magic(bytes) {
        return Err(SaveError::Decode(
            "not a compressed save envelope (missing CIVI magic)".to_string(),
        ));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Decode(format!(
            "save envelope is too short ({} bytes, need at least {HEADER_SIZE} for header)",
            bytes.len()
        )));
    }

    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&bytes[12..20]);
    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        flags: read_u32(bytes, 8),
        timestamp: u64::from_le_bytes(timestamp),
        uncompressed_size: read_u32(bytes, 20),
        checksum: read_u32(bytes, 24),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::Decode(format!(
            "save is corrupted: checksum mismatch (expected {:#010X}, got {computed:#010X})",
            header.checksum
        )));
    }

    Ok((header, payload))
}

/// Validate an envelope and return the original (decompressed) data.
pub fn unwrap_envelope(bytes: &[u8]) -> Result<Vec<u8>, SaveError> {
    let (header, payload) = parse_header(bytes)?;
    if !header.is_compressed() {
        return Ok(payload.to_vec());
    }
    let data = lz4_flex::decompress(payload, header.uncompressed_size as usize)?;
    if data.len() != header.uncompressed_size as usize {
        return Err(SaveError::Decode(format!(
            "decompressed size {} does not match header size {}",
            data.len(),
            header.uncompressed_size
        )));
    }
    Ok(data)
}
