//! Off-thread compression for the save codec.
//!
//! Compression and decompression of a full save can take long enough to drop
//! frames, so both run on Bevy's `AsyncComputeTaskPool`. The returned
//! [`Task`]s are futures; await them from the save task or poll them from a
//! system. On WASM the pool has no extra threads and the work runs on the
//! main thread when polled.

use bevy::tasks::{AsyncComputeTaskPool, Task, TaskPool};

use crate::file_header::{unwrap_envelope, wrap_compressed};
use crate::save_error::SaveError;

fn pool() -> &'static AsyncComputeTaskPool {
    AsyncComputeTaskPool::get_or_init(TaskPool::default)
}

/// Compress serialized save bytes into an envelope on the compute pool.
pub fn compress(bytes: Vec<u8>) -> Task<Vec<u8>> {
    pool().spawn(async move { wrap_compressed(&bytes) })
}

/// Validate and decompress an envelope on the compute pool.
pub fn decompress(bytes: Vec<u8>) -> Task<Result<Vec<u8>, SaveError>> {
    pool().spawn(async move { unwrap_envelope(&bytes) })
}
