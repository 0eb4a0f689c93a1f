//! Atomic file write using the write-rename pattern.
//!
//! Data goes to `{path}.tmp`, is flushed with `sync_all()`, then the temp file
//! is renamed over the final path. A crash mid-write leaves the previous save
//! intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path of the temporary file used while writing `path`.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Atomically writes `data` to `path`, creating parent directories.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = tmp_path_for(path);
    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)
}
