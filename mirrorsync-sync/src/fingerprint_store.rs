//! Fingerprint store: the persisted path → fingerprint document.
//!
//! The document is a flat, pretty-printed JSON object:
//!
//! ```json
//! {
//!   "docs/a.md": "3b18e512dba79e4c8300dd08aeb37f8e728b8dad",
//!   "docs/b.md": "5716ca5987cbf97d6bb54920bea6adde242d87e6"
//! }
//! ```
//!
//! Writes go to `<path>.tmp` in the same directory and are renamed over the
//! target, so a crash mid-write leaves the previous document intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mirrorsync_core::FingerprintMap;

use crate::error::{io_err, SyncError};

/// Sibling temp file used by [`save_at`].
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load the store at `path`.
///
/// Returns an empty map if the document does not exist yet (first run). A
/// document that exists but does not parse is an error, never "empty".
pub fn load_at(path: &Path) -> Result<FingerprintMap, SyncError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FingerprintMap::new()),
        Err(err) => return Err(io_err(path, err)),
    };
    serde_json::from_str(&contents).map_err(|source| SyncError::StoreParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save `store` at `path` atomically.
///
/// Output is deterministic: keys are sorted and the document ends with a
/// newline, so saving an unchanged map reproduces the same bytes.
pub fn save_at(path: &Path, store: &FingerprintMap) -> Result<(), SyncError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }

    let json = serde_json::to_string_pretty(store)?;
    let tmp = tmp_path_for(path);
    std::fs::write(&tmp, format!("{json}\n")).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
