//! Output writer: persist transformed text at the mirrored path.
//!
//! ## Write protocol
//!
//! 1. Validate the repository path (relative, no `..`).
//! 2. Create parent directories under the output root.
//! 3. Write to `<path>.mirrorsync.tmp`.
//! 4. Rename to the final path (atomic on POSIX); remove the temp file if
//!    the rename fails.

use std::path::{Component, Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Outcome of an individual output write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Map a repository path onto `output_dir`.
///
/// Rejects empty, absolute, and `..`-containing paths so a listing can never
/// direct a write outside the mirror root.
pub fn output_path(output_dir: &Path, repo_path: &str) -> Result<PathBuf, SyncError> {
    let unsafe_path = || SyncError::UnsafePath {
        path: repo_path.to_string(),
    };
    let relative = Path::new(repo_path);
    if repo_path.is_empty() || repo_path.contains('\\') {
        return Err(unsafe_path());
    }
    let mut out = output_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path())
            }
        }
    }
    if out == output_dir {
        return Err(unsafe_path());
    }
    Ok(out)
}

/// Write `content` verbatim to the mirror of `repo_path`.
pub fn write_output(
    output_dir: &Path,
    repo_path: &str,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let path = output_path(output_dir, repo_path)?;
    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite { path });
    }

    let tmp = PathBuf::from(format!("{}.mirrorsync.tmp", path.display()));
    atomic_write_with_tmp(&path, content, &tmp)?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written { path })
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
