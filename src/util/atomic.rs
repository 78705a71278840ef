//! Atomic file writing via tempfile + rename.
//!
//! Session saves and on-disk edits go through [`atomic_write`] so an
//! interrupted write never leaves a half-written source file behind.

use std::io::Write;
use std::path::Path;

use crate::error::{SurgeonError, SurgeonResult};

/// Atomically write `content` to `path`, creating missing parent directories.
///
/// The temporary file lives next to the target so the final rename stays on
/// one filesystem.
pub fn atomic_write(path: &Path, content: &str) -> SurgeonResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent).map_err(|e| SurgeonError::io(parent, e))?;

    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| SurgeonError::io(parent, e))?;
    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.flush())
        .map_err(|e| SurgeonError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| SurgeonError::io(path, e.error))?;

    Ok(())
}
