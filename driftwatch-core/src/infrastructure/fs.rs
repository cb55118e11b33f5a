// driftwatch-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The target is either fully written or not written at all. An existing
/// file is replaced.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let mut temp_file = staged(path, content.as_ref())?;
    temp_file.flush()?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}

/// Same as [`atomic_write`], but refuses to replace an existing file.
///
/// Fails with `ErrorKind::AlreadyExists` wrapped in `InfrastructureError::Io`
/// when `path` is taken.
pub fn write_new<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    if path.exists() {
        return Err(InfrastructureError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("'{}' already exists", path.display()),
        )));
    }
    let temp_file = staged(path, content.as_ref())?;
    temp_file
        .persist_noclobber(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}

// Temp file in the target directory so the final rename stays on one filesystem.
fn staged(path: &Path, content: &[u8]) -> Result<tempfile::NamedTempFile, InfrastructureError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content)?;
    Ok(temp_file)
}
