use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Bytes fully written to a temporary sibling of their destination, not yet
/// visible there. Dropping it discards the temporary file.
pub struct Staged {
    file: NamedTempFile,
    path: PathBuf,
    len: usize,
}

impl Staged {
    /// Renames the staged file over its destination.
    pub fn commit(self) -> std::io::Result<()> {
        self.file.persist(&self.path).map_err(|e| e.error)?;
        debug!("Wrote {} bytes to {}", self.len, self.path.display());
        Ok(())
    }
}

/// Writes `bytes` next to `path` without touching `path` itself. Missing
/// parent directories are created.
pub fn stage(path: &Path, bytes: &[u8]) -> std::io::Result<Staged> {

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = tempfile::Builder::new()
        .prefix(".webpage2pdf-")
        .tempfile_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;

    Ok(Staged { file, path: path.to_path_buf(), len: bytes.len() })
}

/// Writes `bytes` to `path` through a temporary sibling file that is renamed
/// into place, so a failed write never leaves a truncated document behind.
/// An existing file is replaced.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    stage(path, bytes)?.commit()
}
