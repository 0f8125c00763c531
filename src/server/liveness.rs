use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Liveness probe file. Created before the server starts taking traffic and
/// removed when the marker is dropped.
#[derive(Debug)]
pub struct LivenessMarker {
    path: PathBuf,
}

impl LivenessMarker {
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        File::create(&path)?;
        tracing::info!("liveness marker created at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LivenessMarker {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::info!("liveness marker removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove liveness marker {}: {}", self.path.display(), e),
        }
    }
}
