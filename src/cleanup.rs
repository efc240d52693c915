use std::fs;
use std::path::PathBuf;

/// Deletes the listed artifacts when dropped, unless [`ArtifactGuard::disarm`]
/// was called first. Covers `?` returns and panics alike.
#[must_use = "artifacts are removed as soon as the guard is dropped"]
pub struct ArtifactGuard {
    artifacts: Vec<PathBuf>,
    armed: bool,
}

impl ArtifactGuard {
    pub fn new(artifacts: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            artifacts: artifacts.into_iter().collect(),
            armed: true,
        }
    }

    /// Keep the artifacts: the run succeeded.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for path in &self.artifacts {
            if !path.exists() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => eprintln!("Removed partial artifact: {}", path.display()),
                Err(e) => eprintln!("Warning: failed to remove {}: {e}", path.display()),
            }
        }
    }
}
