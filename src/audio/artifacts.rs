use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Intermediate files owned by one request.
///
/// Every path is registered as soon as it is created and removed when the
/// scope is dropped, so cleanup also runs on early returns and unwinding.
/// Removal is best-effort: failures are logged at debug level only.
#[derive(Debug, Default)]
pub struct ArtifactScope {
    artifacts: Vec<PathBuf>,
}

impl ArtifactScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Remove every registered file; safe to call more than once.
    pub fn cleanup(&mut self) {
        for artifact in self.artifacts.drain(..) {
            match fs::remove_file(&artifact) {
                Ok(()) => tracing::debug!("Removed temp file {}", artifact.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Temp file {} already removed", artifact.display())
                }
                Err(e) => {
                    tracing::debug!("Failed to remove temp file {}: {}", artifact.display(), e)
                }
            }
        }
    }
}

impl Drop for ArtifactScope {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_drop_removes_registered_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        {
            let mut scope = ArtifactScope::new();
            scope.register(&a);
            scope.register(&b);
            assert_eq!(scope.len(), 2);
        }

        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_already_deleted_file_does_not_panic() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone.wav");
        fs::write(&gone, b"x").unwrap();

        let mut scope = ArtifactScope::new();
        scope.register(&gone);
        fs::remove_file(&gone).unwrap();

        scope.cleanup();
        assert!(scope.is_empty());
    }

    #[test]
    fn test_register_deduplicates() {
        let mut scope = ArtifactScope::new();
        scope.register("/tmp/same.wav");
        scope.register("/tmp/same.wav");
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_unregistered_files_survive() {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("input.wav");
        fs::write(&keep, b"keep").unwrap();

        drop(ArtifactScope::new());
        assert!(keep.exists());
    }

    #[test]
    fn test_cleanup_runs_when_unwinding() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("panic.wav");
        fs::write(&file, b"x").unwrap();
        let path = file.clone();

        let result = std::panic::catch_unwind(move || {
            let mut scope = ArtifactScope::new();
            scope.register(path);
            panic!("stage failed");
        });

        assert!(result.is_err());
        assert!(!file.exists());
    }
}
