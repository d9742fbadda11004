//! Persistence of attempt documents.

use crate::error::PlannerError;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::timeout;

/// File-name prefix of every artifact.
pub const ARTIFACT_PREFIX: &str = "attempt-";

/// Directory of attempt artifacts.
///
/// Every [`persist`](Self::persist) creates a new file with a generated,
/// collision-free name. Files are never overwritten and never deleted here.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    suffix: String,
    write_timeout: Duration,
}

impl ArtifactStore {
    /// Opens (creating if needed) the artifact directory.
    ///
    /// `extension` is used as the file suffix, e.g. `xml` gives `attempt-XXXX.xml`.
    pub fn open(dir: PathBuf, extension: &str) -> Result<Self, PlannerError> {
        std::fs::create_dir_all(&dir).map_err(|source| PlannerError::Storage {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            suffix: format!(".{extension}"),
            write_timeout: Duration::from_secs(30),
        })
    }

    /// Sets the time limit for a single write.
    #[must_use]
    pub const fn with_write_timeout(mut self, limit: Duration) -> Self {
        self.write_timeout = limit;
        self
    }

    /// The directory artifacts are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `document` verbatim to a fresh file and returns its path.
    ///
    /// Either the full text is on disk under the returned path, or an error is
    /// returned and no path is handed out.
    pub async fn persist(&self, document: &str) -> Result<PathBuf, PlannerError> {
        let dir = self.dir.clone();
        let suffix = self.suffix.clone();
        let text = document.to_owned();
        let task = tokio::task::spawn_blocking(move || write_artifact(&dir, &suffix, &text));
        self.bounded(task).await
    }

    /// Waits for a write task under the write time limit.
    async fn bounded<F>(&self, task: F) -> Result<PathBuf, PlannerError>
    where
        F: Future<Output = Result<std::io::Result<PathBuf>, JoinError>>,
    {
        let storage = |source: std::io::Error| PlannerError::Storage {
            path: self.dir.clone(),
            source,
        };

        match timeout(self.write_timeout, task).await {
            Ok(Ok(result)) => result.map_err(storage),
            Ok(Err(join)) => Err(storage(std::io::Error::other(join))),
            Err(_) => Err(storage(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("artifact write exceeded {:?}", self.write_timeout),
            ))),
        }
    }
}

/// Creates the file, writes and syncs it, then keeps it on disk.
///
/// The temporary file is removed automatically if any step before `keep`
/// fails.
fn write_artifact(dir: &Path, suffix: &str, text: &str) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(ARTIFACT_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn persisted_text_round_trips_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().to_path_buf(), "xml").unwrap();
        let document = "<mission>\n  <task name=\"ü\"/>\n</mission>\n";

        let path = store.persist(document).await.unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), document);
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(ARTIFACT_PREFIX));
        assert!(name.ends_with(".xml"));
    }

    #[tokio::test]
    async fn every_persist_gets_a_distinct_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().to_path_buf(), "xml").unwrap();

        let mut seen = HashSet::new();
        for _ in 0..20 {
            let path = store.persist("same text").await.unwrap();
            assert!(seen.insert(path));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 20);
    }

    #[tokio::test]
    async fn empty_document_still_produces_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().to_path_buf(), "xml").unwrap();

        let path = store.persist("").await.unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_directory_is_a_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().join("outputs"), "xml").unwrap();
        std::fs::remove_dir(store.dir()).unwrap();

        let err = store.persist("<doc/>").await.unwrap_err();
        assert!(matches!(err, PlannerError::Storage { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_write_times_out_as_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().to_path_buf(), "xml")
            .unwrap()
            .with_write_timeout(Duration::from_secs(5));

        let err = store
            .bounded(std::future::pending::<Result<std::io::Result<PathBuf>, JoinError>>())
            .await
            .unwrap_err();

        match err {
            PlannerError::Storage { path, source } => {
                assert_eq!(path, dir.path());
                assert_eq!(source.kind(), std::io::ErrorKind::TimedOut);
            }
            other => panic!("expected storage failure, got {other:?}"),
        }
    }

    #[test]
    fn open_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = ArtifactStore::open(nested.clone(), "json").unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }
}
