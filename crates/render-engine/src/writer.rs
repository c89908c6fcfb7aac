//! Background file writes.
//!
//! Each write runs on the tokio blocking pool and reports back through its
//! own [`WriteHandle`]. Writes belong to a [`WriteScope`]; once the scope is
//! revoked, writes that have not started yet are dropped instead of
//! recreating directories that teardown just deleted.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use propshot_common::error::{PropshotError, PropshotResult};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Truncate and overwrite in place.
    Overwrite,
    /// Delete the existing file, then create a new one.
    ReplaceExisting,
}

/// How a write ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: PathBuf, bytes: usize },
    /// The scope was revoked before the write ran.
    Dropped { path: PathBuf },
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::Dropped { path } => path,
        }
    }
}

/// Shared revocation flag for a group of writes.
#[derive(Debug, Clone, Default)]
pub struct WriteScope {
    revoked: Arc<RwLock<bool>>,
}

impl WriteScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_revoked(&self) -> bool {
        *self.revoked.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Revoke the scope and run `cleanup` while no write of this scope is in
    /// progress. Writes that start afterwards are dropped.
    pub fn revoke_with<R>(&self, cleanup: impl FnOnce() -> R) -> R {
        let mut revoked = self.revoked.write().unwrap_or_else(PoisonError::into_inner);
        *revoked = true;
        cleanup()
    }
}

/// Completion channel of one background write.
#[derive(Debug)]
pub struct WriteHandle {
    path: PathBuf,
    rx: oneshot::Receiver<PropshotResult<WriteOutcome>>,
}

impl WriteHandle {
    /// Destination of the write.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check. Returns the result once the write has finished.
    ///
    /// After a result has been returned the handle is spent; further calls
    /// report the worker as gone.
    pub fn try_take(&mut self) -> Option<PropshotResult<WriteOutcome>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(self.worker_gone())),
        }
    }

    /// Wait for the write to finish.
    pub async fn wait(self) -> PropshotResult<WriteOutcome> {
        let gone = self.worker_gone();
        self.rx.await.unwrap_or(Err(gone))
    }

    fn worker_gone(&self) -> PropshotError {
        PropshotError::write(
            &self.path,
            std::io::Error::other("write worker exited without reporting"),
        )
    }
}

/// Dispatches writes to the blocking pool of a tokio runtime.
#[derive(Debug, Clone)]
pub struct FileWriter {
    runtime: Handle,
}

impl FileWriter {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Writer bound to the runtime of the calling context.
    pub fn current() -> PropshotResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| PropshotError::unsupported(format!("no tokio runtime: {e}")))
    }

    /// Queue `bytes` for writing to `path`. Parent directories are created
    /// on the worker.
    pub fn write(
        &self,
        scope: &WriteScope,
        path: PathBuf,
        bytes: Vec<u8>,
        policy: WritePolicy,
    ) -> WriteHandle {
        let (tx, rx) = oneshot::channel();
        let scope = scope.clone();
        let dest = path.clone();
        self.runtime.spawn_blocking(move || {
            let result = write_file(&scope, &dest, &bytes, policy);
            if let Err(e) = &result {
                tracing::warn!(path = %dest.display(), error = %e, "Background write failed");
            }
            // The caller may have dropped the handle.
            let _ = tx.send(result);
        });
        WriteHandle { path, rx }
    }
}

fn write_file(
    scope: &WriteScope,
    path: &Path,
    bytes: &[u8],
    policy: WritePolicy,
) -> PropshotResult<WriteOutcome> {
    let revoked = scope.revoked.read().unwrap_or_else(PoisonError::into_inner);
    if *revoked {
        tracing::debug!(path = %path.display(), "Dropped write for revoked scope");
        return Ok(WriteOutcome::Dropped {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PropshotError::write(path, e))?;
    }
    if policy == WritePolicy::ReplaceExisting && path.exists() {
        std::fs::remove_file(path).map_err(|e| PropshotError::write(path, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| PropshotError::write(path, e))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(WriteOutcome::Written {
        path: path.to_path_buf(),
        bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("propshot_test_writer_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = temp_dir("parents");
        let writer = FileWriter::current().unwrap();
        let path = dir.join("nested/deeper/file.bin");

        let outcome = writer
            .write(&WriteScope::new(), path.clone(), vec![1, 2, 3], WritePolicy::Overwrite)
            .wait()
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WriteOutcome::Written {
                path: path.clone(),
                bytes: 3
            }
        );
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_replace_existing_swaps_contents() {
        let dir = temp_dir("replace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.png");
        std::fs::write(&path, b"a much longer previous payload").unwrap();

        let writer = FileWriter::current().unwrap();
        writer
            .write(&WriteScope::new(), path.clone(), b"new".to_vec(), WritePolicy::ReplaceExisting)
            .wait()
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_revoked_scope_drops_write() {
        let dir = temp_dir("revoked");
        let scope = WriteScope::new();
        let deleted = scope.revoke_with(|| std::fs::remove_dir_all(&dir).is_ok());
        assert!(!deleted);
        assert!(scope.is_revoked());

        let writer = FileWriter::current().unwrap();
        let path = dir.join("late.png");
        let outcome = writer
            .write(&scope, path.clone(), vec![0; 4], WritePolicy::ReplaceExisting)
            .wait()
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Dropped { path });
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_failed_write_is_typed_error() {
        let dir = temp_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let writer = FileWriter::current().unwrap();
        let err = writer
            .write(
                &WriteScope::new(),
                blocker.join("child.png"),
                vec![1],
                WritePolicy::Overwrite,
            )
            .wait()
            .await
            .unwrap_err();
        assert!(matches!(err, PropshotError::Write { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_try_take_eventually_completes() {
        let dir = temp_dir("poll");
        let writer = FileWriter::current().unwrap();
        let mut handle = writer.write(
            &WriteScope::new(),
            dir.join("a.bin"),
            vec![7],
            WritePolicy::Overwrite,
        );
        let result = loop {
            if let Some(result) = handle.try_take() {
                break result;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        };
        assert!(result.is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_current_requires_runtime() {
        assert!(FileWriter::current().is_err());
    }
}
