// Watches a local status file so a rewrite can trigger an early refresh
use crate::watch::events::SourceEvent;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tokio::sync::mpsc as tokio_mpsc;

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    file_name: OsString,
    event_sender: tokio_mpsc::UnboundedSender<SourceEvent>,
}

impl FileWatcher {
    /// Watch the directory holding `status_file`. Collectors usually write a
    /// temp file and rename it over the target, so watching the file itself
    /// would lose track after the first rename.
    pub fn new(
        status_file: &Path,
        event_sender: tokio_mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<(Self, mpsc::Receiver<notify::Result<Event>>)> {
        let file_name = status_file
            .file_name()
            .map(|n| n.to_os_string())
            .with_context(|| format!("Not a file path: {}", status_file.display()))?;
        let dir = match status_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, file_receiver) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Err(e) = tx.send(res) {
                    tracing::debug!(error = %e, "file watch receiver gone");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        tracing::debug!(dir = %dir.display(), file = ?file_name, "watching status file");

        let file_watcher = FileWatcher {
            _watcher: watcher,
            file_name,
            event_sender,
        };

        Ok((file_watcher, file_receiver))
    }

    pub async fn run_with_receiver(
        &self,
        file_receiver: mpsc::Receiver<notify::Result<Event>>,
    ) -> Result<()> {
        loop {
            match file_receiver.try_recv() {
                Ok(Ok(event)) => {
                    if self.handle_file_event(event).is_err() {
                        return Ok(());
                    }
                }
                Ok(Err(e)) => {
                    let _ = self
                        .event_sender
                        .send(SourceEvent::Error(format!("File watch error: {}", e)));
                }
                Err(mpsc::TryRecvError::Empty) => {
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    return Err(anyhow::anyhow!("File watcher disconnected"));
                }
            }
        }
    }

    /// Forward create/modify events for the status file. Errs once the
    /// receiving side has hung up.
    fn handle_file_event(&self, event: Event) -> Result<()> {
        let make: fn(PathBuf) -> SourceEvent = match event.kind {
            EventKind::Create(_) => SourceEvent::FileCreated,
            EventKind::Modify(_) => SourceEvent::FileModified,
            _ => return Ok(()),
        };

        for path in event.paths {
            if self.is_status_file(&path) {
                self.event_sender
                    .send(make(path))
                    .map_err(|_| anyhow::anyhow!("refresh loop closed"))?;
            }
        }
        Ok(())
    }

    fn is_status_file(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|n| n == self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_file_watcher_creation() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, _rx) = tokio_mpsc::unbounded_channel();

        let result = FileWatcher::new(&temp_dir.path().join("status.json"), tx);
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_status_file_write_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let status_path = temp_dir.path().join("status.json");
        let (tx, mut rx) = tokio_mpsc::unbounded_channel();

        let (watcher, file_receiver) = FileWatcher::new(&status_path, tx).unwrap();
        let watcher_handle = tokio::spawn(async move {
            let _ = watcher.run_with_receiver(file_receiver).await;
        });

        // Unrelated files in the same directory are ignored.
        fs::write(temp_dir.path().join("other.txt"), "x").unwrap();
        fs::write(&status_path, "{}").unwrap();

        let event = timeout(tokio::time::Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let reported = event.path().unwrap();
        assert_eq!(reported.file_name(), status_path.file_name());

        watcher_handle.abort();
    }

    #[test]
    fn test_is_status_file() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, _rx) = tokio_mpsc::unbounded_channel();
        let (watcher, _file_receiver) =
            FileWatcher::new(&temp_dir.path().join("status.json"), tx).unwrap();

        assert!(watcher.is_status_file(Path::new("/somewhere/status.json")));
        assert!(!watcher.is_status_file(Path::new("/somewhere/status.json.tmp")));
        assert!(!watcher.is_status_file(Path::new("/somewhere/other.json")));
    }
}
