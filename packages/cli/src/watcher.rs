use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),

    #[error("Nothing to watch at {0}")]
    MissingTarget(String),
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Watches the directory holding one file and reports changes to that file
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    target: PathBuf,
}

impl FileWatcher {
    pub fn new(target: &Path) -> WatcherResult<Self> {
        let target = target
            .canonicalize()
            .map_err(|_| WatcherError::MissingTarget(target.display().to_string()))?;
        let dir = target
            .parent()
            .ok_or_else(|| WatcherError::MissingTarget(target.display().to_string()))?
            .to_path_buf();
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        // editors often replace files, so watch the directory
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            target,
        })
    }

    /// Block until the target changes. `None` once the watcher is gone.
    pub fn wait_for_change(&self) -> Option<Event> {
        loop {
            match self.receiver.recv() {
                Ok(Ok(event)) if self.touches_target(&event) => return Some(event),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Drop events already queued, e.g. the burst from a single save
    pub fn drain(&self) {
        while self.receiver.try_recv().is_ok() {}
    }

    fn touches_target(&self, event: &Event) -> bool {
        if event.kind.is_access() {
            return false;
        }
        event
            .paths
            .iter()
            .any(|path| path == &self.target || path.file_name() == self.target.file_name())
    }
}
