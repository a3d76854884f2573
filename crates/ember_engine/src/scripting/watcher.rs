//! Background watcher for the app assembly directory
//!
//! Polls a fingerprint of every `.rhai` file and, when it changes, queues a
//! single reload on the main thread. While a reload is pending further
//! changes are absorbed; the reload itself clears the flag.

use crate::core::MainThreadSender;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Fingerprint of the script files in `directory`.
///
/// Covers file names, sizes, modification times and contents. Unreadable
/// files contribute their name only.
pub fn assembly_fingerprint(directory: &Path) -> u64 {
    let mut files: Vec<PathBuf> = fs::read_dir(directory)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "rhai"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();

    let mut hasher = DefaultHasher::new();
    for file in &files {
        file.hash(&mut hasher);
        if let Ok(metadata) = fs::metadata(file) {
            metadata.len().hash(&mut hasher);
            if let Ok(modified) = metadata.modified() {
                modified.hash(&mut hasher);
            }
        }
        if let Ok(bytes) = fs::read(file) {
            bytes.hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Handle to the watcher thread; dropping it stops the thread
pub struct AssemblyWatcher {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl AssemblyWatcher {
    /// Start watching `path`.
    ///
    /// `on_change` runs on the main thread the next time `sender`'s queue is
    /// drained. `pending` is shared with the script engine.
    pub fn spawn<C: 'static>(
        path: impl Into<PathBuf>,
        interval: Duration,
        pending: Arc<AtomicBool>,
        sender: MainThreadSender<C>,
        on_change: fn(&mut C),
    ) -> Self {
        let path = path.into();
        let watched = path.clone();
        let (stop, stopped) = channel::<()>();

        let handle = thread::spawn(move || {
            let mut last = assembly_fingerprint(&watched);
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }

                let current = assembly_fingerprint(&watched);
                if current == last {
                    continue;
                }
                last = current;
                if !pending.swap(true, Ordering::AcqRel) {
                    log::info!("Detected change in '{}'", watched.display());
                    sender.submit(on_change);
                }
            }
        });

        log::debug!("Watching app assembly '{}'", path.display());
        Self {
            stop: Some(stop),
            handle: Some(handle),
            path,
        }
    }

    /// Directory being watched
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AssemblyWatcher {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Assembly watcher thread panicked");
            }
        }
    }
}
