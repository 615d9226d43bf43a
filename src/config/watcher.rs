//! Config file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by renaming a temp file over the original still trigger a reload.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::CounterConfig;

/// Sends a freshly validated [`CounterConfig`] whenever the file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: CounterConfig,
    update_tx: mpsc::UnboundedSender<CounterConfig>,
}

impl ConfigWatcher {
    /// `current` is the configuration already in use; an unchanged file is not resent.
    pub fn new(path: &Path, current: CounterConfig) -> (Self, mpsc::UnboundedReceiver<CounterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, current, update_tx } = self;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(|n| n.to_os_string());
        let last = Mutex::new(current);
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let touches_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !touches_config {
                    return;
                }

                let config = match load_config(Some(&reload_path)) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::error!(path = %reload_path.display(), error = %e, "Rejected config reload, keeping current configuration");
                        return;
                    }
                };

                let Ok(mut last) = last.lock() else { return };
                if *last == config {
                    tracing::debug!("Config file touched without changes");
                    return;
                }
                *last = config.clone();
                tracing::info!(path = %reload_path.display(), "Config file changed, reloading");
                let _ = update_tx.send(config);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BASE: &str = "[store]\nbackend = \"memory\"\n";

    #[tokio::test]
    async fn test_sends_changed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.toml");
        std::fs::write(&path, BASE).unwrap();
        let current = load_config(Some(&path)).unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path, current);
        let _handle = watcher.run().unwrap();

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "[adapter]\nkind = \"function\"").unwrap();
        file.sync_all().unwrap();

        let update = tokio::time::timeout(Duration::from_secs(10), updates.recv())
            .await
            .expect("no reload within timeout")
            .unwrap();
        assert_eq!(update.adapter.kind, crate::config::AdapterKind::Function);
    }
}
