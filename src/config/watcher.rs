//! Configuration file watcher for hot reload.
//!
//! Only `security`, `rate_limit` and `forms` take effect on a running
//! server. Edits to the other sections are logged and wait for a restart.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::FormsConfig;

/// Sections read once at startup.
const RESTART_ONLY: [&str; 3] = ["listener", "timeouts", "observability"];

/// Names of the top-level sections that differ between two configs.
pub fn changed_sections(old: &FormsConfig, new: &FormsConfig) -> Vec<&'static str> {
    [
        ("listener", old.listener != new.listener),
        ("timeouts", old.timeouts != new.timeouts),
        ("security", old.security != new.security),
        ("rate_limit", old.rate_limit != new.rate_limit),
        ("forms", old.forms != new.forms),
        ("observability", old.observability != new.observability),
    ]
    .into_iter()
    .filter(|(_, changed)| *changed)
    .map(|(section, _)| section)
    .collect()
}

/// Watches the config file and forwards configs whose content changed.
pub struct ConfigWatcher {
    path: PathBuf,
    current: FormsConfig,
    update_tx: mpsc::UnboundedSender<FormsConfig>,
}

impl ConfigWatcher {
    /// `current` is the config the server started with, as read from `path`.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path, current: FormsConfig) -> (Self, mpsc::UnboundedReceiver<FormsConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Reload from disk and forward the result if anything changed.
    ///
    /// Returns the changed sections; an invalid file keeps the current config.
    pub fn reload(&mut self) -> Vec<&'static str> {
        let next = match load_config(&self.path) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                return Vec::new();
            }
        };

        let changed = changed_sections(&self.current, &next);
        if changed.is_empty() {
            tracing::debug!(path = ?self.path, "Config file touched without changes");
            return changed;
        }

        let pending: Vec<&str> = changed
            .iter()
            .copied()
            .filter(|section| RESTART_ONLY.contains(section))
            .collect();
        if !pending.is_empty() {
            tracing::warn!(sections = ?pending, "Config sections change only after a restart");
        }
        tracing::info!(sections = ?changed, "Config file changed, applying");

        self.current = next.clone();
        let _ = self.update_tx.send(next);
        changed
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(mut self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    self.reload();
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
