//! Filesystem watcher: extension filtering and debounce are pure, testable
//! functions decoupled from the `notify` event stream; [`run`] wires them to
//! a real watcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{ScannerError, ScannerResult};
use crate::intake::ScanTrigger;

/// Whether `path`'s extension (case-insensitive) appears in `extensions`,
/// each entry shaped like `.mkv`.
#[must_use]
pub fn is_media_file(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{}", ext.to_ascii_lowercase());
    extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(&dotted))
}

/// Tracks per-path last-seen instants and reports paths whose quiet period
/// has elapsed. Kept free of any real clock or filesystem dependency so it
/// can be driven by synthetic instants in tests.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    last_seen: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    /// Build a debouncer that waits `quiet_period` of silence before a path
    /// is considered stable.
    #[must_use]
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_seen: HashMap::new(),
        }
    }

    /// Record that `path` changed at `now`, resetting its quiet period.
    pub fn observe(&mut self, path: PathBuf, now: Instant) {
        self.last_seen.insert(path, now);
    }

    /// Remove and return every tracked path whose quiet period has elapsed
    /// as of `now`.
    pub fn drain_stable(&mut self, now: Instant) -> Vec<PathBuf> {
        let stable: Vec<PathBuf> = self
            .last_seen
            .iter()
            .filter(|(_, &seen)| now.duration_since(seen) >= self.quiet_period)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &stable {
            self.last_seen.remove(path);
        }
        stable
    }
}

/// Watch `roots` recursively, forwarding debounced, extension-filtered
/// [`ScanTrigger::NewFile`] values to `sender` until it is dropped or the
/// watcher cannot keep running.
///
/// # Errors
///
/// Returns an error if `notify` cannot initialize a watcher or register a
/// root.
pub async fn run(
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    quiet_period: Duration,
    sender: mpsc::UnboundedSender<ScanTrigger>,
) -> ScannerResult<()> {
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |event: notify::Result<Event>| {
            if let Ok(event) = event {
                if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    for path in event.paths {
                        let _ = raw_tx.send(path);
                    }
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|source| ScannerError::Watch {
        operation: "watcher_init",
        source,
    })?;

    for root in &roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| ScannerError::Watch {
                operation: "watch_root",
                source,
            })?;
    }

    let mut debouncer = Debouncer::new(quiet_period);
    let mut tick = tokio::time::interval((quiet_period / 4).max(Duration::from_millis(50)));

    loop {
        tokio::select! {
            Some(path) = raw_rx.recv() => {
                if is_media_file(&path, &extensions) {
                    debouncer.observe(path, Instant::now());
                }
            }
            _ = tick.tick() => {
                for path in debouncer.drain_stable(Instant::now()) {
                    if sender.send(ScanTrigger::NewFile { path }).is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn recognizes_configured_extensions_case_insensitively() {
        let extensions = vec![".mkv".to_string(), ".mp4".to_string()];
        assert!(is_media_file(Path::new("/media/Movie.MKV"), &extensions));
        assert!(is_media_file(Path::new("/media/movie.mp4"), &extensions));
        assert!(!is_media_file(Path::new("/media/movie.srt"), &extensions));
    }

    #[test]
    fn rejects_paths_without_an_extension() {
        let extensions = vec![".mkv".to_string()];
        assert!(!is_media_file(Path::new("/media/movie"), &extensions));
    }

    #[test]
    fn debouncer_withholds_paths_until_quiet_period_elapses() {
        let mut debouncer = Debouncer::new(ms(500));
        let start = Instant::now();
        debouncer.observe(PathBuf::from("/media/a.mkv"), start);

        assert!(debouncer.drain_stable(start + ms(100)).is_empty());
        let stable = debouncer.drain_stable(start + ms(600));
        assert_eq!(stable, vec![PathBuf::from("/media/a.mkv")]);
    }

    #[test]
    fn repeated_events_reset_the_quiet_period() {
        let mut debouncer = Debouncer::new(ms(500));
        let start = Instant::now();
        debouncer.observe(PathBuf::from("/media/a.mkv"), start);
        debouncer.observe(PathBuf::from("/media/a.mkv"), start + ms(400));

        assert!(debouncer.drain_stable(start + ms(600)).is_empty());
        assert_eq!(
            debouncer.drain_stable(start + ms(950)),
            vec![PathBuf::from("/media/a.mkv")]
        );
    }

    #[test]
    fn stable_paths_are_removed_once_drained() {
        let mut debouncer = Debouncer::new(ms(100));
        let start = Instant::now();
        debouncer.observe(PathBuf::from("/media/a.mkv"), start);
        let first = debouncer.drain_stable(start + ms(200));
        assert_eq!(first.len(), 1);
        assert!(debouncer.drain_stable(start + ms(300)).is_empty());
    }
}
