//! Periodic fallback resync: re-walks the watched directories independent
//! of which other intake subcomponents are enabled, to catch anything a
//! missed filesystem event, webhook, or WebSocket message left behind.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::intake::ScanTrigger;
use crate::watcher::is_media_file;

/// Walk `roots` once, returning a trigger for every matching media file.
#[must_use]
pub fn scan_once(roots: &[PathBuf], extensions: &[String]) -> Vec<ScanTrigger> {
    roots
        .iter()
        .flat_map(|root| {
            WalkDir::new(root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| is_media_file(entry.path(), extensions))
                .map(|entry| ScanTrigger::NewFile {
                    path: entry.path().to_path_buf(),
                })
        })
        .collect()
}

/// Re-walk `roots` every `interval`, forwarding matching files to `sender`
/// until it is dropped.
pub async fn run(
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    interval: Duration,
    sender: mpsc::UnboundedSender<ScanTrigger>,
) {
    let mut tick = tokio::time::interval(interval);
    loop {
        tick.tick().await;
        for trigger in scan_once(&roots, &extensions) {
            if sender.send(trigger).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_matching_files_recursively() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        fs::write(dir.path().join("movie.mkv"), b"data").expect("write");
        fs::write(dir.path().join("sub").join("episode.mp4"), b"data").expect("write");
        fs::write(dir.path().join("poster.jpg"), b"data").expect("write");

        let extensions = vec![".mkv".to_string(), ".mp4".to_string()];
        let triggers = scan_once(&[dir.path().to_path_buf()], &extensions);
        assert_eq!(triggers.len(), 2);
    }
}
