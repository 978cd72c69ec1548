//! Shared normalization from any intake subcomponent into a submission
//! request the orchestrator's `submit_download` operation understands.

use std::path::{Path, PathBuf};

/// A single event observed by one of the intake subcomponents, before it has
/// been normalized into a submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTrigger {
    /// A new, stable media file observed by the filesystem watcher.
    NewFile {
        /// Absolute path to the media file.
        path: PathBuf,
    },
    /// A webhook payload accepted by the HTTP listener.
    Webhook {
        /// `Movie` or `Episode`; already filtered by the caller.
        item_type: String,
        /// Display name of the item, if the source provided one.
        item_name: Option<String>,
        /// Filesystem path to the item, if the source provided one.
        item_path: Option<String>,
        /// Direct video URL, if the source provided one.
        video_url: Option<String>,
    },
    /// A `LibraryChanged` message received over the WebSocket client.
    LibraryChanged {
        /// Display name of the item, if known.
        item_name: Option<String>,
        /// Filesystem path to the item, if known.
        item_path: Option<String>,
        /// Direct video URL, if known.
        video_url: Option<String>,
    },
}

/// Orchestrator-shaped submission request built from a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Remote URL or local filesystem path of the video.
    pub video_url: String,
    /// Display title, when known.
    pub video_title: Option<String>,
    /// Target language requested for the subtitle.
    pub target_language: String,
}

/// Normalize a trigger into a submission request, or `None` if the trigger
/// carries no usable video location.
#[must_use]
pub fn build_submit_request(trigger: &ScanTrigger, target_language: &str) -> Option<SubmitRequest> {
    let (video_url, video_title) = match trigger {
        ScanTrigger::NewFile { path } => (path_to_video_url(path), file_stem_title(path)),
        ScanTrigger::Webhook {
            item_name,
            item_path,
            video_url,
            ..
        }
        | ScanTrigger::LibraryChanged {
            item_name,
            item_path,
            video_url,
        } => (
            video_url.clone().or_else(|| item_path.clone())?,
            item_name.clone(),
        ),
    };

    Some(SubmitRequest {
        video_url,
        video_title,
        target_language: target_language.to_string(),
    })
}

fn path_to_video_url(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn file_stem_title(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_uses_path_and_stem_as_title() {
        let trigger = ScanTrigger::NewFile {
            path: PathBuf::from("/media/Movies/Arrival (2016).mkv"),
        };
        let request = build_submit_request(&trigger, "es").expect("request built");
        assert_eq!(request.video_url, "/media/Movies/Arrival (2016).mkv");
        assert_eq!(request.video_title.as_deref(), Some("Arrival (2016)"));
        assert_eq!(request.target_language, "es");
    }

    #[test]
    fn webhook_prefers_video_url_over_item_path() {
        let trigger = ScanTrigger::Webhook {
            item_type: "Movie".to_string(),
            item_name: Some("Arrival".to_string()),
            item_path: Some("/media/arrival.mkv".to_string()),
            video_url: Some("https://server/videos/arrival".to_string()),
        };
        let request = build_submit_request(&trigger, "fr").expect("request built");
        assert_eq!(request.video_url, "https://server/videos/arrival");
        assert_eq!(request.video_title.as_deref(), Some("Arrival"));
    }

    #[test]
    fn webhook_falls_back_to_item_path_without_video_url() {
        let trigger = ScanTrigger::Webhook {
            item_type: "Episode".to_string(),
            item_name: None,
            item_path: Some("/media/show/s01e01.mkv".to_string()),
            video_url: None,
        };
        let request = build_submit_request(&trigger, "de").expect("request built");
        assert_eq!(request.video_url, "/media/show/s01e01.mkv");
    }

    #[test]
    fn trigger_with_no_location_is_rejected() {
        let trigger = ScanTrigger::LibraryChanged {
            item_name: Some("Unknown".to_string()),
            item_path: None,
            video_url: None,
        };
        assert!(build_submit_request(&trigger, "en").is_none());
    }
}
