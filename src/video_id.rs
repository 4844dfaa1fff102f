use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TranscriptError};

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:(?:www|m|music)\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/|v/)|youtube-nocookie\.com/embed/|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/].*)?$",
    )
    .unwrap()
});

/// Extract the 11 character video identifier from a video URL.
pub fn extract_video_id(url: &str) -> Result<String> {
    VIDEO_URL
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TranscriptError::InvalidUrl {
            url: url.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "jNQXAC9IVRw";

    #[test]
    fn recognizes_url_shapes() {
        let urls = [
            "https://www.youtube.com/watch?v=jNQXAC9IVRw",
            "https://youtube.com/watch?v=jNQXAC9IVRw&t=10s",
            "https://www.youtube.com/watch?feature=share&v=jNQXAC9IVRw",
            "http://m.youtube.com/watch?v=jNQXAC9IVRw",
            "https://music.youtube.com/watch?v=jNQXAC9IVRw&list=RD",
            "https://youtu.be/jNQXAC9IVRw",
            "https://youtu.be/jNQXAC9IVRw?si=abc",
            "youtu.be/jNQXAC9IVRw",
            "https://www.youtube.com/embed/jNQXAC9IVRw",
            "https://www.youtube-nocookie.com/embed/jNQXAC9IVRw",
            "https://www.youtube.com/shorts/jNQXAC9IVRw",
            "https://www.youtube.com/live/jNQXAC9IVRw?feature=shared",
            "https://www.youtube.com/v/jNQXAC9IVRw",
            "  https://youtu.be/jNQXAC9IVRw  ",
        ];

        for url in urls {
            assert_eq!(extract_video_id(url).unwrap(), ID, "url: {url}");
        }
    }

    #[test]
    fn rejects_unknown_shapes() {
        let urls = [
            "",
            "jNQXAC9IVRw",
            "https://example.com/watch?v=jNQXAC9IVRw",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/channel/UC4QobU6STFB0P71PMvOGN5A",
            "https://vimeo.com/123456",
        ];

        for url in urls {
            assert!(
                matches!(extract_video_id(url), Err(TranscriptError::InvalidUrl { .. })),
                "url: {url}"
            );
        }
    }
}
