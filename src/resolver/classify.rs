// Query classification - turning a free-form string into a typed reference

use lazy_static::lazy_static;
use regex::Regex;

/// How a channel was referenced in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// `/channel/<UC...>` path segment
    Id(String),
    /// `/@<handle>` path segment
    Handle(String),
}

/// Classified outcome of parsing a user-supplied query string.
///
/// Precedence is a fixed contract: a video id wins over a `list=`
/// parameter embedded in the same URL, a playlist wins over a channel
/// path, and anything unrecognized falls through to `Search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Video(String),
    Playlist(String),
    Channel(ChannelRef),
    Search(String),
}

/// Classify a query string into a content reference.
pub fn classify(query: &str) -> Reference {
    if let Some(id) = extract_video_id(query) {
        return Reference::Video(id);
    }
    if let Some(id) = extract_playlist_id(query) {
        return Reference::Playlist(id);
    }
    if let Some(channel) = extract_channel_ref(query) {
        return Reference::Channel(channel);
    }
    Reference::Search(query.to_string())
}

/// Extract an 11-character video id from any of the common URL shapes
/// (`watch?v=`, `&v=`, `youtu.be/`, `embed/`, `v/`, `u/<x>/`).
pub fn extract_video_id(query: &str) -> Option<String> {
    lazy_static! {
        static ref VIDEO_RE: Regex =
            Regex::new(r"(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*)").unwrap();
        static ref SHORT_RE: Regex = Regex::new(r"youtu\.be/([^#&?]{11})").unwrap();
    }

    if let Some(caps) = VIDEO_RE.captures(query) {
        let id = caps.get(2).map_or("", |m| m.as_str());
        // Anything other than exactly 11 characters is not a video id.
        if id.len() == 11 {
            return Some(id.to_string());
        }
    }
    SHORT_RE
        .captures(query)
        .map(|caps| caps[1].to_string())
}

/// Extract a `list=` playlist id query parameter.
pub fn extract_playlist_id(query: &str) -> Option<String> {
    lazy_static! {
        static ref PLAYLIST_RE: Regex = Regex::new(r"[?&]list=([^#&?]+)").unwrap();
    }
    PLAYLIST_RE.captures(query).map(|caps| caps[1].to_string())
}

/// Extract a channel reference from `/channel/<id>` or `/@<handle>` paths.
pub fn extract_channel_ref(query: &str) -> Option<ChannelRef> {
    lazy_static! {
        static ref CHANNEL_ID_RE: Regex =
            Regex::new(r"youtube\.com/channel/([a-zA-Z0-9_-]+)").unwrap();
        static ref HANDLE_RE: Regex = Regex::new(r"youtube\.com/@([a-zA-Z0-9_.-]+)").unwrap();
    }

    if let Some(caps) = CHANNEL_ID_RE.captures(query) {
        return Some(ChannelRef::Id(caps[1].to_string()));
    }
    HANDLE_RE
        .captures(query)
        .map(|caps| ChannelRef::Handle(caps[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_video_id_from_watch_url() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/u/x/dQw4w9WgXcQ",
        ];
        for url in urls {
            assert_eq!(extract_video_id(url).as_deref(), Some(ID), "url: {}", url);
        }
    }

    #[test]
    fn test_video_id_must_be_eleven_chars() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("plain text query"), None);
    }

    #[test]
    fn test_playlist_id_extraction() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PL123abc"),
            Some("PL123abc".to_string())
        );
        assert_eq!(extract_playlist_id("no list here"), None);
    }

    #[test]
    fn test_channel_id_and_handle() {
        assert_eq!(
            extract_channel_ref("https://www.youtube.com/channel/UCabc123_-x"),
            Some(ChannelRef::Id("UCabc123_-x".to_string()))
        );
        assert_eq!(
            extract_channel_ref("https://www.youtube.com/@some.handle-1"),
            Some(ChannelRef::Handle("some.handle-1".to_string()))
        );
        assert_eq!(extract_channel_ref("https://example.com/@nope"), None);
    }

    #[test]
    fn test_video_wins_over_playlist() {
        // A watch URL carrying both v= and list= classifies as the video.
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123abc";
        assert_eq!(classify(url), Reference::Video(ID.to_string()));
    }

    #[test]
    fn test_playlist_wins_over_channel() {
        let url = "https://www.youtube.com/channel/UCabc?list=PL123abc";
        assert_eq!(classify(url), Reference::Playlist("PL123abc".to_string()));
    }

    #[test]
    fn test_free_text_falls_through_to_search() {
        assert_eq!(
            classify("rust async tutorial"),
            Reference::Search("rust async tutorial".to_string())
        );
    }
}
