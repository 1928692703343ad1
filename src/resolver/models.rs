// Wire models for the YouTube Data API plus display helpers

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One thumbnail rendition. Dimensions are not guaranteed by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Thumbnail set keyed by rendition name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnails: Thumbnails,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoContentDetails {
    /// ISO-8601 duration string, e.g. "PT1H2M3S"
    pub duration: String,
}

/// Counters arrive as decimal strings and may be withheld per video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

/// Full video payload as returned by `/videos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoRecord {
    pub id: String,
    pub snippet: VideoSnippet,
    pub content_details: VideoContentDetails,
    pub statistics: VideoStatistics,
}

impl VideoRecord {
    /// Duration in seconds, parsed from the ISO-8601 string.
    pub fn duration_seconds(&self) -> u64 {
        super::filter::duration_seconds(&self.content_details.duration)
    }

    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    /// Publication time, when the payload carries a valid RFC 3339 stamp.
    pub fn published(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.snippet.published_at, &Rfc3339).ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelSnippet {
    pub title: String,
    pub description: String,
    pub custom_url: Option<String>,
    pub published_at: String,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelStatistics {
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
    pub view_count: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelatedPlaylists {
    /// The channel's implicit playlist enumerating all uploads
    pub uploads: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

/// Full channel payload as returned by `/channels`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelRecord {
    pub id: String,
    pub snippet: ChannelSnippet,
    pub statistics: ChannelStatistics,
    pub content_details: ChannelContentDetails,
}

impl ChannelRecord {
    /// Uploads playlist id, the entry point for the channel's video listing.
    pub fn uploads_playlist(&self) -> Option<&str> {
        self.content_details.related_playlists.uploads.as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistSnippet {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
}

/// Playlist metadata as returned by `/playlists`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistRecord {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

pub const KIND_VIDEO: &str = "youtube#video";
pub const KIND_CHANNEL: &str = "youtube#channel";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResultId {
    pub kind: String,
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
}

/// One `/search` hit; only the id block is consumed downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemResource {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemSnippet {
    pub resource_id: PlaylistItemResource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

/// One page of `/playlistItems`, with the continuation token when more
/// results remain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemsPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

/// Generic `items` envelope shared by the list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Seconds to a clock string ("1:02:03", "02:05"); 0 displays as "N/A".
pub fn format_clock(seconds: u64) -> String {
    if seconds == 0 {
        return "N/A".to_string();
    }
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Compact count formatting for statistics display: "987", "1.2K", "34M".
/// Unparsable input displays as "0".
pub fn format_count(raw: &str) -> String {
    let n: u64 = match raw.trim().parse() {
        Ok(n) => n,
        Err(_) => return "0".to_string(),
    };
    let scaled = |value: f64, suffix: &str| {
        if value < 10.0 {
            // One decimal below 10, but "1.0K" reads better as "1K"
            let text = format!("{:.1}", value);
            let text = text.strip_suffix(".0").unwrap_or(&text);
            format!("{}{}", text, suffix)
        } else {
            format!("{:.0}{}", value, suffix)
        }
    };
    if n >= 1_000_000_000 {
        scaled(n as f64 / 1_000_000_000.0, "B")
    } else if n >= 1_000_000 {
        scaled(n as f64 / 1_000_000.0, "M")
    } else if n >= 1_000 {
        scaled(n as f64 / 1_000.0, "K")
    } else {
        n.to_string()
    }
}

/// Human name for a YouTube video category id.
pub fn category_name(id: &str) -> &'static str {
    match id {
        "1" => "Film & Animation",
        "2" => "Autos & Vehicles",
        "10" => "Music",
        "15" => "Pets & Animals",
        "17" => "Sports",
        "18" => "Short Movies",
        "19" => "Travel & Events",
        "20" => "Gaming",
        "21" => "Videoblogging",
        "22" => "People & Blogs",
        "23" => "Comedy",
        "24" => "Entertainment",
        "25" => "News & Politics",
        "26" => "Howto & Style",
        "27" => "Education",
        "28" => "Science & Technology",
        "29" => "Nonprofits & Activism",
        "30" => "Movies",
        "31" => "Anime/Animation",
        "32" => "Action/Adventure",
        "33" => "Classics",
        "34" => "Comedy",
        "35" => "Documentary",
        "36" => "Drama",
        "37" => "Family",
        "38" => "Foreign",
        "39" => "Horror",
        "40" => "Sci-Fi/Fantasy",
        "41" => "Thriller",
        "42" => "Shorts",
        "43" => "Shows",
        "44" => "Trailers",
        _ => "Unknown",
    }
}
