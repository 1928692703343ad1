// YouTube Data API boundary

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use super::errors::{upstream_message, ResolveError};
use super::models::{
    ChannelRecord, ListResponse, PlaylistItemsPage, PlaylistRecord, SearchResult, VideoRecord,
};

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for `/playlistItems` and id-batch size for `/videos`
/// (the API caps both at 50).
pub const PAGE_SIZE: usize = 50;

/// The Data API endpoints the resolver needs, one method per endpoint.
///
/// Methods return raw pages; pagination, filtering and ordering are layered
/// on top by [`ContentResolver`](super::content::ContentResolver). Tests
/// substitute a mock implementation.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    async fn search(&self, query: &str, max_results: u32)
        -> Result<Vec<SearchResult>, ResolveError>;

    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoRecord>, ResolveError>;

    async fn channels_by_id(&self, id: &str) -> Result<Vec<ChannelRecord>, ResolveError>;

    /// Resolve a handle to channel ids (`/channels?forHandle=`, `part=id`).
    async fn channel_ids_for_handle(&self, handle: &str) -> Result<Vec<String>, ResolveError>;

    async fn playlists(&self, id: &str) -> Result<Vec<PlaylistRecord>, ResolveError>;

    async fn playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage, ResolveError>;
}

/// reqwest-backed Data API client.
///
/// The API key is an explicit constructor argument, captured once per
/// client; build a new client when the caller changes keys.
pub struct DataApiClient {
    http: reqwest::Client,
    api_key: String,
}

impl DataApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ResolveError> {
        let url = format!("{}/{}", YOUTUBE_API_URL, endpoint);
        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        query.push(("key", self.api_key.as_str()));

        debug!("GET /{}", endpoint);
        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message);
            return Err(ResolveError::Upstream {
                status: status.as_u16(),
                message: upstream_message(status.as_u16(), detail.as_deref()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ResolveError::UnexpectedShape(e.to_string()))
    }
}

#[async_trait]
impl YouTubeApi for DataApiClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, ResolveError> {
        let params = [
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let page: ListResponse<SearchResult> = self.get_json("search", &params).await?;
        Ok(page.items)
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoRecord>, ResolveError> {
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", ids.join(",")),
        ];
        let page: ListResponse<VideoRecord> = self.get_json("videos", &params).await?;
        Ok(page.items)
    }

    async fn channels_by_id(&self, id: &str) -> Result<Vec<ChannelRecord>, ResolveError> {
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", id.to_string()),
        ];
        let page: ListResponse<ChannelRecord> = self.get_json("channels", &params).await?;
        Ok(page.items)
    }

    async fn channel_ids_for_handle(&self, handle: &str) -> Result<Vec<String>, ResolveError> {
        let params = [
            ("part", "id".to_string()),
            ("forHandle", handle.to_string()),
        ];
        let page: ListResponse<ChannelIdOnly> = self.get_json("channels", &params).await?;
        Ok(page.items.into_iter().map(|item| item.id).collect())
    }

    async fn playlists(&self, id: &str) -> Result<Vec<PlaylistRecord>, ResolveError> {
        let params = [("part", "snippet".to_string()), ("id", id.to_string())];
        let page: ListResponse<PlaylistRecord> = self.get_json("playlists", &params).await?;
        Ok(page.items)
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage, ResolveError> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        self.get_json("playlistItems", &params).await
    }
}

#[derive(Debug, Deserialize)]
struct ChannelIdOnly {
    #[serde(default)]
    id: String,
}

/// Error envelope the Data API attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_parsing() {
        let body = r#"{"error": {"code": 403, "message": "quotaExceeded", "errors": []}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(
            envelope.error.and_then(|e| e.message).as_deref(),
            Some("quotaExceeded")
        );
    }

    #[test]
    fn test_error_envelope_tolerates_garbage() {
        assert!(serde_json::from_str::<ApiErrorEnvelope>("<html>nope</html>").is_err());
        let envelope: ApiErrorEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.error.is_none());
    }
}
