// Content resolution - classification dispatch, pagination and filtering

use std::collections::HashMap;

use log::debug;

use super::classify::{classify, ChannelRef, Reference};
use super::client::{YouTubeApi, PAGE_SIZE};
use super::errors::ResolveError;
use super::filter;
use super::models::{
    ChannelRecord, PlaylistRecord, VideoRecord, KIND_CHANNEL, KIND_VIDEO,
};

/// Fully resolved content for one user query.
#[derive(Debug, Clone)]
pub enum ResolvedContent {
    Video(VideoRecord),
    Channel {
        channel: ChannelRecord,
        videos: Vec<VideoRecord>,
    },
    Playlist {
        playlist: PlaylistRecord,
        videos: Vec<VideoRecord>,
    },
}

/// First hit of a free-text search, resolved to full details.
#[derive(Debug, Clone)]
pub enum SearchHit {
    Video(VideoRecord),
    Channel(ChannelRecord),
}

/// Resolves classified references against the Data API.
///
/// All awaits are strictly sequential; the resolver never issues parallel
/// requests.
pub struct ContentResolver<A: YouTubeApi> {
    api: A,
}

impl<A: YouTubeApi> ContentResolver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Classify and resolve a raw query string end to end.
    pub async fn resolve_query(&self, query: &str) -> Result<ResolvedContent, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::InvalidInput(
                "Please enter a YouTube URL or search query.".to_string(),
            ));
        }
        self.resolve(classify(query)).await
    }

    /// Dispatch a classified reference.
    ///
    /// Single videos (direct or found via search) must pass the long-form
    /// 16:9 acceptance rule; listings apply it as a silent filter instead.
    pub async fn resolve(&self, reference: Reference) -> Result<ResolvedContent, ResolveError> {
        match reference {
            Reference::Video(id) => {
                let video = self.resolve_video(&id).await?;
                filter::check_long_form(&video)?;
                Ok(ResolvedContent::Video(video))
            }
            Reference::Playlist(id) => {
                let playlist = self.resolve_playlist(&id).await?;
                let videos = self.resolve_playlist_videos(&id).await?;
                Ok(ResolvedContent::Playlist { playlist, videos })
            }
            Reference::Channel(channel_ref) => {
                let channel = self.resolve_channel(&channel_ref).await?;
                let videos = self.resolve_channel_videos(&channel).await?;
                Ok(ResolvedContent::Channel { channel, videos })
            }
            Reference::Search(text) => match self.search_first(&text).await? {
                SearchHit::Video(video) => {
                    filter::check_long_form(&video)?;
                    Ok(ResolvedContent::Video(video))
                }
                SearchHit::Channel(channel) => {
                    let videos = self.resolve_channel_videos(&channel).await?;
                    Ok(ResolvedContent::Channel { channel, videos })
                }
            },
        }
    }

    pub async fn resolve_video(&self, id: &str) -> Result<VideoRecord, ResolveError> {
        let mut items = self.api.videos(&[id.to_string()]).await?;
        if items.is_empty() {
            return Err(ResolveError::NotFound(
                "Video not found or invalid ID.".to_string(),
            ));
        }
        Ok(items.remove(0))
    }

    pub async fn resolve_channel(
        &self,
        reference: &ChannelRef,
    ) -> Result<ChannelRecord, ResolveError> {
        let id = match reference {
            ChannelRef::Id(id) => id.clone(),
            ChannelRef::Handle(handle) => {
                let ids = self.api.channel_ids_for_handle(handle).await?;
                match ids.into_iter().next() {
                    Some(id) => id,
                    None => {
                        return Err(ResolveError::NotFound(format!(
                            "Channel with handle @{} not found.",
                            handle
                        )))
                    }
                }
            }
        };
        let mut items = self.api.channels_by_id(&id).await?;
        if items.is_empty() {
            return Err(ResolveError::NotFound(
                "Channel not found or invalid ID.".to_string(),
            ));
        }
        Ok(items.remove(0))
    }

    pub async fn resolve_playlist(&self, id: &str) -> Result<PlaylistRecord, ResolveError> {
        let mut items = self.api.playlists(id).await?;
        if items.is_empty() {
            return Err(ResolveError::NotFound(
                "Playlist not found or invalid ID.".to_string(),
            ));
        }
        Ok(items.remove(0))
    }

    /// List a channel's videos through its uploads playlist.
    pub async fn resolve_channel_videos(
        &self,
        channel: &ChannelRecord,
    ) -> Result<Vec<VideoRecord>, ResolveError> {
        let uploads = channel.uploads_playlist().ok_or_else(|| {
            ResolveError::UnexpectedShape(
                "channel payload carries no uploads playlist".to_string(),
            )
        })?;
        self.resolve_playlist_videos(uploads).await
    }

    /// List a playlist's long-form 16:9 videos, in playlist order.
    pub async fn resolve_playlist_videos(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<VideoRecord>, ResolveError> {
        // 1. Collect member video ids in playlist order, page by page,
        //    until the API stops returning a continuation token.
        let mut all_ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .api
                .playlist_items(playlist_id, page_token.as_deref())
                .await?;
            all_ids.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.snippet.resource_id.video_id),
            );
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }
        if all_ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("playlist {}: {} member ids", playlist_id, all_ids.len());

        // 2. Full details, at most PAGE_SIZE ids per call.
        let mut details: Vec<VideoRecord> = Vec::new();
        for batch in all_ids.chunks(PAGE_SIZE) {
            details.extend(self.api.videos(batch).await?);
        }

        // 3. Silent filter, then restore the original playlist order.
        //    Ids filtered out or missing from the detail set are simply
        //    absent from the output.
        let by_id: HashMap<String, VideoRecord> = details
            .into_iter()
            .filter(filter::passes_filter)
            .map(|video| (video.id.clone(), video))
            .collect();
        Ok(all_ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect())
    }

    /// Resolve a free-text query to its first search hit's full details.
    pub async fn search_first(&self, query: &str) -> Result<SearchHit, ResolveError> {
        let items = self.api.search(query, 1).await?;
        let first = match items.into_iter().next() {
            Some(item) => item,
            None => {
                return Err(ResolveError::NotFound(
                    "No results found for your search query.".to_string(),
                ))
            }
        };
        if first.id.kind == KIND_VIDEO {
            if let Some(id) = first.id.video_id {
                return Ok(SearchHit::Video(self.resolve_video(&id).await?));
            }
        } else if first.id.kind == KIND_CHANNEL {
            if let Some(id) = first.id.channel_id {
                return Ok(SearchHit::Channel(
                    self.resolve_channel(&ChannelRef::Id(id)).await?,
                ));
            }
        }
        Err(ResolveError::UnexpectedShape(format!(
            "unsupported search result kind {:?}",
            first.id.kind
        )))
    }
}
