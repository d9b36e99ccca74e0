use std::collections::HashMap;

use tracing::warn;

use crate::{
    error::{ProviderError, Result},
    management::CacheTtl,
    types::{
        SearchItem, SearchResponse, Snippet, Thumbnail, Thumbnails, ThumbnailsPayload, Video,
        VideoItem, VideosResponse,
    },
    utils::{categorize_video, format_duration, format_view_count},
};

use super::YouTubeClient;

const DEFAULT_DURATION: &str = "0:00";
const DEFAULT_VIEW_COUNT: &str = "0";

const CHANNEL_VIDEO_COUNT: &str = "6";
const SEARCH_VIDEO_COUNT: &str = "10";

/// Duration and view count of one video, already formatted.
#[derive(Debug, Clone, PartialEq)]
struct VideoStats {
    duration: String,
    view_count: String,
}

impl Default for VideoStats {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION.to_string(),
            view_count: DEFAULT_VIEW_COUNT.to_string(),
        }
    }
}

impl From<&VideoItem> for VideoStats {
    fn from(item: &VideoItem) -> Self {
        let duration = item
            .content_details
            .as_ref()
            .and_then(|details| details.duration.as_deref())
            .map(format_duration)
            .unwrap_or_else(|| DEFAULT_DURATION.to_string());

        let view_count = item
            .statistics
            .as_ref()
            .and_then(|stats| stats.view_count.as_deref())
            .map(format_view_count)
            .unwrap_or_else(|| DEFAULT_VIEW_COUNT.to_string());

        Self {
            duration,
            view_count,
        }
    }
}

impl YouTubeClient {
    /// Retrieves the six most recent videos of the channel.
    ///
    /// Cached for one hour under `youtube:videos`.
    pub async fn videos(&self) -> Result<Vec<Video>> {
        let key = self.key("videos", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Medium, || async move {
                let search = self
                    .search(&[
                        ("channelId", self.config.channel_id.as_str()),
                        ("maxResults", CHANNEL_VIDEO_COUNT),
                        ("order", "date"),
                    ])
                    .await?;
                Ok(self.with_stats(search.items).await)
            })
            .await
    }

    /// Retrieves the channel's most viewed video.
    ///
    /// Cached for one hour under `youtube:featured`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] when the channel has no videos.
    pub async fn featured_video(&self) -> Result<Video> {
        let key = self.key("featured", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Medium, || async move {
                let search = self
                    .search(&[
                        ("channelId", self.config.channel_id.as_str()),
                        ("maxResults", "1"),
                        ("order", "viewCount"),
                    ])
                    .await?;

                self.with_stats(search.items)
                    .await
                    .into_iter()
                    .next()
                    .ok_or_else(|| ProviderError::NotFound("featured video".into()))
            })
            .await
    }

    /// Retrieves one video by id, with its statistics in the same call.
    ///
    /// Cached for 24 hours under `youtube:video:{id}`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] when no video has this id.
    pub async fn video(&self, id: &str) -> Result<Video> {
        let key = self.key("video", &[id]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Long, || async move {
                let response: VideosResponse = self
                    .get_json(
                        "videos",
                        &[("part", "snippet,contentDetails,statistics"), ("id", id)],
                    )
                    .await?;

                let item = response
                    .items
                    .into_iter()
                    .next()
                    .ok_or_else(|| ProviderError::NotFound(format!("video {id}")))?;

                let stats = VideoStats::from(&item);
                Ok(build_video(
                    item.id,
                    item.snippet.unwrap_or_default(),
                    stats,
                ))
            })
            .await
    }

    /// Searches all of YouTube for videos matching `query`.
    ///
    /// At most ten results; cached for five minutes under
    /// `youtube:search:{query}`.
    pub async fn search_videos(&self, query: &str) -> Result<Vec<Video>> {
        let key = self.key("search", &[query]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Short, || async move {
                let search = self
                    .search(&[("q", query), ("maxResults", SEARCH_VIDEO_COUNT)])
                    .await?;
                Ok(self.with_stats(search.items).await)
            })
            .await
    }

    async fn search(&self, params: &[(&str, &str)]) -> Result<SearchResponse> {
        let mut query = vec![("part", "snippet"), ("type", "video")];
        query.extend_from_slice(params);
        self.get_json("search", &query).await
    }

    /// Turns search hits into videos, filling in duration and view count
    /// from a single batched `videos` call.
    ///
    /// Hits without a video id are dropped.
    async fn with_stats(&self, items: Vec<SearchItem>) -> Vec<Video> {
        let hits: Vec<(String, Snippet)> = items
            .into_iter()
            .filter_map(|item| Some((item.id.video_id?, item.snippet.unwrap_or_default())))
            .collect();

        let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
        let mut stats = match self.stats_for(&ids).await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "failed to fetch video details, using placeholders");
                HashMap::new()
            }
        };

        hits.into_iter()
            .map(|(id, snippet)| {
                let video_stats = stats.remove(&id).unwrap_or_default();
                build_video(id, snippet, video_stats)
            })
            .collect()
    }

    async fn stats_for(&self, ids: &[&str]) -> Result<HashMap<String, VideoStats>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = ids.join(",");
        let response: VideosResponse = self
            .get_json(
                "videos",
                &[("part", "contentDetails,statistics"), ("id", joined.as_str())],
            )
            .await?;

        Ok(response
            .items
            .iter()
            .map(|item| (item.id.clone(), VideoStats::from(item)))
            .collect())
    }
}

fn build_video(id: String, snippet: Snippet, stats: VideoStats) -> Video {
    let title = snippet.title.unwrap_or_default();
    let description = snippet.description.unwrap_or_default();
    let category = categorize_video(&title, &description);

    Video {
        id,
        title,
        description,
        thumbnails: fill_thumbnails(snippet.thumbnails),
        published_at: snippet.published_at,
        duration: stats.duration,
        view_count: stats.view_count,
        category,
    }
}

/// Picks the three sizes the site uses, substituting the nearest available
/// size for any the upload does not have.
fn fill_thumbnails(payload: ThumbnailsPayload) -> Thumbnails {
    let ThumbnailsPayload {
        default,
        medium,
        high,
        standard,
        maxres,
    } = payload;

    let first = |candidates: [&Option<Thumbnail>; 5]| {
        candidates.into_iter().flatten().next().cloned()
    };

    Thumbnails {
        default: first([&default, &medium, &high, &standard, &maxres]),
        medium: first([&medium, &high, &default, &standard, &maxres]),
        high: first([&high, &standard, &maxres, &medium, &default]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumb(url: &str) -> Option<Thumbnail> {
        Some(Thumbnail {
            url: url.to_string(),
            width: None,
            height: None,
        })
    }

    #[test]
    fn test_fill_thumbnails_substitutes_missing_sizes() {
        let filled = fill_thumbnails(ThumbnailsPayload {
            medium: thumb("m.jpg"),
            ..Default::default()
        });

        assert_eq!(filled.default, thumb("m.jpg"));
        assert_eq!(filled.medium, thumb("m.jpg"));
        assert_eq!(filled.high, thumb("m.jpg"));
    }

    #[test]
    fn test_fill_thumbnails_prefers_own_size() {
        let filled = fill_thumbnails(ThumbnailsPayload {
            default: thumb("d.jpg"),
            high: thumb("h.jpg"),
            maxres: thumb("x.jpg"),
            ..Default::default()
        });

        assert_eq!(filled.default, thumb("d.jpg"));
        assert_eq!(filled.medium, thumb("h.jpg"));
        assert_eq!(filled.high, thumb("h.jpg"));
    }

    #[test]
    fn test_fill_thumbnails_none_available() {
        let filled = fill_thumbnails(ThumbnailsPayload::default());
        assert!(filled.default.is_none() && filled.medium.is_none() && filled.high.is_none());
    }

    #[test]
    fn test_stats_from_video_item() {
        let item: VideoItem = serde_json::from_str(
            r#"{"id":"v1","contentDetails":{"duration":"PT3M7S"},"statistics":{"viewCount":"15320"}}"#,
        )
        .unwrap();

        assert_eq!(
            VideoStats::from(&item),
            VideoStats {
                duration: "3:07".into(),
                view_count: "15.3K".into(),
            }
        );
    }

    #[test]
    fn test_stats_defaults_when_details_missing() {
        let item: VideoItem = serde_json::from_str(r#"{"id":"v1"}"#).unwrap();
        assert_eq!(VideoStats::from(&item), VideoStats::default());
    }

    #[test]
    fn test_build_video_categorizes() {
        let snippet: Snippet = serde_json::from_str(
            r#"{"title":"Static Bloom (Official Video)","description":"Out now","publishedAt":"2024-02-09T17:00:00Z"}"#,
        )
        .unwrap();

        let video = build_video("v1".into(), snippet, VideoStats::default());
        assert_eq!(video.category, crate::types::VideoCategory::Music);
        assert_eq!(video.published_at.as_deref(), Some("2024-02-09T17:00:00Z"));
        assert_eq!(video.duration, "0:00");
    }
}
