use crate::{
    error::{Provider, ProviderError, Result, required},
    management::CacheTtl,
    types::{Album, SearchTracksResponse, TopTracksResponse, Track, TrackPayload},
};

use super::{SpotifyClient, artists::artists_from};

/// Number of top tracks shown in the "popular" list.
const POPULAR_TRACK_COUNT: usize = 4;
const SEARCH_LIMIT: &str = "10";

impl SpotifyClient {
    /// Retrieves the artist's single most popular track.
    ///
    /// Cached for one hour under `spotify:featured-track`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotFound`] when the artist has no top tracks.
    pub async fn featured_track(&self) -> Result<Track> {
        let key = self.key("featured-track", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Medium, || async move {
                let first = self.top_tracks().await?.into_iter().next();
                let payload =
                    first.ok_or_else(|| ProviderError::NotFound("featured track".into()))?;
                Track::try_from(payload)
            })
            .await
    }

    /// Retrieves the first four of the artist's top tracks.
    ///
    /// Cached for five minutes under `spotify:popular-tracks`.
    pub async fn popular_tracks(&self) -> Result<Vec<Track>> {
        let key = self.key("popular-tracks", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Short, || async move {
                self.top_tracks()
                    .await?
                    .into_iter()
                    .take(POPULAR_TRACK_COUNT)
                    .map(Track::try_from)
                    .collect()
            })
            .await
    }

    /// Retrieves a single track by its Spotify id.
    ///
    /// Cached for 24 hours under `spotify:track:{id}`.
    pub async fn track(&self, id: &str) -> Result<Track> {
        let key = self.key("track", &[id]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Long, || async move {
                let payload: TrackPayload = self
                    .get_json(
                        &format!("/tracks/{id}"),
                        &[("market", self.config.market.as_str())],
                    )
                    .await?;
                Track::try_from(payload)
            })
            .await
    }

    /// Searches the whole Spotify catalog for tracks matching `query`.
    ///
    /// At most ten results; cached for five minutes under
    /// `spotify:search:{query}`. A response without a `tracks` page yields an
    /// empty list.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let key = self.key("search", &[query]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Short, || async move {
                let response: SearchTracksResponse = self
                    .get_json(
                        "/search",
                        &[("q", query), ("type", "track"), ("limit", SEARCH_LIMIT)],
                    )
                    .await?;

                response
                    .tracks
                    .map(|page| page.items)
                    .unwrap_or_default()
                    .into_iter()
                    .map(Track::try_from)
                    .collect()
            })
            .await
    }

    async fn top_tracks(&self) -> Result<Vec<TrackPayload>> {
        let path = format!("/artists/{}/top-tracks", self.config.artist_id);
        let response: TopTracksResponse = self
            .get_json(&path, &[("market", self.config.market.as_str())])
            .await?;
        Ok(response.tracks)
    }
}

impl TryFrom<TrackPayload> for Track {
    type Error = ProviderError;

    fn try_from(payload: TrackPayload) -> Result<Self> {
        let album = required(payload.album, Provider::Spotify, "track.album")?;

        Ok(Track {
            id: required(payload.id, Provider::Spotify, "track.id")?,
            name: required(payload.name, Provider::Spotify, "track.name")?,
            duration_ms: payload.duration_ms.unwrap_or(0),
            popularity: payload.popularity.unwrap_or(0),
            album: Album::try_from(album)?,
            artists: artists_from(payload.artists)?,
            preview_url: payload.preview_url,
        })
    }
}
