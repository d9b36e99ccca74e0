use crate::{
    error::{Provider, ProviderError, Result, required},
    management::CacheTtl,
    types::{Album, AlbumPayload, Paging},
};

use super::{SpotifyClient, artists::artists_from};

/// Release groups listed on the site, in Spotify's `include_groups` syntax.
const INCLUDE_GROUPS: &str = "album,single,compilation";
const ALBUM_LIMIT: &str = "5";

impl SpotifyClient {
    /// Retrieves the artist's latest releases.
    ///
    /// Albums, singles and compilations are requested together and capped at
    /// five entries. Cached for 24 hours under `spotify:albums`.
    ///
    /// # Errors
    ///
    /// Fails when the request fails with nothing cached, or when any returned
    /// album lacks an id or name.
    pub async fn albums(&self) -> Result<Vec<Album>> {
        let key = self.key("albums", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Long, || async move {
                let path = format!("/artists/{}/albums", self.config.artist_id);
                let page: Paging<AlbumPayload> = self
                    .get_json(
                        &path,
                        &[
                            ("include_groups", INCLUDE_GROUPS),
                            ("limit", ALBUM_LIMIT),
                            ("market", self.config.market.as_str()),
                        ],
                    )
                    .await?;

                page.items.into_iter().map(Album::try_from).collect()
            })
            .await
    }
}

impl TryFrom<AlbumPayload> for Album {
    type Error = ProviderError;

    fn try_from(payload: AlbumPayload) -> Result<Self> {
        Ok(Album {
            id: required(payload.id, Provider::Spotify, "album.id")?,
            name: required(payload.name, Provider::Spotify, "album.name")?,
            album_type: payload.album_type.unwrap_or_else(|| "album".to_string()),
            release_date: payload.release_date.unwrap_or_default(),
            images: payload.images,
            artists: artists_from(payload.artists)?,
        })
    }
}
