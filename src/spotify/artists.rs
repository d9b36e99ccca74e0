use crate::{
    error::{Provider, Result, required},
    management::CacheTtl,
    types::{Artist, ArtistPayload, Followers},
};

use super::SpotifyClient;

impl SpotifyClient {
    /// Retrieves the configured artist's profile.
    ///
    /// Cached for 24 hours under `spotify:artist:{id}`.
    pub async fn artist_profile(&self) -> Result<Artist> {
        let artist_id = self.config.artist_id.clone();
        let key = self.key("artist", &[&artist_id]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Long, || async move {
                let payload: ArtistPayload =
                    self.get_json(&format!("/artists/{artist_id}"), &[]).await?;
                Artist::try_from(payload)
            })
            .await
    }

    /// Checks that the Web API is reachable with the configured credentials.
    ///
    /// Bypasses the cache so a stale entry cannot hide an outage.
    pub async fn probe(&self) -> Result<()> {
        let path = format!("/artists/{}", self.config.artist_id);
        self.get_json::<ArtistPayload>(&path, &[]).await.map(|_| ())
    }
}

impl TryFrom<ArtistPayload> for Artist {
    type Error = crate::error::ProviderError;

    fn try_from(payload: ArtistPayload) -> Result<Self> {
        Ok(Artist {
            id: required(payload.id, Provider::Spotify, "artist.id")?,
            name: required(payload.name, Provider::Spotify, "artist.name")?,
            images: payload.images,
            followers: payload
                .followers
                .and_then(|f| f.total)
                .map(|total| Followers { total }),
        })
    }
}

/// Converts every artist in a payload list, failing on the first bad one.
pub(crate) fn artists_from(payloads: Vec<ArtistPayload>) -> Result<Vec<Artist>> {
    payloads.into_iter().map(Artist::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_from_payload() {
        let payload: ArtistPayload = serde_json::from_str(
            r#"{"id":"a1","name":"AURA VOX","followers":{"href":null,"total":1200},
                "images":[{"url":"https://i.scdn.co/a.jpg","height":640,"width":640}]}"#,
        )
        .unwrap();

        let artist = Artist::try_from(payload).unwrap();
        assert_eq!(artist.name, "AURA VOX");
        assert_eq!(artist.followers, Some(Followers { total: 1200 }));
        assert_eq!(artist.images[0].height, Some(640));
    }

    #[test]
    fn test_artist_without_name_is_malformed() {
        let payload: ArtistPayload = serde_json::from_str(r#"{"id":"a1"}"#).unwrap();
        let err = Artist::try_from(payload).unwrap_err();
        assert!(err.to_string().contains("artist.name"));
    }
}
