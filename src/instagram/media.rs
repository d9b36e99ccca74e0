use crate::{
    error::{Provider, ProviderError, Result, required},
    management::CacheTtl,
    types::{
        GalleryImage, InstagramProfile, MediaPayload, MediaResponse, MediaType, ProfilePayload,
    },
    utils::clean_caption,
};

use super::InstagramClient;

const PROFILE_FIELDS: &str = "id,username,account_type,media_count";
const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,thumbnail_url,permalink,timestamp";

/// Number of recent posts the gallery is built from.
const GALLERY_MEDIA_LIMIT: u32 = 8;

pub const DEFAULT_CAPTION: &str = "AURA VOX Instagram post";

impl InstagramClient {
    /// Retrieves the account profile.
    ///
    /// Cached for 24 hours under `instagram:profile`.
    pub async fn profile(&self) -> Result<InstagramProfile> {
        let key = self.key("profile", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Long, || async move {
                let payload: ProfilePayload =
                    self.get_json("/me", &[("fields", PROFILE_FIELDS)]).await?;

                Ok(InstagramProfile {
                    id: required(payload.id, Provider::Instagram, "id")?,
                    username: payload.username,
                    account_type: payload.account_type,
                    media_count: payload.media_count,
                })
            })
            .await
    }

    /// Retrieves the `limit` most recent media items, unfiltered.
    ///
    /// Cached for one hour under `instagram:media:{limit}`.
    pub async fn media(&self, limit: u32) -> Result<Vec<MediaPayload>> {
        let limit = limit.to_string();
        let key = self.key("media", &[&limit]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Medium, || async move {
                let response: MediaResponse = self
                    .get_json(
                        "/me/media",
                        &[("fields", MEDIA_FIELDS), ("limit", limit.as_str())],
                    )
                    .await?;
                Ok(response.data)
            })
            .await
    }

    /// Builds the site gallery from the eight most recent posts.
    ///
    /// Only images, carousels and videos are kept. Cached for five minutes
    /// under `instagram:gallery`, on top of the one hour media cache.
    pub async fn gallery(&self) -> Result<Vec<GalleryImage>> {
        let key = self.key("gallery", &[]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Short, || async move {
                self.media(GALLERY_MEDIA_LIMIT)
                    .await?
                    .into_iter()
                    .filter(|item| item.media_type.is_displayable())
                    .map(GalleryImage::try_from)
                    .collect()
            })
            .await
    }

    /// Retrieves a single post by media id.
    ///
    /// Cached for 24 hours under `instagram:post:{id}`.
    pub async fn post(&self, id: &str) -> Result<GalleryImage> {
        let key = self.key("post", &[id]);

        self.cache
            .get_or_fetch(&key, CacheTtl::Long, || async move {
                let payload: MediaPayload = self
                    .get_json(&format!("/{id}"), &[("fields", MEDIA_FIELDS)])
                    .await?;
                GalleryImage::try_from(payload)
            })
            .await
    }
}

impl TryFrom<MediaPayload> for GalleryImage {
    type Error = ProviderError;

    fn try_from(media: MediaPayload) -> Result<Self> {
        let id = required(media.id, Provider::Instagram, "media.id")?;

        let url = match media.media_type {
            MediaType::Video => media.thumbnail_url.clone().or(media.media_url.clone()),
            _ => media.media_url.clone().or(media.thumbnail_url.clone()),
        };
        let thumbnail = media.thumbnail_url.or(media.media_url);

        let caption = media
            .caption
            .as_deref()
            .map(clean_caption)
            .unwrap_or_else(|| DEFAULT_CAPTION.to_string());

        Ok(GalleryImage {
            id,
            url,
            caption,
            thumbnail,
            timestamp: media.timestamp,
            permalink: media.permalink,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(json: &str) -> MediaPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_video_uses_thumbnail_as_url() {
        let image = GalleryImage::try_from(media(
            r#"{"id":"1","media_type":"VIDEO","media_url":"https://cdn/v.mp4","thumbnail_url":"https://cdn/v.jpg"}"#,
        ))
        .unwrap();

        assert_eq!(image.url.as_deref(), Some("https://cdn/v.jpg"));
        assert_eq!(image.thumbnail.as_deref(), Some("https://cdn/v.jpg"));
    }

    #[test]
    fn test_image_uses_media_url() {
        let image = GalleryImage::try_from(media(
            r#"{"id":"2","media_type":"IMAGE","media_url":"https://cdn/p.jpg","caption":"Soundcheck #berlin"}"#,
        ))
        .unwrap();

        assert_eq!(image.url.as_deref(), Some("https://cdn/p.jpg"));
        assert_eq!(image.thumbnail.as_deref(), Some("https://cdn/p.jpg"));
        assert_eq!(image.caption, "Soundcheck");
    }

    #[test]
    fn test_video_without_thumbnail_falls_back() {
        let image = GalleryImage::try_from(media(
            r#"{"id":"3","media_type":"VIDEO","media_url":"https://cdn/v.mp4"}"#,
        ))
        .unwrap();

        assert_eq!(image.url.as_deref(), Some("https://cdn/v.mp4"));
    }

    #[test]
    fn test_missing_caption_uses_default() {
        let image = GalleryImage::try_from(media(r#"{"id":"4","media_type":"IMAGE"}"#)).unwrap();

        assert_eq!(image.caption, DEFAULT_CAPTION);
        assert_eq!(image.url, None);
    }

    #[test]
    fn test_media_without_id_is_malformed() {
        let err = GalleryImage::try_from(media(r#"{"media_type":"IMAGE"}"#)).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }
}
