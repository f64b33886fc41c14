use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{EmbeddedMedia, Field, MediaContent, MediaFile, ValidatedDraft, ValidationErrors};

/// Read the bytes of an attached file
pub async fn read_media(file: &MediaFile) -> Result<Vec<u8>> {
    match &file.content {
        MediaContent::Bytes(bytes) => Ok(bytes.clone()),
        MediaContent::Path(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Size of the content actually behind an attachment, whatever it declares
pub async fn actual_size(file: &MediaFile) -> Result<u64> {
    match &file.content {
        MediaContent::Bytes(bytes) => Ok(bytes.len() as u64),
        MediaContent::Path(path) => Ok(tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len()),
    }
}

/// Encode bytes as a `data:` URL
pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

fn media_error(file: &MediaFile) -> impl FnOnce(anyhow::Error) -> StoreError + '_ {
    move |source| StoreError::Media {
        name: file.name.clone(),
        source: source.into(),
    }
}

fn oversized(file: &MediaFile, field: Field, size: u64, config: &StoreConfig) -> StoreError {
    warn!(
        "{} is {} bytes but declared {}, rejecting",
        file.name, size, file.size
    );
    StoreError::Validation(ValidationErrors::too_large(field, config))
}

async fn embed(file: &MediaFile, field: Field, config: &StoreConfig) -> Result<String, StoreError> {
    let limit = match field {
        Field::Video => config.max_video_bytes,
        _ => config.max_image_bytes,
    };

    // The file may have grown since it was declared; check before reading it in.
    let size = actual_size(file).await.map_err(media_error(file))?;
    if size > limit {
        return Err(oversized(file, field, size, config));
    }
    let bytes = read_media(file).await.map_err(media_error(file))?;
    if bytes.len() as u64 > limit {
        return Err(oversized(file, field, bytes.len() as u64, config));
    }

    debug!("Embedded {} ({} bytes)", file.name, bytes.len());
    Ok(to_data_url(&file.media_type, &bytes))
}

/// Read every attachment of a draft into inline payloads.
///
/// Size limits are enforced against the real content, not the declared size.
/// Fails on the first unreadable or oversized file; nothing is returned
/// partially.
pub async fn embed_media(
    draft: &ValidatedDraft,
    config: &StoreConfig,
) -> Result<EmbeddedMedia, StoreError> {
    let mut images = Vec::with_capacity(draft.image_files().len());
    for file in draft.image_files() {
        images.push(embed(file, Field::Images, config).await?);
    }
    let video = match draft.video_file() {
        Some(file) => Some(embed(file, Field::Video, config).await?),
        None => None,
    };
    Ok(EmbeddedMedia { images, video })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::models::ListingDraft;

    fn draft(image_files: Vec<MediaFile>, video_file: Option<MediaFile>) -> ValidatedDraft {
        ListingDraft {
            breed: "Jersey".to_string(),
            age: 3.0,
            milk_yield: 12.0,
            price: 45000.0,
            district: "Salem".to_string(),
            image_files,
            video_file,
            ..Default::default()
        }
        .validate(&StoreConfig::default())
        .expect("valid draft")
    }

    #[test]
    fn data_url_shape() {
        assert_eq!(to_data_url("image/png", &[0, 1, 2]), "data:image/png;base64,AAEC");
    }

    #[tokio::test]
    async fn embeds_bytes_and_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cow.mp4");
        std::fs::write(&path, b"moo").expect("write video");

        let media = embed_media(
            &draft(
                vec![MediaFile::from_bytes("a.png", "image/png", vec![0, 1, 2])],
                Some(MediaFile::from_path("cow.mp4", "video/mp4", 3, &path)),
            ),
            &StoreConfig::default(),
        )
        .await
        .expect("embed");

        assert_eq!(media.images, vec!["data:image/png;base64,AAEC".to_string()]);
        assert_eq!(media.video.as_deref(), Some("data:video/mp4;base64,bW9v"));
    }

    #[tokio::test]
    async fn unreadable_file_names_the_attachment() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = MediaFile::from_path("gone.jpg", "image/jpeg", 10, dir.path().join("gone.jpg"));

        let err = embed_media(&draft(vec![missing], None), &StoreConfig::default())
            .await
            .expect_err("read fails");
        match err {
            StoreError::Media { name, .. } => assert_eq!(name, "gone.jpg"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn understated_file_size_is_caught_on_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("big.jpg");
        std::fs::write(&path, vec![0u8; 6 * 1024 * 1024]).expect("write image");
        let understated = MediaFile::from_path("big.jpg", "image/jpeg", 10, &path);

        let err = embed_media(&draft(vec![understated], None), &StoreConfig::default())
            .await
            .expect_err("too big");
        match err {
            StoreError::Validation(errors) => {
                assert_eq!(errors.get(Field::Images), Some("Each image must be <= 5MB"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn understated_byte_size_is_caught() {
        let config = StoreConfig {
            max_video_bytes: 4,
            ..Default::default()
        };
        let mut video = MediaFile::from_bytes("cow.mp4", "video/mp4", vec![0; 8]);
        video.size = 2;
        let validated = ListingDraft {
            breed: "Jersey".to_string(),
            age: 3.0,
            milk_yield: 12.0,
            price: 45000.0,
            district: "Salem".to_string(),
            video_file: Some(video),
            ..Default::default()
        }
        .validate(&config)
        .expect("declared size passes");

        let err = embed_media(&validated, &config).await.expect_err("too big");
        assert!(matches!(err, StoreError::Validation(ref e) if e.get(Field::Video).is_some()));
    }
}
