//! Resolution of photo references into something an HTTP API accepts.

use crate::error::GenerationError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::path::Path;

/// Largest photo sent inline; providers reject bigger request bodies.
pub(crate) const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImageSource {
    /// Fetched by the provider itself.
    Url(String),
    Inline { media_type: String, data: String },
}

impl ImageSource {
    pub(crate) fn into_data_url(self) -> String {
        match self {
            Self::Url(url) => url,
            Self::Inline { media_type, data } => format!("data:{media_type};base64,{data}"),
        }
    }
}

pub(crate) async fn resolve_image(reference: &str) -> Result<ImageSource, GenerationError> {
    resolve_image_within(reference, MAX_IMAGE_BYTES).await
}

async fn resolve_image_within(
    reference: &str,
    max_bytes: u64,
) -> Result<ImageSource, GenerationError> {
    let reference = reference.trim();
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Ok(ImageSource::Url(reference.to_string()));
    }
    if let Some(rest) = reference.strip_prefix("data:") {
        return parse_data_url(rest, max_bytes);
    }

    let path = Path::new(reference);
    let media_type = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| {
            GenerationError::InvalidPayload(format!("Not an image file: {}", path.display()))
        })?;

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|err| {
            GenerationError::InvalidPayload(format!("Failed to read photo {}: {err}", path.display()))
        })?
        .len();
    if size > max_bytes {
        return Err(GenerationError::InvalidPayload(format!(
            "Photo {} is {size} bytes, limit is {max_bytes}",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await.map_err(|err| {
        GenerationError::InvalidPayload(format!("Failed to read photo {}: {err}", path.display()))
    })?;

    Ok(ImageSource::Inline {
        media_type,
        data: BASE64_STANDARD.encode(bytes),
    })
}

fn parse_data_url(rest: &str, max_bytes: u64) -> Result<ImageSource, GenerationError> {
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| GenerationError::InvalidPayload("Malformed data URL".into()))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| GenerationError::InvalidPayload("Data URL is not base64".into()))?;
    if !media_type.starts_with("image/") {
        return Err(GenerationError::InvalidPayload(format!(
            "Unsupported media type: {media_type}"
        )));
    }
    // base64 carries 3 bytes in every 4 characters
    let decoded_len = data.len() as u64 / 4 * 3;
    if decoded_len > max_bytes {
        return Err(GenerationError::InvalidPayload(format!(
            "Inline photo is about {decoded_len} bytes, limit is {max_bytes}"
        )));
    }
    Ok(ImageSource::Inline {
        media_type: media_type.to_string(),
        data: data.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remote_urls_pass_through() {
        let source = resolve_image("https://example.com/bori.jpg").await.unwrap();
        assert_eq!(source, ImageSource::Url("https://example.com/bori.jpg".into()));
    }

    #[tokio::test]
    async fn data_urls_are_split() {
        let source = resolve_image("data:image/png;base64,AAAA").await.unwrap();
        assert_eq!(
            source,
            ImageSource::Inline {
                media_type: "image/png".into(),
                data: "AAAA".into()
            }
        );
        assert_eq!(source.into_data_url(), "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn local_files_are_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bori.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let source = resolve_image(path.to_str().unwrap()).await.unwrap();
        match source {
            ImageSource::Inline { media_type, data } => {
                assert_eq!(media_type, "image/jpeg");
                assert_eq!(data, BASE64_STANDARD.encode([0xFF, 0xD8, 0xFF]));
            }
            other => panic!("expected inline image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_photos_are_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        let reference = path.to_str().unwrap();

        let err = resolve_image_within(reference, 1024).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(ref msg) if msg.contains("limit")));
        assert!(resolve_image_within(reference, 4096).await.is_ok());

        let err = resolve_image_within("data:image/png;base64,AAAAAAAA", 3).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn non_images_are_rejected() {
        let err = resolve_image("/tmp/notes.txt").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }
}
