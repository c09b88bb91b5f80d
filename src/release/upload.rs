use std::sync::Arc;
use tracing::{debug, info};

use super::client::ReleaseApi;
use super::content_type::detect_content_type;
use super::enumerate::AssetCandidate;
use super::error::{Error, Result};

/// A fully read asset, ready to be sent as one request body
///
/// Files are read into memory in one go; very large assets are bounded by
/// available memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPayload {
    pub name: String,
    pub content_type: &'static str,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl AssetPayload {
    /// Read a candidate's content and classify it
    pub async fn read(candidate: &AssetCandidate) -> Result<Self> {
        let bytes = tokio::fs::read(&candidate.path)
            .await
            .map_err(|source| Error::Read {
                name: candidate.name.clone(),
                source,
            })?;

        Ok(Self {
            name: candidate.name.clone(),
            content_type: detect_content_type(&candidate.name),
            size: bytes.len() as u64,
            bytes,
        })
    }
}

/// Uploads single assets to one release
#[derive(Clone)]
pub struct AssetUploader {
    api: Arc<dyn ReleaseApi>,
    upload_url: String,
}

impl AssetUploader {
    pub fn new(api: Arc<dyn ReleaseApi>, upload_url: impl Into<String>) -> Self {
        Self {
            api,
            upload_url: upload_url.into(),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Upload one asset and return its public download URL
    pub async fn upload(&self, candidate: &AssetCandidate) -> Result<String> {
        let payload = AssetPayload::read(candidate).await?;

        debug!(
            "Uploading {} ({}, {} bytes)",
            payload.name, payload.content_type, payload.size
        );

        let asset = self.api.upload_asset(&self.upload_url, payload).await?;

        info!("Uploaded {} → {}", candidate.name, asset.browser_download_url);
        Ok(asset.browser_download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::client::{MockReleaseApi, UploadedAsset};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::TempDir;

    fn candidate(dir: &TempDir, name: &str, content: &[u8]) -> AssetCandidate {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        AssetCandidate {
            name: name.to_string(),
            path,
        }
    }

    #[tokio::test]
    async fn test_read_payload() {
        let dir = TempDir::new().unwrap();
        let candidate = candidate(&dir, "tool.zip", b"test content");

        let payload = AssetPayload::read(&candidate).await.unwrap();

        assert_eq!(payload.name, "tool.zip");
        assert_eq!(payload.content_type, "application/zip");
        assert_eq!(payload.size, 12);
        assert_eq!(payload.bytes, b"test content");
    }

    #[tokio::test]
    async fn test_read_payload_missing_file() {
        let dir = TempDir::new().unwrap();
        let candidate = AssetCandidate {
            name: "gone.bin".to_string(),
            path: dir.path().join("gone.bin"),
        };

        let err = AssetPayload::read(&candidate).await.unwrap_err();

        assert!(matches!(err, Error::Read { ref name, .. } if name == "gone.bin"));
    }

    #[tokio::test]
    async fn test_upload_sends_payload_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let candidate = candidate(&dir, "notes.unknownext123", b"abc");

        let mut api = MockReleaseApi::new();
        api.expect_upload_asset()
            .with(
                eq("https://uploads.example.com/assets{?name,label}"),
                eq(AssetPayload {
                    name: "notes.unknownext123".to_string(),
                    content_type: "application/x-binary",
                    size: 3,
                    bytes: b"abc".to_vec(),
                }),
            )
            .times(1)
            .returning(|_, payload| {
                Ok(UploadedAsset {
                    id: Some(1),
                    browser_download_url: format!("https://dl.example.com/{}", payload.name),
                    name: payload.name,
                })
            });

        let uploader = AssetUploader::new(
            Arc::new(api),
            "https://uploads.example.com/assets{?name,label}",
        );
        let url = uploader.upload(&candidate).await.unwrap();

        assert_eq!(url, "https://dl.example.com/notes.unknownext123");
    }

    #[tokio::test]
    async fn test_upload_unreadable_file_skips_api() {
        let dir = TempDir::new().unwrap();
        let candidate = AssetCandidate {
            name: "gone.bin".to_string(),
            path: dir.path().join("gone.bin"),
        };

        let mut api = MockReleaseApi::new();
        api.expect_upload_asset().times(0);

        let uploader = AssetUploader::new(Arc::new(api), "https://uploads.example.com/assets");
        let err = uploader.upload(&candidate).await.unwrap_err();

        assert!(matches!(err, Error::Read { .. }));
    }
}
