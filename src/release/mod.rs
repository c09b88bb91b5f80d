pub mod client;
pub mod content_type;
pub mod enumerate;
pub mod error;
pub mod orchestrator;
pub mod upload;

pub use client::{GitHubReleaseClient, ReleaseApi, UploadedAsset};
pub use content_type::{FALLBACK_CONTENT_TYPE, detect_content_type};
pub use enumerate::{AssetCandidate, enumerate_assets};
pub use error::{Error, Result};
pub use orchestrator::{DEFAULT_MAX_CONCURRENT, UploadOrchestrator};
pub use upload::{AssetPayload, AssetUploader};
