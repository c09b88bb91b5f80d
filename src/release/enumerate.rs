use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::{Error, Result};

/// A file in the asset directory that will be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCandidate {
    pub name: String,
    pub path: PathBuf,
}

/// Whether a directory entry name is hidden (starts with a dot)
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// List the assets directly inside `dir`
///
/// Hidden entries and subdirectories are skipped; the directory is not
/// walked recursively. Names that are not valid UTF-8 are kept in their
/// lossy form and still uploaded from their real path. Candidates are
/// sorted by name so that the output order does not depend on the
/// filesystem's listing order.
///
/// # Errors
///
/// Returns [`Error::Enumeration`] if the directory cannot be listed. No
/// partial listing is returned.
pub async fn enumerate_assets(dir: &Path) -> Result<Vec<AssetCandidate>> {
    let enumeration_error = |source| Error::Enumeration {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(enumeration_error)?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(enumeration_error)? {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if file_name.to_str().is_none() {
            warn!("Asset name is not valid UTF-8, uploading as '{}'", name);
        }

        if is_hidden(&name) {
            debug!("Skipping hidden entry: {}", name);
            continue;
        }

        let path = entry.path();
        // Follows symlinks; a dangling link is kept and fails at read time.
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            debug!("Skipping subdirectory: {}", name);
            continue;
        }

        candidates.push(AssetCandidate {
            name: name.into_owned(),
            path,
        });
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(candidates)
}
