use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while uploading a directory of release assets
#[derive(Error, Debug)]
pub enum Error {
    /// A required input is missing or invalid
    #[error("{0}")]
    Configuration(String),

    /// The asset directory could not be listed
    #[error("Failed to read asset directory {}: {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An individual asset could not be read
    #[error("Failed to read asset '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Network failure or non-success response from the release API
    #[error("Failed to upload asset '{name}': {message}")]
    Transport { name: String, message: String },

    /// A success response without a usable download URL
    #[error("Unexpected response uploading asset '{name}': {message}")]
    Protocol { name: String, message: String },

    /// An upload worker died before reporting its result
    #[error("Upload worker failed: {0}")]
    Worker(String),
}

impl Error {
    /// Build a transport error from a reqwest failure
    pub fn from_request_error(name: &str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {}", error)
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else {
            error.to_string()
        };

        Self::Transport {
            name: name.to_string(),
            message,
        }
    }

    /// Build a transport error from a non-success HTTP status and its body
    pub fn from_status(name: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("API call failed with status {}", status)
        } else {
            format!("API call failed with status {}: {}", status, body)
        };

        Self::Transport {
            name: name.to_string(),
            message,
        }
    }

    /// Asset name this error is about, if it concerns a single asset
    pub fn asset_name(&self) -> Option<&str> {
        match self {
            Self::Read { name, .. } | Self::Transport { name, .. } | Self::Protocol { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// Result type for release asset operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_body() {
        let err = Error::from_status("app.zip", reqwest::StatusCode::INTERNAL_SERVER_ERROR, "disk full\n");
        assert_eq!(
            err.to_string(),
            "Failed to upload asset 'app.zip': API call failed with status 500 Internal Server Error: disk full"
        );
        assert_eq!(err.asset_name(), Some("app.zip"));
    }

    #[test]
    fn test_status_error_empty_body() {
        let err = Error::from_status("app.zip", reqwest::StatusCode::UNPROCESSABLE_ENTITY, "");
        assert!(err.to_string().ends_with("API call failed with status 422 Unprocessable Entity"));
    }

    #[test]
    fn test_read_error_keeps_cause() {
        let err = Error::Read {
            name: "notes.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(err.asset_name(), Some("notes.txt"));
    }

    #[test]
    fn test_configuration_error_message() {
        let err = Error::Configuration("Input required and not supplied: upload_url".to_string());
        assert_eq!(err.to_string(), "Input required and not supplied: upload_url");
        assert_eq!(err.asset_name(), None);
    }
}
