use async_trait::async_trait;
use reqwest::{
    Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
};
use serde::Deserialize;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use super::error::{Error, Result};
use super::upload::AssetPayload;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("release-assets/", env!("CARGO_PKG_VERSION"));

/// An asset as reported back by the release API after upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub id: Option<u64>,
    pub name: String,
    pub browser_download_url: String,
}

/// Remote release-hosting API
///
/// One call uploads one complete asset body and yields its canonical
/// download URL.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    async fn upload_asset(&self, upload_url: &str, payload: AssetPayload) -> Result<UploadedAsset>;
}

#[derive(Deserialize)]
struct ReleaseAssetResponse {
    id: Option<u64>,
    name: Option<String>,
    browser_download_url: Option<String>,
}

/// GitHub implementation of [`ReleaseApi`]
#[derive(Clone)]
pub struct GitHubReleaseClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl GitHubReleaseClient {
    /// Create a client authenticating with `token`
    ///
    /// `timeout` bounds each upload request, including the body transfer.
    pub fn new(token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

#[async_trait]
impl ReleaseApi for GitHubReleaseClient {
    async fn upload_asset(&self, upload_url: &str, payload: AssetPayload) -> Result<UploadedAsset> {
        let url = asset_upload_url(upload_url, &payload.name)?;
        let name = payload.name;

        let mut request = self
            .client
            .post(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(CONTENT_TYPE, payload.content_type)
            .header(CONTENT_LENGTH, payload.size)
            .body(payload.bytes);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::from_request_error(&name, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::from_request_error(&name, e))?;

        if !status.is_success() {
            return Err(Error::from_status(&name, status, &text));
        }

        parse_upload_response(&name, &text)
    }
}

/// Expand the release's upload URL for one asset
///
/// GitHub hands out upload URLs with an RFC 6570 query template such as
/// `.../assets{?name,label}`. The template is dropped and the asset name is
/// set as the `name` query parameter.
pub fn asset_upload_url(upload_url: &str, name: &str) -> Result<Url> {
    let base = match upload_url.find('{') {
        Some(idx) => &upload_url[..idx],
        None => upload_url,
    };

    let mut url = Url::parse(base).map_err(|e| {
        Error::Configuration(format!("Invalid upload_url '{}': {}", upload_url, e))
    })?;

    let existing: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "name")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(existing)
        .append_pair("name", name);

    Ok(url)
}

/// Extract the download URL from an upload response body
pub fn parse_upload_response(name: &str, body: &str) -> Result<UploadedAsset> {
    let response: ReleaseAssetResponse =
        serde_json::from_str(body).map_err(|e| Error::Protocol {
            name: name.to_string(),
            message: format!("response is not a release asset: {}", e),
        })?;

    match response.browser_download_url {
        Some(url) if !url.trim().is_empty() => Ok(UploadedAsset {
            id: response.id,
            name: response.name.unwrap_or_else(|| name.to_string()),
            browser_download_url: url,
        }),
        _ => Err(Error::Protocol {
            name: name.to_string(),
            message: "response has no browser_download_url".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str =
        "https://uploads.github.com/repos/octo/tool/releases/42/assets{?name,label}";

    #[test]
    fn test_asset_upload_url_strips_template() {
        let url = asset_upload_url(TEMPLATE, "tool-v1.0.tar.gz").unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/octo/tool/releases/42/assets?name=tool-v1.0.tar.gz"
        );
    }

    #[test]
    fn test_asset_upload_url_encodes_name() {
        let url = asset_upload_url(TEMPLATE, "my tool&co.zip").unwrap();
        let name = url
            .query_pairs()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.into_owned());
        assert_eq!(name.as_deref(), Some("my tool&co.zip"));
    }

    #[test]
    fn test_asset_upload_url_replaces_existing_name() {
        let url = asset_upload_url("http://localhost:8080/assets?name=old&label=x", "new.zip").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/assets?label=x&name=new.zip");
    }

    #[test]
    fn test_asset_upload_url_invalid() {
        let err = asset_upload_url("not a url", "a.zip").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_parse_upload_response() {
        let body = r#"{"id": 7, "name": "a.zip", "state": "uploaded",
            "browser_download_url": "https://github.com/octo/tool/releases/download/v1/a.zip"}"#;
        let asset = parse_upload_response("a.zip", body).unwrap();
        assert_eq!(asset.id, Some(7));
        assert_eq!(
            asset.browser_download_url,
            "https://github.com/octo/tool/releases/download/v1/a.zip"
        );
    }

    #[test]
    fn test_parse_upload_response_missing_url() {
        let err = parse_upload_response("a.zip", r#"{"id": 7, "name": "a.zip"}"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));

        let err = parse_upload_response("a.zip", r#"{"browser_download_url": ""}"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_parse_upload_response_malformed() {
        let err = parse_upload_response("a.zip", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(err.to_string().contains("a.zip"));
    }
}
