/// Content type used when an asset's extension is unknown or absent
pub const FALLBACK_CONTENT_TYPE: &str = "application/x-binary";

/// Detect Content-Type based on an asset's file name
///
/// Uses the standard extension-to-MIME table from `mime_guess`. Unknown
/// extensions fall back to [`FALLBACK_CONTENT_TYPE`] so that no upload is
/// refused for lack of a type.
pub fn detect_content_type(name: &str) -> &'static str {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}
