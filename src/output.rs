use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Name of the output carrying the uploaded assets' download URLs
pub const DOWNLOAD_URLS_OUTPUT: &str = "browser_download_urls";

/// Reports results back to the workflow that invoked the uploader
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    output_file: Option<PathBuf>,
}

impl ActionOutput {
    /// Use the `GITHUB_OUTPUT` file when running inside GitHub Actions
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from))
    }

    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self {
            output_file: output_file.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Publish the download URLs as a JSON array
    ///
    /// Returns the serialized value, which is also written to stdout.
    pub fn set_download_urls(&self, urls: &[String]) -> Result<String> {
        let value = serde_json::to_string(urls).context("Failed to serialize download URLs")?;
        self.set_output(DOWNLOAD_URLS_OUTPUT, &value)?;
        println!("{}", value);
        Ok(value)
    }

    /// Set a named output, appending to the output file if there is one
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.output_file else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        writeln!(file, "{}", format_output(name, value))
            .with_context(|| format!("Failed to write output file {}", path.display()))?;

        Ok(())
    }

    /// Report the run as failed with `message`
    pub fn set_failed(&self, message: &str) {
        println!("::error::{}", escape_data(message));
    }
}

/// Format one `name=value` output entry, using a heredoc for multi-line values
fn format_output(name: &str, value: &str) -> String {
    if value.contains('\n') {
        let delimiter = format!("ghadelimiter_{}", std::process::id());
        format!("{}<<{}\n{}\n{}", name, delimiter, value, delimiter)
    } else {
        format!("{}={}", name, value)
    }
}

/// Escape a workflow command message
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_set_download_urls_appends_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("github_output");
        fs::write(&path, "previous=1\n").unwrap();

        let output = ActionOutput::new(Some(path.clone()));
        let urls = vec![
            "https://github.com/o/r/releases/download/v1/a.zip".to_string(),
            "https://github.com/o/r/releases/download/v1/b.zip".to_string(),
        ];
        let value = output.set_download_urls(&urls).unwrap();

        let expected = format!("previous=1\nbrowser_download_urls={}\n", value);
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
        assert_eq!(serde_json::from_str::<Vec<String>>(&value).unwrap(), urls);
    }

    #[test]
    fn test_set_download_urls_empty() {
        let output = ActionOutput::new(None);
        assert_eq!(output.set_download_urls(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_format_output_multiline() {
        assert_eq!(format_output("k", "v"), "k=v");

        let formatted = format_output("k", "a\nb");
        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("k<<ghadelimiter_"));
        assert_eq!(lines[1], "a");
        assert_eq!(lines[2], "b");
        assert_eq!(lines[3], &lines[0][3..]);
    }

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("disk full"), "disk full");
        assert_eq!(escape_data("50% done\nnext"), "50%25 done%0Anext");
    }
}
