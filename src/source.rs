//! Getting the nutrition PDF onto disk and its pages out as text.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

pub const DEFAULT_PDF_URL: &str =
    "https://www.starbucks.at/sites/starbucks-at-pwa/files/2025-04/AT%20Beverage%20Nutrition%20Summer.pdf";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("could not extract text from {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Where the PDF comes from and where the downloaded copy and results live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub pdf_url: String,
    pub output_file: PathBuf,
    pub pdf_file: PathBuf,
    pub md5_file: PathBuf,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            pdf_url: DEFAULT_PDF_URL.to_string(),
            output_file: PathBuf::from("nutrition_data.json"),
            pdf_file: PathBuf::from("starbucks_nutrition.pdf"),
            md5_file: PathBuf::from("starbucks_nutrition.md5"),
        }
    }
}

pub fn build_client() -> Result<Client, SourceError> {
    let client = Client::builder()
        // Avoid macOS system proxy lookup that can panic in sandboxed contexts.
        .no_proxy()
        .user_agent("beverage-nutrition/0.1")
        .build()?;
    Ok(client)
}

/// Lower-case hex MD5 of a file, read in 4 KiB chunks.
pub fn file_md5(path: &Path) -> Result<String, SourceError> {
    let mut file = File::open(path).map_err(|err| SourceError::io(path, err))?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; 4096];
    loop {
        let read = file.read(&mut buf).map_err(|err| SourceError::io(path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Whether the local PDF is missing or no longer matches its stored hash.
pub fn should_download(config: &ExtractorConfig) -> bool {
    if !config.pdf_file.exists() {
        info!("PDF file not found, will download");
        return true;
    }
    if !config.md5_file.exists() {
        info!("MD5 file not found, will re-download PDF");
        return true;
    }

    let stored = match std::fs::read_to_string(&config.md5_file) {
        Ok(value) => value.trim().to_string(),
        Err(err) => {
            warn!("Error reading MD5 file ({err}), will re-download PDF");
            return true;
        }
    };
    let current = match file_md5(&config.pdf_file) {
        Ok(value) => value,
        Err(err) => {
            warn!("Error hashing PDF ({err}), will re-download");
            return true;
        }
    };

    if current == stored {
        info!("PDF unchanged (MD5: {current}), using existing file");
        false
    } else {
        info!("PDF changed (old: {stored}, new: {current}), will re-download");
        true
    }
}

/// Stream the PDF to `pdf_file` and record its hash next to it.
pub async fn download_pdf(client: &Client, config: &ExtractorConfig) -> Result<String, SourceError> {
    info!("Downloading PDF from {}", config.pdf_url);
    let mut resp = client.get(&config.pdf_url).send().await?.error_for_status()?;

    let path = &config.pdf_file;
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|err| SourceError::io(path, err))?;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|err| SourceError::io(path, err))?;
    }
    file.flush().await.map_err(|err| SourceError::io(path, err))?;

    let hash = file_md5(path)?;
    tokio::fs::write(&config.md5_file, &hash)
        .await
        .map_err(|err| SourceError::io(&config.md5_file, err))?;
    info!("PDF downloaded successfully (MD5: {hash})");
    Ok(hash)
}

/// Download the PDF when forced or when change detection asks for it.
pub async fn ensure_pdf(client: &Client, config: &ExtractorConfig, force: bool) -> Result<(), SourceError> {
    if force || should_download(config) {
        download_pdf(client, config).await?;
    }
    Ok(())
}

/// Text of every page, in page order, with table cells separated by tabs.
pub fn pdf_page_texts(path: &Path) -> Result<Vec<String>, SourceError> {
    let bytes = std::fs::read(path).map_err(|err| SourceError::io(path, err))?;
    crate::layout::page_texts(&bytes).map_err(|err| SourceError::Pdf {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// [`pdf_page_texts`] on a blocking thread.
pub async fn load_page_texts(path: &Path) -> Result<Vec<String>, SourceError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || pdf_page_texts(&path)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello world").unwrap();
        assert_eq!(file_md5(&path).unwrap(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = file_md5(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn default_config_points_at_the_published_pdf() {
        let config = ExtractorConfig::default();
        assert!(config.pdf_url.ends_with(".pdf"));
        assert_eq!(config.output_file, PathBuf::from("nutrition_data.json"));
    }
}
