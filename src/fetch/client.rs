// src/fetch/client.rs

//! HTTP client for package downloads
//!
//! Wraps a blocking reqwest client with the configured timeout. Bodies
//! are streamed to a temporary file next to the destination and renamed
//! into place, so an interrupted transfer never leaves a truncated
//! package under the real name.

use indicatif::ProgressBar;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_LENGTH;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::decision::RemoteProbe;
use crate::error::{Error, Result};

/// Maximum attempts when the connection itself fails
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// Buffer size for streaming downloads (64 KB)
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Path used while a download is in flight: `<dest>.tmp`
pub fn partial_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest_path.with_file_name(name)
}

/// Stream an HTTP response into a file, updating the progress bar
fn stream_response_to_file(
    mut response: reqwest::blocking::Response,
    file: &mut File,
    progress_bar: Option<&ProgressBar>,
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    file.flush()
        .map_err(|e| Error::IoError(format!("Failed to flush data: {e}")))?;
    Ok(downloaded)
}

/// Blocking HTTP client for package transfers
pub struct TransferClient {
    client: Client,
    max_retries: u32,
}

impl TransferClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rpmget/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Override how many times a failed connection is attempted
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Ask the server for a resource's size without downloading it
    ///
    /// Reads the `Content-Length` header of a HEAD response directly;
    /// returns `None` on any failure or when the header is absent.
    pub fn content_length(&self, url: &str) -> Option<u64> {
        let response = match self.client.head(url).send() {
            Ok(response) => response,
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("HEAD {} returned {}", url, response.status());
            return None;
        }

        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Download a URL to `dest_path`, returning the number of bytes written
    ///
    /// On any failure the partial file is removed before the error is
    /// returned; an existing file at `dest_path` is left untouched.
    pub fn download_file_with_progress(
        &self,
        url: &str,
        dest_path: &Path,
        display_name: &str,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<u64> {
        info!("Downloading {} to {}", url, dest_path.display());

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => break response,
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to download {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Download attempt {} failed: {}, retrying...", attempt, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        };

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        debug!("File size: {}", total_size);
        if let Some(pb) = progress_bar {
            if total_size > 0 {
                pb.set_length(total_size);
            }
            pb.set_message(display_name.to_string());
        }

        let temp_path = partial_path(dest_path);
        let result = File::create(&temp_path)
            .map_err(|e| {
                Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
            })
            .and_then(|mut file| stream_response_to_file(response, &mut file, progress_bar))
            .and_then(|downloaded| {
                fs::rename(&temp_path, dest_path).map_err(|e| {
                    Error::IoError(format!(
                        "Failed to move {} to {}: {e}",
                        temp_path.display(),
                        dest_path.display()
                    ))
                })?;
                Ok(downloaded)
            });

        match result {
            Ok(downloaded) => {
                info!("Downloaded {} bytes to {}", downloaded, dest_path.display());
                Ok(downloaded)
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

impl RemoteProbe for TransferClient {
    fn remote_size(&self, url: &str) -> Option<u64> {
        self.content_length(url)
    }
}
