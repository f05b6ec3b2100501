//! Content-addressed store client
//!
//! Talks to the IPFS HTTP API: a multipart `POST {api_url}/add` returns a
//! JSON body whose `Hash` field is the content identifier.

use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::RefinerConfig;
use crate::error::{RefinerError, RefinerResult};

/// Upload side of a content-addressed store
pub trait ContentStore {
    /// Upload raw bytes under a display name, returning the content id
    fn add_bytes(&self, name: &str, bytes: Vec<u8>) -> RefinerResult<String>;

    /// Upload a file's contents, returning the content id
    fn add_file(&self, path: &Path) -> RefinerResult<String> {
        let bytes = std::fs::read(path).map_err(|e| RefinerError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.add_bytes(&name, bytes)
    }
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Blocking IPFS HTTP API client with bounded retries
#[derive(Clone)]
pub struct IpfsClient {
    client: Client,
    endpoint: String,
    max_retries: u32,
    initial_backoff: Duration,
    cancel: CancelToken,
}

impl IpfsClient {
    pub fn new(
        api_url: &str,
        timeout: Duration,
        max_retries: u32,
        initial_backoff: Duration,
        cancel: CancelToken,
    ) -> RefinerResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RefinerError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;
        let endpoint = format!("{}/add", api_url.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            max_retries,
            initial_backoff,
            cancel,
        })
    }

    pub fn from_config(config: &RefinerConfig, cancel: CancelToken) -> RefinerResult<Self> {
        Self::new(
            &config.ipfs.api_url,
            config.upload_timeout(),
            config.ipfs.max_retries,
            config.retry_backoff(),
            cancel,
        )
    }

    /// Endpoint uploads are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn should_retry(status: StatusCode) -> bool {
        status.is_server_error()
    }

    fn is_retryable_error(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff * (1u32 << attempt.saturating_sub(1).min(5))
    }
}

impl ContentStore for IpfsClient {
    fn add_bytes(&self, name: &str, bytes: Vec<u8>) -> RefinerResult<String> {
        let mut attempt = 0u32;
        loop {
            self.cancel.check()?;

            let part = multipart::Part::bytes(bytes.clone()).file_name(name.to_string());
            let form = multipart::Form::new().part("file", part);
            let response = self.client.post(&self.endpoint).multipart(form).send();

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: AddResponse = resp.json().map_err(|e| {
                            RefinerError::Upload(format!("Invalid response from IPFS add: {}", e))
                        })?;
                        debug!("Uploaded {} as {}", name, parsed.hash);
                        return Ok(parsed.hash);
                    }

                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if Self::should_retry(status) && attempt < self.max_retries {
                        attempt += 1;
                        warn!(
                            "Upload of {} failed with {}, retry {}/{}",
                            name, status, attempt, self.max_retries
                        );
                        thread::sleep(self.backoff(attempt));
                        continue;
                    }
                    return Err(RefinerError::Upload(format!(
                        "IPFS add of {} failed ({}): {}",
                        name, status, body
                    )));
                }
                Err(err) => {
                    if Self::is_retryable_error(&err) && attempt < self.max_retries {
                        attempt += 1;
                        warn!(
                            "Upload of {} failed: {}, retry {}/{}",
                            name, err, attempt, self.max_retries
                        );
                        thread::sleep(self.backoff(attempt));
                        continue;
                    }
                    return Err(RefinerError::Upload(format!(
                        "IPFS add of {} failed: {}",
                        name, err
                    )));
                }
            }
        }
    }
}
