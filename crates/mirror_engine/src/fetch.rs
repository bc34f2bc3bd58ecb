use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::types::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Blocking HTTP client shared by the listing fetch and file downloads.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }

    /// GET a listing page and return its body as text.
    pub fn fetch_listing(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        response.text().map_err(map_reqwest_error)
    }

    /// GET `url` and stream the body to `dest`, returning the byte count.
    ///
    /// The destination file is created only after the response status is
    /// known to be successful. A transport error mid-stream leaves a partial
    /// file behind; the next run then treats the name as already present.
    pub fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut file =
            File::create(dest).map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
        let bytes = io::copy(&mut response, &mut file)
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
        Ok(bytes)
    }
}

/// Join a listing entry onto its base URL, so the request always goes to
/// `base_url/name` even when the configured base lacks a trailing slash.
pub fn file_url(base: &Url, name: &str) -> Result<Url, FetchError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(name)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
