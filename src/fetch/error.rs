use crate::latest::error::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("File exists: '{0}'")]
    AlreadyExists(PathBuf),

    #[error("Invalid dataset date '{0}', expected YYYYMMDD")]
    InvalidDate(String),

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}. This might be caused by incorrect arguments")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // Body stream broke off after the response started
    #[error("Download of {url} was interrupted")]
    DownloadIo {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write data file '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl FetchError {
    /// True for failures on the remote side: transport errors and non-2xx
    /// responses.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            FetchError::NetworkRequest(..) | FetchError::HttpStatus { .. }
        )
    }
}
