//! Streaming download of one GFS product into the local data store.

use crate::fetch::config::{ExistingFilePolicy, FetchConfig};
use crate::fetch::error::FetchError;
use crate::fetch::http::{body_reader, get_checked, read_chunk};
use crate::latest::probe::HttpProbe;
use crate::latest::resolver::LatestResolver;
use crate::store::DataStore;
use crate::types::any_date::AnyDatasetDate;
use crate::types::dataset::{DatasetId, DatasetTime};
use crate::utils::ensure_data_dir_exists;
use bon::bon;
use log::{debug, info, warn};
use reqwest::{Client, Response};
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Where the dataset was written.
    pub path: PathBuf,
    /// Number of body bytes written.
    pub bytes: u64,
}

/// Downloads GFS products from the NOMADS filter service.
///
/// One call writes exactly one file, named after the [`DatasetId`]. The body
/// is streamed into a hidden temporary file next to its destination and only
/// renamed into place once the whole response has been read, so a failed
/// transfer never leaves a truncated dataset behind.
pub struct Fetcher {
    config: FetchConfig,
    client: Client,
}

#[bon]
impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: FetchConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Downloads one product, identified by date, cycle hour and optional
    /// forecast offset.
    ///
    /// # Arguments
    ///
    /// * `.date(impl AnyDatasetDate)`: **Required.** UTC date of the cycle, as a
    ///   `NaiveDate`, a `"YYYYMMDD"` string or the number `YYYYMMDD`.
    /// * `.hour(u32)`: **Required.** Cycle hour; only 0, 6, 12 and 18 exist remotely.
    /// * `.forecast_offset(u32)`: Optional. Hours ahead of the cycle; omitted means the analysis.
    ///
    /// # Errors
    ///
    /// * [`FetchError::InvalidDate`] when `date` does not name a calendar day.
    /// * [`FetchError::AlreadyExists`] when the target exists and the policy is
    ///   [`ExistingFilePolicy::Fail`]. No request is sent in that case.
    /// * [`FetchError::HttpStatus`] / [`FetchError::NetworkRequest`] when NOMADS
    ///   rejects the request or cannot be reached.
    /// * [`FetchError::DownloadIo`] when the body stream breaks off.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use gfs_profile::{Fetcher, FetchConfig, FetchError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), FetchError> {
    /// let fetcher = Fetcher::new(FetchConfig::curated());
    /// let outcome = fetcher
    ///     .fetch()
    ///     .date("20230101")
    ///     .hour(6)
    ///     .forecast_offset(12)
    ///     .call()
    ///     .await?;
    /// assert!(outcome.path.ends_with("2023010106.f012"));
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn fetch<D>(
        &self,
        date: D,
        hour: u32,
        forecast_offset: Option<u32>,
    ) -> Result<FetchOutcome, FetchError>
    where
        D: AnyDatasetDate + Display,
    {
        let raw = date.to_string();
        let date = date
            .to_dataset_date()
            .ok_or(FetchError::InvalidDate(raw))?;
        let id = DatasetId::new(DatasetTime::new(date, hour), forecast_offset);
        self.fetch_dataset(&id).await
    }

    /// Resolves the most recent published cycle, then downloads it.
    pub async fn fetch_latest(
        &self,
        forecast_offset: Option<u32>,
    ) -> Result<FetchOutcome, FetchError> {
        let resolver = LatestResolver::new(HttpProbe::new(self.client.clone(), &self.config));
        let time = resolver.resolve().await?;
        self.fetch_dataset(&DatasetId::new(time, forecast_offset))
            .await
    }

    pub async fn fetch_dataset(&self, id: &DatasetId) -> Result<FetchOutcome, FetchError> {
        if !id.time.is_synoptic() {
            warn!(
                "Hour {} is not a synoptic hour (00, 06, 12, 18); NOMADS will most likely reject it",
                id.time.hour_string()
            );
        }

        let store = DataStore::new(&self.config.data_dir);
        let path = store.path_for(id);
        if self.config.existing_file == ExistingFilePolicy::Fail
            && tokio::fs::metadata(&path).await.is_ok()
        {
            return Err(FetchError::AlreadyExists(path));
        }

        ensure_data_dir_exists(&self.config.data_dir)
            .await
            .map_err(|e| FetchError::DataDirCreation(self.config.data_dir.clone(), e))?;

        let url = self.config.dataset_url(id);
        info!("Downloading from: {}", url);
        let response = match get_checked(&self.client, &url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request for {} failed: {}", id, e);
                return Err(e);
            }
        };

        let bytes = self.stream_to_store(response, &url, &path).await?;
        info!("{} {}", id.file_name(), bytes);

        Ok(FetchOutcome { path, bytes })
    }

    async fn stream_to_store(
        &self,
        response: Response,
        url: &str,
        path: &Path,
    ) -> Result<u64, FetchError> {
        let mut reader = body_reader(response);
        let mut chunk = Vec::with_capacity(self.config.chunk_size);
        let mut partial: Option<PartialFile> = None;
        let mut total: u64 = 0;

        loop {
            read_chunk(&mut reader, self.config.chunk_size, &mut chunk)
                .await
                .map_err(|e| FetchError::DownloadIo {
                    url: url.to_string(),
                    source: e,
                })?;
            if chunk.is_empty() {
                break;
            }

            // Opened lazily so a response that fails before its first chunk
            // leaves nothing on disk.
            if partial.is_none() {
                partial = Some(PartialFile::create_in(&self.config.data_dir)?);
            }
            if let Some(file) = partial.as_mut() {
                file.write_all(&chunk).await?;
            }
            total += chunk.len() as u64;
            debug!("{}, total {}", chunk.len(), total);
        }

        let partial = match partial {
            Some(file) => file,
            None => PartialFile::create_in(&self.config.data_dir)?,
        };
        partial.persist(path, self.config.existing_file).await?;
        Ok(total)
    }
}

/// Temporary download target inside the data directory. Deleted on drop
/// unless persisted.
struct PartialFile {
    file: tokio::fs::File,
    path: TempPath,
}

impl PartialFile {
    fn create_in(dir: &Path) -> Result<Self, FetchError> {
        let named = tempfile::Builder::new()
            .prefix(".")
            .suffix(".partial")
            .tempfile_in(dir)
            .map_err(|e| FetchError::FileWrite(dir.to_path_buf(), e))?;
        let (file, path) = named.into_parts();
        Ok(Self {
            file: tokio::fs::File::from_std(file),
            path,
        })
    }

    async fn write_all(&mut self, chunk: &[u8]) -> Result<(), FetchError> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| FetchError::FileWrite(self.path.to_path_buf(), e))
    }

    async fn persist(self, dest: &Path, policy: ExistingFilePolicy) -> Result<(), FetchError> {
        let PartialFile { mut file, path } = self;
        let synced = async {
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        synced.map_err(|e| FetchError::FileWrite(path.to_path_buf(), e))?;
        drop(file);

        let persisted = match policy {
            ExistingFilePolicy::Fail => path.persist_noclobber(dest),
            ExistingFilePolicy::Overwrite => path.persist(dest),
        };
        persisted.map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                FetchError::AlreadyExists(dest.to_path_buf())
            } else {
                FetchError::FileWrite(dest.to_path_buf(), e.error)
            }
        })
    }
}
