//! The local data directory: one flat file per downloaded product.

use crate::error::GfsError;
use crate::profile::dataset::IsobaricDataset;
use crate::types::any_date::AnyDatasetDate;
use crate::types::dataset::{DatasetId, DatasetTime};
use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is not found.")]
    NoDataAtPath(PathBuf),

    #[error("Data directory '{0}' is empty.")]
    EmptyStore(PathBuf),

    #[error("Failed to read data directory '{0}'")]
    DirRead(PathBuf, #[source] io::Error),
}

/// Which file the caller wants out of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRequest {
    /// The lexicographically greatest file, which is the newest product
    /// given the `{YYYYMMDD}{HH}.{ext}` naming.
    Latest,
    /// A file name relative to the data directory.
    Named(String),
    /// The file a fetch of this product would have written.
    Dataset(DatasetId),
}

impl FileRequest {
    /// An empty name means "no preference", i.e. [`FileRequest::Latest`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            FileRequest::Latest
        } else {
            FileRequest::Named(name.to_string())
        }
    }

    /// Builds a request from command-line style flags, or `None` when they
    /// do not pick a file and the user should be asked instead.
    ///
    /// A `file` (even an empty one) wins over `date`/`hour`. A date that
    /// does not parse selects [`FileRequest::Latest`].
    pub fn from_flags(
        file: Option<&str>,
        date: Option<&str>,
        hour: Option<u32>,
        forecast_offset: Option<u32>,
    ) -> Option<Self> {
        if let Some(name) = file {
            return Some(Self::from_name(name));
        }

        let (date, hour) = (date?, hour?);
        match date.to_dataset_date() {
            Some(day) => Some(FileRequest::Dataset(DatasetId::new(
                DatasetTime::new(day, hour),
                forecast_offset,
            ))),
            None => {
                warn!("Ignoring invalid date '{}'", date);
                Some(FileRequest::Latest)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &DatasetId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Regular files in the directory, sorted by name. Hidden files (which
    /// includes in-flight downloads) are skipped. A missing directory lists
    /// as empty.
    pub async fn list(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::DirRead(self.dir.clone(), e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StoreError::DirRead(self.dir.clone(), e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 file name {:?}", entry.file_name());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    pub async fn most_recent(&self) -> Result<PathBuf, StoreError> {
        self.list()
            .await?
            .pop()
            .ok_or_else(|| StoreError::EmptyStore(self.dir.clone()))
    }

    /// Strict lookup: the requested file or [`StoreError::NoDataAtPath`].
    pub async fn locate(&self, request: &FileRequest) -> Result<PathBuf, StoreError> {
        let path = match request {
            FileRequest::Latest => return self.most_recent().await,
            FileRequest::Named(name) => self.dir.join(name),
            FileRequest::Dataset(id) => self.path_for(id),
        };
        if tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            Ok(path)
        } else {
            Err(StoreError::NoDataAtPath(path))
        }
    }

    /// Like [`DataStore::locate`], but a missing file falls back to the most
    /// recent one in the store.
    pub async fn resolve(&self, request: &FileRequest) -> Result<PathBuf, StoreError> {
        match self.locate(request).await {
            Err(StoreError::NoDataAtPath(missing)) => {
                let fallback = self.most_recent().await?;
                warn!(
                    "Using {} since {} is not found",
                    fallback.display(),
                    missing.display()
                );
                Ok(fallback)
            }
            other => other,
        }
    }

    /// Resolves `request` and decodes the file it lands on.
    pub async fn open_dataset(
        &self,
        request: &FileRequest,
    ) -> Result<(PathBuf, IsobaricDataset), GfsError> {
        let path = self.resolve(request).await?;
        let dataset = IsobaricDataset::open(&path).await?;
        Ok((path, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"GRIB").unwrap();
        path
    }

    #[tokio::test]
    async fn test_empty_store() {
        let root = tempfile::tempdir().unwrap();
        let store = DataStore::new(root.path());

        let err = store.resolve(&FileRequest::Latest).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyStore(_)));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty_store() {
        let root = tempfile::tempdir().unwrap();
        let store = DataStore::new(root.path().join("data"));

        assert!(store.list().await.unwrap().is_empty());
        let err = store
            .resolve(&FileRequest::Named("2023010100.anl".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyStore(_)));
    }

    #[tokio::test]
    async fn test_missing_name_falls_back_to_greatest() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "2023010100.anl");
        let newest = touch(root.path(), "2023010206.f003");
        touch(root.path(), "2023010118.anl");

        let store = DataStore::new(root.path());
        let path = store
            .resolve(&FileRequest::Named("2099010100.anl".into()))
            .await
            .unwrap();
        assert_eq!(path, newest);
    }

    #[tokio::test]
    async fn test_named_file_is_used_when_present() {
        let root = tempfile::tempdir().unwrap();
        let wanted = touch(root.path(), "2023010100.anl");
        touch(root.path(), "2023010206.anl");

        let store = DataStore::new(root.path());
        let path = store
            .resolve(&FileRequest::Named("2023010100.anl".into()))
            .await
            .unwrap();
        assert_eq!(path, wanted);
    }

    #[tokio::test]
    async fn test_dataset_request_uses_derived_name() {
        let root = tempfile::tempdir().unwrap();
        let wanted = touch(root.path(), "2023010106.f012");
        touch(root.path(), "2023010112.anl");

        let id = DatasetId::new(
            DatasetTime::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 6),
            Some(12),
        );
        let store = DataStore::new(root.path());
        assert_eq!(store.path_for(&id), wanted);
        assert_eq!(
            store.locate(&FileRequest::Dataset(id)).await.unwrap(),
            wanted
        );
    }

    #[tokio::test]
    async fn test_locate_is_strict() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "2023010100.anl");

        let store = DataStore::new(root.path());
        let err = store
            .locate(&FileRequest::Named("nope.anl".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoDataAtPath(p) if p.ends_with("nope.anl")));
    }

    #[tokio::test]
    async fn test_list_skips_hidden_and_directories() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), ".tmpAbc.partial");
        std::fs::create_dir(root.path().join("9999999999.anl")).unwrap();
        let only = touch(root.path(), "2023010100.anl");

        let store = DataStore::new(root.path());
        assert_eq!(store.list().await.unwrap(), vec![only.clone()]);
        assert_eq!(store.most_recent().await.unwrap(), only);
    }

    #[test]
    fn test_request_from_empty_name() {
        assert_eq!(FileRequest::from_name("  "), FileRequest::Latest);
        assert_eq!(
            FileRequest::from_name("2023010100.anl"),
            FileRequest::Named("2023010100.anl".to_string())
        );
    }

    #[test]
    fn test_request_from_flags() {
        assert_eq!(FileRequest::from_flags(None, None, None, None), None);
        assert_eq!(
            FileRequest::from_flags(None, Some("20230101"), None, Some(6)),
            None
        );
        assert_eq!(FileRequest::from_flags(None, None, Some(6), None), None);

        assert_eq!(
            FileRequest::from_flags(Some("2023010100.anl"), Some("20230102"), Some(6), None),
            Some(FileRequest::Named("2023010100.anl".to_string()))
        );
        assert_eq!(
            FileRequest::from_flags(Some(""), None, None, None),
            Some(FileRequest::Latest)
        );

        let id = DatasetId::new(
            DatasetTime::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 6),
            Some(12),
        );
        assert_eq!(
            FileRequest::from_flags(None, Some("20230101"), Some(6), Some(12)),
            Some(FileRequest::Dataset(id))
        );
    }

    #[test]
    fn test_request_from_flags_with_bad_date() {
        assert_eq!(
            FileRequest::from_flags(None, Some("2023-13-45"), Some(6), None),
            Some(FileRequest::Latest)
        );
    }

    #[tokio::test]
    async fn test_open_dataset_on_empty_store() {
        let root = tempfile::tempdir().unwrap();
        let store = DataStore::new(root.path());

        let err = store.open_dataset(&FileRequest::Latest).await.unwrap_err();
        assert!(matches!(err, GfsError::Store(StoreError::EmptyStore(_))));
    }

    #[tokio::test]
    async fn test_open_dataset_reports_decode_failure() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "2023010100.anl");
        let store = DataStore::new(root.path());

        let err = store
            .open_dataset(&FileRequest::Named("2023010100.anl".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, GfsError::Dataset(_)));
    }
}
