use crate::fetch::error::FetchError;
use crate::latest::error::ResolveError;
use crate::profile::error::DatasetError;
use crate::profile::input::InputError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GfsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Input(#[from] InputError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dataset::DatasetTime;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[test]
    fn test_messages_pass_through() {
        let err: GfsError = StoreError::EmptyStore(PathBuf::from("data")).into();
        assert_eq!(err.to_string(), "Data directory 'data' is empty.");

        let err: GfsError = ResolveError::NoRecentData {
            attempts: 4,
            last_tried: DatasetTime::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 6),
        }
        .into();
        assert!(err.to_string().contains("2023010106"));
        assert!(matches!(err, GfsError::Resolve(_)));
    }

    #[test]
    fn test_fetch_error_message() {
        let err: GfsError = FetchError::AlreadyExists(PathBuf::from("data/2023010100.anl")).into();
        assert_eq!(err.to_string(), "File exists: 'data/2023010100.anl'");
    }
}
