use crate::types::dataset::DatasetTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No published GFS cycle found after {attempts} attempts (oldest tried: {last_tried})")]
    NoRecentData {
        attempts: usize,
        last_tried: DatasetTime,
    },
}
