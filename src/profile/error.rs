use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open GRIB file '{0}'")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode GRIB file '{0}'")]
    Decode(PathBuf, #[source] grib::GribError),

    #[error("No isobaric (pressure level) fields in '{0}'")]
    NoIsobaricFields(PathBuf),

    #[error("Variable '{variable}' is not present in the dataset")]
    VariableNotFound { variable: String },

    #[error("Dataset has no grid points")]
    EmptyGrid,

    #[error("DataFrame processing error: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background decoding task failed: {0}")]
    TaskJoin(#[from] JoinError),
}
