mod error;
mod fetch;
mod latest;
mod profile;
mod store;
mod types;
mod utils;

pub use error::GfsError;

pub use types::any_date::AnyDatasetDate;
pub use types::dataset::*;

pub use fetch::config::*;
pub use fetch::error::FetchError;
pub use fetch::fetcher::*;

pub use latest::error::ResolveError;
pub use latest::probe::{AvailabilityProbe, HttpProbe, NO_FILES_MARKER};
pub use latest::resolver::{LatestResolver, MAX_ATTEMPTS};

pub use store::{DataStore, FileRequest, StoreError};

pub use profile::dataset::*;
pub use profile::error::DatasetError;
pub use profile::grib_loader::{read_isobaric_fields, short_name, GridField};
pub use profile::input::*;
pub use profile::plot::plot_profile;
