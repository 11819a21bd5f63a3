pub mod dataset;
pub mod error;
pub mod grib_loader;
pub mod input;
pub mod plot;
