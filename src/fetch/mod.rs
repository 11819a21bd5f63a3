pub mod config;
pub mod error;
pub mod fetcher;
pub(crate) mod http;
