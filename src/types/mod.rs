pub mod any_date;
pub mod dataset;
