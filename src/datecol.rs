//! Appends a hyphen-joined date column to a headerless comma-separated file.

pub mod error;
pub mod record;
pub mod transformer;

pub use error::TransformError;
pub use record::Record;
pub use transformer::{transform, write_records, Summary};
