//! Log file readers
//!
//! Each reader decodes a whole log file up front and then serves channels
//! through [`ChannelSource`](crate::source::ChannelSource).

pub mod csv_log;

pub use csv_log::{CsvLayout, CsvLogReader};

/// File extensions with a built-in reader
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv"];
