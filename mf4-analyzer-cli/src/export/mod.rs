//! Export collaborators
//!
//! Every exporter writes one artifact for a log into the output directory
//! and returns the path it wrote.

pub mod csv;
pub mod json;
pub mod plot;

pub use self::csv::export_csv;
pub use self::json::export_json;
pub use self::plot::export_plots;
