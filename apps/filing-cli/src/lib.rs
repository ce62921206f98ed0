//! Command-line front end for the filing verification pipeline
//!
//! Reads paginated OCR Markdown, takes collaborator proposals from disk and
//! writes the verified manifest, merged document and footnote report.

pub mod batch;
pub mod collaborators;
pub mod config;
pub mod lookup;
pub mod output;

pub use batch::{collect_inputs, process_file, run_batch, BatchReport};
pub use config::Config;
pub use lookup::{locate_in_file, locate_json};
