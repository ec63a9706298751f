//! Grantline RePORTER - NIH RePORTER award pipeline
//!
//! Pages through the RePORTER project search API one (state, fiscal-year)
//! partition at a time and writes each page as a JSON file. Existing files
//! are never fetched again, so interrupted runs resume where they stopped.
//!
//! # Example
//!
//! ```ignore
//! use grantline_reporter::{Config, run};
//!
//! let config = Config {
//!     output_dir: "awards".into(),
//!     states: vec!["WY"],
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, &grantline_core::ProgressContext::new())?;
//! println!("Wrote {} pages", summary.pages_written);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod plan;
pub mod runner;
pub mod schema;
pub mod store;

// Re-exports
pub use api::{ReporterClient, SearchApi};
pub use config::{Config, PartitionMode};
pub use error::{FetchError, PaginationLimitExceeded};
pub use runner::{Summary, run, run_with};
pub use schema::{AwardRecord, SearchPage};
