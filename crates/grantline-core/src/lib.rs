//! Grantline Core - Common infrastructure for grant data pipelines
//!
//! Logging, progress reporting, the shared HTTP client, atomic JSON
//! output and request pacing used by the source-specific crates.

pub mod http;
pub mod logging;
pub mod progress;
pub mod shutdown;
pub mod sink;
pub mod throttle;

// Re-exports for convenience
pub use http::{HttpConfig, HttpError, SHARED_RUNTIME, http_client, http_config, set_http_config};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, fmt_num};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag};
pub use sink::{cleanup_tmp_files, write_json_atomic};
pub use throttle::Throttle;
