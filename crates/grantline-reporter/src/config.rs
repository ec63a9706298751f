//! RePORTER pipeline configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_ENDPOINT;
use crate::plan::{DEFAULT_CHUNK_COUNT, DEFAULT_START_YEAR, US_STATES, YearChunk, year_chunks};

/// Upper bound on year chunks per run
pub const MAX_CHUNK_COUNT: u32 = 100;

/// How far one run goes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionMode {
    /// Every state and year chunk in one pass
    #[default]
    All,
    /// Stop after the first partition that has records; repeated runs
    /// advance one partition at a time
    FirstNonEmpty,
}

/// Runtime configuration for the RePORTER pipeline
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the `{state}/{year}/` output tree
    pub output_dir: PathBuf,
    /// Project search endpoint
    pub endpoint: String,
    /// States to walk, in canonical order
    pub states: Vec<&'static str>,
    /// First fiscal year of the end-date chunks
    pub start_year: i32,
    /// Number of year chunks; the last is open-ended
    pub chunk_count: u32,
    /// Minimum gap between page fetches that produced a file
    pub delay: Duration,
    pub partition_mode: PartitionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            states: US_STATES.to_vec(),
            start_year: DEFAULT_START_YEAR,
            chunk_count: DEFAULT_CHUNK_COUNT,
            delay: Duration::from_millis(100),
            partition_mode: PartitionMode::All,
        }
    }
}

impl Config {
    pub fn chunks(&self) -> Vec<YearChunk> {
        year_chunks(self.start_year, self.chunk_count)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.states.is_empty(), "No states selected");
        anyhow::ensure!(
            (1..=MAX_CHUNK_COUNT).contains(&self.chunk_count),
            "chunk_count must be between 1 and {MAX_CHUNK_COUNT}, got {}",
            self.chunk_count
        );
        let last_year = i32::try_from(self.chunk_count)
            .ok()
            .and_then(|n| self.start_year.checked_add(n - 1));
        anyhow::ensure!(
            self.start_year >= 1900 && last_year.is_some_and(|y| y <= 9999),
            "start_year out of range: {}",
            self.start_year
        );
        anyhow::ensure!(
            self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://"),
            "endpoint must be an http(s) URL: {}",
            self.endpoint
        );
        Ok(())
    }
}
