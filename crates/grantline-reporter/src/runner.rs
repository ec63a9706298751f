//! Main runner for the RePORTER pipeline
//!
//! Per partition: `PROBE → (SKIP | PAGINATE)`. Within PAGINATE, each page
//! is `CHECK_EXISTS → (SKIP_PAGE | FETCH → WRITE → THROTTLE)` until the
//! offset passes the probed total.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use grantline_core::{ProgressContext, Throttle, cleanup_tmp_files, fmt_num, shutdown_flag};
use indicatif::ProgressBar;

use crate::api::{ReporterClient, SearchApi};
use crate::config::{Config, PartitionMode};
use crate::error::{FetchError, PaginationLimitExceeded};
use crate::plan::{
    MAX_RESULT_WINDOW, PAGE_LIMIT, PageRequest, SearchCriteria, page_file_name, page_offsets,
    partitions,
};
use crate::store::PageStore;

/// Pipeline execution summary
#[derive(Debug, Default)]
pub struct Summary {
    pub partitions_probed: usize,
    pub partitions_empty: usize,
    pub partitions_paginated: usize,
    pub pages_written: usize,
    pub pages_skipped: usize,
    pub pages_failed: usize,
    pub records_written: usize,
    /// Stopped early by a shutdown request
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl Summary {
    pub fn log(&self) {
        log::info!("=== RePORTER Pipeline Summary ===");
        log::info!(
            "Partitions: {} probed ({} empty, {} paginated)",
            self.partitions_probed,
            self.partitions_empty,
            self.partitions_paginated
        );
        log::info!(
            "Pages: {} written, {} already present, {} failed",
            self.pages_written,
            self.pages_skipped,
            self.pages_failed
        );
        log::info!("Records: {}", fmt_num(self.records_written));
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if self.pages_failed > 0 {
            log::warn!(
                "{} pages failed; run again to retry them",
                self.pages_failed
            );
        }
        if self.interrupted {
            log::warn!("Run interrupted; completed pages are kept");
        }
    }
}

/// Run the pipeline against the live API, stopping on SIGINT/SIGTERM
pub fn run(config: &Config, progress: &ProgressContext) -> Result<Summary> {
    let mut api = ReporterClient::new(config.endpoint.clone());
    run_with(&mut api, config, progress, shutdown_flag())
}

/// Run the pipeline with any transport; `stop` is polled between requests.
pub fn run_with<A: SearchApi>(
    api: &mut A,
    config: &Config,
    progress: &ProgressContext,
    stop: &AtomicBool,
) -> Result<Summary> {
    config.validate()?;
    let start = Instant::now();

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    cleanup_tmp_files(&config.output_dir).context("Failed to clean stale tmp files")?;

    let mut pipeline = Pipeline {
        api,
        store: PageStore::new(&config.output_dir),
        throttle: Throttle::new(config.delay),
        stop,
        line: progress.stage_line("reporter"),
        summary: Summary::default(),
    };

    let chunks = config.chunks();
    let mut current_state = None;
    for criteria in partitions(&config.states, &chunks) {
        if pipeline.stopping() {
            break;
        }
        if current_state != Some(criteria.state) {
            log::info!("Fetching data for state: {}", criteria.state);
            current_state = Some(criteria.state);
        }

        let has_records = pipeline.partition(criteria)?;
        if has_records && config.partition_mode == PartitionMode::FirstNonEmpty {
            log::info!("Stopping after {criteria}; run again to continue with the next partition");
            break;
        }
    }

    pipeline.line.finish_and_clear();
    let mut summary = pipeline.summary;
    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}

struct Pipeline<'a, A> {
    api: &'a mut A,
    store: PageStore,
    throttle: Throttle,
    stop: &'a AtomicBool,
    line: ProgressBar,
    summary: Summary,
}

impl<A: SearchApi> Pipeline<'_, A> {
    fn stopping(&mut self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            self.summary.interrupted = true;
        }
        self.summary.interrupted
    }

    /// Number of records the API holds for a partition
    fn probe(&mut self, criteria: SearchCriteria) -> Result<u64> {
        self.line.set_message(format!("{criteria} probing"));
        let page = self
            .api
            .fetch(&PageRequest::probe(criteria))
            .with_context(|| format!("Probe failed for {criteria}"))?;

        let total = page.meta.total;
        if total > MAX_RESULT_WINDOW {
            return Err(PaginationLimitExceeded { criteria, total }.into());
        }
        Ok(total)
    }

    /// Probe and page through one partition. Returns whether it had records.
    fn partition(&mut self, criteria: SearchCriteria) -> Result<bool> {
        let total = self.probe(criteria)?;
        self.summary.partitions_probed += 1;

        if total == 0 {
            log::info!("No records found for {}", criteria.state);
            log::debug!("{criteria}: empty");
            self.summary.partitions_empty += 1;
            return Ok(false);
        }

        self.summary.partitions_paginated += 1;
        let pages = total.div_ceil(u64::from(PAGE_LIMIT));
        log::debug!("{criteria}: {total} records in {pages} pages");

        for (n, offset) in page_offsets(total, PAGE_LIMIT).enumerate() {
            if self.stopping() {
                break;
            }
            let request = PageRequest::page(criteria, offset);
            self.line
                .set_message(format!("{criteria} page {}/{pages}", n + 1));
            self.page(&request, total)?;
        }
        Ok(true)
    }

    /// Fetch and write one page unless its file already exists.
    ///
    /// Only fatal errors propagate; anything else is logged and the page
    /// is left for the next run.
    fn page(&mut self, request: &PageRequest, total: u64) -> Result<()> {
        if self.store.exists(request) {
            log::debug!(
                "Skipping existing {}",
                self.store.page_path(request).display()
            );
            self.summary.pages_skipped += 1;
            return Ok(());
        }

        self.throttle.wait();
        match self.fetch_and_write(request, total) {
            Ok(count) => {
                self.summary.pages_written += 1;
                self.summary.records_written += count;
                self.throttle.mark();
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                log::error!("{e}");
                log::error!(
                    "Failed to get {} for {}",
                    page_file_name(request.offset, request.limit),
                    request.criteria.state
                );
                self.summary.pages_failed += 1;
                Ok(())
            }
        }
    }

    fn fetch_and_write(&mut self, request: &PageRequest, total: u64) -> Result<usize, FetchError> {
        let page = self.api.fetch(request)?;

        let expected = request.expected_len(total);
        if page.records.len() as u64 != expected {
            log::warn!(
                "{}: expected {expected} records at offset {}, got {} (data changed since probe?)",
                request.criteria,
                request.offset,
                page.records.len()
            );
        }

        let path = self.store.write(request, &page.records)?;
        log::info!("Wrote {}", path.display());
        Ok(page.records.len())
    }
}
