//! Integration tests for grantline-reporter
//!
//! Offline tests drive the public API with a scripted transport. Tests
//! that hit the live RePORTER API are marked #[ignore]:
//! cargo test -p grantline-reporter --test integration -- --ignored

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use grantline_core::{HttpError, ProgressContext};
use grantline_reporter::plan::{PageRequest, SearchCriteria, YearChunk};
use grantline_reporter::schema::SearchRequest;
use grantline_reporter::{AwardRecord, Config, FetchError, ReporterClient, SearchApi, run_with};
use tempfile::TempDir;

/// Answers every probe with `total` and every page with valid records
struct FixedTotal {
    total: u64,
    posts: usize,
}

impl SearchApi for FixedTotal {
    fn post(&mut self, body: &SearchRequest) -> Result<Vec<u8>, HttpError> {
        self.posts += 1;
        let end = (body.offset + u64::from(body.limit)).min(self.total);
        let results: Vec<_> = (body.offset..end)
            .map(|i| {
                serde_json::json!({
                    "appl_id": i,
                    "fiscal_year": 2026,
                    "project_num": format!("U01-{i}"),
                    "award_amount": 1500.5,
                    "is_active": false,
                    "contact_pi_name": "ROE, RICHARD",
                    "budget_start": "2026-01-01T00:00:00Z",
                    "budget_end": "2026-12-31T00:00:00Z",
                    "project_title": "Cohort study",
                    "project_detail_url": format!("https://reporter.nih.gov/project-details/{i}"),
                    "project_start_date": "2021-01-01T00:00:00Z",
                    "project_end_date": "2026-12-31T00:00:00Z",
                    "date_added": "2026-01-05T12:00:00Z",
                    "organization": {
                        "org_name": "STATE UNIVERSITY",
                        "org_city": "CHEYENNE",
                        "org_state": "WY"
                    },
                    "terms": "<Cohort>",
                    "abstract_text": "Text",
                    "pref_terms": "Cohort"
                })
            })
            .collect();
        let body = serde_json::json!({
            "meta": {
                "search_id": "fixed",
                "total": self.total,
                "offset": body.offset,
                "limit": body.limit,
                "sort_field": "project_start_date"
            },
            "results": results
        });
        Ok(serde_json::to_vec(&body).unwrap())
    }
}

fn offline_config(dir: &TempDir) -> Config {
    Config {
        output_dir: dir.path().to_path_buf(),
        states: vec!["WY"],
        start_year: 2026,
        chunk_count: 2,
        delay: Duration::ZERO,
        ..Default::default()
    }
}

#[test]
fn pages_round_trip_as_award_records() {
    let dir = TempDir::new().unwrap();
    let mut api = FixedTotal {
        total: 501,
        posts: 0,
    };
    let stop = AtomicBool::new(false);

    let summary = run_with(&mut api, &offline_config(&dir), &ProgressContext::hidden(), &stop)
        .expect("pipeline should succeed");

    // 2 probes + 2 pages for each of the 2 chunks
    assert_eq!(api.posts, 6);
    assert_eq!(summary.pages_written, 4);

    for year in ["2026", "2027"] {
        let page_dir = dir.path().join("WY").join(year);
        let first: Vec<AwardRecord> =
            serde_json::from_str(&std::fs::read_to_string(page_dir.join("0-499.json")).unwrap())
                .unwrap();
        let last: Vec<AwardRecord> =
            serde_json::from_str(&std::fs::read_to_string(page_dir.join("500-999.json")).unwrap())
                .unwrap();
        assert_eq!(first.len(), 500);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].appl_id, 500);
        assert_eq!(last[0].org_city.as_deref(), Some("CHEYENNE"));
    }
}

#[test]
fn rerun_is_probe_only() {
    let dir = TempDir::new().unwrap();
    let config = offline_config(&dir);
    let stop = AtomicBool::new(false);

    let mut first = FixedTotal {
        total: 20,
        posts: 0,
    };
    run_with(&mut first, &config, &ProgressContext::hidden(), &stop).unwrap();

    let mut second = FixedTotal {
        total: 20,
        posts: 0,
    };
    let summary = run_with(&mut second, &config, &ProgressContext::hidden(), &stop).unwrap();

    assert_eq!(second.posts, 2);
    assert_eq!(summary.pages_skipped, 2);
}

#[test]
fn oversized_limit_never_reaches_transport() {
    let mut api = FixedTotal {
        total: 10,
        posts: 0,
    };
    let request = PageRequest {
        criteria: SearchCriteria {
            state: "WY",
            chunk: YearChunk {
                year: 2026,
                is_final: false,
            },
        },
        offset: 0,
        limit: 501,
    };

    let err = api.fetch(&request).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, FetchError::InvalidLimit { .. }));
    assert_eq!(api.posts, 0);
}

/// Probe the live API for the smallest state
/// Run with: cargo test -p grantline-reporter --test integration -- --ignored live_probe
#[test]
#[ignore]
fn live_probe() {
    let mut client = ReporterClient::default();
    let criteria = SearchCriteria {
        state: "WY",
        chunk: YearChunk {
            year: 2025,
            is_final: false,
        },
    };

    let page = client
        .fetch(&PageRequest::probe(criteria))
        .expect("probe should succeed");

    assert!(page.records.is_empty());
    assert!(page.meta.total <= grantline_reporter::plan::MAX_RESULT_WINDOW);
}

/// Fetch one real page and check every record decodes
/// Run with: cargo test -p grantline-reporter --test integration -- --ignored live_single_state
#[test]
#[ignore]
fn live_single_state() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        states: vec!["WY"],
        start_year: 2025,
        chunk_count: 1,
        ..Default::default()
    };

    let summary = grantline_reporter::run(&config, &ProgressContext::hidden())
        .expect("Pipeline should succeed");

    assert_eq!(summary.partitions_probed, 1);
    assert_eq!(summary.pages_failed, 0);
    if summary.partitions_empty == 0 {
        assert!(dir.path().join("WY/2025/0-499.json").exists());
    }
}
