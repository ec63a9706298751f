//! Partition and page planning
//!
//! A run walks every (state, year chunk) partition in a fixed order and
//! splits each partition's result set into fixed-size pages.

use std::fmt;

/// Largest page the search endpoint accepts
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Page size used for every data request; output file names depend on it
pub const PAGE_LIMIT: u32 = MAX_PAGE_LIMIT;

/// Deepest result the endpoint can reach through offset + limit paging
pub const MAX_RESULT_WINDOW: u64 = 14_999;

/// First fiscal year queried by default
pub const DEFAULT_START_YEAR: i32 = 2025;

/// Number of year chunks by default; the last one is open-ended
pub const DEFAULT_CHUNK_COUNT: u32 = 5;

/// Organization states, in processing order
#[rustfmt::skip]
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME",
    "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA",
    "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
];

/// Resolve a state code (case-insensitive) to its canonical entry
pub fn lookup_state(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .copied()
        .find(|s| s.eq_ignore_ascii_case(code.trim()))
}

/// Keep only the requested states, in canonical order.
///
/// An empty selection means every state. Unknown codes are an error.
pub fn select_states(codes: &[String]) -> anyhow::Result<Vec<&'static str>> {
    if codes.is_empty() {
        return Ok(US_STATES.to_vec());
    }
    let mut wanted = Vec::with_capacity(codes.len());
    for code in codes {
        let Some(state) = lookup_state(code) else {
            anyhow::bail!("Unknown state code: {code}");
        };
        wanted.push(state);
    }
    Ok(US_STATES
        .iter()
        .copied()
        .filter(|s| wanted.contains(s))
        .collect())
}

/// Fiscal-year window on the project end date
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearChunk {
    pub year: i32,
    /// Open-ended: matches every end date from `year` onwards
    pub is_final: bool,
}

impl YearChunk {
    pub fn from_date(&self) -> String {
        format!("{}-01-01", self.year)
    }

    /// Upper bound, absent for the open-ended chunk
    pub fn to_date(&self) -> Option<String> {
        (!self.is_final).then(|| format!("{}-12-31", self.year))
    }
}

impl fmt::Display for YearChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_final {
            write!(f, "{}+", self.year)
        } else {
            write!(f, "{}", self.year)
        }
    }
}

/// `count` consecutive years from `start`, the last one open-ended
pub fn year_chunks(start: i32, count: u32) -> Vec<YearChunk> {
    (0..count)
        .map(|i| YearChunk {
            year: start + i as i32,
            is_final: i + 1 == count,
        })
        .collect()
}

/// One partition: an organization state within a year chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchCriteria {
    pub state: &'static str,
    pub chunk: YearChunk,
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.state, self.chunk)
    }
}

/// Every partition in processing order: states outer, years inner
pub fn partitions(states: &[&'static str], chunks: &[YearChunk]) -> Vec<SearchCriteria> {
    states
        .iter()
        .flat_map(|&state| chunks.iter().map(move |&chunk| SearchCriteria { state, chunk }))
        .collect()
}

/// A bounded slice of one partition's results
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub criteria: SearchCriteria,
    pub offset: u64,
    pub limit: u32,
}

impl PageRequest {
    /// Zero-limit request that only reports the partition total
    pub fn probe(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            offset: 0,
            limit: 0,
        }
    }

    pub fn page(criteria: SearchCriteria, offset: u64) -> Self {
        Self {
            criteria,
            offset,
            limit: PAGE_LIMIT,
        }
    }

    /// Number of records this page should hold for a partition of `total`
    pub fn expected_len(&self, total: u64) -> u64 {
        total.saturating_sub(self.offset).min(u64::from(self.limit))
    }
}

/// Page start offsets covering `total` records
pub fn page_offsets(total: u64, limit: u32) -> impl Iterator<Item = u64> {
    let step = u64::from(limit.max(1));
    (0..total).step_by(step as usize)
}

/// Output file name for a page, e.g. `500-999.json`
pub fn page_file_name(offset: u64, limit: u32) -> String {
    let last = (offset + u64::from(limit)).saturating_sub(1);
    format!("{offset}-{last}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ca_2025() -> SearchCriteria {
        SearchCriteria {
            state: "CA",
            chunk: YearChunk {
                year: 2025,
                is_final: false,
            },
        }
    }

    #[test]
    fn fifty_unique_states() {
        let mut sorted = US_STATES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 50);
        assert_eq!(US_STATES[0], "AL");
        assert_eq!(US_STATES[49], "WY");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup_state("ca"), Some("CA"));
        assert_eq!(lookup_state(" wy "), Some("WY"));
        assert_eq!(lookup_state("DC"), None);
    }

    #[test]
    fn select_keeps_canonical_order() {
        let picked = select_states(&["WY".into(), "ca".into(), "AL".into()]).unwrap();
        assert_eq!(picked, vec!["AL", "CA", "WY"]);
    }

    #[test]
    fn select_empty_means_all() {
        assert_eq!(select_states(&[]).unwrap().len(), 50);
    }

    #[test]
    fn select_rejects_unknown() {
        let err = select_states(&["CA".into(), "XX".into()]).unwrap_err();
        assert!(err.to_string().contains("XX"));
    }

    #[test]
    fn default_chunks_end_open() {
        let chunks = year_chunks(DEFAULT_START_YEAR, DEFAULT_CHUNK_COUNT);
        let years: Vec<i32> = chunks.iter().map(|c| c.year).collect();
        assert_eq!(years, vec![2025, 2026, 2027, 2028, 2029]);
        assert!(chunks[..4].iter().all(|c| !c.is_final));
        assert!(chunks[4].is_final);
    }

    #[test]
    fn chunk_date_bounds() {
        let closed = YearChunk {
            year: 2026,
            is_final: false,
        };
        assert_eq!(closed.from_date(), "2026-01-01");
        assert_eq!(closed.to_date().as_deref(), Some("2026-12-31"));

        let open = YearChunk {
            year: 2029,
            is_final: true,
        };
        assert_eq!(open.from_date(), "2029-01-01");
        assert_eq!(open.to_date(), None);
        assert_eq!(open.to_string(), "2029+");
    }

    #[test]
    fn partitions_states_outer_years_inner() {
        let chunks = year_chunks(2025, 2);
        let parts = partitions(&["AK", "AL"], &chunks);
        let labels: Vec<String> = parts.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["AK/2025", "AK/2026+", "AL/2025", "AL/2026+"]);
    }

    #[test]
    fn offsets_for_1200_records() {
        let offsets: Vec<u64> = page_offsets(1200, PAGE_LIMIT).collect();
        assert_eq!(offsets, vec![0, 500, 1000]);
    }

    #[test]
    fn offsets_exact_multiple() {
        let offsets: Vec<u64> = page_offsets(1000, PAGE_LIMIT).collect();
        assert_eq!(offsets, vec![0, 500]);
    }

    #[test]
    fn offsets_empty_partition() {
        assert_eq!(page_offsets(0, PAGE_LIMIT).count(), 0);
    }

    #[test]
    fn offsets_at_result_window() {
        assert_eq!(page_offsets(MAX_RESULT_WINDOW, PAGE_LIMIT).count(), 30);
    }

    #[test]
    fn file_names_span_full_limit() {
        assert_eq!(page_file_name(0, 500), "0-499.json");
        assert_eq!(page_file_name(500, 500), "500-999.json");
        assert_eq!(page_file_name(1000, 500), "1000-1499.json");
    }

    #[test]
    fn expected_len_of_last_page() {
        let criteria = ca_2025();
        assert_eq!(PageRequest::page(criteria, 0).expected_len(1200), 500);
        assert_eq!(PageRequest::page(criteria, 1000).expected_len(1200), 200);
        assert_eq!(PageRequest::page(criteria, 1500).expected_len(1200), 0);
    }

    #[test]
    fn probe_has_zero_limit() {
        let probe = PageRequest::probe(ca_2025());
        assert_eq!(probe.offset, 0);
        assert_eq!(probe.limit, 0);
    }
}
