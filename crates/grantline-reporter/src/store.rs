//! Page files on disk; a file's existence is its resume marker

use std::path::PathBuf;

use crate::plan::{PageRequest, page_file_name};
use crate::schema::AwardRecord;

/// Output tree rooted at `{outdir}`: `{state}/{year}/{first}-{last}.json`
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every page of one partition
    pub fn partition_dir(&self, request: &PageRequest) -> PathBuf {
        self.root
            .join(request.criteria.state)
            .join(request.criteria.chunk.year.to_string())
    }

    pub fn page_path(&self, request: &PageRequest) -> PathBuf {
        self.partition_dir(request)
            .join(page_file_name(request.offset, request.limit))
    }

    /// Whether the page was already written by an earlier run
    pub fn exists(&self, request: &PageRequest) -> bool {
        self.page_path(request).is_file()
    }

    /// Write one page of records, creating directories as needed.
    ///
    /// Returns the written path.
    pub fn write(&self, request: &PageRequest, records: &[AwardRecord]) -> std::io::Result<PathBuf> {
        let path = self.page_path(request);
        let bytes = grantline_core::write_json_atomic(&path, records)?;
        log::debug!("{}: {} records, {bytes} bytes", path.display(), records.len());
        Ok(path)
    }
}
