//! JSON file output with atomic tmp→rename

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary sibling used while a file is being written
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `value` as pretty-printed JSON into `path`.
///
/// Parent directories are created as needed. Bytes go to `{path}.tmp`
/// first and are renamed into place, so `path` only ever exists complete.
/// Returns the number of bytes written.
pub fn write_json_atomic<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path_for(path);
    let result = (|| {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, value).map_err(io::Error::other)?;
        writer.flush()?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(fs::metadata(path)?.len())
}

/// Remove stale .tmp files anywhere below the output directory.
///
/// Returns how many were removed. A missing directory is not an error.
pub fn cleanup_tmp_files(output_dir: &Path) -> io::Result<usize> {
    if !output_dir.exists() {
        return Ok(0);
    }
    let root = output_dir.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path is not UTF-8: {}", output_dir.display()),
        )
    })?;
    let pattern = format!("{}/**/*.tmp", glob::Pattern::escape(root));
    let paths = glob::glob(&pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut removed = 0;
    for entry in paths {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
