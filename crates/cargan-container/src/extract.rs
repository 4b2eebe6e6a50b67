//! Writing decoded records to a directory.
//!
//! The parser never touches the filesystem; this module is the persistence
//! side that callers can use instead of writing records themselves.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::container::Container;
use crate::header::Variant;
use crate::index::synthesized_name;
use crate::record::OutputRecord;
use crate::{Error, Result};

/// Options controlling how records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Replace files that already exist. When false they are skipped.
    pub overwrite: bool,
    /// Drop directory components from record names.
    pub flatten: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            flatten: false,
        }
    }
}

/// Progress notification, sent once per record.
#[derive(Debug, Clone, Copy)]
pub enum ExtractEvent<'a> {
    /// The record was written to `path`.
    Written {
        record: &'a OutputRecord,
        path: &'a Path,
    },
    /// `path` already existed and overwriting is disabled.
    Skipped {
        record: &'a OutputRecord,
        path: &'a Path,
    },
}

impl ExtractEvent<'_> {
    /// The record this event is about.
    pub fn record(&self) -> &OutputRecord {
        match self {
            Self::Written { record, .. } | Self::Skipped { record, .. } => record,
        }
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::Skipped { path, .. } => path,
        }
    }
}

/// Totals for one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub variant: Variant,
    pub written: usize,
    pub skipped: usize,
    pub bytes: u64,
}

impl ExtractSummary {
    fn new(variant: Variant) -> Self {
        Self {
            variant,
            written: 0,
            skipped: 0,
            bytes: 0,
        }
    }

    fn add(&mut self, record: &OutputRecord, written: bool) {
        if written {
            self.written += 1;
            self.bytes += record.data.len() as u64;
        } else {
            self.skipped += 1;
        }
    }
}

/// Destination path for a record under `out_dir`.
///
/// Backslashes count as separators. Root, prefix, `.` and `..` components are
/// dropped so the result always stays inside `out_dir`. A name with nothing
/// left falls back to the synthesized name for the record's offset.
pub fn output_path(out_dir: &Path, record: &OutputRecord, flatten: bool) -> PathBuf {
    let normalized = record.name.replace('\\', "/");

    let mut relative: PathBuf = Path::new(&normalized)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if flatten {
        relative = relative.file_name().map(PathBuf::from).unwrap_or_default();
    }
    if relative.as_os_str().is_empty() {
        relative = PathBuf::from(synthesized_name(record.offset));
    }

    out_dir.join(relative)
}

/// Write one record. Returns the destination and whether it was written.
pub fn write_record(
    out_dir: &Path,
    record: &OutputRecord,
    options: &ExtractOptions,
) -> Result<(PathBuf, bool)> {
    let path = output_path(out_dir, record, options.flatten);

    if !options.overwrite && path.exists() {
        debug!(path = %path.display(), "exists, skipping");
        return Ok((path, false));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, e))?;
    }
    fs::write(&path, &record.data).map_err(|e| Error::filesystem(&path, e))?;

    debug!(path = %path.display(), size = record.data.len(), "wrote record");
    Ok((path, true))
}

/// Extract every record of `container` into `out_dir`.
///
/// Records are written as they are decoded. The first error stops the run;
/// files written before it stay on disk.
pub fn extract_all<F>(
    container: &Container,
    out_dir: impl AsRef<Path>,
    options: &ExtractOptions,
    mut on_progress: F,
) -> Result<ExtractSummary>
where
    F: FnMut(&ExtractEvent<'_>),
{
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|e| Error::filesystem(out_dir, e))?;

    let mut summary = ExtractSummary::new(container.variant());
    for record in container.parse()? {
        let record = record?;
        let (path, written) = write_record(out_dir, &record, options)?;
        summary.add(&record, written);
        on_progress(&event(&record, &path, written));
    }

    info!(
        container = container.name(),
        written = summary.written,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "extraction finished"
    );
    Ok(summary)
}

/// Extract every record of `container` into `out_dir`, writing in parallel.
///
/// The whole data section is decoded before any file is written, so a
/// structural error leaves the output directory untouched. Progress events
/// arrive in completion order. If two records resolve to the same path, which
/// one remains is unspecified.
#[cfg(feature = "parallel")]
pub fn extract_parallel<F>(
    container: &Container,
    out_dir: impl AsRef<Path>,
    options: &ExtractOptions,
    mut on_progress: F,
) -> Result<ExtractSummary>
where
    F: FnMut(&ExtractEvent<'_>) + Send,
{
    use rayon::prelude::*;
    use std::sync::Mutex;

    let out_dir = out_dir.as_ref();
    let records = container.records()?;
    fs::create_dir_all(out_dir).map_err(|e| Error::filesystem(out_dir, e))?;

    let callback = Mutex::new(&mut on_progress);
    let outcomes = records
        .par_iter()
        .map(|record| {
            let (path, written) = write_record(out_dir, record, options)?;
            if let Ok(mut cb) = callback.lock() {
                (*cb)(&event(record, &path, written));
            }
            Ok(written)
        })
        .collect::<Result<Vec<bool>>>()?;

    let mut summary = ExtractSummary::new(container.variant());
    for (record, written) in records.iter().zip(outcomes) {
        summary.add(record, written);
    }

    info!(
        container = container.name(),
        written = summary.written,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "parallel extraction finished"
    );
    Ok(summary)
}

fn event<'a>(record: &'a OutputRecord, path: &'a Path, written: bool) -> ExtractEvent<'a> {
    if written {
        ExtractEvent::Written { record, path }
    } else {
        ExtractEvent::Skipped { record, path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, offset: usize) -> OutputRecord {
        OutputRecord {
            name: name.to_string(),
            offset,
            next_offset: 0,
            data: b"data".to_vec(),
            resolved: true,
        }
    }

    #[test]
    fn test_output_path_plain_name() {
        let out = Path::new("out");
        assert_eq!(
            output_path(out, &record("a.bin", 0), false),
            out.join("a.bin")
        );
    }

    #[test]
    fn test_output_path_backslashes() {
        let out = Path::new("out");
        assert_eq!(
            output_path(out, &record("Data\\Sub\\x.png", 0), false),
            out.join("Data").join("Sub").join("x.png")
        );
        assert_eq!(
            output_path(out, &record("Data\\Sub\\x.png", 0), true),
            out.join("x.png")
        );
    }

    #[test]
    fn test_output_path_stays_inside() {
        let out = Path::new("out");
        assert_eq!(
            output_path(out, &record("../../etc/passwd", 0), false),
            out.join("etc").join("passwd")
        );
        assert_eq!(
            output_path(out, &record("/abs/name", 0), false),
            out.join("abs").join("name")
        );
    }

    #[test]
    fn test_output_path_empty_falls_back() {
        let out = Path::new("out");
        assert_eq!(
            output_path(out, &record("", 40), false),
            out.join("file-40.extracted")
        );
        assert_eq!(
            output_path(out, &record("..", 52), false),
            out.join("file-52.extracted")
        );
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert!(options.overwrite);
        assert!(!options.flatten);
    }
}
