use std::collections::HashSet;
use std::fs;
use std::path::Path;

use mirror_logging::{mirror_error, mirror_info};
use thiserror::Error;
use url::Url;

use crate::fetch::{file_url, HttpFetcher};
use crate::listing;
use crate::persist::{ensure_dest_dir, PersistError};
use crate::types::{FailureKind, FetchError, SyncReport, SyncTarget};

/// Why a target's sync stopped before the download loop.
#[derive(Debug, Error)]
pub enum SyncAbort {
    #[error("destination not usable: {0}")]
    DestDir(#[from] PersistError),
    #[error("listing fetch failed: {0}")]
    Listing(FetchError),
    #[error("no <pre> block found in listing page")]
    NoPreBlock,
    #[error("listing contained no file links")]
    NoEntries,
}

impl SyncAbort {
    /// Missing structure and empty listings mean "nothing to do" and are
    /// logged as warnings; fetch failures are logged as errors.
    pub fn is_warning(&self) -> bool {
        !matches!(self, SyncAbort::Listing(_))
    }
}

/// The candidate set: the final `n` entries in the page's original order.
/// Listing order is trusted as oldest-to-newest; no re-sorting happens.
pub fn select_latest(entries: &[String], n: usize) -> &[String] {
    &entries[entries.len().saturating_sub(n)..]
}

/// Run one full sync for a single target: enumerate local files, fetch and
/// parse the listing, then download the latest entries not already present.
///
/// Per-file download failures are logged and skipped; only the steps before
/// the download loop can abort the target.
pub fn sync_target(
    fetcher: &HttpFetcher,
    target: &SyncTarget,
    latest_count: usize,
) -> Result<SyncReport, SyncAbort> {
    mirror_info!("Starting sync for {}", target.base_url);

    let base = Url::parse(&target.base_url).map_err(|err| {
        SyncAbort::Listing(FetchError {
            kind: FailureKind::InvalidUrl,
            message: err.to_string(),
        })
    })?;

    ensure_dest_dir(&target.dest_dir)?;
    let known = known_files(&target.dest_dir)?;
    mirror_info!(
        "Found {} local files in {:?}",
        known.len(),
        target.dest_dir
    );

    let html = fetcher
        .fetch_listing(&base)
        .map_err(SyncAbort::Listing)?;
    let entries = listing::extract_entries(&html).ok_or(SyncAbort::NoPreBlock)?;
    if entries.is_empty() {
        return Err(SyncAbort::NoEntries);
    }

    let candidates = select_latest(&entries, latest_count);
    mirror_info!(
        "Selected {} latest entries: {:?}",
        candidates.len(),
        candidates
    );

    let mut report = SyncReport::default();
    for name in candidates {
        if known.contains(name) {
            mirror_info!("File {} already exists, skipping", name);
            report.skipped += 1;
            continue;
        }

        let url = match file_url(&base, name) {
            Ok(url) => url,
            Err(err) => {
                mirror_error!("Skipping {}: {}", name, err);
                continue;
            }
        };
        let dest = target.dest_dir.join(name);

        mirror_info!("Downloading new file: {}", name);
        match fetcher.download_to(&url, &dest) {
            Ok(bytes) => {
                mirror_info!("Downloaded {} ({} bytes)", name, bytes);
                report.downloaded += 1;
            }
            Err(err) => {
                mirror_error!("Failed to download {}: {}", name, err);
            }
        }
    }

    mirror_info!(
        "Sync finished for {}: {} downloaded, {} skipped",
        target.base_url,
        report.downloaded,
        report.skipped
    );
    Ok(report)
}

/// Filenames already present locally, recomputed fresh for every sync.
fn known_files(dir: &Path) -> Result<HashSet<String>, PersistError> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
