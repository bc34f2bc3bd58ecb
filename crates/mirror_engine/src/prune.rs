use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use mirror_logging::{mirror_error, mirror_info, mirror_warn};

/// Outcome counts for one retention pass over a folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted: usize,
}

/// Keep only the `keep` most-recently-modified files per filename prefix,
/// deleting the rest. Best-effort throughout: per-file failures are logged
/// and the pass continues.
///
/// Prefixes are evaluated independently. They are not required to be
/// disjoint, so a file matching two prefixes is considered once under each.
pub fn prune_dir(dir: &Path, prefixes: &[String], keep: usize) -> PruneReport {
    let mut report = PruneReport::default();

    if !dir.exists() {
        mirror_info!("Prune: folder {:?} does not exist, nothing to do", dir);
        return report;
    }

    for prefix in prefixes {
        let mut matched = match files_with_prefix(dir, prefix) {
            Ok(files) => files,
            Err(err) => {
                mirror_error!("Prune: failed to list {:?}: {}", dir, err);
                continue;
            }
        };
        if matched.len() <= keep {
            continue;
        }

        // Oldest-first trimming: sort ascending by mtime, drop the excess.
        matched.sort_by_key(|(_, mtime)| *mtime);
        let excess = matched.len() - keep;
        mirror_info!(
            "Prune: {} files match prefix {:?}, deleting {} oldest",
            matched.len(),
            prefix,
            excess
        );

        for (path, _) in matched.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    mirror_info!("Deleted old file {:?}", path);
                    report.deleted += 1;
                }
                Err(err) => {
                    mirror_error!("Failed to delete {:?}: {}", path, err);
                }
            }
        }
    }

    report
}

/// Regular files in `dir` whose name starts with `prefix`, with their
/// modification times. Entries whose metadata cannot be read are skipped.
fn files_with_prefix(dir: &Path, prefix: &str) -> io::Result<Vec<(PathBuf, SystemTime)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(prefix) {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                mirror_warn!("Prune: cannot stat {:?}: {}", entry.path(), err);
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let mtime = match meta.modified() {
            Ok(mtime) => mtime,
            Err(err) => {
                mirror_warn!("Prune: no mtime for {:?}: {}", entry.path(), err);
                continue;
            }
        };
        files.push((entry.path(), mtime));
    }
    Ok(files)
}
