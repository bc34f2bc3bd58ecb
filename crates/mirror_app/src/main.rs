//! Entry point: sync every configured listing once, prune, then exit.
//!
//! The binary is expected to be invoked periodically by an external
//! scheduler; it does not daemonize or loop.

mod config;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use mirror_engine::{prune_dir, sync_target, FetchSettings, HttpFetcher, SyncTarget};
use mirror_logging::{mirror_error, mirror_info, mirror_warn, LogDestination};

const DEFAULT_CONFIG_PATH: &str = "./mirror.ron";

fn main() -> ExitCode {
    mirror_logging::initialize(LogDestination::Both);

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            mirror_error!("Failed to load config {:?}: {}", config_path, err);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = match HttpFetcher::new(FetchSettings::default()) {
        Ok(fetcher) => fetcher,
        Err(err) => {
            mirror_error!("Failed to build HTTP client: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // Targets run one after another; a failed target never stops the rest.
    for target_config in &config.targets {
        let target = SyncTarget {
            base_url: target_config.url.clone(),
            dest_dir: target_config.folder.clone(),
        };
        match sync_target(&fetcher, &target, config.latest_count) {
            Ok(report) => {
                mirror_info!(
                    "{}: {} new files, {} already present",
                    target.base_url,
                    report.downloaded,
                    report.skipped
                );
            }
            Err(abort) if abort.is_warning() => {
                mirror_warn!("{}: {}", target.base_url, abort);
            }
            Err(abort) => {
                mirror_error!("{}: {}", target.base_url, abort);
            }
        }
    }

    if !config.prune_prefixes.is_empty() {
        let keep = config.retention_keep_count();
        for target_config in &config.targets {
            let report = prune_dir(&target_config.folder, &config.prune_prefixes, keep);
            mirror_info!(
                "Retention pass for {:?}: {} files deleted",
                target_config.folder,
                report.deleted
            );
        }
    }

    ExitCode::SUCCESS
}
