//! Mirror engine: autoindex listing sync and retention pruning.
mod fetch;
mod listing;
mod persist;
mod prune;
mod sync;
mod types;

pub use fetch::{file_url, FetchSettings, HttpFetcher};
pub use listing::extract_entries;
pub use persist::{ensure_dest_dir, PersistError};
pub use prune::{prune_dir, PruneReport};
pub use sync::{select_latest, sync_target, SyncAbort};
pub use types::{FailureKind, FetchError, SyncReport, SyncTarget};
