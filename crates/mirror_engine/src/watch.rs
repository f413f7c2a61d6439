//! The watch-diff-get cycle over a persisted listing snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use thiserror::Error;

use mirror_core::{diff_inventories, parse_inventory, Change, DiffEntry, FileInfo, ListingError};

use crate::decode::{decode_page, DecodeError};
use crate::fetch::{FetchError, Fetcher};
use crate::persist::{BatchDir, PersistError, StateFile};

/// Filenames reported as changed but never downloaded.
const DEFAULT_IGNORED: &[&str] = &["doxygen/"];

/// Clock used to stamp batch directories, injectable for tests.
pub type UtcStamp = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct WatchSettings {
    /// Where the last observed page lives.
    pub state_path: PathBuf,
    /// Parent directory for the per-run batch directories.
    pub batch_root: PathBuf,
    /// Changed names that are listed but never fetched.
    pub ignored_names: Vec<String>,
    pub stamp: UtcStamp,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("state"),
            batch_root: PathBuf::from("."),
            ignored_names: DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect(),
            stamp: Arc::new(|| Utc::now().format("%Y-%m-%dT%H:%M:%S%z").to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum WatchError {
    /// No snapshot has been committed yet.
    #[error("no state available")]
    NoState,
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("remote fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("remote sent content type {content_type:?}, expected text/html")]
    ContentType { content_type: Option<String> },
    #[error("download of {url} failed: {source}")]
    Transfer { url: String, source: FetchError },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Progress events emitted during a `get` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The changed files about to be processed, in diff order.
    Changed(Vec<FileInfo>),
    /// One artifact download is starting.
    Downloading { url: String },
}

/// Observer for [`WatchEvent`]s; the CLI prints them, tests collect them.
pub trait WatchSink {
    fn emit(&self, event: WatchEvent);
}

/// Result of a `get` run that found changes.
#[derive(Debug)]
pub struct AppliedBatch {
    /// Every new or modified file, in diff order, ignore list included.
    pub changed: Vec<FileInfo>,
    /// URLs actually fetched, in download order.
    pub downloaded: Vec<String>,
    pub batch_dir: PathBuf,
}

/// Result of a `get` run.
#[derive(Debug)]
pub enum GetOutcome {
    /// Remote matches the stored snapshot; nothing was touched.
    Unchanged,
    Applied(AppliedBatch),
}

/// The fetched listing page in both raw and parsed form.
struct RemoteListing {
    raw: Vec<u8>,
    inventory: Vec<FileInfo>,
}

/// Ties persisted state, the remote fetch, the diff and the selective
/// download together.
///
/// Every operation starts from the committed snapshot; only a fully
/// successful `get` (or `init`) commits a new one, and it does so as its
/// last step, so a failed run leaves the previous state intact and the whole
/// cycle retryable. Invocations against the same state file must be
/// serialized by the caller; no locking happens here.
pub struct Watcher<F> {
    fetcher: F,
    settings: WatchSettings,
}

impl<F: Fetcher> Watcher<F> {
    pub fn new(fetcher: F, settings: WatchSettings) -> Self {
        Self { fetcher, settings }
    }

    fn state_file(&self) -> StateFile {
        StateFile::new(&self.settings.state_path)
    }

    fn stored_inventory(&self) -> Result<Vec<FileInfo>, WatchError> {
        let bytes = self.state_file().read()?.ok_or(WatchError::NoState)?;
        let html = decode_page(&bytes, None)?;
        Ok(parse_inventory(&html)?)
    }

    async fn fetch_listing(&self, url: &str) -> Result<RemoteListing, WatchError> {
        let output = self.fetcher.fetch(url).await?;
        let is_html = output
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/html"));
        if !is_html {
            return Err(WatchError::ContentType {
                content_type: output.content_type,
            });
        }
        let html = decode_page(&output.bytes, output.content_type.as_deref())?;
        let inventory = parse_inventory(&html)?;
        debug!("fetched listing from {url}: {} entries", inventory.len());
        Ok(RemoteListing {
            raw: output.bytes,
            inventory,
        })
    }

    /// Inventory recorded by the committed snapshot, in parsed order.
    pub fn dump(&self) -> Result<Vec<FileInfo>, WatchError> {
        self.stored_inventory()
    }

    /// Changes between the committed snapshot and the live listing.
    /// Read-only; no state mutation.
    pub async fn diff(&self, url: &str) -> Result<Vec<DiffEntry>, WatchError> {
        let stored = self.stored_inventory()?;
        let remote = self.fetch_listing(url).await?;
        Ok(diff_inventories(&stored, &remote.inventory))
    }

    /// Fetch and validate the listing, then commit it as the initial
    /// snapshot without downloading anything. The explicit bootstrap for a
    /// first run.
    pub async fn init(&self, url: &str) -> Result<usize, WatchError> {
        let remote = self.fetch_listing(url).await?;
        self.state_file().replace(&remote.raw)?;
        info!(
            "committed initial snapshot of {} entries to {:?}",
            remote.inventory.len(),
            self.settings.state_path
        );
        Ok(remote.inventory.len())
    }

    /// Download everything new or modified into a fresh batch directory,
    /// then commit the fetched page as the new snapshot.
    ///
    /// Deleted entries are visible in the diff but never fetched. Any
    /// transfer failure aborts the run before the state is touched;
    /// artifacts already written stay behind in the batch directory.
    pub async fn get(&self, url: &str, sink: &dyn WatchSink) -> Result<GetOutcome, WatchError> {
        // Stamp first so the batch name reflects when the query started.
        let stamp = (self.settings.stamp)();

        let stored = self.stored_inventory()?;
        let remote = self.fetch_listing(url).await?;
        let diff = diff_inventories(&stored, &remote.inventory);

        let changed_names: Vec<&str> = diff
            .iter()
            .filter(|entry| matches!(entry.change, Change::New | Change::Modified))
            .map(|entry| entry.name.as_str())
            .collect();
        if changed_names.is_empty() {
            debug!("no new or modified files; leaving state untouched");
            return Ok(GetOutcome::Unchanged);
        }

        let changed: Vec<FileInfo> = changed_names
            .iter()
            .map(|name| {
                remote
                    .inventory
                    .iter()
                    .find(|info| info.name == *name)
                    .expect("diff names come from the remote inventory")
                    .clone()
            })
            .collect();
        sink.emit(WatchEvent::Changed(changed.clone()));

        let batch = BatchDir::create(&self.settings.batch_root, &stamp)?;
        info!("created batch directory {:?}", batch.path());

        let mut downloaded = Vec::new();
        for name in &changed_names {
            if self
                .settings
                .ignored_names
                .iter()
                .any(|ignored| ignored.as_str() == *name)
            {
                debug!("skipping ignored file {name}");
                continue;
            }
            let file_url = format!("{url}{name}");
            sink.emit(WatchEvent::Downloading {
                url: file_url.clone(),
            });
            let output = self
                .fetcher
                .fetch(&file_url)
                .await
                .map_err(|source| WatchError::Transfer {
                    url: file_url.clone(),
                    source,
                })?;
            batch.write_file(name, &output.bytes)?;
            downloaded.push(file_url);
        }

        // Audit copy of the page the batch was computed from.
        batch.write_file("index.html", &remote.raw)?;

        // Committing the snapshot is the last step: a failure anywhere above
        // leaves the previous state in place and the run retryable.
        self.state_file().replace(&remote.raw)?;
        info!(
            "committed new snapshot after {} downloads to {:?}",
            downloaded.len(),
            batch.path()
        );

        Ok(GetOutcome::Applied(AppliedBatch {
            changed,
            downloaded,
            batch_dir: batch.path().to_path_buf(),
        }))
    }
}
