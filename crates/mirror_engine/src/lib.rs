//! Mirror engine: network fetch, page decoding, persistence and the
//! watch-diff-get cycle.
mod decode;
mod fetch;
mod persist;
mod watch;

pub use decode::{decode_page, DecodeError};
pub use fetch::{FetchError, FetchOutput, FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{BatchDir, PersistError, StateFile};
pub use watch::{
    AppliedBatch, GetOutcome, WatchError, WatchEvent, WatchSettings, WatchSink, Watcher,
};
