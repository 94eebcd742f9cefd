mod feed;
mod fetch;
mod snapshot;

pub use feed::{DEFAULT_POLL_INTERVAL, FeedState, FeedStatus, SnapshotFeed};
pub use fetch::{HttpSnapshotSource, SnapshotSource, SourceConfig};
pub use snapshot::{GraphSnapshot, SnapshotEdge, SnapshotNode};
