pub mod achievements;
pub mod error;
pub mod feed;
pub mod sharing;
pub mod store;

pub use achievements::thresholds_crossed;
pub use error::StoreError;
pub use feed::DiscoveryFeed;
pub use sharing::{ShareLink, SharingService};
pub use store::{StoreEvent, WatchlistStore};
