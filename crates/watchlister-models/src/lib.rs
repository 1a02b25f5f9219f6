pub mod achievement;
pub mod discover;
pub mod document;
pub mod movie;
pub mod session;
pub mod share;
pub mod video;

pub use achievement::{Achievement, ACHIEVEMENT_THRESHOLDS};
pub use discover::{DiscoverFilter, PagedResults, SortKey};
pub use document::UserDocument;
pub use movie::{MediaType, MovieKey, MovieRecord, Priority};
pub use session::UserSession;
pub use share::{ShareSettings, SharedWatchlistView};
pub use video::Video;
