pub mod docstore;
pub mod error;
pub mod identity;
pub mod memory;
pub mod tmdb;
pub mod traits;

pub use docstore::DocStoreClient;
pub use error::BackendError;
pub use identity::IdentityClient;
pub use memory::MemoryStore;
pub use tmdb::TmdbClient;
pub use traits::{DocumentStore, IdentityProvider, MetadataProvider};
