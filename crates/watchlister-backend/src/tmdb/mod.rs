pub mod api;
pub mod client;
pub mod genres;

pub use client::TmdbClient;
pub use genres::{genre_id_for_name, genre_name_for_id, GENRES};
