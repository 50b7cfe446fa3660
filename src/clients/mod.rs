/// Capabilities the genre aggregation consumes
pub mod catalog;
/// Data entities for playlists, tracks and artists
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Spotify API client
pub mod spotify;
/// OAuth token storage, in memory or backed by `DuckDB`
pub mod token_storage;

pub use catalog::{CatalogProvider, GenreLookup, MemoizedLookup, MusicCatalog};
pub use spotify::SpotifyClient;
pub use token_storage::{DuckDbTokenStore, InMemoryTokenStore, TokenStore};
