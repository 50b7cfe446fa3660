//! Genrepie - chart the most common genres of a Spotify playlist
//!
//! This library resolves one of the user's playlists by name, counts the genres
//! of each track's primary artist and renders the top ten as a pie chart, either
//! from the command line or through a small web app.

/// Playlist analysis, from name resolution to a saved chart
pub mod analyzer;
/// SVG pie chart rendering
pub mod chart;
/// Client modules for interacting with Spotify and token storage
pub mod clients;
/// Application settings
pub mod config;
/// Genre counting and ranking
pub mod genres;
/// HTTP interface
pub mod web;
