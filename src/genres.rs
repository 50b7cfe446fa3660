//! Genre aggregation over a playlist's tracks.
//!
//! Each available track contributes the genres of its primary artist, once per
//! genre. Counts are ranked highest first and truncated to [`TOP_GENRES`].
//! Genres with equal counts keep the order in which they were first seen.

use std::collections::HashMap;

use log::{debug, info};

use crate::clients::{
    catalog::GenreLookup,
    entities::{PlaylistSummary, TrackEntry},
    errors::{Error, Result},
};

/// Size of the ranked table handed to the chart
pub const TOP_GENRES: usize = 10;

/// One genre and the number of tracks it was counted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    /// Genre label as the catalog spells it
    pub genre: String,
    /// Number of counted tracks whose primary artist carries the genre
    pub count: u32,
}

/// Occurrence table for a single aggregation pass, in first-seen order.
#[derive(Debug, Default)]
pub struct GenreCounts {
    entries: Vec<GenreCount>,
    index: HashMap<String, usize>,
}

impl GenreCounts {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence, appending the genre if it is new.
    pub fn increment(&mut self, genre: &str) {
        match self.index.get(genre) {
            Some(&pos) => self.entries[pos].count += 1,
            None => {
                self.index.insert(genre.to_string(), self.entries.len());
                self.entries.push(GenreCount {
                    genre: genre.to_string(),
                    count: 1,
                });
            }
        }
    }

    /// Count of `genre`, `None` if it was never seen.
    pub fn get(&self, genre: &str) -> Option<u32> {
        self.index.get(genre).map(|&pos| self.entries[pos].count)
    }

    /// Number of distinct genres.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was counted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the table into its `n` most frequent genres.
    pub fn into_top(self, n: usize) -> TopGenres {
        let mut entries = self.entries;
        // stable: ties stay in first-seen order
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(n);
        TopGenres { entries }
    }
}

/// Ranked genre counts, highest count first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopGenres {
    entries: Vec<GenreCount>,
}

impl TopGenres {
    /// Entries in rank order.
    pub fn entries(&self) -> &[GenreCount] {
        &self.entries
    }

    /// Iterates in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &GenreCount> {
        self.entries.iter()
    }

    /// Number of ranked genres, at most the requested size.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no genre was found at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the ranked counts, the denominator of the chart's percentages.
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Counts the primary-artist genres of every available track and ranks them.
///
/// Entries without a track, and tracks without artists, are skipped. The lookup
/// runs once per counted track, in playlist order. A failed lookup fails the
/// whole aggregation.
pub async fn top_genres<L>(entries: &[TrackEntry], lookup: &L) -> Result<TopGenres>
where
    L: GenreLookup + ?Sized,
{
    let mut counts = GenreCounts::new();
    let mut skipped = 0usize;

    for entry in entries {
        let Some(artist) = entry.track.as_ref().and_then(|t| t.primary_artist()) else {
            skipped += 1;
            continue;
        };
        for genre in lookup.genres_of(&artist.id).await? {
            counts.increment(&genre);
        }
    }

    debug!(
        "Counted {} distinct genres over {} entries, {skipped} skipped",
        counts.len(),
        entries.len()
    );
    Ok(counts.into_top(TOP_GENRES))
}

/// Finds the first playlist whose name equals `name`, ignoring case.
pub fn find_playlist<'a>(playlists: &'a [PlaylistSummary], name: &str) -> Result<&'a PlaylistSummary> {
    let wanted = name.to_lowercase();
    let found = playlists.iter().find(|p| p.name.to_lowercase() == wanted);
    match found {
        Some(playlist) => {
            info!("Resolved playlist {name:?} to {}", playlist.id);
            Ok(playlist)
        }
        None => Err(Error::PlaylistNotFound(name.to_string())),
    }
}
