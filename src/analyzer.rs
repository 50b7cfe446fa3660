use log::{debug, info};
use std::path::PathBuf;

use crate::chart;
use crate::clients::{
    catalog::{MemoizedLookup, MusicCatalog},
    errors::Result,
};
use crate::genres::{self, TopGenres};

/// Outcome of analyzing one playlist
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Name as the catalog spells it, not as typed
    pub playlist_name: String,
    /// File name of the chart inside the image directory
    pub image_file: String,
    /// Ranked genres the chart was drawn from
    pub top: TopGenres,
}

/// Settings of the [`Analyzer`]
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Directory charts are written to
    pub image_dir: PathBuf,
    /// Look each artist up once per analysis
    pub memoize_artists: bool,
}

/// Runs one playlist through name resolution, aggregation and chart rendering
pub struct Analyzer<'a, C> {
    catalog: &'a C,
    config: &'a AnalyzerConfig,
}

impl<'a, C: MusicCatalog> Analyzer<'a, C> {
    /// Analyzer over the user's catalog.
    pub fn new(catalog: &'a C, config: &'a AnalyzerConfig) -> Self {
        Analyzer { catalog, config }
    }

    /// Resolves the playlist by name and ranks its genres, without drawing a chart.
    pub async fn top_genres(&self, playlist_name: &str) -> Result<(String, TopGenres)> {
        debug!("Fetching playlists of the current user ...");
        let playlists = self.catalog.list_user_playlists().await?;
        let playlist = genres::find_playlist(&playlists, playlist_name)?;

        let entries = self.catalog.playlist_tracks(&playlist.id).await?;
        info!(
            "Aggregating genres over {} entries of {:?}",
            entries.len(),
            playlist.name
        );

        let top = if self.config.memoize_artists {
            let lookup = MemoizedLookup::new(self.catalog);
            let top = genres::top_genres(&entries, &lookup).await?;
            debug!("Looked up {} distinct artists", lookup.cached_artists());
            top
        } else {
            genres::top_genres(&entries, self.catalog).await?
        };

        Ok((playlist.name.clone(), top))
    }

    /// Ranks the playlist's genres and saves their chart.
    pub async fn analyze(&self, playlist_name: &str) -> Result<Analysis> {
        let (playlist_name, top) = self.top_genres(playlist_name).await?;
        if top.is_empty() {
            info!("No genres found in {playlist_name:?}");
        }
        let image_file = chart::save_chart(&self.config.image_dir, &top, &playlist_name).await?;
        info!("Analysis of {playlist_name:?} completed, chart {image_file}");
        Ok(Analysis {
            playlist_name,
            image_file,
            top,
        })
    }
}
