use std::{env, net::SocketAddr, path::PathBuf};

use crate::analyzer::AnalyzerConfig;
use crate::clients::{
    errors::{Error, Result},
    token_storage::{DuckDbTokenStore, TokenStoreKind},
};

const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_IMAGE_DIR: &str = "static/images";

/// Application settings, read from `GENREPIE_*` environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the web server listens on
    pub address: SocketAddr,
    /// Where web sessions keep their tokens
    pub token_store: TokenStoreKind,
    /// Settings shared by the web app and the CLI
    pub analyzer: AnalyzerConfig,
}

/// Collects settings from explicit values, then the environment, then defaults.
#[derive(Default)]
pub struct ConfigBuilder {
    address: Option<String>,
    image_dir: Option<PathBuf>,
    token_store: Option<String>,
    token_db: Option<PathBuf>,
    memoize_artists: Option<bool>,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ConfigBuilder {
    /// Builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds unset fields from the environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        Self {
            address: self.address.or_else(|| env_opt("GENREPIE_ADDRESS")),
            image_dir: self
                .image_dir
                .or_else(|| env_opt("GENREPIE_IMAGE_DIR").map(PathBuf::from)),
            token_store: self.token_store.or_else(|| env_opt("GENREPIE_TOKEN_STORE")),
            token_db: self
                .token_db
                .or_else(|| env_opt("GENREPIE_TOKEN_DB").map(PathBuf::from)),
            memoize_artists: self.memoize_artists.or_else(|| {
                env_opt("GENREPIE_MEMOIZE_ARTISTS").map(|v| {
                    !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
                })
            }),
        }
    }

    /// Listen address, `host:port`.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Directory charts are written to and served from.
    #[must_use]
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// `memory` or `duckdb`.
    #[must_use]
    pub fn token_store(mut self, kind: impl Into<String>) -> Self {
        self.token_store = Some(kind.into());
        self
    }

    /// Whether one analysis looks up each artist only once.
    #[must_use]
    pub fn memoize_artists(mut self, memoize: bool) -> Self {
        self.memoize_artists = Some(memoize);
        self
    }

    /// Analysis settings only. Web server settings are not read, so they
    /// cannot make a CLI run fail.
    #[must_use]
    pub fn build_analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            image_dir: self
                .image_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR)),
            memoize_artists: self.memoize_artists.unwrap_or(true),
        }
    }

    /// Full web app settings; fails on a malformed address or unknown token store.
    pub fn build(self) -> Result<AppConfig> {
        let analyzer = self.build_analyzer();

        let address = self.address.as_deref().unwrap_or(DEFAULT_ADDRESS);
        let address: SocketAddr = address.parse().map_err(|e| {
            Error::ConfigurationError(format!("Invalid address {address:?}: {e}"))
        })?;

        let token_db = self.token_db.unwrap_or_else(DuckDbTokenStore::default_path);
        let token_store =
            TokenStoreKind::parse(self.token_store.as_deref().unwrap_or("duckdb"), token_db)?;

        Ok(AppConfig {
            address,
            token_store,
            analyzer,
        })
    }
}
