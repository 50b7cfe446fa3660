use async_duckdb::ClientBuilder;
use async_duckdb::duckdb::OptionalExt;
use log::debug;
use rspotify::Token;
use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::clients::errors::{Error, Result};

/// Keeps the OAuth token of each web session, keyed by session id.
pub trait TokenStore: Send + Sync + 'static {
    /// Token of the session, `None` if it never logged in or logged out.
    fn load(&self, session_id: &str) -> impl Future<Output = Result<Option<Token>>> + Send;

    /// Stores or replaces the session's token.
    fn save(&self, session_id: &str, token: &Token) -> impl Future<Output = Result<()>> + Send;

    /// Forgets the session's token. Unknown sessions are not an error.
    fn remove(&self, session_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Process-local storage, lost on restart.
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, Token>>,
}

impl InMemoryTokenStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tokens(&self) -> std::sync::MutexGuard<'_, HashMap<String, Token>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for InMemoryTokenStore {
    async fn load(&self, session_id: &str) -> Result<Option<Token>> {
        Ok(self.tokens().get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, token: &Token) -> Result<()> {
        self.tokens().insert(session_id.to_string(), token.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.tokens().remove(session_id);
        Ok(())
    }
}

const TOKEN_TABLE: &str = "oauth_token";

/// Tokens serialized as JSON rows in a `DuckDB` file.
pub struct DuckDbTokenStore {
    client: async_duckdb::Client,
}

impl DuckDbTokenStore {
    /// Wraps an open client whose schema is already initialized.
    pub fn new(client: async_duckdb::Client) -> Self {
        DuckDbTokenStore { client }
    }

    /// Opens or creates the database file and its table.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let client: async_duckdb::Client = ClientBuilder::new().path(db_path).open().await?;
        debug!("Opened token storage database at {db_path:?}");
        let store = DuckDbTokenStore { client };
        store.init_db().await?;
        Ok(store)
    }

    /// Database file under the user's cache directory.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".genrepie_tokens.duckdb")
    }

    /// Creates the token table if it does not exist yet.
    pub async fn init_db(&self) -> Result<()> {
        let table_query = format!(
            "
            CREATE TABLE IF NOT EXISTS {TOKEN_TABLE} (
                session_id TEXT PRIMARY KEY,
                token_json TEXT NOT NULL
            );
        "
        );
        self.client
            .conn(move |conn| conn.execute_batch(&table_query))
            .await?;

        debug!("Successfully initialized token storage database");
        Ok(())
    }
}

impl TokenStore for DuckDbTokenStore {
    async fn load(&self, session_id: &str) -> Result<Option<Token>> {
        let query = format!("SELECT token_json FROM {TOKEN_TABLE} WHERE session_id = ?1;");
        let session_id = session_id.to_string();

        let json: Option<String> = self
            .client
            .conn(move |conn| {
                conn.query_row(&query, [session_id], |row| row.get(0))
                    .optional()
            })
            .await?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: &str, token: &Token) -> Result<()> {
        let query = format!(
            "INSERT OR REPLACE INTO {TOKEN_TABLE} (session_id, token_json) VALUES (?1, ?2);"
        );
        let params = [session_id.to_string(), serde_json::to_string(token)?];

        self.client
            .conn(move |conn| conn.execute(&query, params))
            .await?;

        debug!("Stored token of a session in local storage");
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        let query = format!("DELETE FROM {TOKEN_TABLE} WHERE session_id = ?1;");
        let session_id = session_id.to_string();

        self.client
            .conn(move |conn| conn.execute(&query, [session_id]))
            .await?;
        Ok(())
    }
}

/// Which [`TokenStore`] the web app keeps its sessions in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStoreKind {
    /// [`InMemoryTokenStore`]
    Memory,
    /// [`DuckDbTokenStore`] at the given path
    DuckDb(PathBuf),
}

impl TokenStoreKind {
    /// Parses `memory` or `duckdb`, ignoring case.
    pub fn parse(kind: &str, db_path: PathBuf) -> Result<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "memory" => Ok(TokenStoreKind::Memory),
            "duckdb" => Ok(TokenStoreKind::DuckDb(db_path)),
            other => Err(Error::ConfigurationError(format!(
                "Unknown token store {other:?}, expected \"memory\" or \"duckdb\""
            ))),
        }
    }
}
