//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod memory_adapter;
#[cfg(feature = "postgres")]
pub mod postgres_adapter;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql_query;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(feature = "web")]
pub mod web;

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::error::BlotterError;
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_store::TradeStore;

pub type SharedStore = Arc<dyn TradeStore + Send + Sync>;

/// `[store] backend` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = BlotterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => Err(BlotterError::ConfigInvalid {
                section: "store".into(),
                key: "backend".into(),
                reason: format!("unknown backend '{other}'"),
            }),
        }
    }
}

impl Backend {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BlotterError> {
        config
            .get_string("store", "backend")
            .as_deref()
            .unwrap_or("sqlite")
            .parse()
    }
}

#[cfg(not(all(feature = "sqlite", feature = "postgres")))]
fn feature_disabled(backend: &str) -> BlotterError {
    BlotterError::ConfigInvalid {
        section: "store".into(),
        key: "backend".into(),
        reason: format!("built without the '{backend}' feature"),
    }
}

/// Open the configured store and make sure its schema exists.
pub fn open_store(config: &dyn ConfigPort) -> Result<SharedStore, BlotterError> {
    let backend = Backend::from_config(config)?;
    tracing::info!(?backend, "opening trade store");

    match backend {
        Backend::Memory => Ok(Arc::new(memory_adapter::MemoryAdapter::new())),
        Backend::Sqlite => {
            #[cfg(feature = "sqlite")]
            {
                let adapter = sqlite_adapter::SqliteAdapter::from_config(config)?;
                adapter.initialize_schema()?;
                Ok(Arc::new(adapter))
            }
            #[cfg(not(feature = "sqlite"))]
            {
                Err(feature_disabled("sqlite"))
            }
        }
        Backend::Postgres => {
            #[cfg(feature = "postgres")]
            {
                let adapter = postgres_adapter::PostgresAdapter::from_config(config)?;
                adapter.initialize_schema()?;
                Ok(Arc::new(adapter))
            }
            #[cfg(not(feature = "postgres"))]
            {
                Err(feature_disabled("postgres"))
            }
        }
    }
}
