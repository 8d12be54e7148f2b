use crate::config::Config;
use crate::core::catalog::FieldCatalog;
use crate::db::changes::{ChangeBus, ChangeEvent};
use crate::db::fields::load_fields;
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::storage::{BlobStore, FsBlobStore};
use crate::ui::messages::warning;
use rusqlite::Connection;

/// Everything a command needs: the record store, the blob store, the change
/// bus, the field catalog and the effective configuration.
pub struct AppContext {
    pub pool: DbPool,
    pub blobs: Box<dyn BlobStore>,
    pub bus: ChangeBus,
    pub catalog: FieldCatalog,
    pub config: Config,
}

impl AppContext {
    /// Open (and migrate) the configured database and blob directory.
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let pool = DbPool::new(&cfg.database)?;
        let blobs = FsBlobStore::open(cfg.storage_root(), &cfg.signing_secret)?;
        Self::with_parts(pool, Box::new(blobs), cfg.clone())
    }

    /// Assemble a context from already-built stores.
    pub fn with_parts(pool: DbPool, blobs: Box<dyn BlobStore>, config: Config) -> AppResult<Self> {
        init_db(&pool.conn)?;
        let catalog = FieldCatalog::new(load_fields(&pool.conn)?)?;

        Ok(Self {
            pool,
            blobs,
            bus: ChangeBus::new(),
            catalog,
            config,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    pub fn reload_catalog(&mut self) -> AppResult<()> {
        self.catalog = FieldCatalog::new(load_fields(&self.pool.conn)?)?;
        Ok(())
    }

    /// Append a change to the internal log, then notify subscribers.
    /// A log write failure never undoes the change itself.
    pub fn record(&self, event: &ChangeEvent, message: &str) {
        let target = format!("{} #{}", event.table, event.record_id);
        if let Err(e) = ttlog(&self.pool.conn, event.kind.as_str(), &target, message) {
            warning(format!("Failed to write internal log: {}", e));
        }
        self.bus.publish(event);
    }
}
