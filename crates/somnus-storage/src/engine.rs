//! StorageEngine: owns the connection pool and implements the event, memory
//! and contradiction store traits.

use std::path::Path;

use chrono::{Duration, Utc};

use somnus_core::config::StorageConfig;
use somnus_core::errors::SomnusResult;
use somnus_core::models::{
    Contradiction, ContradictionStatus, EpisodicEvent, LifecycleState, PendingUpdate,
    SemanticMemory,
};
use somnus_core::traits::{IContradictionStore, IEventStore, IMemoryStore};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{contradiction_ops, event_ops, memory_ops, pending_ops};

pub struct StorageEngine {
    pool: ConnectionPool,
    /// File-backed mode reads through the read pool. In-memory mode routes
    /// reads through the writer, because in-memory readers are isolated
    /// databases.
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, config: &StorageConfig) -> SomnusResult<Self> {
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        let engine = Self {
            pool,
            use_read_pool: true,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open using `config.db_path`.
    pub fn from_config(config: &StorageConfig) -> SomnusResult<Self> {
        Self::open(Path::new(&config.db_path), config)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> SomnusResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self {
            pool,
            use_read_pool: false,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> SomnusResult<()> {
        self.pool.writer.with_conn(migrations::run_migrations)
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn with_reader<F, T>(&self, f: F) -> SomnusResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> SomnusResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }

    /// Ingest an event. The event store proper is external; this is the
    /// ingestion path for the bundled SQLite store.
    pub fn insert_event(&self, event: &EpisodicEvent) -> SomnusResult<()> {
        self.pool
            .writer
            .with_conn(|conn| event_ops::insert_event(conn, event))
    }

    pub fn get_event(&self, id: &str) -> SomnusResult<Option<EpisodicEvent>> {
        self.with_reader(|conn| event_ops::get_event(conn, id))
    }
}

impl IEventStore for StorageEngine {
    fn get_unconsolidated(
        &self,
        project_id: &str,
        since: Duration,
    ) -> SomnusResult<Vec<EpisodicEvent>> {
        let cutoff = Utc::now() - since;
        self.with_reader(|conn| event_ops::unconsolidated_since(conn, project_id, cutoff))
    }

    fn mark_consolidated(&self, event_ids: &[String]) -> SomnusResult<()> {
        let changed = self
            .pool
            .writer
            .with_conn(|conn| event_ops::mark_consolidated(conn, event_ids))?;
        tracing::debug!(requested = event_ids.len(), changed, "marked events consolidated");
        Ok(())
    }
}

impl IMemoryStore for StorageEngine {
    fn insert(&self, memory: &SemanticMemory) -> SomnusResult<()> {
        memory.validate()?;
        self.pool
            .writer
            .with_conn(|conn| memory_ops::insert_memory(conn, memory))
    }

    fn get(&self, id: &str) -> SomnusResult<Option<SemanticMemory>> {
        self.with_reader(|conn| memory_ops::get_memory(conn, id))
    }

    fn list_active(&self, project_id: &str) -> SomnusResult<Vec<SemanticMemory>> {
        self.with_reader(|conn| memory_ops::list_active(conn, project_id))
    }

    fn list_by_state(
        &self,
        project_id: &str,
        state: LifecycleState,
    ) -> SomnusResult<Vec<SemanticMemory>> {
        self.with_reader(|conn| memory_ops::list_by_state(conn, project_id, state))
    }

    fn compare_and_swap(
        &self,
        memory: &SemanticMemory,
        expected_version: u64,
    ) -> SomnusResult<bool> {
        memory.validate()?;
        let swapped = self
            .pool
            .writer
            .with_conn(|conn| memory_ops::compare_and_swap(conn, memory, expected_version))?;
        if !swapped {
            tracing::debug!(
                memory_id = %memory.id,
                expected_version,
                "compare-and-swap lost"
            );
        }
        Ok(swapped)
    }

    fn queue_update(&self, update: &PendingUpdate) -> SomnusResult<()> {
        self.pool
            .writer
            .with_conn(|conn| pending_ops::queue_update(conn, update))
    }

    fn pending_update(&self, memory_id: &str) -> SomnusResult<Option<PendingUpdate>> {
        self.with_reader(|conn| pending_ops::get_pending(conn, memory_id))
    }

    fn clear_pending_update(&self, memory_id: &str) -> SomnusResult<()> {
        self.pool
            .writer
            .with_conn(|conn| pending_ops::clear_pending(conn, memory_id))
    }
}

impl IContradictionStore for StorageEngine {
    fn record(&self, contradiction: &Contradiction) -> SomnusResult<()> {
        self.pool
            .writer
            .with_conn(|conn| contradiction_ops::insert_contradiction(conn, contradiction))
    }

    fn update(&self, contradiction: &Contradiction) -> SomnusResult<()> {
        self.pool
            .writer
            .with_conn(|conn| contradiction_ops::update_contradiction(conn, contradiction))
    }

    fn find_pair(&self, a: &str, b: &str) -> SomnusResult<Option<Contradiction>> {
        self.with_reader(|conn| contradiction_ops::find_pair(conn, a, b))
    }

    fn list_by_status(
        &self,
        project_id: &str,
        status: ContradictionStatus,
    ) -> SomnusResult<Vec<Contradiction>> {
        self.with_reader(|conn| contradiction_ops::list_by_status(conn, project_id, status))
    }
}
