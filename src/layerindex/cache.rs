use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::layerindex::error::CacheError;
use crate::layerindex::types::Endpoint;

/// Trait for storing and retrieving layer index snapshots
#[cfg_attr(test, automock)]
pub trait SnapshotStorer: Send + Sync + 'static {
    /// Get the snapshot for an endpoint if it is younger than the refresh interval
    fn get_fresh(&self, endpoint: Endpoint) -> Result<Option<Vec<Value>>, CacheError>;

    /// Get the snapshot for an endpoint regardless of its age
    fn get_any(&self, endpoint: Endpoint) -> Result<Option<Vec<Value>>, CacheError>;

    /// Replace the snapshot for an endpoint
    fn replace(&self, endpoint: Endpoint, records: &[Value]) -> Result<(), CacheError>;
}

/// SQLite-backed snapshot cache, one row per endpoint
pub struct SnapshotCache {
    conn: Mutex<Connection>,
    refresh_interval: i64,
}

impl SnapshotCache {
    pub fn new(db_path: &Path, refresh_interval: i64) -> Result<Self, CacheError> {
        info!("Initializing snapshot cache at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let cache = Self {
            conn: Mutex::new(conn),
            refresh_interval,
        };

        cache.create_schema()?;
        debug!("Snapshot cache ready");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                endpoint TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                record_count INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    /// When the snapshot for an endpoint was last replaced
    pub fn updated_at(&self, endpoint: Endpoint) -> Result<Option<DateTime<Utc>>, CacheError> {
        let conn = self.lock_conn()?;
        let updated_at: Option<i64> = conn
            .query_row(
                "SELECT updated_at FROM snapshots WHERE endpoint = ?1",
                [endpoint.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(updated_at.and_then(DateTime::from_timestamp_millis))
    }

    fn load(&self, endpoint: Endpoint, min_updated_at: i64) -> Result<Option<Vec<Value>>, CacheError> {
        let conn = self.lock_conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM snapshots WHERE endpoint = ?1 AND updated_at >= ?2",
                (endpoint.as_str(), min_updated_at),
                |row| row.get(0),
            )
            .optional()?;

        body.map(|body| serde_json::from_str::<Vec<Value>>(&body))
            .transpose()
            .map_err(CacheError::from)
    }

    fn store(&self, endpoint: Endpoint, records: &[Value], updated_at: i64) -> Result<(), CacheError> {
        let body = serde_json::to_string(records)?;
        let record_count = i64::try_from(records.len()).unwrap_or(i64::MAX);

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO snapshots (endpoint, body, record_count, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(endpoint) DO UPDATE SET
                body = excluded.body,
                record_count = excluded.record_count,
                updated_at = excluded.updated_at
            "#,
            (endpoint.as_str(), body, record_count, updated_at),
        )?;

        debug!("Cached {} {} records", records.len(), endpoint.as_str());
        Ok(())
    }
}

impl SnapshotStorer for SnapshotCache {
    fn get_fresh(&self, endpoint: Endpoint) -> Result<Option<Vec<Value>>, CacheError> {
        let threshold = Self::current_timestamp_ms().saturating_sub(self.refresh_interval);
        self.load(endpoint, threshold)
    }

    fn get_any(&self, endpoint: Endpoint) -> Result<Option<Vec<Value>>, CacheError> {
        self.load(endpoint, i64::MIN)
    }

    fn replace(&self, endpoint: Endpoint, records: &[Value]) -> Result<(), CacheError> {
        self.store(endpoint, records, Self::current_timestamp_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn open_cache(temp_dir: &TempDir) -> SnapshotCache {
        SnapshotCache::new(&temp_dir.path().join("test.db"), DAY_MS).unwrap()
    }

    #[test]
    fn replace_then_get_fresh_returns_records() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);
        let records = vec![json!({ "id": 1, "sort_priority": 1 })];

        cache.replace(Endpoint::Branches, &records).unwrap();

        assert_eq!(cache.get_fresh(Endpoint::Branches).unwrap(), Some(records));
        assert!(cache.get_fresh(Endpoint::Layers).unwrap().is_none());
    }

    #[test]
    fn replace_overwrites_existing_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        cache
            .replace(Endpoint::Layers, &[json!({ "id": 1 })])
            .unwrap();
        cache
            .replace(Endpoint::Layers, &[json!({ "id": 2 }), json!({ "id": 3 })])
            .unwrap();

        let saved = cache.get_any(Endpoint::Layers).unwrap().unwrap();
        assert_eq!(saved, vec![json!({ "id": 2 }), json!({ "id": 3 })]);
    }

    #[test]
    fn get_fresh_excludes_stale_snapshot_but_get_any_returns_it() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);
        let two_days_ago = SnapshotCache::current_timestamp_ms() - 2 * DAY_MS;

        cache
            .store(Endpoint::Recipes, &[json!({ "pn": "zlib" })], two_days_ago)
            .unwrap();

        assert!(cache.get_fresh(Endpoint::Recipes).unwrap().is_none());
        assert_eq!(
            cache.get_any(Endpoint::Recipes).unwrap(),
            Some(vec![json!({ "pn": "zlib" })])
        );
    }

    #[test]
    fn updated_at_reports_last_replace_time() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        assert!(cache.updated_at(Endpoint::Layers).unwrap().is_none());

        cache.store(Endpoint::Layers, &[], 1_700_000_000_000).unwrap();

        assert_eq!(
            cache.updated_at(Endpoint::Layers).unwrap(),
            DateTime::from_timestamp_millis(1_700_000_000_000)
        );
    }

    #[test]
    fn snapshots_survive_reopening_the_database() {
        let temp_dir = TempDir::new().unwrap();
        {
            let cache = open_cache(&temp_dir);
            cache
                .replace(Endpoint::LayerBranches, &[json!({ "id": 1, "layer": 1, "branch": 1 })])
                .unwrap();
        }

        let cache = open_cache(&temp_dir);
        assert_eq!(
            cache.get_fresh(Endpoint::LayerBranches).unwrap().map(|r| r.len()),
            Some(1)
        );
    }
}
