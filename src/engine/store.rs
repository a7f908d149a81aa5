// ── Keepsake Engine: Memory Store ──────────────────────────────────────────
// Durable record of caregiver-submitted memories in SQLite, including the
// ingestion state machine:
//
//   pending → indexed   on successful upload to the vector service
//   pending → failed    (attempts+1) on upload failure
//   failed  → indexed   retried until attempts reach the configured max
//
// The chat path never reads this store directly — it only sees the
// downstream effect (indexed vectors).

use std::path::Path;

use log::info;
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::atoms::error::KeepsakeResult;
use crate::atoms::types::{IngestStatus, MemoryRecord};

pub struct MemoryStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS memories (
        id TEXT PRIMARY KEY,
        text TEXT NOT NULL,
        author TEXT NOT NULL DEFAULT 'Caregiver',
        image_url TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        attempts INTEGER NOT NULL DEFAULT 0,
        indexed_at TEXT,
        patient_id TEXT NOT NULL DEFAULT 'default',
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_memories_status ON memories(status);
    CREATE INDEX IF NOT EXISTS idx_memories_patient ON memories(patient_id);
";

impl MemoryStore {
    /// Open (or create) the database at `path` and initialize tables.
    pub fn open(path: &Path) -> KeepsakeResult<Self> {
        info!("[store] opening memory store at {:?}", path);
        let conn = Connection::open(path)?;
        // WAL for better concurrent read behavior
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        conn.execute_batch(SCHEMA)?;
        Ok(MemoryStore { conn: Mutex::new(conn) })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> KeepsakeResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(MemoryStore { conn: Mutex::new(conn) })
    }

    /// Insert a new caregiver memory in `pending` state, returning its id.
    pub fn insert(
        &self,
        text: &str,
        author: &str,
        image_url: Option<&str>,
        patient_id: &str,
    ) -> KeepsakeResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO memories (id, text, author, image_url, status, attempts, patient_id, created_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', 0, ?5, ?6)",
            params![id, text, author, image_url, patient_id, created_at],
        )?;
        Ok(id)
    }

    /// Most recent memories, newest first.
    pub fn recent(&self, limit: i64) -> KeepsakeResult<Vec<MemoryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, text, author, image_url, status, attempts, indexed_at, patient_id, created_at
             FROM memories ORDER BY created_at DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map(params![limit], row_to_record)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// The next batch for the ingestion worker: pending records plus failed
    /// ones that still have attempts left, oldest first.
    pub fn pending_batch(&self, limit: i64, max_attempts: i64) -> KeepsakeResult<Vec<MemoryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, text, author, image_url, status, attempts, indexed_at, patient_id, created_at
             FROM memories
             WHERE status = 'pending' OR (status = 'failed' AND attempts < ?1)
             ORDER BY created_at ASC LIMIT ?2",
        )?;
        let records = stmt
            .query_map(params![max_attempts, limit], row_to_record)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// Mark records as indexed, stamping `indexed_at`.
    pub fn mark_indexed(&self, ids: &[String]) -> KeepsakeResult<()> {
        let indexed_at = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "UPDATE memories SET status = 'indexed', indexed_at = ?1 WHERE id = ?2",
        )?;
        for id in ids {
            stmt.execute(params![indexed_at, id])?;
        }
        Ok(())
    }

    /// Mark records as failed and burn one attempt each.
    pub fn mark_failed(&self, ids: &[String]) -> KeepsakeResult<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "UPDATE memories SET status = 'failed', attempts = attempts + 1 WHERE id = ?1",
        )?;
        for id in ids {
            stmt.execute(params![id])?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> KeepsakeResult<Option<MemoryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, text, author, image_url, status, attempts, indexed_at, patient_id, created_at
             FROM memories WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_record)?;
        Ok(rows.next().transpose()?)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let status: String = row.get(4)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        text: row.get(1)?,
        author: row.get(2)?,
        image_url: row.get(3)?,
        status: IngestStatus::parse(&status),
        attempts: row.get(5)?,
        indexed_at: row.get(6)?,
        patient_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}
