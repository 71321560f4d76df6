//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, Transaction, params, params_from_iter};
use serde::Serialize;
use crate::{Result, Error};
use crate::reference::{ReferenceRecord, TargetType};
use super::{schema, ReferenceStore};

/// SQLite-backed storage for reference records
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("Opened reference store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Begin a transaction. Dropping the handle without `commit` rolls back.
    pub fn begin(&self) -> Result<StoreTransaction<'_>> {
        let tx = self.conn.unchecked_transaction()?;
        Ok(StoreTransaction { tx })
    }

    /// All records of one source article, in insertion order
    pub fn select_by_source(&self, source_id: i64) -> Result<Vec<ReferenceRecord>> {
        let sql = format!(
            "SELECT {} FROM article_references WHERE source_id = ?1 ORDER BY id",
            schema::RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([source_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Count all references
    pub fn count_references(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM article_references", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete all data
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM article_references", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let stats = self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COUNT(DISTINCT source_id),
                   COUNT(DISTINCT target_url),
                   COALESCE(SUM(target_type = 11), 0),
                   COALESCE(SUM(target_type = 21), 0)
            FROM article_references
            "#,
            [],
            |row| {
                Ok(DbStats {
                    references: row.get::<_, i64>(0)? as usize,
                    sources: row.get::<_, i64>(1)? as usize,
                    targets: row.get::<_, i64>(2)? as usize,
                    inner: row.get::<_, i64>(3)? as usize,
                    external: row.get::<_, i64>(4)? as usize,
                })
            },
        )?;
        Ok(stats)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ReferenceStore for SqliteStore {
    fn delete_by_source(&self, source_id: i64) -> Result<usize> {
        delete_by_source(&self.conn, source_id)
    }

    fn insert_batch(&self, records: &[ReferenceRecord]) -> Result<usize> {
        insert_batch(&self.conn, records)
    }

    fn exists_by_target_url(&self, url: &str) -> Result<bool> {
        exists_by_target_url(&self.conn, url)
    }

    fn select_by_user_and_types(&self, user_id: i64, types: &[TargetType]) -> Result<Vec<ReferenceRecord>> {
        select_by_user_and_types(&self.conn, user_id, types)
    }
}

/// An open write transaction on the store
pub struct StoreTransaction<'a> {
    tx: Transaction<'a>,
}

impl StoreTransaction<'_> {
    /// Commit all work done through this handle
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    /// Roll back explicitly
    pub fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

impl ReferenceStore for StoreTransaction<'_> {
    fn delete_by_source(&self, source_id: i64) -> Result<usize> {
        delete_by_source(&self.tx, source_id)
    }

    fn insert_batch(&self, records: &[ReferenceRecord]) -> Result<usize> {
        insert_batch(&self.tx, records)
    }

    fn exists_by_target_url(&self, url: &str) -> Result<bool> {
        exists_by_target_url(&self.tx, url)
    }

    fn select_by_user_and_types(&self, user_id: i64, types: &[TargetType]) -> Result<Vec<ReferenceRecord>> {
        select_by_user_and_types(&self.tx, user_id, types)
    }
}

// ========== Reference Operations ==========

fn delete_by_source(conn: &Connection, source_id: i64) -> Result<usize> {
    let removed = conn.execute("DELETE FROM article_references WHERE source_id = ?1", [source_id])?;
    Ok(removed)
}

fn insert_batch(conn: &Connection, records: &[ReferenceRecord]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO article_references (user_id, source_id, source_name, target_type, target_id, target_url, target_name)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )?;

    for record in records {
        stmt.execute(params![
            record.user_id,
            record.source_id,
            record.source_name,
            record.target_type.code(),
            record.target_id,
            record.target_url,
            record.target_name,
        ])?;
    }
    Ok(records.len())
}

fn exists_by_target_url(conn: &Connection, url: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM article_references WHERE target_url = ?1)",
        [url],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn select_by_user_and_types(conn: &Connection, user_id: i64, types: &[TargetType]) -> Result<Vec<ReferenceRecord>> {
    if types.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; types.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM article_references WHERE user_id = ? AND target_type IN ({}) ORDER BY id",
        schema::RECORD_COLUMNS,
        placeholders
    );

    let mut values = Vec::with_capacity(types.len() + 1);
    values.push(user_id);
    values.extend(types.iter().map(TargetType::code));

    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params_from_iter(values), row_to_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Helper to convert a row to a ReferenceRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ReferenceRecord> {
    let code: i64 = row.get(4)?;
    let target_type = TargetType::try_from(code).map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    Ok(ReferenceRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        source_id: row.get(2)?,
        source_name: row.get(3)?,
        target_type,
        target_id: row.get(5)?,
        target_url: row.get(6)?,
        target_name: row.get(7)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub references: usize,
    pub sources: usize,
    pub targets: usize,
    pub inner: usize,
    pub external: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  References: {} (inner: {}, external: {})", self.references, self.inner, self.external)?;
        writeln!(f, "  Source articles: {}", self.sources)?;
        writeln!(f, "  Distinct targets: {}", self.targets)
    }
}
