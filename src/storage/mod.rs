//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with one table:
//! - article_references(user_id, source_id, source_name, target_type, target_id, target_url, target_name)
//!
//! The operations the service relies on are the [`ReferenceStore`] trait,
//! implemented both by the store itself and by an open transaction.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, StoreTransaction, DbStats};

use crate::reference::{ReferenceRecord, TargetType};
use crate::Result;

/// Storage contract consumed by the reference service.
pub trait ReferenceStore {
    /// Remove every record of a source article. Returns the number removed.
    fn delete_by_source(&self, source_id: i64) -> Result<usize>;

    /// Insert records already stamped with user, source id and source name.
    fn insert_batch(&self, records: &[ReferenceRecord]) -> Result<usize>;

    /// Whether any record targets exactly this URL.
    fn exists_by_target_url(&self, url: &str) -> Result<bool>;

    /// All records of a user with one of the given target types, in insertion order.
    fn select_by_user_and_types(&self, user_id: i64, types: &[TargetType]) -> Result<Vec<ReferenceRecord>>;
}
