//! # Refgraph - Article reference bookkeeping
//!
//! Tracks which articles reference which other articles or external URLs,
//! and renders that reference set as a graph for visualization.
//!
//! Refgraph provides:
//! - Reference records keyed by source article and target URL
//! - A storage contract with a SQLite-backed implementation
//! - Transactional replace of an article's outbound references
//! - A graph builder folding records into deduplicated nodes and links

pub mod reference;
pub mod graph;
pub mod storage;
pub mod service;
pub mod server;
pub mod output;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use reference::{ReferenceRecord, ReferenceRequest, TargetType};
pub use graph::{GraphBuilder, GraphLink, GraphNode, NodeIdentity, NodeKind, ReferenceGraph};
pub use storage::{ReferenceStore, SqliteStore, StoreTransaction};
pub use service::ReferenceService;

/// Result type alias for Refgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Refgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid target type: {0}")]
    InvalidTargetType(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was caused by caller input rather than storage
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidTargetType(_) | Error::InvalidReference(_) | Error::Json(_)
        )
    }
}
