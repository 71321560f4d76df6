//! Reference service
//!
//! High-level reference operations:
//! - `bind`: transactional replace of an article's outbound references
//! - `delete`: drop every reference of an article
//! - `check`: whether a URL is referenced anywhere
//! - `list_all`: the reference graph of a user

use crate::Result;
use crate::graph::{GraphBuilder, NodeIdentity, ReferenceGraph};
use crate::reference::{ReferenceRecord, ReferenceRequest, TargetType};
use crate::storage::{ReferenceStore, SqliteStore};

/// Reference operations over a store
pub struct ReferenceService<'a> {
    store: &'a SqliteStore,
    builder: GraphBuilder,
}

impl<'a> ReferenceService<'a> {
    /// Create a service deduplicating graph nodes by name
    pub fn new(store: &'a SqliteStore) -> Self {
        Self::with_identity(store, NodeIdentity::default())
    }

    pub fn with_identity(store: &'a SqliteStore, identity: NodeIdentity) -> Self {
        Self {
            store,
            builder: GraphBuilder::new(identity),
        }
    }

    /// Replace all outbound references of `source_id`.
    ///
    /// An empty `references` list clears the article's references. On any
    /// failure the previous references are left untouched.
    pub fn bind(&self, user_id: i64, source_id: i64, source_name: &str, references: Vec<ReferenceRequest>) -> Result<()> {
        let records = references
            .into_iter()
            .map(|req| req.into_record(user_id, source_id, source_name))
            .collect::<Result<Vec<ReferenceRecord>>>()?;

        let tx = self.store.begin()?;
        let removed = tx.delete_by_source(source_id)?;

        if !records.is_empty() {
            tx.insert_batch(&records)?;
        }
        tx.commit()?;

        tracing::info!(
            "Bound {} references for article {} ({} replaced)",
            records.len(),
            source_id,
            removed
        );
        Ok(())
    }

    /// Remove every reference of an article. Unknown ids are a no-op.
    pub fn delete(&self, source_id: i64) -> Result<()> {
        let removed = self.store.delete_by_source(source_id)?;
        tracing::debug!("Deleted {} references of article {}", removed, source_id);
        Ok(())
    }

    /// Whether any article references `url`
    pub fn check(&self, url: &str) -> Result<bool> {
        self.store.exists_by_target_url(url)
    }

    /// Reference graph of a user, optionally restricted to article-to-article references
    pub fn list_all(&self, only_inner: bool, user_id: i64) -> Result<ReferenceGraph> {
        let records = self
            .store
            .select_by_user_and_types(user_id, TargetType::filter(only_inner))?;
        let graph = self.builder.build(&records);

        tracing::debug!(
            "Built graph for user {} from {} records: {} nodes, {} links",
            user_id,
            records.len(),
            graph.nodes.len(),
            graph.links.len()
        );
        Ok(graph)
    }

    /// Records of one source article
    pub fn references_of(&self, source_id: i64) -> Result<Vec<ReferenceRecord>> {
        self.store.select_by_source(source_id)
    }
}
