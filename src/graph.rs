//! Reference Graph - nodes and links derived from reference records
//!
//! The graph is recomputed on every request and never persisted. Node
//! deduplication follows a [`NodeIdentity`] policy:
//! - `Name`: nodes collapse on display name, first inserted wins
//! - `StableId`: nodes are keyed by article id or target URL and carry the
//!   most recent name seen for that identity

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::reference::{ReferenceRecord, TargetType};

/// How graph nodes are deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIdentity {
    /// Same display name means same node
    #[default]
    Name,
    /// Same article id (or target URL) means same node
    StableId,
}

impl std::str::FromStr for NodeIdentity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(NodeIdentity::Name),
            "stable_id" | "id" => Ok(NodeIdentity::StableId),
            _ => Err(crate::Error::Config(format!("Unknown node identity: {}", s))),
        }
    }
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An article in the system
    Article { art_id: Option<i64> },
    /// An external resource
    External { art_url: String },
}

impl NodeKind {
    pub fn target_type(&self) -> TargetType {
        match self {
            NodeKind::Article { .. } => TargetType::Inner,
            NodeKind::External { .. } => TargetType::External,
        }
    }
}

/// A node of the reference graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn article(name: impl Into<String>, art_id: Option<i64>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Article { art_id },
        }
    }

    pub fn external(name: impl Into<String>, art_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::External { art_url: art_url.into() },
        }
    }

    pub fn is_inner(&self) -> bool {
        matches!(self.kind, NodeKind::Article { .. })
    }

    /// Node describing the target of a record
    fn target_of(record: &ReferenceRecord, name: &str) -> Self {
        match record.target_type {
            TargetType::Inner => GraphNode::article(name, record.target_id),
            TargetType::External => GraphNode::external(name, record.target_url.as_str()),
        }
    }
}

// Wire shape: {name, artType, inner, artId?, artUrl?}
impl Serialize for GraphNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (art_id, art_url) = match &self.kind {
            NodeKind::Article { art_id } => (*art_id, None),
            NodeKind::External { art_url } => (None, Some(art_url.as_str())),
        };
        let len = 3 + usize::from(art_id.is_some()) + usize::from(art_url.is_some());

        let mut state = serializer.serialize_struct("GraphNode", len)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("artType", &self.kind.target_type())?;
        state.serialize_field("inner", &self.is_inner())?;
        if let Some(id) = art_id {
            state.serialize_field("artId", &id)?;
        }
        if let Some(url) = art_url {
            state.serialize_field("artUrl", url)?;
        }
        state.end()
    }
}

/// A directed link between two node names.
///
/// Equality is on exact field order, so `A -> B` and `B -> A` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The reference graph returned to callers.
///
/// Always carries both containers, empty when the user has no references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl ReferenceGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn has_link(&self, source: &str, target: &str) -> bool {
        self.links.iter().any(|l| l.source == source && l.target == target)
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let inner_nodes = self.nodes.iter().filter(|n| n.is_inner()).count();
        GraphStats {
            nodes: self.nodes.len(),
            inner_nodes,
            external_nodes: self.nodes.len() - inner_nodes,
            links: self.links.len(),
        }
    }
}

/// Statistics about a reference graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub inner_nodes: usize,
    pub external_nodes: usize,
    pub links: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Reference Graph Statistics:")?;
        writeln!(f, "  Nodes: {} (inner: {}, external: {})", self.nodes, self.inner_nodes, self.external_nodes)?;
        writeln!(f, "  Links: {}", self.links)
    }
}

/// Folds reference records into a [`ReferenceGraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    identity: NodeIdentity,
}

impl GraphBuilder {
    pub fn new(identity: NodeIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> NodeIdentity {
        self.identity
    }

    /// Build the graph. Records are expected in insertion order; "first" and
    /// "most recent" are relative to that order.
    pub fn build(&self, records: &[ReferenceRecord]) -> ReferenceGraph {
        if records.is_empty() {
            return ReferenceGraph::default();
        }
        match self.identity {
            NodeIdentity::Name => build_by_name(records),
            NodeIdentity::StableId => build_by_stable_id(records),
        }
    }
}

/// First record per key, in first-seen key order.
fn representatives<'a, K, F>(records: &'a [ReferenceRecord], key: F) -> Vec<(K, &'a ReferenceRecord)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a ReferenceRecord) -> K,
{
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| {
            let k = key(record);
            seen.insert(k.clone()).then_some((k, record))
        })
        .collect()
}

/// Ordered set insert: keeps the first value per key.
fn insert_first<K: Eq + Hash, V>(keys: &mut HashSet<K>, values: &mut Vec<V>, key: K, value: V) {
    if keys.insert(key) {
        values.push(value);
    }
}

fn build_by_name(records: &[ReferenceRecord]) -> ReferenceGraph {
    let sources = representatives(records, |r| r.source_id);
    let targets = representatives(records, |r| r.target_url.as_str());

    let mut names = HashSet::new();
    let mut nodes = Vec::new();
    for (id, rep) in &sources {
        let node = GraphNode::article(rep.source_name.as_str(), Some(*id));
        insert_first(&mut names, &mut nodes, rep.source_name.as_str(), node);
    }
    for (_, rep) in &targets {
        let node = GraphNode::target_of(rep, &rep.target_name);
        insert_first(&mut names, &mut nodes, rep.target_name.as_str(), node);
    }

    let source_names: HashMap<i64, &str> = sources
        .iter()
        .map(|(id, rep)| (*id, rep.source_name.as_str()))
        .collect();
    let target_names: HashMap<&str, &str> = targets
        .iter()
        .map(|(url, rep)| (*url, rep.target_name.as_str()))
        .collect();

    let mut pairs = HashSet::new();
    let mut links = Vec::new();
    for record in records {
        let source = source_names[&record.source_id];
        let target = target_names[record.target_url.as_str()];
        insert_first(&mut pairs, &mut links, (source, target), GraphLink::new(source, target));
    }

    ReferenceGraph { nodes, links }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeKey<'a> {
    Article(i64),
    Url(&'a str),
}

impl<'a> NodeKey<'a> {
    fn target_of(record: &'a ReferenceRecord) -> Self {
        match (record.target_type, record.target_id) {
            (TargetType::Inner, Some(id)) => NodeKey::Article(id),
            _ => NodeKey::Url(record.target_url.as_str()),
        }
    }
}

fn build_by_stable_id(records: &[ReferenceRecord]) -> ReferenceGraph {
    let mut order: Vec<(NodeKey<'_>, NodeKind)> = Vec::new();
    let mut latest_name: HashMap<NodeKey<'_>, &str> = HashMap::new();

    for record in records {
        let source = NodeKey::Article(record.source_id);
        if !latest_name.contains_key(&source) {
            order.push((source.clone(), NodeKind::Article { art_id: Some(record.source_id) }));
        }
        latest_name.insert(source, record.source_name.as_str());

        let target = NodeKey::target_of(record);
        if !latest_name.contains_key(&target) {
            let kind = match &target {
                NodeKey::Article(id) => NodeKind::Article { art_id: Some(*id) },
                NodeKey::Url(_) => GraphNode::target_of(record, "").kind,
            };
            order.push((target.clone(), kind));
        }
        latest_name.insert(target, record.target_name.as_str());
    }

    let nodes = order
        .into_iter()
        .map(|(key, kind)| GraphNode {
            name: latest_name[&key].to_string(),
            kind,
        })
        .collect();

    let mut pairs = HashSet::new();
    let mut links = Vec::new();
    for record in records {
        let source = NodeKey::Article(record.source_id);
        let target = NodeKey::target_of(record);
        let link = GraphLink::new(latest_name[&source], latest_name[&target]);
        insert_first(&mut pairs, &mut links, (source, target), link);
    }

    ReferenceGraph { nodes, links }
}
