//! The graph shapes the projector emits and the abstract graph-store protocol consumes (§3, §6).

use serde_json::Value;
use std::collections::BTreeMap;

/// A node's declared labels, property bag, and unique-key declaration — the tuple of property
/// names whose values identify the node for upsert purposes.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    labels: Vec<String>,
    properties: BTreeMap<String, Value>,
    unique_key: Vec<String>,
}

impl GraphNode {
    pub fn new(labels: Vec<String>, unique_key: Vec<String>) -> Self {
        Self { labels, properties: BTreeMap::new(), unique_key }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn unique_key(&self) -> &[String] {
        &self.unique_key
    }

    /// The tuple of values the unique key resolves to, in declared order. `None` if any declared
    /// key is absent from the property bag.
    pub fn unique_key_values(&self) -> Option<Vec<&Value>> {
        self.unique_key.iter().map(|k| self.properties.get(k)).collect()
    }
}

/// A `Capability` provenance tag recorded on every emitted edge: which of the evaluator's
/// sources contributed the decision (mirrors [crate::PolicySource] at the graph layer).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Capability {
    IdentityPolicy,
    ResourcePolicy,
    OrgPolicy,
    GitHubActionsFederation,
}

/// A directed relationship from a start node to an end node, typed by a label.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    start: GraphNode,
    end: GraphNode,
    label: String,
    properties: BTreeMap<String, Value>,
    capability: Capability,
}

impl GraphEdge {
    pub fn new(start: GraphNode, end: GraphNode, label: impl Into<String>, capability: Capability) -> Self {
        Self { start, end, label: label.into(), properties: BTreeMap::new(), capability }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn start(&self) -> &GraphNode {
        &self.start
    }

    pub fn end(&self) -> &GraphNode {
        &self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }
}

/// The result of a batched `create_relationships` call against the graph store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchSummary {
    pub nodes_created: u64,
    pub relationships_created: u64,
}

impl BatchSummary {
    pub fn merge(&mut self, other: BatchSummary) {
        self.nodes_created += other.nodes_created;
        self.relationships_created += other.relationships_created;
    }
}
