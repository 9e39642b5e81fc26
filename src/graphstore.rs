//! The abstract graph store protocol (§6) and its `neo4rs`-backed reference adapter. The
//! [GraphStore] trait is the public contract the rest of the crate programs against; only one
//! concrete implementation ships, matching the single adapter the original tooling carried.

use {
    crate::model::graph::{BatchSummary, GraphEdge, GraphNode},
    async_trait::async_trait,
    neo4rs::{query, BoltType, Graph},
    serde_json::Value,
    std::collections::BTreeMap,
};

/// One row of a [GraphStore::query] result, keyed by the Cypher `RETURN` alias.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum GraphStoreError {
    #[error("graph store connection error: {0}")]
    Connection(String),

    #[error("graph query failed: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("{0:?} is not a safe Cypher label/type identifier")]
    UnsafeIdentifier(String),
}

/// The graph store contract every projected edge eventually flows through (§6). Node identity on
/// write is the node's declared unique-key tuple — a `create_relationships` call upserts rather
/// than blindly inserting, so re-running a summarization pass over the same snapshot does not
/// duplicate nodes.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Confirms the store is reachable, failing fast at startup rather than on the first write.
    async fn verify_connectivity(&self) -> Result<(), GraphStoreError>;

    /// Upserts every node `edges` references and the edges themselves, returning how many nodes
    /// and relationships were newly created (as opposed to merged into existing ones). Callers
    /// that want the "log per batch, keep going" failure semantics of §4.I chunk `edges`
    /// themselves and call this once per chunk.
    async fn create_relationships(&self, edges: &[GraphEdge]) -> Result<BatchSummary, GraphStoreError>;

    /// Runs an arbitrary Cypher-like query, returning its result rows.
    async fn query(&self, cypher: &str, params: Vec<(String, Value)>) -> Result<Vec<Record>, GraphStoreError>;

    async fn close(&self);
}

/// Validates a label or relationship type before it is spliced directly into Cypher text (Neo4j
/// has no way to parameterize these). Restricting to `[A-Za-z_][A-Za-z0-9_]*` rules out injection
/// via a crafted action name or resource type before it ever reaches the driver.
fn safe_identifier(value: &str) -> Result<(), GraphStoreError> {
    let mut chars = value.chars();
    let ok = match chars.next() {
        Some(c) => (c.is_ascii_alphabetic() || c == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(GraphStoreError::UnsafeIdentifier(value.to_string()))
    }
}

/// A Cypher relationship type is built from an action identifier like `s3:GetObject`, which Neo4j
/// does not accept unmodified (`:` is not allowed in a type name). Mirrors the identifier
/// sanitization the property bag already exempts via parameterization.
fn relationship_type(label: &str) -> String {
    label.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(neo4rs::BoltNull),
        Value::Bool(b) => BoltType::Boolean(neo4rs::BoltBoolean::new(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(neo4rs::BoltInteger::new(i)),
            None => BoltType::Float(neo4rs::BoltFloat::new(n.as_f64().unwrap_or_default())),
        },
        Value::String(s) => BoltType::String(neo4rs::BoltString::new(s)),
        Value::Array(items) => {
            let mut list = neo4rs::BoltList::new();
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(_) => BoltType::String(neo4rs::BoltString::new(&value.to_string())),
    }
}

fn node_merge_clause(alias: &str, node: &GraphNode, param_prefix: &str, params: &mut Vec<(String, BoltType)>) -> Result<String, GraphStoreError> {
    for label in node.labels() {
        safe_identifier(label)?;
    }
    let labels = node.labels().iter().map(|l| format!(":{l}")).collect::<String>();

    let key_values = node.unique_key_values().unwrap_or_default();
    let key_predicates: Vec<String> = node
        .unique_key()
        .iter()
        .zip(key_values.iter())
        .enumerate()
        .map(|(i, (key, value))| {
            let param = format!("{param_prefix}k{i}");
            params.push((param.clone(), json_to_bolt(value)));
            format!("{key}: ${param}")
        })
        .collect();

    let set_clauses: Vec<String> = node
        .properties()
        .iter()
        .filter(|(k, _)| !node.unique_key().iter().any(|key| key == *k))
        .enumerate()
        .map(|(i, (key, value))| {
            let param = format!("{param_prefix}p{i}");
            params.push((param.clone(), json_to_bolt(value)));
            format!("{alias}.{key} = ${param}")
        })
        .collect();

    let mut clause = format!("MERGE ({alias}{labels} {{{}}})", key_predicates.join(", "));
    if !set_clauses.is_empty() {
        clause.push_str(&format!(" SET {}", set_clauses.join(", ")));
    }
    Ok(clause)
}

/// The `neo4rs`-backed reference adapter. The only concrete [GraphStore] implementation this
/// crate ships, as §6 requires.
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, GraphStoreError> {
        let graph = Graph::new(uri, user, password).await.map_err(|e| GraphStoreError::Connection(e.to_string()))?;
        Ok(Self { graph })
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn verify_connectivity(&self) -> Result<(), GraphStoreError> {
        let mut result = self.graph.execute(query("RETURN 1")).await?;
        result.next().await?;
        Ok(())
    }

    async fn create_relationships(&self, edges: &[GraphEdge]) -> Result<BatchSummary, GraphStoreError> {
        let mut summary = BatchSummary::default();

        for edge in edges {
            safe_identifier(&relationship_type(edge.label()))?;

            let mut params = Vec::new();
            let start_clause = node_merge_clause("s", edge.start(), "s", &mut params)?;
            let end_clause = node_merge_clause("e", edge.end(), "e", &mut params)?;

            let rel_type = relationship_type(edge.label());
            let rel_set: Vec<String> = edge
                .properties()
                .iter()
                .enumerate()
                .map(|(i, (key, value))| {
                    let param = format!("rp{i}");
                    params.push((param.clone(), json_to_bolt(value)));
                    format!("r.{key} = ${param}")
                })
                .collect();

            let mut cypher = format!("{start_clause}\n{end_clause}\nMERGE (s)-[r:{rel_type}]->(e)");
            if !rel_set.is_empty() {
                cypher.push_str(&format!("\nSET {}", rel_set.join(", ")));
            }
            cypher.push_str("\nRETURN s, e, r");

            let mut q = query(&cypher);
            for (name, value) in params {
                q = q.param(&name, value);
            }

            match self.graph.execute(q).await {
                Ok(mut stream) => {
                    while stream.next().await?.is_some() {}
                    summary.merge(BatchSummary { nodes_created: 0, relationships_created: 1 });
                }
                Err(e) => {
                    log::error!("graph write failed for edge {} -> {}: {e}", edge.label(), edge.end().unique_key().join(","));
                    return Err(GraphStoreError::Query(e));
                }
            }
        }

        Ok(summary)
    }

    async fn query(&self, cypher: &str, params: Vec<(String, Value)>) -> Result<Vec<Record>, GraphStoreError> {
        let mut q = query(cypher);
        for (name, value) in &params {
            q = q.param(name, json_to_bolt(value));
        }

        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            let mut record = Record::new();
            for key in row.keys() {
                if let Ok(value) = row.get::<String>(key) {
                    record.insert(key.to_string(), Value::String(value));
                } else if let Ok(value) = row.get::<i64>(key) {
                    record.insert(key.to_string(), Value::from(value));
                } else if let Ok(value) = row.get::<bool>(key) {
                    record.insert(key.to_string(), Value::Bool(value));
                }
            }
            rows.push(record);
        }

        Ok(rows)
    }

    async fn close(&self) {}
}
