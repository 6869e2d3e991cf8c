//! Query descriptions and canonical cache keys.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A logical query request, opaque to the orchestrator.
///
/// Either a raw MDX statement or a structured specification of measures,
/// dimensions, and filters. The orchestrator only hashes a query and
/// forwards it to the adapter; it never interprets the contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Raw MDX statement, forwarded verbatim.
    Mdx(String),
    /// Structured query specification.
    Spec(QuerySpec),
}

/// Structured query: measures and dimensions by name, plus object-valued
/// filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
    /// Filter expressions keyed by dimension. Key order is irrelevant for
    /// identity — see [`Query::cache_key`].
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub filters: serde_json::Map<String, Value>,
}

impl Query {
    /// Convenience constructor for a raw MDX query.
    pub fn mdx(statement: impl Into<String>) -> Self {
        Query::Mdx(statement.into())
    }

    /// Compute the canonical cache key for this query.
    ///
    /// Structured queries are normalized by hashing object keys in sorted
    /// order, so logically identical queries whose filters were assembled
    /// in a different order collide to the same key. Measure and dimension
    /// lists are positional and hash in order.
    ///
    /// Uses `DefaultHasher` (SipHash), deterministic within a process
    /// lifetime, which is sufficient for an in-memory cache. A distributed
    /// backend would need a stable cross-process hash instead.
    pub fn cache_key(&self) -> String {
        let mut hasher = DefaultHasher::new();
        match self {
            Query::Mdx(statement) => {
                0u8.hash(&mut hasher);
                statement.hash(&mut hasher);
            }
            Query::Spec(spec) => {
                1u8.hash(&mut hasher);
                spec.measures.hash(&mut hasher);
                spec.dimensions.hash(&mut hasher);
                hash_object(&spec.filters, &mut hasher);
            }
        }
        format!("q{:016x}", hasher.finish())
    }
}

/// Hash a JSON object with keys visited in sorted order.
///
/// `serde_json::Map` already iterates sorted without the `preserve_order`
/// feature, but the explicit sort keeps the key canonical even if a
/// downstream crate enables it.
fn hash_object(map: &serde_json::Map<String, Value>, hasher: &mut DefaultHasher) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    map.len().hash(hasher);
    for key in keys {
        key.hash(hasher);
        hash_value(&map[key], hasher);
    }
}

/// Structural hash of a JSON value. Discriminant bytes keep e.g. the
/// string "1" and the number 1 from colliding.
fn hash_value(value: &Value, hasher: &mut DefaultHasher) {
    match value {
        Value::Null => 0u8.hash(hasher),
        Value::Bool(b) => {
            1u8.hash(hasher);
            b.hash(hasher);
        }
        Value::Number(n) => {
            2u8.hash(hasher);
            n.to_string().hash(hasher);
        }
        Value::String(s) => {
            3u8.hash(hasher);
            s.hash(hasher);
        }
        Value::Array(items) => {
            4u8.hash(hasher);
            items.len().hash(hasher);
            for item in items {
                hash_value(item, hasher);
            }
        }
        Value::Object(map) => {
            5u8.hash(hasher);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            map.len().hash(hasher);
            for key in keys {
                key.hash(hasher);
                hash_value(&map[key], hasher);
            }
        }
    }
}
