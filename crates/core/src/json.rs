//! Deterministic "pretty" JSON serialization for the three output shapes the engine
//! produces: the index itself, location→count, and query→ranked-results.
//!
//! Without the `preserve_order` feature, `serde_json::Map` is backed by a `BTreeMap`
//! and always serializes keys in lexicographic order regardless of insertion order,
//! matching how this crate already produces its other deterministic JSON payloads.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::index::SearchResult;

/// Serialize the full index (`term -> location -> positions`) as pretty JSON.
pub fn index_to_json(terms: &BTreeMap<String, BTreeMap<String, BTreeSet<u32>>>) -> String {
    let mut outer = Map::new();
    for (term, locations) in terms {
        let mut inner = Map::new();
        for (location, positions) in locations {
            let array: Vec<Value> = positions.iter().map(|p| Value::from(*p)).collect();
            inner.insert(location.clone(), Value::Array(array));
        }
        outer.insert(term.clone(), Value::Object(inner));
    }
    serde_json::to_string_pretty(&Value::Object(outer)).expect("map of primitives always serializes")
}

/// Serialize `location -> count` as pretty JSON.
pub fn counts_to_json(counts: &BTreeMap<String, u32>) -> String {
    let mut obj = Map::new();
    for (location, count) in counts {
        obj.insert(location.clone(), Value::from(*count));
    }
    serde_json::to_string_pretty(&Value::Object(obj)).expect("map of primitives always serializes")
}

/// Serialize `query -> ranked results` as pretty JSON. Scores are formatted to exactly
/// 8 fractional digits.
pub fn results_to_json(results: &BTreeMap<String, Vec<SearchResult>>) -> String {
    let mut outer = Map::new();
    for (query, hits) in results {
        let array: Vec<Value> = hits
            .iter()
            .map(|hit| {
                let mut row = Map::new();
                row.insert("where".to_string(), Value::String(hit.location.clone()));
                row.insert("count".to_string(), Value::from(hit.query_count));
                row.insert("score".to_string(), Value::String(format!("{:.8}", hit.score)));
                Value::Object(row)
            })
            .collect();
        outer.insert(query.clone(), Value::Array(array));
    }
    serde_json::to_string_pretty(&Value::Object(outer)).expect("map of primitives always serializes")
}
