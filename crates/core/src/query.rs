//! Query processor: normalizes query text into a canonical form, performs exact or
//! prefix lookup against the shared index, and caches results keyed by canonical query.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use dashmap::DashMap;

use crate::index::SearchResult;
use crate::locked_index::LockedIndex;
use crate::queue::WorkQueue;
use crate::text;

/// `parse` the query string, stem each token, insert into a sorted set, then join
/// with single-space separators. An empty canonical query is a no-op (caller should
/// skip it).
pub fn canonical_query(line: &str) -> String {
    let terms: std::collections::BTreeSet<String> =
        text::parse(line).into_iter().map(|w| text::stem(&w)).collect();
    terms.into_iter().collect::<Vec<_>>().join(" ")
}

/// Multithreaded query processor. Caches results by canonical query in a `resultMap`
/// whose contains-test and insert may race harmlessly — recomputation is idempotent.
pub struct QueryProcessor {
    index: Arc<LockedIndex>,
    queue: Option<Arc<WorkQueue>>,
    result_map: DashMap<String, Vec<SearchResult>>,
}

impl QueryProcessor {
    /// Multithreaded variant, backed by a work queue.
    pub fn new(index: Arc<LockedIndex>, queue: Arc<WorkQueue>) -> Arc<QueryProcessor> {
        Arc::new(QueryProcessor { index, queue: Some(queue), result_map: DashMap::new() })
    }

    /// Single-thread variant: identical behavior, no queue, no concurrent map lookup
    /// contention (still backed by the same `DashMap` for a uniform API, but every
    /// call runs synchronously on the caller's thread).
    pub fn new_single_threaded(index: Arc<LockedIndex>) -> Arc<QueryProcessor> {
        Arc::new(QueryProcessor { index, queue: None, result_map: DashMap::new() })
    }

    /// Process one query line. If a work queue is configured, submits the computation
    /// as a task; otherwise runs synchronously. Returns immediately in the
    /// multithreaded case — call `finish` to await completion.
    pub fn process_query(self: &Arc<Self>, line: &str, exact: bool) {
        let line = line.to_string();
        match &self.queue {
            Some(queue) => {
                let this = Arc::clone(self);
                queue.execute(move || this.run_query(&line, exact));
            }
            None => self.run_query(&line, exact),
        }
    }

    fn run_query(&self, line: &str, exact: bool) {
        let canonical = canonical_query(line);
        if canonical.is_empty() {
            return;
        }
        if self.result_map.contains_key(&canonical) {
            return;
        }
        let terms: Vec<String> = canonical.split(' ').map(str::to_string).collect();
        let results = self.index.search(&terms, exact);
        self.result_map.insert(canonical, results);
    }

    /// Read `path` line by line, `process_query` each line, then block until all
    /// submitted queries have completed (a no-op for the single-thread variant, which
    /// has already completed synchronously).
    pub fn process_queries(
        self: &Arc<Self>,
        reader: impl std::io::Read,
        exact: bool,
    ) -> std::io::Result<()> {
        let reader = BufReader::new(reader);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            self.process_query(&line, exact);
        }
        self.finish();
        Ok(())
    }

    /// Block until all submitted queries have completed. A no-op without a work queue.
    pub fn finish(&self) {
        if let Some(queue) = &self.queue {
            queue.finish();
        }
    }

    /// Snapshot the cached results as an ordered `query -> results` map, suitable for
    /// serialization.
    pub fn results(&self) -> BTreeMap<String, Vec<SearchResult>> {
        self.result_map.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_query_dedupes_and_sorts_stemmed_terms() {
        let canonical = canonical_query("Worlds world hello");
        assert_eq!(canonical, "hello world");
    }

    #[test]
    fn canonical_query_of_empty_input_is_empty() {
        assert_eq!(canonical_query("   "), "");
    }

    #[test]
    fn single_threaded_process_query_caches_by_canonical_query() {
        let index = Arc::new(LockedIndex::new());
        index.add("world", "/a.txt", 1);
        index.add("world", "/a.txt", 2);

        let processor = QueryProcessor::new_single_threaded(index);
        processor.process_query("worlds", true);
        processor.process_query("world", true); // same canonical query, cache hit

        let results = processor.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results["world"][0].query_count, 2);
    }

    #[test]
    fn multithreaded_process_queries_completes_after_finish() {
        let index = Arc::new(LockedIndex::new());
        index.add("cat", "/a.txt", 1);
        let queue = WorkQueue::new(4);
        let processor = QueryProcessor::new(index, queue);

        let input = "cat\ncat\ndog\n";
        processor.process_queries(input.as_bytes(), true).unwrap();

        let results = processor.results();
        assert_eq!(results.len(), 2);
        assert!(results["dog"].is_empty());
    }
}
