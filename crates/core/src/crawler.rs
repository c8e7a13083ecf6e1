//! Bounded BFS crawler: expands from a seed URL, subject to a discovered-location cap,
//! building a private per-page index on each worker and merging it into the shared
//! index under one write-lock critical section.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::fetch;
use crate::html;
use crate::index::InvertedIndex;
use crate::link;
use crate::locked_index::LockedIndex;
use crate::queue::WorkQueue;
use crate::text;

const REDIRECT_BUDGET: u32 = 3;

/// Crawls a bounded neighborhood of a seed URL into a shared index.
pub struct Crawler {
    index: Arc<LockedIndex>,
    queue: Arc<WorkQueue>,
    limit: usize,
    visited: Mutex<HashSet<String>>,
}

impl Crawler {
    pub fn new(index: Arc<LockedIndex>, queue: Arc<WorkQueue>, limit: usize) -> Arc<Crawler> {
        Arc::new(Crawler { index, queue, limit, visited: Mutex::new(HashSet::new()) })
    }

    /// Canonicalize `seed`, mark it visited, submit a worker for it, and block until
    /// the whole bounded crawl has completed.
    pub fn crawl(self: &Arc<Self>, seed: &str) {
        let canonical = match link::canonicalize(seed) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(seed, error = %e, "crawl seed is not a valid url");
                return;
            }
        };
        self.visited.lock().unwrap().insert(canonical.clone());
        self.submit(canonical);
        self.queue.finish();
    }

    fn submit(self: &Arc<Self>, url: String) {
        let this = Arc::clone(self);
        self.queue.execute(move || this.worker(url));
    }

    fn worker(self: &Arc<Self>, url: String) {
        let Some(html_body) = fetch::fetch(&url, REDIRECT_BUDGET) else {
            tracing::debug!(url, "fetch returned no body; abandoning page");
            return;
        };

        // Anchor-bearing text only strips block elements, not all tags, so hrefs
        // survive for link extraction.
        let anchor_text = html::strip_block_elements(&html_body);
        let links = link::extract_links(&url, &anchor_text);

        for candidate in links {
            let canonical = match link::canonicalize(&candidate) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let mut visited = self.visited.lock().unwrap();
            if visited.len() >= self.limit {
                break;
            }
            let newly_inserted = visited.insert(canonical.clone());
            drop(visited);
            if newly_inserted {
                self.submit(canonical);
            }
        }

        let plain_text = html::clean(&html_body);
        let terms = text::parse_and_stem(&plain_text);

        let mut local = InvertedIndex::new();
        for (position, term) in (1u32..).zip(terms) {
            local.add(&term, &url, position);
        }
        self.index.add_all(&local);
    }

    /// Number of distinct locations discovered so far (bounded by `limit`).
    pub fn visited_count(&self) -> usize {
        self.visited.lock().unwrap().len()
    }
}
