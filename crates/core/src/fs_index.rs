//! Local filesystem traversal for the `-path` CLI mode: recursively index `.txt`/
//! `.text` files under a root, the same way the crawler folds a fetched page — a
//! private per-file index merged into the shared index under one write-lock critical
//! section per file.
//!
//! Out of scope as a *feature* per the engine's purpose (it is peripheral to the
//! crawl/index/query core), but implemented here using this crate's existing parallel
//! directory-walk idiom: `ignore::WalkBuilder` driven in parallel via `rayon`, the same
//! shape this codebase already uses for its own file scanning, generalized from
//! extension/category bucketing to a plain `.txt`/`.text` filter.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ignore::WalkBuilder;
use rayon::iter::{ParallelBridge, ParallelIterator};

use crate::error::FsIndexError;
use crate::index::InvertedIndex;
use crate::locked_index::LockedIndex;
use crate::text;

fn is_text_candidate(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text"),
        None => false,
    }
}

/// Collect every `.txt`/`.text` file under `root`, recursively.
fn collect_files(root: &Path) -> Vec<PathBuf> {
    let found = Mutex::new(Vec::new());
    WalkBuilder::new(root).build().par_bridge().for_each(|entry| {
        let Ok(entry) = entry else { return };
        let path = entry.path();
        if path.is_file() && is_text_candidate(path) {
            found.lock().unwrap().push(path.to_path_buf());
        }
    });
    let mut files = found.into_inner().unwrap();
    files.sort();
    files
}

/// Build a private local index for a single file, keyed by its path as the location.
fn index_file(path: &Path) -> Result<InvertedIndex, FsIndexError> {
    let text_content = std::fs::read_to_string(path)?;
    let location = path.to_string_lossy().into_owned();
    let mut local = InvertedIndex::new();
    for (position, term) in (1u32..).zip(text::parse_and_stem(&text_content)) {
        local.add(&term, &location, position);
    }
    Ok(local)
}

/// Index every `.txt`/`.text` file under `root` into `index`, one file per task on
/// `queue`, then block until all merges have completed.
pub fn index_path(index: Arc<LockedIndex>, queue: &crate::queue::WorkQueue, root: &Path) {
    for path in collect_files(root) {
        let index = Arc::clone(&index);
        queue.execute(move || match index_file(&path) {
            Ok(local) => index.add_all(&local),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to index file"),
        });
    }
    queue.finish();
}
