//! webdex-core — the inverted index, crawler, and query-processing engine.
//!
//! Data flow: seed URL → [`crawler`] → [`fetch`] → [`html`] → [`link`] (enqueues new
//! crawls) → [`text`] → a private local [`index`] merged into the shared
//! [`locked_index`] under its write lock. Query flow: query string → [`text`] →
//! canonical term set → the shared index (read lock) → ranked results → [`json`].

pub mod crawler;
pub mod error;
pub mod fetch;
pub mod fs_index;
pub mod html;
pub mod index;
pub mod json;
pub mod link;
pub mod locked_index;
pub mod query;
pub mod queue;
pub mod rwlock;
pub mod text;
