//! The single-threaded inverted index core: a three-level sorted mapping (term →
//! location → positions) plus per-location word counts, merge, exact/prefix search,
//! and scoring. Thread safety is layered on top in [`crate::locked_index`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One row of a search result: a location, the total matched-term count there, and the
/// resulting score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub location: String,
    pub query_count: u32,
    pub score: f64,
}

/// Term → Location → Positions, plus Location → highest position ever recorded
/// (document length). Both outer and inner maps are `BTreeMap`s so iteration order is
/// always lexicographic and prefix search can use `range`.
#[derive(Default, Clone)]
pub struct InvertedIndex {
    terms: BTreeMap<String, BTreeMap<String, BTreeSet<u32>>>,
    counts: BTreeMap<String, u32>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `position` into the set at `index[term][location]`. `position` must be
    /// `>= 1`. Updates `counts[location] := max(counts[location], position)`.
    pub fn add(&mut self, term: &str, location: &str, position: u32) {
        assert!(position >= 1, "position must be >= 1, got {position}");
        self.terms
            .entry(term.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);
        self.counts
            .entry(location.to_string())
            .and_modify(|c| *c = (*c).max(position))
            .or_insert(position);
    }

    /// Union `other`'s location→positions substructure into this index, term by term.
    /// Location counts are merged by taking the per-location maximum.
    pub fn add_all(&mut self, other: &InvertedIndex) {
        for (term, locations) in &other.terms {
            let entry = self.terms.entry(term.clone()).or_default();
            for (location, positions) in locations {
                entry.entry(location.clone()).or_default().extend(positions.iter().copied());
            }
        }
        for (location, count) in &other.counts {
            self.counts
                .entry(location.clone())
                .and_modify(|c| *c = (*c).max(*count))
                .or_insert(*count);
        }
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn has_location(&self, term: &str, location: &str) -> bool {
        self.terms.get(term).is_some_and(|locs| locs.contains_key(location))
    }

    pub fn has_position(&self, term: &str, location: &str, position: u32) -> bool {
        self.terms
            .get(term)
            .and_then(|locs| locs.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn num_locations(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, |locs| locs.len())
    }

    pub fn num_positions(&self, term: &str, location: &str) -> usize {
        self.terms.get(term).and_then(|locs| locs.get(location)).map_or(0, |p| p.len())
    }

    /// Highest position ever recorded at `location`, i.e. its document length.
    pub fn location_count(&self, location: &str) -> Option<u32> {
        self.counts.get(location).copied()
    }

    /// Read-only view of this index's terms. No mutation is possible through the
    /// returned reference.
    pub fn terms(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<u32>>> {
        &self.terms
    }

    /// Read-only view of the location→count map.
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    /// For each query term present in the index exactly, accumulate matches and
    /// return the ranked result list.
    pub fn exact_search<'a>(&self, query: impl IntoIterator<Item = &'a str>) -> Vec<SearchResult> {
        let mut acc: HashMap<String, u32> = HashMap::new();
        for term in query {
            if let Some(locations) = self.terms.get(term) {
                accumulate(&mut acc, locations);
            }
        }
        self.rank(acc)
    }

    /// For each query term, walk indexed terms in sorted order starting from it while
    /// each has it as a prefix, accumulating as in exact search. Relies on the sorted
    /// term map to stop early once a key no longer carries the prefix.
    pub fn partial_search<'a>(&self, query: impl IntoIterator<Item = &'a str>) -> Vec<SearchResult> {
        let mut acc: HashMap<String, u32> = HashMap::new();
        for prefix in query {
            for (term, locations) in self.terms.range(prefix.to_string()..) {
                if !term.starts_with(prefix) {
                    break;
                }
                accumulate(&mut acc, locations);
            }
        }
        self.rank(acc)
    }

    pub fn search<'a>(&self, query: impl IntoIterator<Item = &'a str>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(query)
        } else {
            self.partial_search(query)
        }
    }

    fn rank(&self, acc: HashMap<String, u32>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = acc
            .into_iter()
            .map(|(location, query_count)| {
                let location_count = self.counts.get(&location).copied().unwrap_or(1).max(1);
                let score = query_count as f64 / location_count as f64;
                SearchResult { location, query_count, score }
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.query_count.cmp(&a.query_count))
                .then_with(|| a.location.to_lowercase().cmp(&b.location.to_lowercase()))
                .then_with(|| a.location.cmp(&b.location))
        });
        results
    }
}

fn accumulate(acc: &mut HashMap<String, u32>, locations: &BTreeMap<String, BTreeSet<u32>>) {
    for (location, positions) in locations {
        *acc.entry(location.clone()).or_insert(0) += positions.len() as u32;
    }
}
