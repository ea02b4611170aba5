//! Suffix-array lookups (spec.md §4.D "Query: match" / "countMatches"),
//! grounded in `original_source/SubsetSuffixArraySearch.cc`'s `match_` and
//! `countMatches`.
//!
//! Both operations narrow a `[beg, end)` range of `positions` one depth at a
//! time: at each depth, the current range is already sorted by the subset
//! value at that depth (an invariant carried over from the radix sort in
//! [`super::build`]), so the sub-range whose subset equals the query's is
//! found with two binary searches. The optional [`super::ChildTable`] would
//! let this jump straight to the sub-range in O(1); without it (or when a
//! link is absent) this falls back to the binary search, which is always
//! correct.

use super::SubsetSuffixArray;
use crate::alphabet::DELIMITER as LETTER_DELIMITER;
use crate::seed::{CyclicSubsetSeed, DELIMITER as SUBSET_DELIMITER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub beg: usize,
    pub end: usize,
    pub depth: usize,
}

fn subset_at(buf: &[u8], seed: &CyclicSubsetSeed, start: usize, depth: usize) -> u8 {
    let map = seed.map_at(depth % seed.len());
    buf.get(start + depth).copied().map_or(LETTER_DELIMITER, |b| map[b as usize])
}

/// Narrow `positions[beg..end]` (already sorted by subset value at `depth`)
/// to the contiguous sub-range whose subset equals `target`.
fn narrow_to_subset(positions: &[u64], beg: usize, end: usize, text: &[u8], seed: &CyclicSubsetSeed, depth: usize, target: u8) -> (usize, usize) {
    let slice = &positions[beg..end];
    let lo = slice.partition_point(|&p| subset_at(text, seed, p as usize, depth) < target);
    let hi = lo + slice[lo..].partition_point(|&p| subset_at(text, seed, p as usize, depth) <= target);
    (beg + lo, beg + hi)
}

/// Descend from the bucket-accelerated starting range as far as the query
/// and `max_depth` allow, stopping early once the range is small enough (if
/// `min_depth` has been reached) or the query is exhausted.
pub fn matching_range(
    sa: &SubsetSuffixArray,
    query: &[u8],
    text: &[u8],
    seeds: &[CyclicSubsetSeed],
    seed_num: usize,
    max_hits: usize,
    min_depth: usize,
    max_depth: usize,
) -> MatchResult {
    let seed = &seeds[seed_num];
    let run = sa.seed_range(seed_num);
    let (mut beg, mut end) = (run.start, run.end);
    let mut depth = 0usize;

    // Jump straight to the bucket range for the seed's chosen bucket depth,
    // when the query is at least that long.
    let bucket_depth = sa.bucket_depth[seed_num].min(max_depth);
    if bucket_depth > 0 && query.len() >= bucket_depth {
        if let Some((b, e)) = bucket_lookup(sa, seed_num, query, text, seed, bucket_depth) {
            beg = b;
            end = e;
            depth = bucket_depth;
        }
    }

    while depth < max_depth && end > beg {
        if depth >= query.len() {
            break;
        }
        let target = subset_at(query, seed, 0, depth);
        if target == SUBSET_DELIMITER {
            break;
        }
        let (nb, ne) = narrow_to_subset(&sa.positions, beg, end, text, seed, depth, target);
        if ne == nb {
            beg = nb;
            end = ne;
            break;
        }
        beg = nb;
        end = ne;
        depth += 1;
        if depth >= min_depth && end - beg <= max_hits {
            break;
        }
    }

    MatchResult { beg, end, depth }
}

/// Look up the bucket cell for `query`'s first `bucket_depth` subsets,
/// returning the `[beg, end)` range stored there.
fn bucket_lookup(
    sa: &SubsetSuffixArray,
    seed_num: usize,
    query: &[u8],
    _text: &[u8],
    seed: &CyclicSubsetSeed,
    bucket_depth: usize,
) -> Option<(usize, usize)> {
    let steps = &sa.bucket_steps[seed_num];
    let buckets = &sa.buckets[seed_num];
    let mut idx = 0usize;
    for d in 0..bucket_depth {
        let subset = subset_at(query, seed, 0, d);
        if subset == SUBSET_DELIMITER {
            return None;
        }
        idx += subset as usize * steps[d + 1];
    }
    let run = sa.seed_range(seed_num);
    let beg = run.start + *buckets.get(idx)? as usize;
    let end = run.start + *buckets.get(idx + 1)? as usize;
    Some((beg, end))
}

/// Per-depth histogram of match-count as the query is extended one subset
/// at a time, from 0 up to `max_depth` (exclusive of the bucket shortcut,
/// since the histogram must reflect every intermediate depth).
pub fn count_matches(sa: &SubsetSuffixArray, query: &[u8], text: &[u8], seeds: &[CyclicSubsetSeed], seed_num: usize, max_depth: usize) -> Vec<u64> {
    let seed = &seeds[seed_num];
    let run = sa.seed_range(seed_num);
    let (mut beg, mut end) = (run.start, run.end);
    let mut counts = Vec::with_capacity(max_depth);

    for depth in 0..max_depth {
        if depth >= query.len() || beg == end {
            counts.push((end - beg) as u64);
            continue;
        }
        let target = subset_at(query, seed, 0, depth);
        if target == SUBSET_DELIMITER {
            counts.push((end - beg) as u64);
            continue;
        }
        let (nb, ne) = narrow_to_subset(&sa.positions, beg, end, text, seed, depth, target);
        beg = nb;
        end = ne;
        counts.push((end - beg) as u64);
    }
    counts
}
