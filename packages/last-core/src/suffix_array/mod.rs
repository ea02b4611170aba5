//! The subset suffix array (spec.md §4.D): a bucketed, optionally
//! child-table-accelerated index over one or more cyclic subset seeds.
//!
//! Grounded in `original_source/SubsetSuffixArray.hh`,
//! `SubsetSuffixArraySort.cc`, `SubsetSuffixArraySearch.cc`.
//!
//! # Simplification from the original
//!
//! The C++ source packs `positions[]` as little-endian byte records sized
//! by `posParts` so that the array can be memory-mapped directly in its
//! on-disk form. Here the in-memory representation is a plain `Vec<u64>`
//! for clarity; [`crate::io::index_files`] performs the packing/unpacking
//! at the disk boundary, so the on-disk format (spec.md §6) is unchanged.

mod build;
mod bucket;
mod child_table;
mod query;

pub use child_table::ChildTable;
pub use query::MatchResult;

use crate::alphabet::DELIMITER;
use crate::seed::CyclicSubsetSeed;

#[derive(Debug, Clone)]
pub struct SubsetSuffixArray {
    /// Sorted suffix-start positions, one contiguous run per seed.
    pub positions: Vec<u64>,
    /// `cumulative_counts[i]` is the end (exclusive) of seed `i`'s run in
    /// `positions`; `cumulative_counts[0]` is implicitly 0.
    pub cumulative_counts: Vec<usize>,
    /// Per-seed flat bucket offset table.
    pub buckets: Vec<Vec<u64>>,
    /// Per-seed `steps[d]`: stride, in bucket cells, of one subset unit at
    /// depth `d`.
    pub bucket_steps: Vec<Vec<usize>>,
    /// Per-seed chosen bucket depth.
    pub bucket_depth: Vec<usize>,
    pub child_table: ChildTable,
}

/// Parameters controlling suffix array construction.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub min_positions_per_bucket: usize,
    pub num_threads: usize,
    pub child_table_kind: ChildTableKind,
    /// Below this count, suffix ranges are sorted sequentially rather than
    /// fanned out across the thread pool.
    pub parallel_threshold: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            min_positions_per_bucket: 16,
            num_threads: num_cpus::get().max(1),
            child_table_kind: ChildTableKind::None,
            parallel_threshold: 4096,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildTableKind {
    None,
    Chibi,
    Kiddy,
    Full,
}

impl SubsetSuffixArray {
    /// Build the suffix array for `text` under one or more cyclic subset
    /// seeds. `word_length` is the restricted-count prefix length used when
    /// sizing buckets (spec.md §4.D "Bucket build").
    pub fn build(text: &[u8], seeds: &[CyclicSubsetSeed], word_length: usize, opts: &BuildOptions) -> Self {
        let mut positions = Vec::new();
        let mut cumulative_counts = Vec::with_capacity(seeds.len());
        let mut buckets = Vec::with_capacity(seeds.len());
        let mut bucket_steps = Vec::with_capacity(seeds.len());
        let mut bucket_depth = Vec::with_capacity(seeds.len());

        for (seed_num, seed) in seeds.iter().enumerate() {
            let mut run = build::collect_candidate_starts(text, seed);
            log::debug!("seed {seed_num}: {} candidate suffixes", run.len());
            build::sort_positions(text, seed, &mut run, opts);
            positions.extend_from_slice(&run);
            cumulative_counts.push(positions.len());

            let depth = bucket::choose_bucket_depth(run.len(), seed, word_length, opts.min_positions_per_bucket);
            let steps = bucket::compute_bucket_steps(seed, word_length, depth);
            let bkt = bucket::fill_buckets(text, seed, &run, depth, &steps);
            bucket_depth.push(depth);
            bucket_steps.push(steps);
            buckets.push(bkt);
        }

        let child_table = child_table::build(text, seeds, &positions, &cumulative_counts, opts.child_table_kind);

        Self {
            positions,
            cumulative_counts,
            buckets,
            bucket_steps,
            bucket_depth,
            child_table,
        }
    }

    pub fn seed_range(&self, seed_num: usize) -> std::ops::Range<usize> {
        let beg = if seed_num == 0 { 0 } else { self.cumulative_counts[seed_num - 1] };
        beg..self.cumulative_counts[seed_num]
    }

    /// Query for the suffix-array range matching `query` under `seeds[seed_num]`,
    /// per spec.md §4.D "Query: match".
    pub fn query_match(
        &self,
        query: &[u8],
        text: &[u8],
        seeds: &[CyclicSubsetSeed],
        seed_num: usize,
        max_hits: usize,
        min_depth: usize,
        max_depth: usize,
    ) -> MatchResult {
        query::matching_range(self, query, text, seeds, seed_num, max_hits, min_depth, max_depth)
    }

    /// Accumulate a per-depth histogram of match counts, per spec.md §4.D
    /// "countMatches".
    pub fn count_matches(&self, query: &[u8], text: &[u8], seeds: &[CyclicSubsetSeed], seed_num: usize, max_depth: usize) -> Vec<u64> {
        query::count_matches(self, query, text, seeds, seed_num, max_depth)
    }

    fn is_delimiter_start(text: &[u8], pos: usize, first_map: &[u8; 256]) -> bool {
        first_map[text.get(pos).copied().unwrap_or(DELIMITER) as usize] == DELIMITER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn dna_seed(code: &str) -> CyclicSubsetSeed {
        let alph = Alphabet::dna().unwrap();
        CyclicSubsetSeed::from_code(code, "ACGT", false, &alph.encode).unwrap()
    }

    #[test]
    fn exact_seed_full_match_returns_whole_range_for_each_letter() {
        let alph = Alphabet::dna().unwrap();
        let mut text = b"ACGT".to_vec();
        alph.tr(&mut text);
        let seed = dna_seed("ACGT");
        let seeds = vec![seed];
        let sa = SubsetSuffixArray::build(&text, &seeds, 4, &BuildOptions::default());

        let mut query = b"ACGT".to_vec();
        alph.tr(&mut query);
        let counts = sa.count_matches(&query, &text, &seeds, 0, 4);
        assert_eq!(counts[0], sa.positions.len() as u64);
    }

    #[test]
    fn count_matches_is_non_increasing_over_depth() {
        let alph = Alphabet::dna().unwrap();
        let mut text = b"ACGTACGTACGT".to_vec();
        alph.tr(&mut text);
        let seed = dna_seed("ACGT");
        let seeds = vec![seed];
        let sa = SubsetSuffixArray::build(&text, &seeds, 4, &BuildOptions::default());

        let mut query = b"ACGT".to_vec();
        alph.tr(&mut query);
        let counts = sa.count_matches(&query, &text, &seeds, 0, 4);
        for w in counts.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn match_range_is_contiguous_and_bounded_by_max_hits() {
        let alph = Alphabet::dna().unwrap();
        let mut text = b"ACGTACGTACGTACGT".to_vec();
        alph.tr(&mut text);
        let seed = dna_seed("ACGT");
        let seeds = vec![seed];
        let sa = SubsetSuffixArray::build(&text, &seeds, 4, &BuildOptions::default());

        let mut query = b"ACGT".to_vec();
        alph.tr(&mut query);
        let result = sa.query_match(&query, &text, &seeds, 0, 2, 0, 4);
        assert!(result.end - result.beg <= 2 || result.depth == 4);
    }
}
