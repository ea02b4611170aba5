//! Parallel radix-sort construction of suffix-array positions, grounded in
//! `original_source/SubsetSuffixArraySort.cc`.
//!
//! The C++ source shards a stack of `(beg, end, depth)` ranges across
//! worker threads, each owning private key/count caches, with specialized
//! fast paths for small ranges and small subset counts. Here the same shape
//! -- recursive MSD radix sort over cyclic-subset-map bytes, with a
//! sequential cutover for small ranges -- is expressed with `rayon::scope`
//! fanning out one task per non-trivial bucket, which gives the same
//! work-stealing distribution without a hand-rolled thread pool (this
//! crate's teacher leans on `rayon` for all data-parallel loops rather than
//! bespoke thread management).

use super::BuildOptions;
use crate::alphabet::DELIMITER;
use crate::seed::CyclicSubsetSeed;

/// Collect every text position whose first-position subset (under the
/// seed's first map) is not the delimiter (spec.md §3 invariant: "suffixes
/// starting with a DELIMITER under the seed's first map are excluded").
pub fn collect_candidate_starts(text: &[u8], seed: &CyclicSubsetSeed) -> Vec<u64> {
    let first_map = seed.first_map();
    text.iter()
        .enumerate()
        .filter_map(|(i, &b)| if first_map[b as usize] != DELIMITER { Some(i as u64) } else { None })
        .collect()
}

/// Sort `positions` in place into the suffix order induced by `seed`:
/// lexicographic order of the cyclic-subset-map sequence starting at each
/// position's first map.
pub fn sort_positions(text: &[u8], seed: &CyclicSubsetSeed, positions: &mut [u64], opts: &BuildOptions) {
    if positions.len() <= 1 {
        return;
    }
    let mut scratch = vec![0u64; positions.len()];
    if positions.len() > opts.parallel_threshold {
        rayon::scope(|scope| {
            radix_sort_range(text, seed, positions, &mut scratch, 0, opts, scope);
        });
    } else {
        radix_sort_sequential(text, seed, positions, &mut scratch, 0);
    }
}

const INSERTION_SORT_CUTOFF: usize = 10;

fn subset_at(text: &[u8], seed: &CyclicSubsetSeed, pos: u64, depth: usize) -> u8 {
    let map_idx = depth % seed.len();
    let map = seed.map_at(map_idx);
    let byte = text.get(pos as usize + depth).copied().unwrap_or(DELIMITER);
    map[byte as usize]
}

/// Insertion sort by full cyclic-subset-map comparison; used below
/// [`INSERTION_SORT_CUTOFF`] and as the base case of the radix recursion.
fn insertion_sort(text: &[u8], seed: &CyclicSubsetSeed, positions: &mut [u64], depth: usize) {
    let map_idx = depth % seed.len();
    for i in 1..positions.len() {
        let mut j = i;
        while j > 0 && seed.is_less(text, positions[j] as usize, positions[j - 1] as usize, map_idx) == std::cmp::Ordering::Less {
            positions.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Recursive MSD radix sort: bucket `positions` by the subset value at
/// `depth`, then recurse into each non-trivial bucket at `depth + 1`,
/// cycling back through the seed's positions.
fn radix_sort_sequential(text: &[u8], seed: &CyclicSubsetSeed, positions: &mut [u64], scratch: &mut [u64], depth: usize) {
    if positions.len() <= 1 {
        return;
    }
    if positions.len() == 2 {
        if seed.is_less(text, positions[1] as usize, positions[0] as usize, depth % seed.len()) == std::cmp::Ordering::Less {
            positions.swap(0, 1);
        }
        return;
    }
    if positions.len() <= INSERTION_SORT_CUTOFF {
        insertion_sort(text, seed, positions, depth);
        return;
    }

    let mut counts = [0usize; 256];
    for &p in positions.iter() {
        counts[subset_at(text, seed, p, depth) as usize] += 1;
    }
    if counts[subset_at(text, seed, positions[0], depth) as usize] == positions.len() {
        // Every position shares the same subset at this depth: all
        // delimiters (stop) or all the same letter (recurse deeper).
        let subset = subset_at(text, seed, positions[0], depth);
        if subset == DELIMITER {
            return;
        }
        radix_sort_sequential(text, seed, positions, scratch, depth + 1);
        return;
    }

    let mut offsets = [0usize; 257];
    for i in 0..256 {
        offsets[i + 1] = offsets[i] + counts[i];
    }
    let starts = offsets;
    let mut cursor = offsets;
    for &p in positions.iter() {
        let s = subset_at(text, seed, p, depth) as usize;
        scratch[cursor[s]] = p;
        cursor[s] += 1;
    }
    positions.copy_from_slice(scratch);

    for s in 0..256 {
        if s == DELIMITER as usize {
            continue;
        }
        let range = starts[s]..starts[s + 1];
        if range.len() > 1 {
            let (sub_positions, sub_scratch) = (&mut positions[range.clone()], &mut scratch[range]);
            radix_sort_sequential(text, seed, sub_positions, sub_scratch, depth + 1);
        }
    }
}

fn radix_sort_range<'scope>(
    text: &'scope [u8],
    seed: &'scope CyclicSubsetSeed,
    positions: &'scope mut [u64],
    scratch: &'scope mut [u64],
    depth: usize,
    opts: &'scope BuildOptions,
    scope: &rayon::Scope<'scope>,
) {
    if positions.len() <= opts.parallel_threshold {
        radix_sort_sequential(text, seed, positions, scratch, depth);
        return;
    }
    if positions.len() <= 1 {
        return;
    }

    let mut counts = [0usize; 256];
    for &p in positions.iter() {
        counts[subset_at(text, seed, p, depth) as usize] += 1;
    }
    let mut offsets = [0usize; 257];
    for i in 0..256 {
        offsets[i + 1] = offsets[i] + counts[i];
    }
    let starts = offsets;
    let mut cursor = offsets;
    for &p in positions.iter() {
        let s = subset_at(text, seed, p, depth) as usize;
        scratch[cursor[s]] = p;
        cursor[s] += 1;
    }
    positions.copy_from_slice(scratch);

    // Split the buffers into disjoint per-bucket slices so each spawned
    // task only ever touches its own range -- the child-table write (and
    // this sort) never races because ranges are disjoint by construction.
    let mut remaining_positions = &mut positions[..];
    let mut remaining_scratch = &mut scratch[..];
    let mut prev = 0usize;
    for s in 0..256 {
        if s == DELIMITER as usize {
            let width = starts[s + 1] - prev;
            let (_, rest_p) = remaining_positions.split_at_mut(width);
            let (_, rest_s) = remaining_scratch.split_at_mut(width);
            remaining_positions = rest_p;
            remaining_scratch = rest_s;
            prev = starts[s + 1];
            continue;
        }
        let width = starts[s + 1] - prev;
        let (chunk_p, rest_p) = remaining_positions.split_at_mut(width);
        let (chunk_s, rest_s) = remaining_scratch.split_at_mut(width);
        remaining_positions = rest_p;
        remaining_scratch = rest_s;
        prev = starts[s + 1];

        if chunk_p.len() > 1 {
            scope.spawn(move |scope| {
                radix_sort_range(text, seed, chunk_p, chunk_s, depth + 1, opts, scope);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    #[test]
    fn sorted_positions_satisfy_seed_order() {
        let alph = Alphabet::dna().unwrap();
        let mut text = b"BANANA".to_vec(); // deliberately non-DNA to exercise delimiter codes
        alph.tr(&mut text);
        let seed = CyclicSubsetSeed::from_code("1", "ACGT", false, &alph.encode).unwrap();
        let mut positions = collect_candidate_starts(&text, &seed);
        let opts = BuildOptions { parallel_threshold: 1, ..BuildOptions::default() };
        sort_positions(&text, &seed, &mut positions, &opts);
        for w in positions.windows(2) {
            assert_ne!(
                seed.is_less(&text, w[1] as usize, w[0] as usize, 0),
                std::cmp::Ordering::Less,
                "positions must be non-decreasing in seed order"
            );
        }
    }
}
