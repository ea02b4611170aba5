//! Bucket-depth selection and bucket filling (spec.md §4.D "Bucket build").
//!
//! A bucket table lets `match`/`countMatches` jump straight to a
//! `[beg, end)` range in `positions` for a fixed-length prefix, instead of
//! always falling back to binary search. `bucket_steps[d]` is the number of
//! flat-array cells spanned by one sibling subtree rooted at depth `d`; the
//! recursion at the bottom of this file derives it from the per-depth
//! subset counts.

use crate::seed::CyclicSubsetSeed;

/// A generous ceiling on how deep the bucket table may go, to keep
/// `subset_count` products from overflowing for pathological seeds.
const MAX_BUCKET_DEPTH: usize = 24;

fn subset_count_at_depth(seed: &CyclicSubsetSeed, word_length: usize, d: usize) -> usize {
    if d < word_length {
        seed.restricted_subset_count(d)
    } else {
        seed.unrestricted_subset_count(d)
    }
}

/// The largest depth such that the total bucket cell count stays within
/// `num_positions / min_positions_per_bucket`.
pub fn choose_bucket_depth(num_positions: usize, seed: &CyclicSubsetSeed, word_length: usize, min_positions_per_bucket: usize) -> usize {
    let target = (num_positions / min_positions_per_bucket.max(1)).max(1);
    let mut total_cells: usize = 1;
    let mut depth = 0;
    while depth < MAX_BUCKET_DEPTH {
        let count = subset_count_at_depth(seed, word_length, depth);
        let Some(next_total) = total_cells.checked_mul(count) else {
            break;
        };
        if next_total > target && depth > 0 {
            break;
        }
        total_cells = next_total;
        depth += 1;
        if next_total > target {
            break;
        }
    }
    depth
}

/// `steps[d]` for `d` in `0..=depth`: the flat-array stride of one subset
/// unit when transitioning into depth `d` (so `steps[depth] == 1`).
pub fn compute_bucket_steps(seed: &CyclicSubsetSeed, word_length: usize, depth: usize) -> Vec<usize> {
    let counts: Vec<usize> = (0..depth).map(|d| subset_count_at_depth(seed, word_length, d)).collect();
    let mut steps = vec![1usize; depth + 1];
    for d in (0..depth).rev() {
        steps[d] = steps[d + 1].saturating_mul(counts[d]);
    }
    steps
}

/// Fill the flat bucket array by streaming the already-sorted `positions`
/// once and stepping the subset map at each position.
pub fn fill_buckets(text: &[u8], seed: &CyclicSubsetSeed, positions: &[u64], depth: usize, steps: &[usize]) -> Vec<u64> {
    let size = steps[0] + 1;
    let mut buckets = vec![positions.len() as u64; size];
    buckets[0] = 0;

    let mut cell: usize = 0;
    let mut prev_cell: usize = 0;
    let mut filled_up_to = 0usize;

    for (i, &pos) in positions.iter().enumerate() {
        let mut map_idx = 0usize;
        let mut d = 0usize;
        let mut idx = 0usize;
        while d < depth {
            let map = seed.map_at(map_idx);
            let byte = text.get(pos as usize + d).copied().unwrap_or(crate::alphabet::DELIMITER);
            let subset = map[byte as usize];
            if subset == crate::seed::DELIMITER {
                idx = steps[0]; // past the end: delimiter-prefixed suffixes sort last within this bucket run
                break;
            }
            idx += subset as usize * steps[d + 1];
            d += 1;
            map_idx = seed.next_map_index(map_idx);
        }
        cell = idx;
        while filled_up_to <= cell {
            buckets[filled_up_to] = i as u64;
            filled_up_to += 1;
        }
        prev_cell = cell;
    }
    let _ = prev_cell;
    while filled_up_to < size {
        buckets[filled_up_to] = positions.len() as u64;
        filled_up_to += 1;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    #[test]
    fn bucket_steps_innermost_step_is_one() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_code("ACGT", "ACGT", false, &alph.encode).unwrap();
        let steps = compute_bucket_steps(&seed, 4, 3);
        assert_eq!(*steps.last().unwrap(), 1);
    }

    #[test]
    fn deeper_bucket_depth_never_exceeds_target_by_much() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_code("ACGT", "ACGT", false, &alph.encode).unwrap();
        let depth = choose_bucket_depth(1000, &seed, 4, 16);
        assert!(depth <= MAX_BUCKET_DEPTH);
    }
}
