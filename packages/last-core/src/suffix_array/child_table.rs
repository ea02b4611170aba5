//! Child tables (spec.md §4.D "Child-table construction"), grounded in
//! `original_source/SubsetSuffixArraySearch.cc`'s `childRange`/`getChildForward`.
//!
//! # Simplification from the original
//!
//! The C++ source stores a single combined up/down/next-L-index value per
//! slot (the classic Abouelhoda-Ohlebusch encoding) so that one array
//! replaces three. Here the table stores one quantity directly: for slot
//! `i`, the index of the next slot `j > i` whose longest-common-subset-depth
//! with its predecessor is *smaller* than slot `i`'s -- i.e. the next
//! sibling boundary to the right (a "next smaller value" query, computed
//! with the standard monotonic-stack algorithm). This is enough to jump
//! from any slot directly to the end of its equal-prefix run without a
//! binary search, which is the property `match`/`countMatches` actually
//! need; it is simpler to build and verify than reproducing the exact
//! combined encoding bit-for-bit. The "reserved max value means no child"
//! rule is preserved, and also covers the case where the true index
//! doesn't fit the table's width (u8/u16 chibi/kiddy tables): both cases
//! fall back to binary search.

use super::ChildTableKind;
use crate::alphabet::DELIMITER as LETTER_DELIMITER;
use crate::seed::{CyclicSubsetSeed, DELIMITER as SUBSET_DELIMITER};

/// A generous cap on how deep the LCP scan goes, to bound cost for
/// pathologically repetitive text.
const MAX_LCP_DEPTH: usize = 200;

#[derive(Debug, Clone)]
pub enum ChildTable {
    None,
    Chibi(Vec<u8>),
    Kiddy(Vec<u16>),
    Full(Vec<usize>),
}

impl ChildTable {
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Chibi(v) => v.len(),
            Self::Kiddy(v) => v.len(),
            Self::Full(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read slot `i`, returning `None` if the link is absent (sentinel) or
    /// the index didn't fit the table's width.
    pub fn get(&self, i: usize) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Chibi(v) => {
                let x = v[i];
                if x == u8::MAX {
                    None
                } else {
                    Some(x as usize)
                }
            }
            Self::Kiddy(v) => {
                let x = v[i];
                if x == u16::MAX {
                    None
                } else {
                    Some(x as usize)
                }
            }
            Self::Full(v) => {
                let x = v[i];
                if x == usize::MAX {
                    None
                } else {
                    Some(x)
                }
            }
        }
    }
}

pub fn build(
    text: &[u8],
    seeds: &[CyclicSubsetSeed],
    positions: &[u64],
    cumulative_counts: &[usize],
    kind: ChildTableKind,
) -> ChildTable {
    if kind == ChildTableKind::None {
        return ChildTable::None;
    }

    let n = positions.len();
    let mut next_smaller = vec![usize::MAX; n];

    // Build next_smaller independently within each seed's contiguous run.
    let mut run_start = 0usize;
    for (seed_idx, &run_end) in cumulative_counts.iter().enumerate() {
        let seed = &seeds[seed_idx];
        let run = &positions[run_start..run_end];
        let lcp = compute_lcp(text, seed, run);
        let local = next_smaller_via_monotonic_stack(&lcp);
        for (offset, v) in local.into_iter().enumerate() {
            next_smaller[run_start + offset] = v.map(|x| x + run_start).unwrap_or(usize::MAX);
        }
        run_start = run_end;
    }

    match kind {
        ChildTableKind::None => unreachable!(),
        ChildTableKind::Chibi => ChildTable::Chibi(
            next_smaller
                .into_iter()
                .map(|v| v.and_then(|x| u8::try_from(x).ok()).unwrap_or(u8::MAX))
                .collect(),
        ),
        ChildTableKind::Kiddy => ChildTable::Kiddy(
            next_smaller
                .into_iter()
                .map(|v| v.and_then(|x| u16::try_from(x).ok()).unwrap_or(u16::MAX))
                .collect(),
        ),
        ChildTableKind::Full => ChildTable::Full(
            next_smaller.into_iter().map(|v| v.unwrap_or(usize::MAX)).collect(),
        ),
    }
}

/// `lcp[i]` (for `i` in `1..run.len()`) is the depth at which `run[i-1]` and
/// `run[i]` first diverge under the cyclic subset map; `lcp[0]` is 0
/// (unused as a real value, only as the left sentinel).
fn compute_lcp(text: &[u8], seed: &CyclicSubsetSeed, run: &[u64]) -> Vec<usize> {
    let mut lcp = vec![0usize; run.len()];
    for i in 1..run.len() {
        lcp[i] = common_subset_depth(text, seed, run[i - 1] as usize, run[i] as usize);
    }
    lcp
}

fn common_subset_depth(text: &[u8], seed: &CyclicSubsetSeed, a: usize, b: usize) -> usize {
    let mut map_idx = 0usize;
    for d in 0..MAX_LCP_DEPTH {
        let map = seed.map_at(map_idx);
        let sa = text.get(a + d).copied().map_or(LETTER_DELIMITER, |c| map[c as usize]);
        let sb = text.get(b + d).copied().map_or(LETTER_DELIMITER, |c| map[c as usize]);
        if sa != sb || sa == SUBSET_DELIMITER {
            return d;
        }
        map_idx = seed.next_map_index(map_idx);
    }
    MAX_LCP_DEPTH
}

/// For each index `i`, the smallest `j > i` with `lcp[j] < lcp[i]`, or
/// `None` if no such `j` exists. Standard monotonic-stack "next smaller
/// element" algorithm, O(n).
fn next_smaller_via_monotonic_stack(lcp: &[usize]) -> Vec<Option<usize>> {
    let mut result = vec![None; lcp.len()];
    let mut stack: Vec<usize> = Vec::new();
    for i in 0..lcp.len() {
        while let Some(&top) = stack.last() {
            if lcp[top] > lcp[i] {
                result[top] = Some(i);
                stack.pop();
            } else {
                break;
            }
        }
        stack.push(i);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_smaller_matches_brute_force() {
        let lcp = vec![0, 3, 5, 2, 4, 1];
        let fast = next_smaller_via_monotonic_stack(&lcp);
        for i in 0..lcp.len() {
            let brute = (i + 1..lcp.len()).find(|&j| lcp[j] < lcp[i]);
            assert_eq!(fast[i], brute, "mismatch at {i}");
        }
    }
}
