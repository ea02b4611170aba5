//! Candidate-alignment layout (spec.md §4.I "active-set bookkeeping"),
//! grounded in `original_source/split/cbrc_split_aligner.cc`'s handling of
//! one query's set of candidate genomic alignments ("DP sequences").
//!
//! Each candidate is one gapped [`crate::alignment::Alignment`] of the
//! query against some genomic location; the split aligner chooses a chain
//! of non-overlapping (in query coordinates) candidates that together cover
//! the query, optionally crossing a splice junction or an rna-seq-style
//! "trans" jump between non-adjacent candidates.

use crate::alignment::Alignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// One candidate alignment, with the query-coordinate span it covers (used
/// to order candidates and detect overlaps) and which genomic sequence/
/// strand it belongs to (used to decide whether two adjacent candidates
/// could plausibly be joined by a splice).
#[derive(Debug, Clone)]
pub struct Candidate {
    pub alignment: Alignment,
    pub chromosome: usize,
    pub strand: Strand,
    pub query_beg: u64,
    pub query_end: u64,
}

impl Candidate {
    pub fn new(alignment: Alignment, chromosome: usize, strand: Strand) -> Self {
        let query_beg = alignment.beg2();
        let query_end = alignment.end2();
        Self { alignment, chromosome, strand, query_beg, query_end }
    }

    pub fn genomic_beg(&self) -> u64 {
        self.alignment.beg1()
    }
    pub fn genomic_end(&self) -> u64 {
        self.alignment.end1()
    }
}

/// An active set of candidates for one query, sorted by query-coordinate
/// start, ready for the Viterbi chain DP.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub candidates: Vec<Candidate>,
}

impl Layout {
    pub fn new(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by_key(|c| c.query_beg);
        Self { candidates }
    }

    /// Candidates `j` that could plausibly follow candidate `i` in a chain:
    /// `j`'s query span starts no earlier than `i`'s does (query coordinates
    /// must advance, though a small overlap is tolerated to allow trimming).
    pub fn successors(&self, i: usize, max_query_overlap: u64) -> impl Iterator<Item = usize> + '_ {
        let end = self.candidates[i].query_end;
        (0..self.candidates.len()).filter(move |&j| j != i && self.candidates[j].query_beg + max_query_overlap >= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::SegmentPair;

    fn aln(t: u64, q: u64, len: u64) -> Alignment {
        let sp = SegmentPair::new(t, q, len, len as i32);
        Alignment::from_segment_pair(sp)
    }

    #[test]
    fn layout_sorts_candidates_by_query_position() {
        let c1 = Candidate::new(aln(0, 100, 10), 0, Strand::Forward);
        let c2 = Candidate::new(aln(0, 0, 10), 0, Strand::Forward);
        let layout = Layout::new(vec![c1, c2]);
        assert_eq!(layout.candidates[0].query_beg, 0);
        assert_eq!(layout.candidates[1].query_beg, 100);
    }
}
