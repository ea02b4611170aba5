//! The split-alignment engine (spec.md §4.I), grounded in
//! `original_source/split/cbrc_split_aligner.cc`,
//! `cbrc_unsplit_alignment.cc`, and `last-split.cc`.
//!
//! Chooses, for one query, the highest-scoring chain of candidate genomic
//! alignments that together explain the whole read -- crossing splice
//! junctions (scored by a GT-AG signal table and a log-normal intron-length
//! model) or unrelated "trans" jumps between candidates that share no
//! plausible intron relationship.

pub mod forward_backward;
pub mod layout;
pub mod splice;
pub mod viterbi;

pub use layout::{Candidate, Layout, Strand};
pub use splice::{IntronLengthModel, SpliceSignals};
pub use viterbi::{SplitAligner, SplitAlignerParams};

use crate::alignment::UnsplitAlignment;

/// The outcome of splitting one query: the winning chain (as indices into
/// the input candidate list), its total score, and per-candidate posterior
/// probabilities of belonging to that chain.
pub struct SplitResult {
    pub chain: Vec<usize>,
    pub score: i32,
    pub posteriors: Vec<f64>,
}

/// Run the split aligner over one strand's candidates for a query and
/// return the winning chain plus posterior confidence per candidate.
pub fn split_one_strand(aligner: &SplitAligner, layout: &Layout) -> SplitResult {
    let (score, chain) = aligner.viterbi(layout);
    let marginals = aligner.forward_backward(layout);
    let posteriors: Vec<f64> = (0..layout.candidates.len())
        .map(|i| (marginals.forward[i] * marginals.backward[i] / marginals.partition).min(1.0))
        .collect();
    SplitResult { chain, score, posteriors }
}

/// Disambiguate strand by comparing forward- and reverse-strand partition
/// functions, then run the winning strand's split (spec.md §4.I "strand
/// disambiguation").
pub fn split_with_strand_disambiguation(
    aligner_fwd: &SplitAligner,
    layout_fwd: &Layout,
    aligner_rev: &SplitAligner,
    layout_rev: &Layout,
) -> (Strand, SplitResult) {
    let marg_fwd = aligner_fwd.forward_backward(layout_fwd);
    let marg_rev = aligner_rev.forward_backward(layout_rev);
    let p_forward = SplitAligner::strand_probability(marg_fwd.partition, marg_rev.partition);
    if p_forward >= 0.5 {
        (Strand::Forward, split_one_strand(aligner_fwd, layout_fwd))
    } else {
        (Strand::Reverse, split_one_strand(aligner_rev, layout_rev))
    }
}

/// Build the final [`UnsplitAlignment`]-per-chunk view of a winning chain,
/// for output (spec.md §6 MAF/tabular format).
pub fn chain_to_unsplit_alignments(layout: &Layout, chain: &[usize]) -> Vec<UnsplitAlignment> {
    chain
        .iter()
        .map(|&i| {
            let c = &layout.candidates[i];
            let aln = &c.alignment;
            UnsplitAlignment {
                rname: String::new(),
                rstart: aln.beg1(),
                rend: aln.end1(),
                qname: String::new(),
                qstart: aln.beg2(),
                qend: aln.end2(),
                qstrand: match c.strand {
                    Strand::Forward => crate::alignment::Strand::Forward,
                    Strand::Reverse => crate::alignment::Strand::Reverse,
                },
                ralign: Vec::new(),
                qalign: Vec::new(),
                qquality: None,
                score: aln.score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{Alignment, SegmentPair};

    fn candidate(t: u64, q: u64, len: u64, score: i32) -> Candidate {
        let sp = SegmentPair::new(t, q, len, score);
        Candidate::new(Alignment::from_segment_pair(sp), 0, Strand::Forward)
    }

    fn params() -> SplitAlignerParams {
        SplitAlignerParams {
            gap_existence_score: 10,
            gap_extension_score: 1,
            jump_score: -1000,
            restart_score: -5,
            scale: 10.0,
            max_query_overlap: 0,
        }
    }

    #[test]
    fn posteriors_are_probabilities_in_zero_one() {
        let aligner = SplitAligner { params: params(), splice: SpliceSignals::new(10.0), intron_model: IntronLengthModel::new(0.0, 7.0, 1.75), genome: None };
        let layout = Layout::new(vec![candidate(0, 0, 50, 100), candidate(1000, 50, 50, 100)]);
        let result = split_one_strand(&aligner, &layout);
        for p in result.posteriors {
            assert!((0.0..=1.0).contains(&p));
        }
        assert_eq!(result.chain, vec![0, 1]);
    }
}
