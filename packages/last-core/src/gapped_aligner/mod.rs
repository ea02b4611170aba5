//! The generalized-affine X-drop gapped aligner (spec.md §4.F), grounded in
//! `original_source/GappedXdropAligner.cc`/`GappedXdropAligner2qual.cc`/
//! `GappedXdropAlignerPssm.cc` (one core recurrence, several cell-scoring
//! strategies) and `XdropAligner.hh`.

mod translated;
mod xdrop;

pub use translated::{translate_extend, TranslatedOptions};
pub use xdrop::{CellScorer, ScoreLane, Scalar};

use crate::alignment::{Alignment, SegmentPair};
use crate::gap_costs::GeneralizedAffineGapCosts;
use crate::score_matrix::ScoreMatrix;

/// Scores cells from a plain substitution matrix.
pub struct MatrixScorer<'a> {
    pub text: &'a [u8],
    pub query: &'a [u8],
    pub matrix: &'a ScoreMatrix,
    pub case_sensitive: bool,
    /// Direction: `1` extends forward from the seed, `-1` extends backward.
    pub dir: i64,
    pub t_anchor: i64,
    pub q_anchor: i64,
}

impl CellScorer for MatrixScorer<'_> {
    fn score(&self, i: i64, j: i64) -> Option<i32> {
        let t_pos = self.t_anchor + self.dir * i;
        let q_pos = self.q_anchor + self.dir * j;
        if t_pos < 0 || q_pos < 0 {
            return None;
        }
        let t_byte = *self.text.get(t_pos as usize)?;
        let q_byte = *self.query.get(q_pos as usize)?;
        if t_byte == crate::alphabet::DELIMITER || q_byte == crate::alphabet::DELIMITER {
            return None;
        }
        Some(self.matrix.score(t_byte, q_byte, self.case_sensitive))
    }
}

/// Scores cells from a query PSSM (one row per query position), per
/// [`crate::multi_sequence::is_delimiter_row`]'s delimiter convention.
pub struct PssmScorer<'a> {
    pub text: &'a [u8],
    pub pssm: &'a [[f64; 64]],
    pub dir: i64,
    pub t_anchor: i64,
    pub q_anchor: i64,
}

impl CellScorer for PssmScorer<'_> {
    fn score(&self, i: i64, j: i64) -> Option<i32> {
        let t_pos = self.t_anchor + self.dir * i;
        let q_pos = self.q_anchor + self.dir * j;
        if t_pos < 0 || q_pos < 0 {
            return None;
        }
        let t_byte = *self.text.get(t_pos as usize)?;
        if t_byte == crate::alphabet::DELIMITER {
            return None;
        }
        let row = self.pssm.get(q_pos as usize)?;
        if crate::multi_sequence::is_delimiter_row(t_byte, row) {
            return None;
        }
        Some(row[(t_byte & 63) as usize] as i32)
    }
}

/// Extend a seed in both directions under the generalized-affine X-drop
/// recurrence, combining the two half-alignments with the seed itself into
/// one [`Alignment`]. `globality` selects the edge-score termination rule
/// from spec.md §4.F.
#[allow(clippy::too_many_arguments)]
pub fn extend_gapped(
    text: &[u8],
    query: &[u8],
    seed: SegmentPair,
    matrix: &ScoreMatrix,
    case_sensitive: bool,
    gap_costs: &GeneralizedAffineGapCosts,
    max_drop: i32,
    globality: bool,
) -> Alignment {
    let fwd_scorer = MatrixScorer {
        text,
        query,
        matrix,
        case_sensitive,
        dir: 1,
        t_anchor: seed.end1() as i64,
        q_anchor: seed.end2() as i64,
    };
    let max_i_fwd = text.len() as i64 - seed.end1() as i64;
    let max_j_fwd = query.len() as i64 - seed.end2() as i64;
    let fwd = xdrop::extend_forward(&fwd_scorer, gap_costs, max_drop, max_i_fwd.max(0), max_j_fwd.max(0), globality);

    let rev_scorer = MatrixScorer {
        text,
        query,
        matrix,
        case_sensitive,
        dir: -1,
        t_anchor: seed.start1 as i64 - 1,
        q_anchor: seed.start2 as i64 - 1,
    };
    let max_i_rev = seed.start1 as i64;
    let max_j_rev = seed.start2 as i64;
    let rev = xdrop::extend_forward(&rev_scorer, gap_costs, max_drop, max_i_rev.max(0), max_j_rev.max(0), globality);

    combine(text, query, seed, fwd, rev)
}

fn combine(_text: &[u8], _query: &[u8], seed: SegmentPair, fwd: xdrop::XdropResult, rev: xdrop::XdropResult) -> Alignment {
    let mut blocks = Vec::with_capacity(rev.blocks.len() + 1 + fwd.blocks.len());

    // Reverse-extension blocks were produced walking backward from the seed;
    // flip their offsets back into forward coordinates relative to the seed start.
    for b in rev.blocks.iter().rev() {
        let start1 = seed.start1 - b.start1 - b.size;
        let start2 = seed.start2 - b.start2 - b.size;
        blocks.push(SegmentPair::new(start1, start2, b.size, b.score));
    }
    if seed.size > 0 {
        blocks.push(seed);
    }
    for b in &fwd.blocks {
        let start1 = seed.end1() + b.start1;
        let start2 = seed.end2() + b.start2;
        blocks.push(SegmentPair::new(start1, start2, b.size, b.score));
    }

    // Merge adjacent blocks that are contiguous on the diagonal (the seed
    // and the first column of each extension typically are).
    let merged = merge_adjacent(blocks);

    let score = fwd.score + rev.score + seed.score;
    Alignment { blocks: merged, score, seed, match_probabilities: None }
}

fn merge_adjacent(blocks: Vec<SegmentPair>) -> Vec<SegmentPair> {
    let mut out: Vec<SegmentPair> = Vec::with_capacity(blocks.len());
    for b in blocks {
        if b.size == 0 {
            continue;
        }
        if let Some(last) = out.last_mut() {
            if last.end1() == b.start1 && last.end2() == b.start2 {
                *last = SegmentPair::new(last.start1, last.start2, last.size + b.size, last.score + b.score);
                continue;
            }
        }
        out.push(b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::gap_costs::GeneralizedAffineGapCosts;

    fn encode(alph: &Alphabet, s: &[u8]) -> Vec<u8> {
        let mut v = s.to_vec();
        alph.tr(&mut v);
        v
    }

    #[test]
    fn extends_a_perfect_match_seed_to_cover_the_whole_sequence() {
        let alph = Alphabet::dna().unwrap();
        let matrix = ScoreMatrix::simple(alph.size, 1, 1);
        let gap_costs = GeneralizedAffineGapCosts::affine(7, 1);
        let text = encode(&alph, b"ACGTACGT");
        let query = encode(&alph, b"ACGTACGT");
        let seed = SegmentPair::new(3, 3, 1, 1);
        let aln = extend_gapped(&text, &query, seed, &matrix, false, &gap_costs, 20, false);
        assert_eq!(aln.beg1(), 0);
        assert_eq!(aln.end1(), 8);
        assert!(aln.blocks_are_monotonic());
        assert!(aln.blocks_are_in_bounds(text.len(), query.len()));
    }

    #[test]
    fn extension_spans_a_single_base_insertion_in_the_query() {
        let alph = Alphabet::dna().unwrap();
        let matrix = ScoreMatrix::simple(alph.size, 1, 1);
        let gap_costs = GeneralizedAffineGapCosts::affine(7, 1);
        let text = encode(&alph, b"ACGTACGT");
        let query = encode(&alph, b"ACGTTACGT"); // one extra T inserted after position 4
        let seed = SegmentPair::new(0, 0, 4, 4);
        let aln = extend_gapped(&text, &query, seed, &matrix, false, &gap_costs, 20, false);
        assert!(aln.blocks_are_monotonic());
        assert!(aln.blocks_are_in_bounds(text.len(), query.len()));
    }
}
