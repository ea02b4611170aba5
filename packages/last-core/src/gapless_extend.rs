//! Gapless X-drop seed extension (spec.md §4.E), grounded in
//! `original_source/Alignment.hh`'s `extend`/`isOptimal` declarations and
//! `lastal.cc::alignGapless`.
//!
//! Gapless extension has no underlying `.cc` body in the retrieved source
//! (only the `Alignment.hh` interface and its caller survive), so the DP
//! itself -- additive cell scores, running-best tracking, X-drop cutoff --
//! is implemented directly from spec.md §4.E against that interface.

use crate::alignment::SegmentPair;
use crate::gap_costs::INF;
use crate::score_matrix::ScoreMatrix;

/// One step of a score lookup: either a plain substitution matrix cell, or
/// (when aligning against a PSSM query) a row lookup keyed by the query
/// position, per [`crate::multi_sequence::is_delimiter_row`]'s convention.
pub enum ScoreSource<'a> {
    Matrix { matrix: &'a ScoreMatrix, case_sensitive: bool },
    Pssm(&'a [[f64; 64]]),
}

impl ScoreSource<'_> {
    fn score(&self, t_code: u8, q_pos: usize, q_code: u8) -> i32 {
        match self {
            Self::Matrix { matrix, case_sensitive } => matrix.score(t_code, q_code, *case_sensitive),
            Self::Pssm(rows) => rows.get(q_pos).map_or(-(INF), |row| row[(t_code & 63) as usize] as i32),
        }
    }
}

const DELIMITER: u8 = crate::alphabet::DELIMITER;

/// Extend from `(t, q)` in one direction (`dir = 1` forward, `dir = -1`
/// backward), returning `(best_score, best_length)` where `best_length` is
/// the number of columns consumed to reach the running-best score.
fn extend_one_direction(text: &[u8], query: &[u8], t: i64, q: i64, dir: i64, scores: &ScoreSource, max_drop: i32) -> (i32, i64) {
    let mut score = 0i32;
    let mut best_score = 0i32;
    let mut best_len = 0i64;
    let mut len = 0i64;
    loop {
        let ti = t + dir * len;
        let qi = q + dir * len;
        if ti < 0 || qi < 0 {
            break;
        }
        let Some(&t_byte) = text.get(ti as usize) else { break };
        let Some(&q_byte) = query.get(qi as usize) else { break };
        if t_byte == DELIMITER || q_byte == DELIMITER {
            break;
        }
        let q_pos_for_pssm = qi as usize;
        score += scores.score(t_byte, q_pos_for_pssm, q_byte);
        len += 1;
        if score > best_score {
            best_score = score;
            best_len = len;
        } else if best_score - score > max_drop {
            break;
        }
    }
    (best_score, best_len)
}

/// Extend a zero-length seed anchored at `(t_seed, q_seed)` in both
/// directions, producing the maximal-score segment pair.
pub fn gapless_extend(text: &[u8], query: &[u8], t_seed: u64, q_seed: u64, scores: &ScoreSource, max_drop: i32) -> SegmentPair {
    let (fwd_score, fwd_len) = extend_one_direction(text, query, t_seed as i64, q_seed as i64, 1, scores, max_drop);
    let (rev_score, rev_len) = extend_one_direction(text, query, t_seed as i64 - 1, q_seed as i64 - 1, -1, scores, max_drop);

    let start1 = t_seed - rev_len as u64;
    let start2 = q_seed - rev_len as u64;
    let size = (rev_len + fwd_len) as u64;
    let score = fwd_score + rev_score;
    SegmentPair::new(start1, start2, size, score)
}

/// Rescore a segment, column by column, checking the three optimality
/// conditions from spec.md §4.E: no non-positive-score prefix, no
/// non-positive-score suffix, no internal drop exceeding `max_drop`.
pub fn is_optimal(text: &[u8], query: &[u8], sp: &SegmentPair, scores: &ScoreSource, max_drop: i32) -> bool {
    if sp.size == 0 {
        return true;
    }
    let mut score = 0i32;
    let mut best = 0i32;
    for k in 0..sp.size {
        let t_byte = text[(sp.start1 + k) as usize];
        let q_byte = query[(sp.start2 + k) as usize];
        score += scores.score(t_byte, (sp.start2 + k) as usize, q_byte);
        if k + 1 < sp.size && score <= 0 {
            return false; // a non-positive-score prefix
        }
        if score > best {
            best = score;
        } else if best - score > max_drop {
            return false; // an internal drop exceeding max_drop
        }
    }
    if score <= 0 {
        return false; // the alignment itself (as a suffix of itself) is non-positive
    }
    let mut suffix_score = 0i32;
    for k in (0..sp.size).rev() {
        let t_byte = text[(sp.start1 + k) as usize];
        let q_byte = query[(sp.start2 + k) as usize];
        suffix_score += scores.score(t_byte, (sp.start2 + k) as usize, q_byte);
        if k > 0 && suffix_score <= 0 {
            return false; // a non-positive-score suffix
        }
    }
    true
}

/// Shrink `sp` to its longest run of identical (score > 0, i.e. canonical
/// match) columns, used to re-seed the gapped pass so noisy flanks don't
/// bias the X-drop band.
pub fn max_identical_run(text: &[u8], query: &[u8], sp: &SegmentPair, scores: &ScoreSource) -> SegmentPair {
    let mut best_start = 0u64;
    let mut best_len = 0u64;
    let mut cur_start = 0u64;
    let mut cur_len = 0u64;
    for k in 0..sp.size {
        let t_byte = text[(sp.start1 + k) as usize];
        let q_byte = query[(sp.start2 + k) as usize];
        let is_match = scores.score(t_byte, (sp.start2 + k) as usize, q_byte) > 0;
        if is_match {
            if cur_len == 0 {
                cur_start = k;
            }
            cur_len += 1;
            if cur_len > best_len {
                best_len = cur_len;
                best_start = cur_start;
            }
        } else {
            cur_len = 0;
        }
    }
    SegmentPair::new(sp.start1 + best_start, sp.start2 + best_start, best_len, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn encode(alph: &Alphabet, s: &[u8]) -> Vec<u8> {
        let mut v = s.to_vec();
        alph.tr(&mut v);
        v
    }

    #[test]
    fn extends_through_perfect_match_and_stops_at_delimiter() {
        let alph = Alphabet::dna().unwrap();
        let matrix = ScoreMatrix::simple(alph.size, 1, 1);
        let text = encode(&alph, b"ACGTACGT");
        let query = encode(&alph, b"ACGTACGT");
        let scores = ScoreSource::Matrix { matrix: &matrix, case_sensitive: false };
        let sp = gapless_extend(&text, &query, 0, 0, &scores, 10);
        assert_eq!(sp.size, 8);
        assert_eq!(sp.score, 8);
    }

    #[test]
    fn xdrop_cuts_off_extension_after_large_score_drop() {
        let alph = Alphabet::dna().unwrap();
        let matrix = ScoreMatrix::simple(alph.size, 1, 10);
        // Several mismatches in a row after one match should breach max_drop.
        let text = encode(&alph, b"AGGGG");
        let query = encode(&alph, b"ATTTT");
        let scores = ScoreSource::Matrix { matrix: &matrix, case_sensitive: false };
        let sp = gapless_extend(&text, &query, 0, 0, &scores, 5);
        assert_eq!(sp.size, 1); // only the initial A-A match survives
    }

    #[test]
    fn optimality_rejects_alignment_with_non_positive_prefix() {
        let alph = Alphabet::dna().unwrap();
        let matrix = ScoreMatrix::simple(alph.size, 1, 1);
        let text = encode(&alph, b"GACGT");
        let query = encode(&alph, b"TACGT");
        let scores = ScoreSource::Matrix { matrix: &matrix, case_sensitive: false };
        let sp = SegmentPair::new(0, 0, 5, 3); // leading mismatch, then 4 matches
        assert!(!is_optimal(&text, &query, &sp, &scores, 100));
    }
}
