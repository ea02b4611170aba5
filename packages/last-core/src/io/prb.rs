//! PRB reading: the old Illumina per-base-per-letter quality format, four
//! lines per read (one line of space-separated integer scores for each of
//! A, C, G, T), each line's column `i` giving le the raw log-odds score that
//! read position `i` really is that letter. Grounded in the PSSM-row
//! representation `original_source/MultiSequence.hh` documents for
//! probability-weighted input, with PRB scores loaded directly as PSSM
//! rows.

use crate::alphabet::Alphabet;
use crate::error::LastError;
use crate::multi_sequence::MultiSequence;
use eyre::{eyre, Result};

/// Read one PRB record (four score lines) for a sequence named `name`.
/// `alphabet` must be a DNA alphabet; scores are placed at the A/C/G/T
/// codes' positions in each PSSM row, with every other code left at 0
/// (matching [`crate::multi_sequence::is_delimiter_row`]'s "all non-positive
/// means delimiter" rule only incidentally -- real bases always carry a
/// positive score for at least one letter).
pub fn read_prb_record(name: &str, a_line: &str, c_line: &str, g_line: &str, t_line: &str, alphabet: &Alphabet, store: &mut MultiSequence, anonymous_counter: &mut usize) -> Result<usize> {
    let a_scores = parse_score_line(a_line)?;
    let c_scores = parse_score_line(c_line)?;
    let g_scores = parse_score_line(g_line)?;
    let t_scores = parse_score_line(t_line)?;
    let n = a_scores.len();
    if c_scores.len() != n || g_scores.len() != n || t_scores.len() != n {
        return Err(eyre!(LastError::Input("PRB record: A/C/G/T lines have different lengths".to_string())));
    }

    let name = if name.is_empty() {
        *anonymous_counter += 1;
        format!("{anonymous_counter}")
    } else {
        name.to_string()
    };

    let codes = [
        alphabet.encode[b'A' as usize],
        alphabet.encode[b'C' as usize],
        alphabet.encode[b'G' as usize],
        alphabet.encode[b'T' as usize],
    ];
    let mut rows = Vec::with_capacity(n);
    let mut bases = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = [0.0f64; 64];
        row[(codes[0] & 63) as usize] = a_scores[i] as f64;
        row[(codes[1] & 63) as usize] = c_scores[i] as f64;
        row[(codes[2] & 63) as usize] = g_scores[i] as f64;
        row[(codes[3] & 63) as usize] = t_scores[i] as f64;
        rows.push(row);
        let best = [0usize, 1, 2, 3].into_iter().max_by_key(|&k| [a_scores[i], c_scores[i], g_scores[i], t_scores[i]][k]).unwrap();
        bases.push(codes[best]);
    }

    let idx = store.append_sequence(name, &bases);
    store.append_pssm_rows(&rows);
    Ok(idx)
}

fn parse_score_line(line: &str) -> Result<Vec<i32>> {
    line.split_whitespace()
        .map(|tok| tok.parse::<i32>().map_err(|_| eyre!(LastError::Input(format!("PRB record: not an integer score: {tok}")))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_short_prb_record_into_pssm_rows() {
        let alph = Alphabet::dna().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        let mut counter = 0;
        let idx = read_prb_record("read1", "40 -5", "-5 40", "-5 -5", "-5 -5", &alph, &mut store, &mut counter).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(store.seq_len(0), 2);
        assert!(store.pssm.is_some());
    }
}
