//! PSI-BLAST ASCII PSSM reading (spec.md §4.J / §6 "PSSM (PSI-BLAST
//! ASCII)"), grounded in the PSSM-row representation
//! `original_source/MultiSequence.hh` documents for probability-weighted
//! query input (the same representation [`crate::io::prb`] builds from the
//! older PRB format).
//!
//! A PSSM file has a header line naming the 20 amino-acid columns, then one
//! line per query position: a 1-based position number, the consensus
//! residue letter, and 20 integer log-odds scores in the header's column
//! order. Trailing weighted-percentage columns (if present) are ignored, as
//! is any blank line.

use crate::alphabet::Alphabet;
use crate::error::LastError;
use crate::multi_sequence::MultiSequence;
use eyre::{eyre, Result};

/// Append one PSSM record (typically the whole file, since PSI-BLAST emits
/// one PSSM per query) to `store`, encoding score rows through
/// `protein_alphabet`'s codes. `anonymous_counter` names the record the way
/// [`crate::io::fasta::read_fasta`] names headerless records.
pub fn read_pssm(text: &str, protein_alphabet: &Alphabet, store: &mut MultiSequence, anonymous_counter: &mut usize) -> Result<usize> {
    let mut lines = text.lines().map(str::trim_end);
    let header = lines
        .by_ref()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| eyre!(LastError::Input("PSSM file has no header line".to_string())))?;
    let columns: Vec<u8> = header
        .split_whitespace()
        .map(|tok| {
            tok.bytes().next().ok_or_else(|| eyre!(LastError::Input("PSSM header: empty column name".to_string())))
        })
        .collect::<Result<_>>()?;
    if columns.is_empty() {
        return Err(eyre!(LastError::Input("PSSM header names no amino acid columns".to_string())));
    }
    let column_codes: Vec<u8> = columns
        .iter()
        .map(|&b| {
            let code = protein_alphabet.encode[b as usize];
            if code == crate::alphabet::DELIMITER {
                return Err(eyre!(LastError::Input(format!("PSSM header: unknown amino acid {}", b as char))));
            }
            Ok(code & 63)
        })
        .collect::<Result<_>>()?;

    let mut rows = Vec::new();
    let mut consensus = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let _position = fields.next();
        let residue = fields
            .next()
            .ok_or_else(|| eyre!(LastError::Input(format!("PSSM: malformed row: {line}"))))?;
        let residue_byte = residue.bytes().next().unwrap_or(b'X');

        let mut row = [0.0f64; 64];
        for &code in &column_codes {
            let score: i32 = fields
                .next()
                .ok_or_else(|| eyre!(LastError::Input(format!("PSSM: row has fewer scores than header columns: {line}"))))?
                .parse()
                .map_err(|_| eyre!(LastError::Input(format!("PSSM: non-integer score in row: {line}"))))?;
            row[code as usize] = score as f64;
        }
        rows.push(row);

        let consensus_code = protein_alphabet.encode[residue_byte as usize];
        consensus.push(if consensus_code == crate::alphabet::DELIMITER { column_codes[0] } else { consensus_code });
    }
    if rows.is_empty() {
        return Err(eyre!(LastError::Input("PSSM file has no data rows".to_string())));
    }

    *anonymous_counter += 1;
    let name = format!("{anonymous_counter}");
    let idx = store.append_sequence(name, &consensus);
    store.append_pssm_rows(&rows);
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_two_column_pssm_into_rows() {
        let alph = Alphabet::protein().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        let mut counter = 0;
        let text = "   A   C\n1 A  5  -3\n2 C -3   5\n";
        let idx = read_pssm(text, &alph, &mut store, &mut counter).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(store.seq_len(0), 2);
        assert!(store.pssm.is_some());
        let rows = store.pssm.as_ref().unwrap();
        let a_code = (alph.encode[b'A' as usize] & 63) as usize;
        assert_eq!(rows[store.seq_start(0)][a_code], 5.0);
    }

    #[test]
    fn rejects_unknown_header_amino_acid() {
        let alph = Alphabet::protein().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        let mut counter = 0;
        let text = "   Z\n1 A 5\n";
        assert!(read_pssm(text, &alph, &mut store, &mut counter).is_err());
    }
}
