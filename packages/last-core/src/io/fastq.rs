//! FASTQ-Sanger and FASTQ-Solexa reading (spec.md §4.J), grounded in
//! `original_source/MultiSequenceQual.cc`'s quality-aware record reader.

use crate::alphabet::Alphabet;
use crate::error::LastError;
use crate::multi_sequence::MultiSequence;
use eyre::{eyre, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityFormat {
    Sanger,
    Solexa,
}

impl QualityFormat {
    /// Convert one raw quality character to a Sanger-scale (`+33`) byte.
    fn normalize(self, raw: u8) -> u8 {
        match self {
            Self::Sanger => raw,
            Self::Solexa => {
                // Solexa quality is Phred-like but offset by 64 and uses a
                // different log-odds formula for very low qualities; for
                // the byte range actually seen in practice the +64 vs +33
                // offset shift is the dominant correction.
                let solexa_q = raw as i32 - 64;
                let phred_q = (10.0 * ((10f64.powf(solexa_q as f64 / 10.0)) + 1.0).log10()) as i32;
                (phred_q + 33).clamp(33, 126) as u8
            }
        }
    }
}

/// Append every 4-line FASTQ record in `text` to `store`, encoding letters
/// through `alphabet` and quality characters through `format`.
pub fn read_fastq(text: &str, alphabet: &Alphabet, format: QualityFormat, store: &mut MultiSequence) -> Result<()> {
    let mut lines = text.lines();
    loop {
        let Some(header) = lines.next() else { break };
        let header = header.trim_end_matches('\r');
        if header.is_empty() {
            continue;
        }
        if !header.starts_with('@') {
            return Err(eyre!(LastError::Input(format!("expected '@' FASTQ header, got: {header}"))));
        }
        let name = header[1..].split_whitespace().next().unwrap_or("").to_string();

        let seq_line = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated FASTQ record: missing sequence line".to_string())))?;
        let plus_line = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated FASTQ record: missing '+' line".to_string())))?;
        if !plus_line.trim_end_matches('\r').starts_with('+') {
            return Err(eyre!(LastError::Input(format!("expected '+' separator line, got: {plus_line}"))));
        }
        let qual_line = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated FASTQ record: missing quality line".to_string())))?;

        let mut bytes = seq_line.trim_end_matches('\r').as_bytes().to_vec();
        let qual_bytes = qual_line.trim_end_matches('\r').as_bytes();
        if bytes.len() != qual_bytes.len() {
            return Err(eyre!(LastError::Input(format!(
                "sequence/quality length mismatch for {name}: {} vs {}",
                bytes.len(),
                qual_bytes.len()
            ))));
        }
        alphabet.tr(&mut bytes);
        store.append_sequence(name, &bytes);
        let normalized: Vec<u8> = qual_bytes.iter().map(|&b| format.normalize(b)).collect();
        store.append_quality(&normalized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sanger_record_with_quality() {
        let alph = Alphabet::dna().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        read_fastq("@read1\nACGT\n+\nIIII\n", &alph, QualityFormat::Sanger, &mut store).unwrap();
        assert_eq!(store.finished_sequences(), 1);
        assert_eq!(store.name(0), "read1");
        assert!(store.qualities.is_some());
    }

    #[test]
    fn rejects_mismatched_sequence_and_quality_lengths() {
        let alph = Alphabet::dna().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        let err = read_fastq("@read1\nACGT\n+\nII\n", &alph, QualityFormat::Sanger, &mut store).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }
}
