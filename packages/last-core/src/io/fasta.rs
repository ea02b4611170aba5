//! FASTA reading (spec.md §4.J), grounded in
//! `original_source/MultiSequence.hh`'s line-oriented `>`-record reader.

use crate::alphabet::Alphabet;
use crate::error::LastError;
use crate::multi_sequence::MultiSequence;
use eyre::{eyre, Result};

/// Append every record in `text` (FASTA format: `>name` header lines
/// followed by sequence lines) to `store`, encoding letters through
/// `alphabet`. `anonymous_counter` names headerless/empty-name records
/// `"NNN"` the way the original assigns sequential anonymous names --
/// threaded explicitly as `&mut usize` rather than any global counter
/// (spec.md §9 "no lazy_static/global mutable state").
pub fn read_fasta(text: &str, alphabet: &Alphabet, store: &mut MultiSequence, anonymous_counter: &mut usize) -> Result<()> {
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('>') {
            return Err(eyre!(LastError::Input(format!("expected '>' record header, got: {line}"))));
        }
        let header = line[1..].trim();
        let name = if header.is_empty() {
            *anonymous_counter += 1;
            format!("{anonymous_counter}")
        } else {
            header.split_whitespace().next().unwrap_or(header).to_string()
        };

        let mut bytes = Vec::new();
        while let Some(&next) = lines.peek() {
            if next.starts_with('>') {
                break;
            }
            let seq_line = lines.next().unwrap().trim_end_matches('\r');
            bytes.extend_from_slice(seq_line.as_bytes());
        }
        alphabet.tr(&mut bytes);
        store.append_sequence(name, &bytes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_records_with_wrapped_sequence_lines() {
        let alph = Alphabet::dna().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        let mut counter = 0;
        read_fasta(">seq1 desc\nACGT\nACGT\n>seq2\nTTTT\n", &alph, &mut store, &mut counter).unwrap();
        assert_eq!(store.finished_sequences(), 2);
        assert_eq!(store.name(0), "seq1");
        assert_eq!(store.seq_len(0), 8);
        assert_eq!(store.seq_len(1), 4);
    }

    #[test]
    fn headerless_records_get_sequential_anonymous_names() {
        let alph = Alphabet::dna().unwrap();
        let mut store = MultiSequence::init_for_appending(1);
        let mut counter = 0;
        read_fasta(">\nACGT\n>\nTTTT\n", &alph, &mut store, &mut counter).unwrap();
        assert_eq!(store.name(0), "1");
        assert_eq!(store.name(1), "2");
    }
}
