//! Byte <-> code maps, case folding, and complementation (spec.md §4.A).
//!
//! An [`Alphabet`] is built once per run and never mutated afterward. Codes
//! `0..size` are the "proper" letters (4 for DNA, 20 for protein); codes
//! `size..` are "improper" letters (ambiguity codes) plus their lowercase
//! counterparts. [`DELIMITER`] is the code used to separate concatenated
//! sequences and is never assigned to a real letter.

use crate::error::LastError;
use eyre::{eyre, Result};

/// The code reserved for sequence delimiters and unrecognized bytes.
pub const DELIMITER: u8 = 255;

const DNA_LETTERS: &str = "ACGT";
const DNA_EXTRA: &str = "NRYSWKMBDHV";
const PROTEIN_LETTERS: &str = "ACDEFGHIKLMNPQRSTVWY";
const PROTEIN_EXTRA: &str = "BJXZ*U";

#[derive(Debug, Clone)]
pub struct Alphabet {
    pub encode: [u8; 256],
    pub decode: [u8; 256],
    pub to_upper: [u8; 256],
    pub to_lower: [u8; 256],
    pub complement: [u8; 256],
    /// Number of "proper" letters, i.e. the size of the canonical alphabet.
    pub size: usize,
    pub is_protein: bool,
}

impl Alphabet {
    pub fn dna() -> Result<Self> {
        Self::init(DNA_LETTERS, DNA_EXTRA, false, true)
    }

    pub fn dna_4bit() -> Result<Self> {
        Self::init(DNA_LETTERS, DNA_EXTRA, true, true)
    }

    pub fn protein() -> Result<Self> {
        Self::init(PROTEIN_LETTERS, PROTEIN_EXTRA, false, false)
    }

    /// Build an alphabet from the "proper" letters (assigned codes
    /// `0..size`) and the extra/ambiguous letters (assigned codes
    /// `size..k`), with lowercase duplicates following at `k..2k`.
    ///
    /// When `is_4bit`, extra letters `N`, `R`, `Y` are folded into the first
    /// 16 codes instead of getting their own slot (spec.md §4.A).
    pub fn init(main_letters: &str, extra_letters: &str, is_4bit: bool, is_dna: bool) -> Result<Self> {
        let mut encode = [DELIMITER; 256];
        let mut decode = [b' '; 256];
        let size = main_letters.len();

        for (i, b) in main_letters.bytes().enumerate() {
            if encode[b as usize] != DELIMITER {
                return Err(eyre!(LastError::Configuration(format!(
                    "repeated letter in alphabet: {}",
                    b as char
                ))));
            }
            encode[b as usize] = i as u8;
            encode[b.to_ascii_lowercase() as usize] = i as u8; // overwritten below if case matters
            decode[i] = b;
        }

        let mut next_code = size as u8;
        let mut extras: Vec<u8> = Vec::new();
        for b in extra_letters.bytes() {
            if encode[b as usize] != DELIMITER {
                continue;
            }
            if is_4bit && matches!(b, b'N' | b'R' | b'Y') {
                // Folded into the first 16 codes: collapse to the first proper code.
                encode[b as usize] = 0;
                continue;
            }
            encode[b as usize] = next_code;
            decode[next_code as usize] = b;
            extras.push(b);
            next_code += 1;
        }
        let k = next_code as usize;

        // Lowercase counterparts occupy codes k..2k, mirroring the uppercase
        // assignment above (index i <-> index i + k).
        let mut to_upper = [0u8; 256];
        let mut to_lower = [0u8; 256];
        for i in 0..256u32 {
            to_upper[i as usize] = i as u8;
            to_lower[i as usize] = i as u8;
        }

        for code in 0..k as u8 {
            let upper_byte = decode[code as usize];
            let lower_byte = upper_byte.to_ascii_lowercase();
            if lower_byte != upper_byte {
                let lower_code = code + k as u8;
                encode[lower_byte as usize] = lower_code;
                decode[lower_code as usize] = lower_byte;
                to_upper[lower_code as usize] = code;
                to_lower[code as usize] = lower_code;
            } else {
                // Letters with no case distinction (e.g. '*') keep a single code.
                to_upper[code as usize] = code;
                to_lower[code as usize] = code;
            }
        }

        for b in 0..256usize {
            if !(b as u8).is_ascii_alphabetic() && b != b'*' as usize {
                encode[b] = DELIMITER;
            }
        }
        encode[b' ' as usize] = DELIMITER;
        encode[b'\t' as usize] = DELIMITER;
        encode[b'\n' as usize] = DELIMITER;
        encode[b'\r' as usize] = DELIMITER;

        let mut complement = [DELIMITER; 256];
        if is_dna {
            complement = Self::make_complement(&encode, &decode, &to_upper, &to_lower, size, k);
        }

        Ok(Self {
            encode,
            decode,
            to_upper,
            to_lower,
            complement,
            size,
            is_protein: !is_dna,
        })
    }

    /// Pair A<->T, C<->G (and propagate through lowercase/ambiguity codes).
    fn make_complement(
        encode: &[u8; 256],
        decode: &[u8; 256],
        to_upper: &[u8; 256],
        to_lower: &[u8; 256],
        size: usize,
        k: usize,
    ) -> [u8; 256] {
        let pairs = [(b'A', b'T'), (b'C', b'G'), (b'T', b'A'), (b'G', b'C')];
        let mut complement = [DELIMITER; 256];
        for code in 0..(2 * k) as u8 {
            complement[code as usize] = code; // identity default for ambiguity codes
        }
        for &(from, to) in &pairs {
            let from_code = encode[from as usize];
            let to_code = encode[to as usize];
            if (from_code as usize) < size {
                complement[from_code as usize] = to_code;
                let lower_from = to_lower[from_code as usize];
                let lower_to = to_lower[to_code as usize];
                complement[lower_from as usize] = lower_to;
            }
        }
        let _ = decode;
        let _ = to_upper;
        complement
    }

    /// Rewrite a buffer of raw letters into codes, in place.
    pub fn tr(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self.encode[*b as usize];
        }
    }

    /// Decode a buffer of codes into raw letters, writing into `out`.
    pub fn rt_copy(&self, out: &mut [u8], buf: &[u8]) {
        for (o, &c) in out.iter_mut().zip(buf.iter()) {
            *o = self.decode[c as usize];
        }
    }

    pub fn is_delimiter(&self, code: u8) -> bool {
        code == DELIMITER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_roundtrips_through_codes() {
        let alph = Alphabet::dna().unwrap();
        let mut buf = b"ACGTacgt".to_vec();
        alph.tr(&mut buf);
        let mut out = vec![0u8; buf.len()];
        alph.rt_copy(&mut out, &buf);
        assert_eq!(&out, b"ACGTacgt");
    }

    #[test]
    fn unknown_byte_maps_to_delimiter() {
        let alph = Alphabet::dna().unwrap();
        assert_eq!(alph.encode[b' ' as usize], DELIMITER);
        assert_eq!(alph.encode[b'1' as usize], DELIMITER);
    }

    #[test]
    fn complement_pairs_at_and_cg() {
        let alph = Alphabet::dna().unwrap();
        let a = alph.encode[b'A' as usize];
        let t = alph.encode[b'T' as usize];
        let c = alph.encode[b'C' as usize];
        let g = alph.encode[b'G' as usize];
        assert_eq!(alph.complement[a as usize], t);
        assert_eq!(alph.complement[t as usize], a);
        assert_eq!(alph.complement[c as usize], g);
        assert_eq!(alph.complement[g as usize], c);
    }

    #[test]
    fn protein_alphabet_has_twenty_proper_letters() {
        let alph = Alphabet::protein().unwrap();
        assert_eq!(alph.size, 20);
    }
}
