//! Codon translation tables (spec.md §4.A collaborator: "genetic-code
//! tables"), used by the three-frame translated alignment mode (§4.F).

use crate::alphabet::Alphabet;
use crate::error::LastError;
use eyre::{eyre, Result};
use std::collections::HashMap;

/// The standard genetic code (NCBI translation table 1), as
/// `codon -> amino acid` where codons are given in order
/// TTT TTC TTA TTG CTT ... (the conventional NCBI listing order).
const STANDARD_AAS: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
const BASES: &str = "TCAG";

#[derive(Debug, Clone)]
pub struct GeneticCode {
    /// Maps a 3-letter codon (as proper-alphabet codes 0..4) to an amino
    /// acid code in the protein alphabet, or `None` for a stop codon.
    table: HashMap<[u8; 3], u8>,
}

impl GeneticCode {
    /// Build the standard genetic code, translating codon nucleotide codes
    /// (as assigned by `dna_alphabet`) into amino acid codes (as assigned by
    /// `protein_alphabet`).
    pub fn standard(dna_alphabet: &Alphabet, protein_alphabet: &Alphabet) -> Self {
        let mut table = HashMap::new();
        let bases: Vec<u8> = BASES.bytes().collect();
        let mut i = 0;
        for &b1 in &bases {
            for &b2 in &bases {
                for &b3 in &bases {
                    let aa = STANDARD_AAS.as_bytes()[i];
                    let codon = [
                        dna_alphabet.encode[b1 as usize],
                        dna_alphabet.encode[b2 as usize],
                        dna_alphabet.encode[b3 as usize],
                    ];
                    if aa != b'*' {
                        table.insert(codon, protein_alphabet.encode[aa as usize]);
                    }
                    i += 1;
                }
            }
        }
        Self { table }
    }

    /// Parse a custom NCBI-style genetic code file: lines of
    /// `key = value`, with the relevant keys `AAs`, `Base1`, `Base2`, `Base3`
    /// (mirrors the line-oriented key=value style used elsewhere in this
    /// codec, e.g. `.prj`).
    pub fn from_ncbi_table(text: &str, dna_alphabet: &Alphabet, protein_alphabet: &Alphabet) -> Result<Self> {
        let mut aas = None;
        let mut base1 = None;
        let mut base2 = None;
        let mut base3 = None;
        for line in text.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("AAs") {
                aas = Some(rest.trim_start_matches([' ', '=']).trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Base1") {
                base1 = Some(rest.trim_start_matches([' ', '=']).trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Base2") {
                base2 = Some(rest.trim_start_matches([' ', '=']).trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Base3") {
                base3 = Some(rest.trim_start_matches([' ', '=']).trim().to_string());
            }
        }
        let (aas, base1, base2, base3) = match (aas, base1, base2, base3) {
            (Some(a), Some(b1), Some(b2), Some(b3)) => (a, b1, b2, b3),
            _ => {
                return Err(eyre!(LastError::Configuration(
                    "genetic code file missing AAs/Base1/Base2/Base3 lines".to_string()
                )))
            }
        };
        if aas.len() != base1.len() || aas.len() != base2.len() || aas.len() != base3.len() {
            return Err(eyre!(LastError::Configuration(
                "genetic code file: AAs/Base1/Base2/Base3 length mismatch".to_string()
            )));
        }
        let mut table = HashMap::new();
        for (((aa, b1), b2), b3) in aas.bytes().zip(base1.bytes()).zip(base2.bytes()).zip(base3.bytes()) {
            if aa == b'*' {
                continue;
            }
            let codon = [
                dna_alphabet.encode[b1 as usize],
                dna_alphabet.encode[b2 as usize],
                dna_alphabet.encode[b3 as usize],
            ];
            table.insert(codon, protein_alphabet.encode[aa as usize]);
        }
        Ok(Self { table })
    }

    /// Translate a codon of 3 proper-letter codes; `None` for a stop codon
    /// or a codon containing a delimiter/ambiguous base.
    pub fn translate(&self, codon: [u8; 3]) -> Option<u8> {
        self.table.get(&codon).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_code_translates_atg_to_methionine() {
        let dna = Alphabet::dna().unwrap();
        let protein = Alphabet::protein().unwrap();
        let code = GeneticCode::standard(&dna, &protein);
        let codon = [dna.encode[b'A' as usize], dna.encode[b'T' as usize], dna.encode[b'G' as usize]];
        let aa = code.translate(codon).unwrap();
        assert_eq!(protein.decode[aa as usize], b'M');
    }

    #[test]
    fn stop_codon_translates_to_none() {
        let dna = Alphabet::dna().unwrap();
        let protein = Alphabet::protein().unwrap();
        let code = GeneticCode::standard(&dna, &protein);
        let codon = [dna.encode[b'T' as usize], dna.encode[b'A' as usize], dna.encode[b'A' as usize]];
        assert!(code.translate(codon).is_none());
    }
}
