//! Shared pipeline glue between `lastdb`, `lastal`, and `last-split`:
//! alphabet-dependent default resolution, seed construction, and input
//! reading, factored out of the three `src/bin` binaries.

use crate::args::{InputFormat, ScoringDefaults, ScoringOverrides};
use eyre::{eyre, Result};
use last_core::alphabet::Alphabet;
use last_core::error::LastError;
use last_core::io::{fasta, fastq, prb, pssm};
use last_core::multi_sequence::MultiSequence;
use last_core::seed::{CyclicSubsetSeed, YASS_SEED};
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// The alphabet- and quality-dependent scoring defaults (spec.md §3).
pub fn default_scoring(is_protein: bool, has_quality: bool) -> ScoringDefaults {
    if is_protein {
        ScoringDefaults { match_score: 0, mismatch_cost: 0, gap_exist: 11, gap_extend: 2, min_score_gapped: 100 }
    } else if has_quality {
        ScoringDefaults { match_score: 6, mismatch_cost: 18, gap_exist: 21, gap_extend: 9, min_score_gapped: 180 }
    } else {
        ScoringDefaults { match_score: 1, mismatch_cost: 1, gap_exist: 7, gap_extend: 1, min_score_gapped: 40 }
    }
}

/// Merge CLI overrides onto the alphabet-dependent defaults.
pub fn resolve_scoring(is_protein: bool, has_quality: bool, overrides: ScoringOverrides) -> ScoringDefaults {
    let mut resolved = default_scoring(is_protein, has_quality);
    resolved.merge_opt(overrides);
    resolved
}

/// `maxDropGapless = matchScore * 10` (spec.md §3 "derived X-drop defaults").
pub fn default_max_drop_gapless(scoring: &ScoringDefaults) -> i32 {
    scoring.match_score.max(1) * 10
}

/// `minScoreGapless = minScoreGapped * 3 / 5`.
pub fn default_min_score_gapless(scoring: &ScoringDefaults) -> i32 {
    scoring.min_score_gapped * 3 / 5
}

/// `maxDropGapped = max(maxDropGapless, gapExistCost + gapExtendCost * 20)`.
pub fn default_max_drop_gapped(scoring: &ScoringDefaults) -> i32 {
    default_max_drop_gapless(scoring).max(scoring.gap_exist + scoring.gap_extend * 20)
}

/// Build the seed pattern named by `-m`: `"exact"` (one subset per proper
/// letter), `"yass"` (the bundled YASS pattern, DNA only), or a compact code
/// string over [`CyclicSubsetSeed::from_code`]'s `1`/`0`/`T` alphabet.
pub fn build_seed(spec: &str, alphabet: &Alphabet, is_mask_lowercase: bool) -> Result<CyclicSubsetSeed> {
    let letters: String = (0..alphabet.size).map(|i| alphabet.decode[i] as char).collect();
    match spec {
        "exact" => CyclicSubsetSeed::from_code(&"1".repeat(letters.chars().count()), &letters, is_mask_lowercase, &alphabet.encode),
        "yass" => {
            if alphabet.is_protein {
                return Err(eyre!(LastError::Configuration("the yass seed pattern is DNA-only".to_string())));
            }
            CyclicSubsetSeed::from_text(YASS_SEED, is_mask_lowercase, &alphabet.encode)
        }
        code => CyclicSubsetSeed::from_code(code, &letters, is_mask_lowercase, &alphabet.encode),
    }
}

/// Rebuild the seeds recorded in a `.prj` manifest's `subsetseed=` lines:
/// each is already literal per-position letter-group text, so it round-trips
/// through [`CyclicSubsetSeed::from_text`] rather than [`build_seed`].
pub fn seeds_from_manifest(subset_seeds: &[String], alphabet: &Alphabet) -> Result<Vec<CyclicSubsetSeed>> {
    subset_seeds.iter().map(|text| CyclicSubsetSeed::from_text(text, false, &alphabet.encode)).collect()
}

/// Read one or more sequence files (or stdin, if `paths` is empty) of the
/// given format into a single [`MultiSequence`] store.
pub fn read_sequences(paths: &[PathBuf], format: InputFormat, alphabet: &Alphabet) -> Result<MultiSequence> {
    let mut store = MultiSequence::init_for_appending(1);
    let mut anonymous_counter = 0usize;
    for text in read_input_texts(paths)? {
        match format {
            InputFormat::Fasta => fasta::read_fasta(&text, alphabet, &mut store, &mut anonymous_counter)?,
            InputFormat::FastqSanger => fastq::read_fastq(&text, alphabet, fastq::QualityFormat::Sanger, &mut store)?,
            InputFormat::FastqSolexa => fastq::read_fastq(&text, alphabet, fastq::QualityFormat::Solexa, &mut store)?,
            InputFormat::Prb => read_prb_text(&text, alphabet, &mut store, &mut anonymous_counter)?,
            InputFormat::Pssm => {
                pssm::read_pssm(&text, alphabet, &mut store, &mut anonymous_counter)?;
            }
        }
    }
    Ok(store)
}

/// PRB has no header line in its original layout; multi-record PRB files
/// here are expected to carry a FASTA-style `>name` line before each
/// four-line A/C/G/T block, so a single input stream can still name each
/// read.
fn read_prb_text(text: &str, alphabet: &Alphabet, store: &mut MultiSequence, anonymous_counter: &mut usize) -> Result<()> {
    let mut lines = text.lines();
    loop {
        let Some(header) = lines.next() else { break };
        let name = header.trim_start_matches('>').trim();
        let a = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated PRB record: missing A line".to_string())))?;
        let c = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated PRB record: missing C line".to_string())))?;
        let g = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated PRB record: missing G line".to_string())))?;
        let t = lines.next().ok_or_else(|| eyre!(LastError::Input("truncated PRB record: missing T line".to_string())))?;
        prb::read_prb_record(name, a, c, g, t, alphabet, store, anonymous_counter)?;
    }
    Ok(())
}

fn read_input_texts(paths: &[PathBuf]) -> Result<Vec<String>> {
    if paths.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(|e| eyre!(LastError::Input(format!("can't read stdin: {e}"))))?;
        return Ok(vec![buf]);
    }
    paths
        .iter()
        .map(|p| fs::read_to_string(p).map_err(|e| eyre!(LastError::Input(format!("can't read {}: {e}", p.display())))))
        .collect()
}

/// Reverse-complement an encoded DNA buffer through `alphabet.complement`.
pub fn reverse_complement(encoded: &[u8], alphabet: &Alphabet) -> Vec<u8> {
    encoded.iter().rev().map(|&c| alphabet.complement[c as usize]).collect()
}

/// Narrowest `.suf` record width (spec.md §6) that can hold every position
/// up to `max_position` inclusive.
pub fn pos_parts_for(max_position: u64) -> usize {
    let bits_needed = 64 - max_position.leading_zeros().min(63);
    (bits_needed as usize).div_ceil(8).clamp(1, 8)
}

#[cfg(test)]
mod pos_parts_tests {
    use super::pos_parts_for;

    #[test]
    fn small_genomes_fit_in_one_byte() {
        assert_eq!(pos_parts_for(200), 1);
    }

    #[test]
    fn forty_bit_genomes_take_five_bytes() {
        assert_eq!(pos_parts_for(1_099_511_627_775), 5);
    }
}
