//! `lastal`: find and score local alignments between query sequences and a
//! `lastdb` index (spec.md §6 "External interfaces").
//!
//! Seed search, gapless/gapped extension, and gamma-centroid decoding run
//! over the whole query batch buffer at once (one seed-search pass per
//! strand), the way `lastal.cc` treats a `MultiSequence` batch as a single
//! concatenated text rather than looping sequence-by-sequence; sequence
//! boundaries are delimiter bytes that extension never crosses.
//!
//! Translated (DNA-vs-protein, 3-frame) alignment is implemented in
//! [`last_core::gapped_aligner::translate_extend`] and unit-tested there,
//! but this binary does not wire a 6-frame-translated seed search against a
//! protein index; aligning a nucleotide query against a protein database
//! logs a warning and falls back to ordinary (untranslated) search.

use clap::Parser;
use eyre::{eyre, Result};
use last_core::alignment::{Alignment, SegmentPair, Strand};
use last_core::alphabet::Alphabet;
use last_core::centroid::Centroid;
use last_core::error::LastError;
use last_core::gap_costs::GeneralizedAffineGapCosts;
use last_core::gapless_extend::{gapless_extend, is_optimal, ScoreSource};
use last_core::gapped_aligner::extend_gapped;
use last_core::io::ProjectFile;
use last_core::multi_sequence::MultiSequence;
use last_core::pot::{AlignmentPot, DiagonalTable, SegmentPairPot};
use last_core::score_matrix::{MaskLowercase, ScoreMatrix};
use last_core::seed::CyclicSubsetSeed;
use last_core::suffix_array::SubsetSuffixArray;
use lastal_cli::args::{LastalArgs, QueryStrand, ScoringOverrides};
use lastal_cli::{output, pipeline};
use std::fs;
use std::io::{self, BufWriter, Write};

fn main() {
    if let Err(err) = run() {
        eprintln!("lastal: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = LastalArgs::parse();
    env_logger::Builder::new().filter_level(args.verbose.log_level_filter()).format_timestamp(None).init();

    let pf = ProjectFile::new(&args.database);
    let manifest = pf.read_manifest()?;
    let is_protein = manifest.alphabet == "PROTEIN";
    if args.protein && !is_protein {
        return Err(eyre!(LastError::Configuration("-p given but the database index is nucleotide".to_string())));
    }
    if !args.protein && is_protein {
        log::warn!("database is protein; translated alignment mode is not wired in this build, searching untranslated");
    }
    let alphabet = if is_protein { Alphabet::protein()? } else { Alphabet::dna()? };

    log::info!("reading the index");
    let text1 = pf.read_sequence_data()?;
    let (names1, ends1) = pf.read_names()?;
    let seq1 = MultiSequence::from_parts(text1, names1, ends1);
    let seeds = pipeline::seeds_from_manifest(&manifest.subset_seeds, &alphabet)?;
    let sa = pf.read_suffix_array(manifest.pos_parts)?;

    log::info!("reading the query sequences");
    let query_fwd = pipeline::read_sequences(&args.query_files, args.input_format, &alphabet)?;
    let query_rev = MultiSequence::from_parts(
        pipeline::reverse_complement(&query_fwd.seq, &alphabet),
        query_fwd.names.clone(),
        query_fwd.ends.clone(),
    );

    let has_quality = matches!(args.input_format, lastal_cli::args::InputFormat::FastqSanger | lastal_cli::args::InputFormat::FastqSolexa);
    let overrides = ScoringOverrides {
        match_score: args.match_score,
        mismatch_cost: args.mismatch_cost,
        gap_exist: args.gap_exist,
        gap_extend: args.gap_extend,
        min_score_gapped: args.min_score_gapped,
    };
    let scoring = pipeline::resolve_scoring(is_protein, has_quality, overrides);

    let matrix = if is_protein {
        ScoreMatrix::blosum62(&alphabet)
    } else {
        ScoreMatrix::simple(alphabet.size, scoring.match_score, scoring.mismatch_cost)
    };
    let gap_costs = GeneralizedAffineGapCosts {
        del_exist: scoring.gap_exist,
        del_extend: scoring.gap_extend,
        ins_exist: scoring.gap_exist,
        ins_extend: scoring.gap_extend,
        pair_cost: args.gap_pair_cost.unwrap_or(last_core::gap_costs::INF),
    };
    let max_drop_gapless = args.max_drop_gapless.unwrap_or_else(|| pipeline::default_max_drop_gapless(&scoring));
    let min_score_gapless = args.min_score_gapless.unwrap_or_else(|| pipeline::default_min_score_gapless(&scoring));
    let max_drop_gapped = args.max_drop_gapped.unwrap_or_else(|| pipeline::default_max_drop_gapped(&scoring));
    let min_score_gapped = scoring.min_score_gapped;

    let mask = MaskLowercase::from(args.mask_lowercase);
    let case_sensitive_gapless = mask.use_case_sensitive_at(0);
    let case_sensitive_gapped = mask.use_case_sensitive_at(1);
    let case_sensitive_final = mask.use_case_sensitive_at(2);

    let strands: Vec<Strand> = match args.query_strand {
        QueryStrand::ForwardOnly => vec![Strand::Forward],
        QueryStrand::ReverseOnly => vec![Strand::Reverse],
        QueryStrand::Both => vec![Strand::Forward, Strand::Reverse],
    };

    let mut out: Box<dyn Write> = match &args.output_file {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    for strand in strands {
        let query_seq = match strand {
            Strand::Forward => &query_fwd,
            Strand::Reverse => &query_rev,
        };
        log::info!("aligning {} strand", if strand == Strand::Forward { "forward" } else { "reverse" });

        #[allow(clippy::too_many_arguments)]
        let alignments = search_one_strand(
            &seq1.seq,
            &query_seq.seq,
            &seeds,
            &sa,
            &matrix,
            case_sensitive_gapless,
            case_sensitive_gapped,
            case_sensitive_final,
            &gap_costs,
            max_drop_gapless,
            min_score_gapless,
            max_drop_gapped,
            min_score_gapped,
            &args,
        );

        for aln in &alignments {
            output::write_alignment(&mut out, args.output_format, aln, &seq1, query_seq, strand, &alphabet)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Seed-search, gapless-extend, gapped-extend, and (at `-j 3`/`-j 4`)
/// gamma-centroid-decode one query buffer against the index, in that order
/// (spec.md §4.H "the alignment pipeline").
#[allow(clippy::too_many_arguments)]
fn search_one_strand(
    text1: &[u8],
    query: &[u8],
    seeds: &[CyclicSubsetSeed],
    sa: &SubsetSuffixArray,
    matrix: &ScoreMatrix,
    case_sensitive_gapless: bool,
    case_sensitive_gapped: bool,
    case_sensitive_final: bool,
    gap_costs: &GeneralizedAffineGapCosts,
    max_drop_gapless: i32,
    min_score_gapless: i32,
    max_drop_gapped: i32,
    min_score_gapped: i32,
    args: &LastalArgs,
) -> Vec<Alignment> {
    let gapless_scores = ScoreSource::Matrix { matrix, case_sensitive: case_sensitive_gapless };

    let mut hits = SegmentPairPot::default();
    let mut seed_coverage = DiagonalTable::new();
    for j in (0..query.len()).step_by(args.query_step.max(1)) {
        if query[j] == last_core::alphabet::DELIMITER {
            continue;
        }
        for seed_num in 0..seeds.len() {
            let max_depth = (query.len() - j).min(1000);
            let m = sa.query_match(&query[j..], text1, seeds, seed_num, args.one_hit_multiplicity, args.min_hit_depth, max_depth);
            if m.end - m.beg > args.one_hit_multiplicity {
                continue; // too repetitive to be worth extending every hit
            }
            for k in m.beg..m.end {
                let t_pos = sa.positions[k];
                if seed_coverage.is_covered(t_pos, j as u64) {
                    continue;
                }
                let sp = gapless_extend(text1, query, t_pos, j as u64, &gapless_scores, max_drop_gapless);
                if sp.score < min_score_gapless || !is_optimal(text1, query, &sp, &gapless_scores, max_drop_gapless) {
                    continue;
                }
                seed_coverage.record(&sp);
                hits.add(sp);
            }
        }
    }

    hits.sort();

    let mut extended_coverage = DiagonalTable::new();
    let mut alignments = AlignmentPot::default();
    for i in 0..hits.size() {
        let sp = *hits.get(i);
        if sp.score == 0 {
            continue;
        }
        if extended_coverage.is_covered(sp.beg1(), sp.beg2()) {
            continue;
        }
        let mut aln = extend_gapped(text1, query, sp, matrix, case_sensitive_gapped, gap_costs, max_drop_gapped, false);
        if aln.score < min_score_gapped {
            continue;
        }
        for block in &aln.blocks {
            extended_coverage.record(block);
        }

        if args.output_type >= 3 {
            decode_with_centroid(&mut aln, text1, query, matrix, case_sensitive_final, gap_costs, args);
        }

        alignments.add(aln);
    }

    alignments.sort();
    alignments.items
}

/// Refine `aln`'s blocks (and, at `-j 4`, its per-column match
/// probabilities) with Forward-Backward gamma-centroid decoding over the
/// alignment's own extent (spec.md §4.G).
fn decode_with_centroid(
    aln: &mut Alignment,
    text1: &[u8],
    query: &[u8],
    matrix: &ScoreMatrix,
    case_sensitive: bool,
    gap_costs: &GeneralizedAffineGapCosts,
    args: &LastalArgs,
) {
    let len1 = (aln.end1() - aln.beg1()) as usize;
    let len2 = (aln.end2() - aln.beg2()) as usize;
    if len1 == 0 || len2 == 0 {
        return;
    }
    let temperature = args.temperature.unwrap_or(f64::from(gap_costs.del_exist.max(1)));
    let exp_gap = gap_costs.exp_params(temperature);
    let t_start = aln.beg1() as usize;
    let q_start = aln.beg2() as usize;

    let mut centroid = Centroid::new(text1, query, t_start, q_start, len1, len2, matrix, case_sensitive, exp_gap, temperature);
    centroid.forward();
    centroid.backward();
    let decoded = centroid.decode_gamma_centroid(args.gamma);

    aln.blocks = decoded
        .blocks
        .iter()
        .map(|b| SegmentPair::new(b.start1 + t_start as u64, b.start2 + q_start as u64, b.size, 0))
        .collect();
    if args.output_type >= 4 {
        aln.match_probabilities = Some(decoded.match_probabilities);
    }
}
