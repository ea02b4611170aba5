//! `last-split`: resolve each query's candidate alignments into a single
//! best split/spliced chain (spec.md §6 "External interfaces", §4.I).
//!
//! Reads MAF candidates (one block per candidate alignment), groups them by
//! query name, chains each query's candidates with
//! [`last_core::split::SplitAligner`], and re-emits the winning chain's MAF
//! blocks with an added `mismap=` annotation.
//!
//! # Simplification from the original
//!
//! `last-split.cc` trims each chained candidate's query span to remove any
//! overlap with its neighbors before re-emitting it. This build re-emits
//! the original candidate blocks unmodified; a neighbor-trimming pass is
//! left as a documented gap in `DESIGN.md`.

use clap::Parser;
use eyre::{eyre, Result};
use last_core::alignment::{Alignment, SegmentPair};
use last_core::alphabet::Alphabet;
use last_core::error::LastError;
use last_core::split::layout::{Candidate, Strand as SplitStrand};
use last_core::split::{split_one_strand, split_with_strand_disambiguation, Layout, SplitAligner, SplitAlignerParams};
use last_core::split::{IntronLengthModel, SpliceSignals};
use lastal_cli::args::LastSplitArgs;
use lastal_cli::pipeline;
use std::collections::HashMap;
use std::io::{self, BufWriter, Read, Write};

fn main() {
    if let Err(err) = run() {
        eprintln!("last-split: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = LastSplitArgs::parse();
    env_logger::Builder::new().filter_level(args.verbose.log_level_filter()).format_timestamp(None).init();

    let text = match &args.maf_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let blocks = parse_maf_blocks(&text)?;
    log::info!("read {} candidate blocks", blocks.len());

    let genome = match &args.genome {
        Some(path) => {
            let alphabet = Alphabet::dna()?;
            Some(pipeline::read_sequences(std::slice::from_ref(path), lastal_cli::args::InputFormat::Fasta, &alphabet)?)
        }
        None => None,
    };

    let mut by_query: HashMap<String, Vec<MafBlock>> = HashMap::new();
    for block in blocks {
        if block.score < args.score {
            continue;
        }
        by_query.entry(block.query_name.clone()).or_default().push(block);
    }

    let mut query_names: Vec<&String> = by_query.keys().collect();
    query_names.sort();

    let mut out: Box<dyn Write> = Box::new(BufWriter::new(io::stdout()));
    let mut chromosome_ids: HashMap<String, usize> = HashMap::new();

    for query_name in query_names {
        let blocks = &by_query[query_name];
        let (fwd_blocks, rev_blocks): (Vec<&MafBlock>, Vec<&MafBlock>) =
            blocks.iter().partition(|b| b.query_strand == SplitStrand::Forward);

        let fwd_candidates: Vec<Candidate> = fwd_blocks.iter().map(|b| b.to_candidate(&mut chromosome_ids)).collect();
        let rev_candidates: Vec<Candidate> = rev_blocks.iter().map(|b| b.to_candidate(&mut chromosome_ids)).collect();
        let layout_fwd = Layout::new(fwd_candidates);
        let layout_rev = Layout::new(rev_candidates);

        let splice_prior = if args.genome.is_some() { args.splice_prior } else { 0.0 };
        let params = SplitAlignerParams {
            gap_existence_score: args.gap_existence_score,
            gap_extension_score: 1,
            jump_score: -10_000,
            restart_score: -args.gap_existence_score,
            scale: args.scale,
            max_query_overlap: args.max_query_overlap,
        };

        let genome_fwd = genome_slice_for(&genome, &fwd_blocks);
        let genome_rev = genome_slice_for(&genome, &rev_blocks);
        let aligner_fwd = SplitAligner {
            params,
            splice: SpliceSignals::new(args.scale),
            intron_model: IntronLengthModel::new(splice_prior, args.mean_log_dist, args.sdev_log_dist),
            genome: genome_fwd.as_deref(),
        };
        let aligner_rev = SplitAligner {
            params,
            splice: SpliceSignals::new(args.scale),
            intron_model: IntronLengthModel::new(splice_prior, args.mean_log_dist, args.sdev_log_dist),
            genome: genome_rev.as_deref(),
        };

        let (strand, result) = if args.disambiguate_strand && !layout_fwd.candidates.is_empty() && !layout_rev.candidates.is_empty() {
            split_with_strand_disambiguation(&aligner_fwd, &layout_fwd, &aligner_rev, &layout_rev)
        } else if !layout_rev.candidates.is_empty() && layout_fwd.candidates.is_empty() {
            (SplitStrand::Reverse, split_one_strand(&aligner_rev, &layout_rev))
        } else {
            (SplitStrand::Forward, split_one_strand(&aligner_fwd, &layout_fwd))
        };

        let chosen_blocks = match strand {
            SplitStrand::Forward => &fwd_blocks,
            SplitStrand::Reverse => &rev_blocks,
        };

        for &i in &result.chain {
            let mismap = 1.0 - result.posteriors[i];
            if mismap > args.mismap {
                continue;
            }
            write_annotated_block(&mut out, chosen_blocks[i], result.score, mismap)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Slice out the sequence belonging to whichever chromosome most of
/// `blocks` align to, for splice-signal lookup (spec.md §4.I); `None` when
/// no genome FASTA was given, or the name isn't found in it.
fn genome_slice_for(genome: &Option<last_core::multi_sequence::MultiSequence>, blocks: &[&MafBlock]) -> Option<Vec<u8>> {
    let genome = genome.as_ref()?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for b in blocks {
        *counts.entry(b.ref_name.as_str()).or_insert(0) += 1;
    }
    let majority_name = counts.into_iter().max_by_key(|&(_, n)| n).map(|(n, _)| n)?;
    let index = genome.names.iter().position(|n| n == majority_name)?;
    Some(genome.seq[genome.seq_start(index)..genome.seq_end(index)].to_vec())
}

fn write_annotated_block(out: &mut impl Write, block: &MafBlock, chain_score: i32, mismap: f64) -> Result<()> {
    writeln!(out, "a score={chain_score} mismap={mismap:.3}")?;
    writeln!(
        out,
        "s {} {} {} {} {} {}",
        block.ref_name, block.ref_start, block.ref_size, '+', block.ref_src_size, block.ref_text
    )?;
    writeln!(
        out,
        "s {} {} {} {} {} {}",
        block.query_name,
        block.query_start,
        block.query_size,
        if block.query_strand == SplitStrand::Forward { '+' } else { '-' },
        block.query_src_size,
        block.query_text,
    )?;
    writeln!(out)?;
    Ok(())
}

/// One parsed `a`/`s`/`s` MAF block: a single candidate alignment of a
/// query against one reference sequence (spec.md §6 "MAF").
struct MafBlock {
    score: i32,
    ref_name: String,
    ref_start: u64,
    ref_size: u64,
    ref_src_size: u64,
    ref_text: String,
    query_name: String,
    query_start: u64,
    query_size: u64,
    query_src_size: u64,
    query_strand: SplitStrand,
    query_text: String,
}

impl MafBlock {
    /// Build the [`Candidate`] the split aligner chains over: an
    /// [`Alignment`] whose blocks are the ungapped runs of this MAF pair,
    /// scored by the MAF block's own score.
    fn to_candidate(&self, chromosome_ids: &mut HashMap<String, usize>) -> Candidate {
        let next_id = chromosome_ids.len();
        let chromosome = *chromosome_ids.entry(self.ref_name.clone()).or_insert(next_id);
        let blocks = blocks_from_alignment_strings(&self.ref_text, &self.query_text, self.ref_start, self.query_start, self.score);
        let alignment = Alignment { blocks, score: self.score, seed: SegmentPair::default(), match_probabilities: None };
        Candidate::new(alignment, chromosome, self.query_strand)
    }
}

/// Walk two equal-length gapped-alignment strings and emit one
/// [`SegmentPair`] per maximal ungapped run (spec.md §3).
fn blocks_from_alignment_strings(top: &str, bot: &str, ref_start: u64, query_start: u64, score: i32) -> Vec<SegmentPair> {
    let mut blocks = Vec::new();
    let (mut t, mut q) = (ref_start, query_start);
    let (mut run_start_t, mut run_start_q, mut run_len) = (ref_start, query_start, 0u64);

    for (tc, qc) in top.bytes().zip(bot.bytes()) {
        let gap = tc == b'-' || qc == b'-';
        if gap {
            if run_len > 0 {
                blocks.push(SegmentPair::new(run_start_t, run_start_q, run_len, 0));
                run_len = 0;
            }
        } else {
            if run_len == 0 {
                run_start_t = t;
                run_start_q = q;
            }
            run_len += 1;
        }
        if tc != b'-' {
            t += 1;
        }
        if qc != b'-' {
            q += 1;
        }
    }
    if run_len > 0 {
        blocks.push(SegmentPair::new(run_start_t, run_start_q, run_len, 0));
    }
    if blocks.is_empty() {
        blocks.push(SegmentPair::new(ref_start, query_start, 0, score));
    } else if let Some(first) = blocks.first_mut() {
        first.score = score;
    }
    blocks
}

/// Parse every `a ... / s ... / s ...` block in a MAF file. Blocks with a
/// third `s` line (e.g. a multi-genome alignment) use only the first two.
fn parse_maf_blocks(text: &str) -> Result<Vec<MafBlock>> {
    let mut blocks = Vec::new();
    let mut score = 0;
    let mut rows: Vec<Vec<String>> = Vec::new();

    let flush = |score: i32, rows: &[Vec<String>], blocks: &mut Vec<MafBlock>| -> Result<()> {
        if rows.len() < 2 {
            return Ok(());
        }
        let r = &rows[0];
        let q = &rows[1];
        blocks.push(MafBlock {
            score,
            ref_name: r[1].clone(),
            ref_start: r[2].parse()?,
            ref_size: r[3].parse()?,
            ref_src_size: r[5].parse()?,
            ref_text: r[6].clone(),
            query_name: q[1].clone(),
            query_start: q[2].parse()?,
            query_size: q[3].parse()?,
            query_strand: if q[4] == "+" { SplitStrand::Forward } else { SplitStrand::Reverse },
            query_src_size: q[5].parse()?,
            query_text: q[6].clone(),
        });
        Ok(())
    };

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            flush(score, &rows, &mut blocks)?;
            rows.clear();
            score = 0;
            continue;
        }
        if let Some(rest) = line.strip_prefix('a') {
            for field in rest.split_whitespace() {
                if let Some(v) = field.strip_prefix("score=") {
                    score = v.parse().unwrap_or(0);
                }
            }
        } else if line.starts_with('s') {
            let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if fields.len() < 7 {
                return Err(eyre!(LastError::Input(format!("malformed MAF 's' line: {line}"))));
            }
            rows.push(fields);
        }
        // 'q', 'p', 'i', and comment lines are ignored here.
    }
    flush(score, &rows, &mut blocks)?;

    Ok(blocks)
}
