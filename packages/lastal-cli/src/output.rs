//! Tabular and MAF alignment output (spec.md §6 "External interfaces":
//! output formats), grounded in `original_source/AlignmentWrite.cc`'s
//! `writeTab`/`writeMaf`/`topString`/`botString`/`qualityString`.

use crate::args::OutputFormat;
use eyre::Result;
use last_core::alignment::{Alignment, Strand};
use last_core::alphabet::Alphabet;
use last_core::centroid::Centroid;
use last_core::multi_sequence::MultiSequence;
use std::io::Write;

pub fn write_alignment(
    out: &mut impl Write,
    format: OutputFormat,
    alignment: &Alignment,
    seq1: &MultiSequence,
    seq2: &MultiSequence,
    strand: Strand,
    alphabet: &Alphabet,
) -> Result<()> {
    match format {
        OutputFormat::Tab => write_tab(out, alignment, seq1, seq2, strand),
        OutputFormat::Maf => write_maf(out, alignment, seq1, seq2, strand, alphabet),
    }
}

/// Which finished sequence `pos` (in forward query coordinates) falls in,
/// and that sequence's start offset, oriented per `strand` exactly as
/// `AlignmentWrite.cc::writeTab` computes `seqStart2`: on the reverse
/// strand, `beg2()` is already a reverse-strand coordinate, so it is
/// converted back to forward coordinates (`size - pos`) before the lookup.
fn locate(seq: &MultiSequence, strand: Strand, pos: u64, size: u64) -> (usize, u64) {
    let forward_coordinate = match strand {
        Strand::Forward => pos,
        Strand::Reverse => size - pos,
    };
    let which = seq.which_sequence(forward_coordinate as usize);
    let seq_start = match strand {
        Strand::Forward => seq.seq_start(which) as u64,
        Strand::Reverse => size - seq.seq_end(which) as u64,
    };
    (which, seq_start)
}

pub fn write_tab(out: &mut impl Write, alignment: &Alignment, seq1: &MultiSequence, seq2: &MultiSequence, strand: Strand) -> Result<()> {
    let size2 = seq2.seq.len() as u64;
    let w1 = seq1.which_sequence(alignment.beg1() as usize);
    let seq_start1 = seq1.seq_start(w1) as u64;
    let (w2, seq_start2) = locate(seq2, strand, alignment.beg2(), size2);

    write!(out, "{}\t", alignment.score)?;
    write!(
        out,
        "{}\t{}\t{}\t+\t{}\t",
        seq1.name(w1),
        alignment.beg1() - seq_start1,
        alignment.end1() - alignment.beg1(),
        seq1.seq_len(w1),
    )?;
    write!(
        out,
        "{}\t{}\t{}\t{}\t{}\t",
        seq2.name(w2),
        alignment.beg2() - seq_start2,
        alignment.end2() - alignment.beg2(),
        strand.as_char(),
        seq2.seq_len(w2),
    )?;

    for (i, block) in alignment.blocks.iter().enumerate() {
        if i > 0 {
            let prev = &alignment.blocks[i - 1];
            write!(out, "{}:{},", block.beg1() - prev.end1(), block.beg2() - prev.end2())?;
        }
        if i + 1 < alignment.blocks.len() {
            write!(out, "{},", block.size)?;
        } else {
            writeln!(out, "{}", block.size)?;
        }
    }
    Ok(())
}

pub fn write_maf(
    out: &mut impl Write,
    alignment: &Alignment,
    seq1: &MultiSequence,
    seq2: &MultiSequence,
    strand: Strand,
    alphabet: &Alphabet,
) -> Result<()> {
    let size2 = seq2.seq.len() as u64;
    let w1 = seq1.which_sequence(alignment.beg1() as usize);
    let seq_start1 = seq1.seq_start(w1) as u64;
    let (w2, seq_start2) = locate(seq2, strand, alignment.beg2(), size2);

    let n1 = seq1.name(w1);
    let n2 = seq2.name(w2);
    let b1 = (alignment.beg1() - seq_start1).to_string();
    let b2 = (alignment.beg2() - seq_start2).to_string();
    let r1 = (alignment.end1() - alignment.beg1()).to_string();
    let r2 = (alignment.end2() - alignment.beg2()).to_string();
    let s1 = seq1.seq_len(w1).to_string();
    let s2 = seq2.seq_len(w2).to_string();

    let name_width = n1.len().max(n2.len());
    let beg_width = b1.len().max(b2.len());
    let range_width = r1.len().max(r2.len());
    let size_width = s1.len().max(s2.len());

    writeln!(out, "a score={}", alignment.score)?;

    let top = top_string(alignment, &seq1.seq, alphabet);
    writeln!(
        out,
        "s {n1:name_width$} {b1:>beg_width$} {r1:>range_width$} + {s1:>size_width$} {top}"
    )?;

    let bot = bot_string(alignment, &seq2.seq, alphabet);
    writeln!(
        out,
        "s {n2:name_width$} {b2:>beg_width$} {r2:>range_width$} {} {s2:>size_width$} {bot}",
        strand.as_char(),
    )?;

    if let Some(qualities) = &seq2.qualities {
        let q = quality_string(alignment, qualities, &seq2.seq);
        let pad = " ".repeat(beg_width + range_width + size_width + 3);
        writeln!(out, "q {n2:name_width$} {pad} {q}")?;
    }

    if let Some(probs) = &alignment.match_probabilities {
        write!(out, "p")?;
        let mut probs = probs.iter();
        for (i, block) in alignment.blocks.iter().enumerate() {
            if i > 0 {
                let prev = &alignment.blocks[i - 1];
                for _ in 0..(block.beg1() - prev.end1()).max(block.beg2() - prev.end2()) {
                    write!(out, " -")?;
                }
            }
            for _ in 0..block.size {
                let code = Centroid::encode_ambiguity_code(*probs.next().unwrap_or(&0.0));
                write!(out, " {}", code as char)?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    Ok(())
}

/// The reference-side row: aligned reference letters, with `-` filling any
/// query-side gap between blocks (`AlignmentWrite.cc::topString`).
fn top_string(alignment: &Alignment, seq: &[u8], alphabet: &Alphabet) -> String {
    let mut s = String::new();
    for (i, block) in alignment.blocks.iter().enumerate() {
        if i > 0 {
            let prev = &alignment.blocks[i - 1];
            for k in prev.end1()..block.beg1() {
                s.push(alphabet.decode[seq[k as usize] as usize] as char);
            }
            s.extend(std::iter::repeat_n('-', (block.beg2() - prev.end2()) as usize));
        }
        for k in block.beg1()..block.end1() {
            s.push(alphabet.decode[seq[k as usize] as usize] as char);
        }
    }
    s
}

/// The query-side row: mirror image of [`top_string`] (`botString`).
fn bot_string(alignment: &Alignment, seq: &[u8], alphabet: &Alphabet) -> String {
    let mut s = String::new();
    for (i, block) in alignment.blocks.iter().enumerate() {
        if i > 0 {
            let prev = &alignment.blocks[i - 1];
            s.extend(std::iter::repeat_n('-', (block.beg1() - prev.end1()) as usize));
            for k in prev.end2()..block.beg2() {
                s.push(alphabet.decode[seq[k as usize] as usize] as char);
            }
        }
        for k in block.beg2()..block.end2() {
            s.push(alphabet.decode[seq[k as usize] as usize] as char);
        }
    }
    s
}

/// Per-column quality: the max quality byte over each base's quality group
/// (`qualityString`/`qualityBlock`).
fn quality_string(alignment: &Alignment, qualities: &[u8], seq: &[u8]) -> String {
    let quals_per_base = (qualities.len() / seq.len().max(1)).max(1);
    let mut s = String::new();
    for (i, block) in alignment.blocks.iter().enumerate() {
        if i > 0 {
            let prev = &alignment.blocks[i - 1];
            s.extend(std::iter::repeat_n('-', (block.beg1() - prev.end1()) as usize));
            s.push_str(&quality_block(qualities, prev.end2(), block.beg2(), quals_per_base));
        }
        s.push_str(&quality_block(qualities, block.beg2(), block.end2(), quals_per_base));
    }
    s
}

fn quality_block(qualities: &[u8], beg: u64, end: u64, quals_per_base: usize) -> String {
    (beg..end)
        .map(|i| {
            let start = i as usize * quals_per_base;
            qualities[start..start + quals_per_base].iter().copied().max().unwrap_or(0) as char
        })
        .collect()
}
