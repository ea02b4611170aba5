//! `lastdb`: build a LAST index volume from one or more sequence files
//! (spec.md §6 "External interfaces").

use clap::Parser;
use eyre::Result;
use lastal_cli::args::LastdbArgs;
use lastal_cli::pipeline;
use last_core::alphabet::Alphabet;
use last_core::io::{IndexManifest, ProjectFile};
use last_core::score_matrix::MaskLowercase;
use last_core::suffix_array::{BuildOptions, SubsetSuffixArray};

fn main() {
    if let Err(err) = run() {
        eprintln!("lastdb: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = LastdbArgs::parse();
    env_logger::Builder::new().filter_level(args.verbose.log_level_filter()).format_timestamp(None).init();

    let alphabet = if args.protein { Alphabet::protein()? } else { Alphabet::dna()? };

    log::info!("reading sequences");
    let mut store = pipeline::read_sequences(&args.input_files, args.input_format, &alphabet)?;

    let mask_lowercase: MaskLowercase = args.mask_lowercase.into();
    if matches!(mask_lowercase, MaskLowercase::Off) && !args.soft_masked {
        for byte in store.seq.iter_mut() {
            *byte = alphabet.to_upper[*byte as usize];
        }
    }

    log::info!("making seed pattern");
    let seed = pipeline::build_seed(&args.seed, &alphabet, args.soft_masked)?;
    let word_length = args.word_length.unwrap_or(seed.len());
    let seeds = vec![seed];

    log::info!("making suffix array");
    let opts = BuildOptions {
        min_positions_per_bucket: args.min_positions_per_bucket,
        child_table_kind: args.child_table.into(),
        ..BuildOptions::default()
    };
    let sa = SubsetSuffixArray::build(&store.seq, &seeds, word_length, &opts);

    log::info!("writing files");
    let pf = ProjectFile::new(&args.output_name);
    pf.write_sequence_data(&store.seq)?;
    pf.write_names(&store.names, &store.ends)?;

    let pos_parts = pipeline::pos_parts_for(store.seq.len() as u64);
    pf.write_suffix_array(&sa, pos_parts)?;

    let numofletters: u64 = (0..store.finished_sequences()).map(|i| store.seq_len(i) as u64).sum();
    let manifest = IndexManifest {
        version: last_core::io::index_files::CURRENT_VERSION,
        alphabet: if alphabet.is_protein { "PROTEIN".to_string() } else { "DNA".to_string() },
        numofsequences: store.finished_sequences() as u64,
        numofletters,
        masklowercase: mask_lowercase_code(args.mask_lowercase),
        sequenceformat: format_name(args.input_format),
        volumes: 1,
        pos_parts,
        subset_seeds: seeds.iter().map(|s| s.to_text()).collect(),
    };
    pf.write_manifest(&manifest)?;

    log::info!("done");
    Ok(())
}

fn mask_lowercase_code(v: lastal_cli::args::MaskLowercaseArg) -> u8 {
    use lastal_cli::args::MaskLowercaseArg;
    match v {
        MaskLowercaseArg::Off => 0,
        MaskLowercaseArg::Softer => 1,
        MaskLowercaseArg::Soft => 2,
        MaskLowercaseArg::Hard => 3,
    }
}

fn format_name(format: lastal_cli::args::InputFormat) -> String {
    use lastal_cli::args::InputFormat;
    match format {
        InputFormat::Fasta => "fasta",
        InputFormat::FastqSanger => "fastq-sanger",
        InputFormat::FastqSolexa => "fastq-solexa",
        InputFormat::Prb => "prb",
        InputFormat::Pssm => "pssm",
    }
    .to_string()
}
