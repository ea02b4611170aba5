//! Command-line argument structs for `lastdb`, `lastal`, and `last-split`
//! (spec.md §6 "External interfaces"), one `clap::Parser` derive per tool,
//! mirroring the doc-comment-driven `--help` style of `nextalign_cli.rs`'s
//! `NextalignRunArgs`.
//!
//! Scoring defaults depend on the alphabet (`-p`) and on whether quality
//! data is in play (`-Q`), so the scoring-related fields are plain
//! `Option<T>` here and resolved against [`ScoringDefaults`] once the
//! alphabet is known, the way `AlignPairwiseParams` resolves its own
//! alphabet-dependent defaults.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use optfield::optfield;
use std::path::PathBuf;

/// Input sequence format (spec.md §4.J collaborator: readers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    Fasta,
    FastqSanger,
    FastqSolexa,
    Prb,
    Pssm,
}

/// On-disk output layout (spec.md §6 "tabular" / "MAF").
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Tab,
    Maf,
}

/// The `-u` lowercase-masking policy, as a CLI-facing 0..3 value (spec.md
/// §3 "the 4-way `-u` policy").
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum MaskLowercaseArg {
    #[default]
    Off,
    Softer,
    Soft,
    Hard,
}

impl From<MaskLowercaseArg> for last_core::score_matrix::MaskLowercase {
    fn from(v: MaskLowercaseArg) -> Self {
        match v {
            MaskLowercaseArg::Off => Self::Off,
            MaskLowercaseArg::Softer => Self::Softer,
            MaskLowercaseArg::Soft => Self::Soft,
            MaskLowercaseArg::Hard => Self::Hard,
        }
    }
}

/// Child-table width (spec.md §4.D "Child-table construction").
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum ChildTableArg {
    #[default]
    None,
    Chibi,
    Kiddy,
    Full,
}

impl From<ChildTableArg> for last_core::suffix_array::ChildTableKind {
    fn from(v: ChildTableArg) -> Self {
        match v {
            ChildTableArg::None => Self::None,
            ChildTableArg::Chibi => Self::Chibi,
            ChildTableArg::Kiddy => Self::Kiddy,
            ChildTableArg::Full => Self::Full,
        }
    }
}

/// Which query strand(s) to search (spec.md §4.H collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum QueryStrand {
    ReverseOnly,
    ForwardOnly,
    #[default]
    Both,
}

/// `lastdb`: build an index volume from one or more sequence files.
#[derive(Debug, Clone, Parser)]
#[command(name = "lastdb", version, about = "Build a LAST index from sequence data")]
pub struct LastdbArgs {
    /// Base name of the index files to write (e.g. `mydb` for `mydb.prj`, ...).
    pub output_name: PathBuf,

    /// FASTA (or `-Q`-selected format) files to index; reads stdin if none given.
    pub input_files: Vec<PathBuf>,

    /// Index amino-acid sequence (default: nucleotide).
    #[arg(short = 'p', long)]
    pub protein: bool,

    /// Keep soft-masking (lowercase) information from the input.
    #[arg(short = 'c', long)]
    pub soft_masked: bool,

    /// Read up to this many bytes per indexing batch (0 = whole input at once).
    #[arg(short = 's', long, default_value_t = 0)]
    pub batch_bytes: u64,

    /// Lowercase-masking policy recorded in the index manifest.
    #[arg(short = 'u', long, value_enum, default_value_t = MaskLowercaseArg::Off)]
    pub mask_lowercase: MaskLowercaseArg,

    /// Seed pattern: a named pattern (`exact`, `yass`) or a code string
    /// (spec.md §4.B: `1`/`#` exact, `0`/`_` any letter, `T`/`@` transition).
    #[arg(short = 'm', long, default_value = "exact")]
    pub seed: String,

    /// Index word length used to size buckets (default: the seed's length).
    #[arg(short = 'w', long)]
    pub word_length: Option<usize>,

    /// Minimum suffix-array positions per bucket cell before stopping descent.
    #[arg(short = 'i', long, default_value_t = 16)]
    pub min_positions_per_bucket: usize,

    /// Accelerating child-table width to build alongside the suffix array.
    #[arg(short = 'x', long, value_enum, default_value_t = ChildTableArg::None)]
    pub child_table: ChildTableArg,

    /// Input sequence format.
    #[arg(short = 'Q', long, value_enum, default_value_t = InputFormat::Fasta)]
    pub input_format: InputFormat,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Per-tool scoring parameters whose sensible default depends on the
/// alphabet and on whether quality scores are in play; `Option` fields are
/// overrides, resolved against [`crate::pipeline::ScoringDefaults`].
#[optfield(pub ScoringOverrides, attrs, merge_fn)]
#[derive(Debug, Clone, Copy)]
pub struct ScoringDefaults {
    pub match_score: i32,
    pub mismatch_cost: i32,
    pub gap_exist: i32,
    pub gap_extend: i32,
    pub min_score_gapped: i32,
}

/// `lastal`: align query sequences against a `lastdb` index.
#[derive(Debug, Clone, Parser)]
#[command(name = "lastal", version, about = "Find and score local alignments against a LAST index")]
pub struct LastalArgs {
    /// Base name of the index to search (as passed to `lastdb`).
    pub database: PathBuf,

    /// Query sequence files; reads stdin if none given.
    pub query_files: Vec<PathBuf>,

    /// Output layout.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Tab)]
    pub output_format: OutputFormat,

    /// How far to carry each alignment: 0 counts matches only, 1 stops after
    /// gapless extension, 2 after gapped extension, 3 after gamma-centroid
    /// decoding, 4 after full ambiguity-code annotation.
    #[arg(short = 'j', long, default_value_t = 4)]
    pub output_type: u8,

    /// Lowercase-masking policy.
    #[arg(short = 'u', long, value_enum, default_value_t = MaskLowercaseArg::Off)]
    pub mask_lowercase: MaskLowercaseArg,

    /// Which query strand(s) to search.
    #[arg(short = 's', long, value_enum, default_value_t = QueryStrand::Both)]
    pub query_strand: QueryStrand,

    /// Match score (nucleotide mode only; protein mode always uses BLOSUM62).
    #[arg(short = 'r', long)]
    pub match_score: Option<i32>,
    /// Mismatch cost (nucleotide mode only).
    #[arg(short = 'q', long)]
    pub mismatch_cost: Option<i32>,
    /// Treat the query as amino acid sequence and score with BLOSUM62.
    #[arg(short = 'p', long)]
    pub protein: bool,
    /// Gap-existence cost.
    #[arg(short = 'a', long)]
    pub gap_exist: Option<i32>,
    /// Gap-extension cost.
    #[arg(short = 'b', long)]
    pub gap_extend: Option<i32>,
    /// Cost of an unaligned-pair "insertion-over-deletion" transition in the
    /// generalized-affine gap model (`None`/absent collapses to plain affine).
    #[arg(short = 'c', long)]
    pub gap_pair_cost: Option<i32>,

    /// Per-frameshift cost for translated (3-frame) DNA-vs-protein alignment.
    #[arg(short = 'F', long)]
    pub frameshift: Option<i32>,

    /// X-drop threshold for gapped extension.
    #[arg(short = 'x', long)]
    pub max_drop_gapped: Option<i32>,
    /// X-drop threshold for gapless extension.
    #[arg(short = 'y', long)]
    pub max_drop_gapless: Option<i32>,
    /// Minimum score to report a gapless alignment.
    #[arg(short = 'd', long)]
    pub min_score_gapless: Option<i32>,
    /// Minimum score to report a gapped alignment.
    #[arg(short = 'e', long)]
    pub min_score_gapped: Option<i32>,

    /// Query input format.
    #[arg(short = 'Q', long, value_enum, default_value_t = InputFormat::Fasta)]
    pub input_format: InputFormat,

    /// Maximum seed hits to extend per query position (seed "multiplicity").
    #[arg(short = 'm', long, default_value_t = 10)]
    pub one_hit_multiplicity: usize,
    /// Minimum seed depth before the multiplicity cutoff applies.
    #[arg(short = 'l', long, default_value_t = 1)]
    pub min_hit_depth: usize,
    /// Step between successive query seed-search start positions.
    #[arg(short = 'k', long, default_value_t = 1)]
    pub query_step: usize,
    /// Maximum distance for tandem-repeat seed suppression.
    #[arg(short = 'w', long, default_value_t = 1000)]
    pub max_repeat_distance: u64,

    /// Read up to this many bytes of query per alignment batch (0 = whole input).
    #[arg(short = 'i', long, default_value_t = 0)]
    pub batch_bytes: u64,

    /// Forward-Backward temperature (`None` picks `gap_exist` as a sensible scale).
    #[arg(short = 't', long)]
    pub temperature: Option<f64>,
    /// Gamma-centroid tradeoff parameter.
    #[arg(short = 'g', long, default_value_t = 1.0)]
    pub gamma: f64,

    /// Custom NCBI-style genetic code file (default: the standard code).
    #[arg(short = 'G', long)]
    pub genetic_code_file: Option<PathBuf>,

    /// Write output here instead of stdout.
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// `last-split`: resolve one query's possibly-overlapping candidate
/// alignments into a single best split/spliced chain (spec.md §4.I).
#[derive(Debug, Clone, Parser)]
#[command(name = "last-split", version, about = "Find a consistent chain through split/spliced alignment candidates")]
pub struct LastSplitArgs {
    /// MAF file of candidate alignments (one query may have many); reads
    /// stdin if absent.
    pub maf_file: Option<PathBuf>,

    /// Drop candidates scoring below this before chaining.
    #[arg(long, default_value_t = 0)]
    pub score: i32,
    /// Drop chained alignments whose mismap probability exceeds this.
    #[arg(long, default_value_t = 1.0)]
    pub mismap: f64,

    /// Reference genome FASTA, for splice-signal scoring at chain junctions.
    #[arg(short = 'g', long)]
    pub genome: Option<PathBuf>,
    /// Prior probability of a splice at all (0 disables splice scoring).
    #[arg(short = 'd', long, default_value_t = 0.0)]
    pub splice_prior: f64,

    /// Gap-existence score charged at a non-spliced chain junction.
    #[arg(short = 'c', long, default_value_t = 7)]
    pub gap_existence_score: i32,
    /// Score scale (`1/temperature`) used to convert scores to probabilities.
    #[arg(short = 't', long, default_value_t = 1.0)]
    pub scale: f64,
    /// Mean log-intron-length of the fitted log-normal intron model.
    #[arg(short = 'M', long, default_value_t = 7.0)]
    pub mean_log_dist: f64,
    /// Standard deviation of log-intron-length of the fitted model.
    #[arg(short = 'S', long, default_value_t = 1.75)]
    pub sdev_log_dist: f64,

    /// Maximum tolerated query-coordinate overlap between chained candidates.
    #[arg(short = 'n', long, default_value_t = 0)]
    pub max_query_overlap: u64,
    /// Disambiguate the query's strand by comparing the two strands'
    /// partition functions before chaining (rather than trusting the input).
    #[arg(short = 'b', long)]
    pub disambiguate_strand: bool,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}
