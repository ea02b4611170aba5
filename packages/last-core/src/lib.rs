//! `last-core`: the alignment engine behind `lastdb`/`lastal`/`last-split`.
//!
//! The modules below implement the dependency-ordered component table from
//! spec.md §2: alphabet and seed tables at the bottom, the subset suffix
//! array and the gapless/gapped X-drop aligners in the middle, and the
//! Forward-Backward/centroid decoder and split-alignment DP on top. `io`
//! implements the external collaborator surface (readers, `.prj`/binary
//! index files) this repository has no separate upstream crate for.

pub mod alignment;
pub mod alphabet;
pub mod centroid;
pub mod error;
pub mod gap_costs;
pub mod gapless_extend;
pub mod gapped_aligner;
pub mod genetic_code;
pub mod io;
pub mod multi_sequence;
pub mod pot;
pub mod score_matrix;
pub mod seed;
pub mod split;
pub mod suffix_array;

pub use alignment::{Alignment, SegmentPair, Strand, UnsplitAlignment};
pub use alphabet::Alphabet;
pub use error::LastError;
pub use gap_costs::GeneralizedAffineGapCosts;
pub use multi_sequence::MultiSequence;
pub use score_matrix::ScoreMatrix;
pub use seed::CyclicSubsetSeed;
pub use suffix_array::SubsetSuffixArray;
