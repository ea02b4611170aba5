//! Readers, writers, and the on-disk index format (spec.md §4.J / §6),
//! grounded in `original_source/MultiSequence.hh`/`MultiSequenceQual.cc`
//! (readers) and `lastdb`/`lastal`'s `.prj`/binary file handling.
//!
//! There is no separate upstream crate providing this surface (unlike the
//! teacher repo, which delegates most I/O to `bio`/`needletail`-style
//! crates); this module implements it directly, the way the original
//! program does, since the on-disk formats (`.prj` key=value text,
//! little-endian flat binary arrays) are bespoke to this project.

pub mod fasta;
pub mod fastq;
pub mod index_files;
pub mod prb;
pub mod pssm;

pub use index_files::{IndexManifest, ProjectFile};
