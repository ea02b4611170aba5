//! Shared library surface for the `lastdb`, `lastal`, and `last-split`
//! binaries: argument parsing ([`args`]), alphabet/seed/input-reading glue
//! ([`pipeline`]), and alignment output formatting ([`output`]).

pub mod args;
pub mod output;
pub mod pipeline;
