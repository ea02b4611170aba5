//! The error taxonomy from which every fallible boundary in `last-core` is built.
//!
//! Components return `eyre::Result<T>` so call sites can attach context with
//! `.wrap_err_with(..)`; `LastError` supplies the small set of named failure
//! modes that the CLI layer needs to recognize (to map them to the right
//! exit-code category).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LastError {
    #[error("bad option value: {0}")]
    Configuration(String),

    #[error("{0}")]
    Input(String),

    #[error("can't open index: {0}")]
    Index(String),

    #[error("index version {found} is older than the minimum supported version {minimum}")]
    IndexVersion { found: u32, minimum: u32 },

    #[error("out of memory")]
    Resource,

    #[error("internal error: {0}")]
    Internal(String),
}
