use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A selected line carried fewer than four comma-separated tokens.
    #[error("malformed record on line {line}: expected at least 4 tokens, found {found}")]
    MalformedRecord { line: usize, found: usize },

    #[error("could not write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}
