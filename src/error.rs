use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading grammar or graph files.
///
/// Malformed individual lines are *not* errors: corpora are large and noisy,
/// so the loaders skip bad lines with a logged diagnostic and keep going.
/// Only conditions that make the whole input unusable are reported here.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input file does not exist or cannot be opened.
    #[error("cannot open `{path}`: {source}")]
    FileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A grammar file ended without the `Count:` footer and start symbol.
    ///
    /// Accepting such a grammar would make every query vacuously empty,
    /// which silently masks operator mistakes.
    #[error("grammar `{path}` has no start symbol (missing `Count:` footer)")]
    MissingStart { path: PathBuf },
}
