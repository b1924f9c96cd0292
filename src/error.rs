//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (dictionary loading,
//! candump parsing, etc.).
use thiserror::Error;

#[derive(Error, Debug)]
/// Fatal errors raised while loading a Digital Annex JSON document.
/// There is no recovery path for these: a decoder cannot run without a
/// dictionary, so construction is the only place this crate returns a
/// hard failure to the caller.
pub enum DictionaryError {
    /// The document could not be parsed as JSON at all.
    #[error("malformed Digital Annex JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A stringified-integer key could not be parsed back into an integer.
    #[error("key `{key}` in table `{table}` is not a valid integer")]
    InvalidKey { table: &'static str, key: String },

    /// A PGN record's `SPNs` and `SPNStartBits` sequences have different lengths.
    #[error("PGN {pgn} declares {spns} SPNs but {start_bits} start-bit entries")]
    SpnStartBitMismatch {
        pgn: u32,
        spns: usize,
        start_bits: usize,
    },

    /// Reading the document from disk failed.
    #[error("failed to read Digital Annex file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
/// Failures while tokenizing a candump log line. Always non-fatal: the
/// caller logs and skips the offending line rather than aborting.
pub enum CandumpError {
    /// Fewer than three whitespace-separated tokens were found.
    #[error("line has too few tokens")]
    TooFewTokens,

    /// The `ID#DATA` token did not contain the `#` separator.
    #[error("token `{0}` is not in ID#DATA form")]
    MissingSeparator(String),

    /// The identifier was not 3 or 8 hex digits.
    #[error("identifier `{0}` is neither an 11-bit nor a 29-bit hex id")]
    BadIdentifier(String),

    /// The data portion was not an even-length hex string.
    #[error("payload `{0}` is not a valid hex byte string")]
    BadPayload(String),
}
