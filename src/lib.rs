//! `j1939-describe`: decodes SAE J1939 traffic carried over CAN 2.0B
//! extended frames into human-readable, structured descriptions.
//!
//! The crate loads a Digital Annex (a JSON-serialized PGN/SPN data
//! dictionary) once, then feeds it raw 29-bit CAN identifiers and payloads
//! one frame at a time through [`describe::Describer`], which parses the
//! identifier, reassembles BAM/RTS-CTS transport sessions, and decodes each
//! SPN into a scaled value, enum text, ASCII string, or raw bit-string.
//!
//! Everything under [`dictionary`], [`protocol`], [`config`], and
//! [`describe`] is always compiled; the `cli` feature additionally builds
//! [`candump`] and the `j1939-describe` binary, which wire a log-file
//! source and JSON sink around the library.
/// Behavior flags controlling what a [`describe::Describer`] includes.
pub mod config;
/// Per-frame orchestration: identifier parsing, link-layer description,
/// and transport-session routing.
pub mod describe;
/// The PGN/SPN data-dictionary model, loaded once from a Digital Annex
/// JSON document.
pub mod dictionary;
/// Domain errors (dictionary loading, candump parsing).
pub mod error;
/// Identifier parsing, bit extraction, SPN value decoding, and transport
/// reassembly.
pub mod protocol;

#[cfg(feature = "cli")]
/// candump log-line parsing, built only for the `j1939-describe` binary.
pub mod candump;

pub use config::DescriberConfig;
pub use describe::Describer;
pub use dictionary::Dictionary;
