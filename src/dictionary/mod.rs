//! The PGN/SPN data-dictionary model: immutable, loaded once from a
//! Digital Annex JSON document, and shared read-only by every downstream
//! component.
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

pub mod wire;

pub use wire::{load_from_path, load_from_str};

/// A bit-count field that may instead be the literal `"Variable"`, or
/// absent entirely in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Fixed(u32),
    Variable,
    Unknown,
}

/// A normalized start-bit position for an SPN, resolved once at load time
/// so the extractor never has to interpret the raw `[-1]`/`[s]`/`[s1,s2]`
/// shapes the document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBit {
    Unknown,
    Single(i32),
    Split(i32, i32),
}

/// A parameter group: the set of SPNs carried by one message and where
/// each one starts within the payload.
#[derive(Debug, Clone)]
pub struct PgnRecord {
    pub label: String,
    pub name: String,
    pub length: Length,
    pub rate: String,
    pub spns: Vec<u32>,
    pub start_bits: Vec<StartBit>,
}

impl PgnRecord {
    /// The normalized start bit for the SPN at `ordinal` in [`Self::spns`],
    /// or `None` if out of range.
    pub fn start_bit_for(&self, ordinal: usize) -> Option<StartBit> {
        self.start_bits.get(ordinal).copied()
    }

    /// The index of `spn` within [`Self::spns`], if present.
    pub fn ordinal_of(&self, spn: u32) -> Option<usize> {
        self.spns.iter().position(|&s| s == spn)
    }
}

/// A single parameter's decode instructions: bit length, scale/offset,
/// and the operational range used for validation.
#[derive(Debug, Clone)]
pub struct SpnRecord {
    pub name: String,
    pub units: String,
    pub length: Length,
    pub offset: f64,
    pub resolution: f64,
    pub operational_low: f64,
    pub operational_high: f64,
    pub data_range: String,
    pub operational_range: String,
    pub delimiter: Option<u8>,
    /// Legacy override of the per-PGN start bit, when the document
    /// specifies it directly on the SPN record.
    pub start_bit: Option<StartBit>,
}

impl SpnRecord {
    /// The effective scale factor used during decoding: `Resolution` if
    /// positive, `1` otherwise.
    pub fn scale(&self) -> f64 {
        if self.resolution > 0.0 {
            self.resolution
        } else {
            1.0
        }
    }

    /// True if the operational range is declared (not the `(-1, -1)`
    /// "unbounded" sentinel).
    pub fn has_operational_range(&self) -> bool {
        !(self.operational_low == -1.0 && self.operational_high == -1.0)
    }

    /// True if this SPN's units mark it as a bit-encoded/enum field
    /// rather than a scaled physical quantity.
    pub fn is_bit_encoded(&self) -> bool {
        self.units.eq_ignore_ascii_case("bit") || self.units.eq_ignore_ascii_case("binary")
    }
}

/// The full decoded Digital Annex: PGN records, SPN records, the
/// source-address name table, and per-SPN bit-value enum decodings.
///
/// Built once via [`load_from_str`] or [`load_from_path`] and never
/// mutated afterward; shared by reference (or via `Arc`) across any
/// number of [`crate::describe::Describer`] instances.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pgns: HashMap<u32, PgnRecord>,
    spns: HashMap<u32, SpnRecord>,
    addresses: HashMap<u8, String>,
    bit_decodings: HashMap<u32, HashMap<u64, String>>,
}

impl Dictionary {
    /// Loads a dictionary from an in-memory JSON document.
    pub fn from_str(json: &str) -> Result<Self, crate::error::DictionaryError> {
        load_from_str(json)
    }

    /// Loads a dictionary from a JSON document on disk.
    pub fn from_path(path: &Path) -> Result<Self, crate::error::DictionaryError> {
        load_from_path(path)
    }

    pub fn pgn(&self, number: u32) -> Option<&PgnRecord> {
        self.pgns.get(&number)
    }

    pub fn spn(&self, number: u32) -> Option<&SpnRecord> {
        self.spns.get(&number)
    }

    /// The display name for a source address. `255` is always `"All"`;
    /// an address with no table entry is `"Unknown"`.
    pub fn source_address_name(&self, address: u8) -> Cow<'_, str> {
        if address == 255 {
            return Cow::Borrowed("All");
        }
        match self.addresses.get(&address) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Borrowed("Unknown"),
        }
    }

    /// The enum text for a bit-encoded SPN's decimal value, if the
    /// document declares one.
    pub fn bit_decoding(&self, spn: u32, value: u64) -> Option<&str> {
        self.bit_decodings.get(&spn)?.get(&value).map(String::as_str)
    }

    /// The PGN label, or `"Unknown"` if the PGN is not in the dictionary.
    pub fn pgn_label(&self, number: u32) -> Cow<'_, str> {
        match self.pgn(number) {
            Some(record) if !record.label.is_empty() => Cow::Borrowed(record.label.as_str()),
            _ => Cow::Borrowed("Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        Dictionary {
            pgns: HashMap::new(),
            spns: HashMap::new(),
            addresses: HashMap::from([(0, "Engine #1".to_string())]),
            bit_decodings: HashMap::from([(190, HashMap::from([(1u64, "On".to_string())]))]),
        }
    }

    #[test]
    fn address_name_special_cases() {
        let dict = sample();
        assert_eq!(dict.source_address_name(255), "All");
        assert_eq!(dict.source_address_name(0), "Engine #1");
        assert_eq!(dict.source_address_name(99), "Unknown");
    }

    #[test]
    fn bit_decoding_lookup() {
        let dict = sample();
        assert_eq!(dict.bit_decoding(190, 1), Some("On"));
        assert_eq!(dict.bit_decoding(190, 2), None);
        assert_eq!(dict.bit_decoding(999, 1), None);
    }

    #[test]
    fn unknown_pgn_label() {
        let dict = sample();
        assert_eq!(dict.pgn_label(12345), "Unknown");
    }
}
