//! Wire-shaped structs mirroring the Digital Annex JSON document exactly as
//! published: PascalCase keys, stringified integer map keys, and a few
//! fields whose type varies between a number and the literal `"Variable"`.
//!
//! These are deserialized with `serde_json` and then converted, in one
//! pass, into the re-indexed domain model in [`super`]. Nothing downstream
//! of [`super::Dictionary`] ever sees this module's types.
use std::collections::HashMap;

use serde::Deserialize;

use super::{Dictionary, Length, PgnRecord, SpnRecord, StartBit};
use crate::error::DictionaryError;

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "J1939PGNdb")]
    pgn_db: HashMap<String, RawPgn>,
    #[serde(rename = "J1939SPNdb")]
    spn_db: HashMap<String, RawSpn>,
    #[serde(rename = "J1939SATabledb")]
    sa_table: HashMap<String, String>,
    #[serde(rename = "J1939BitDecodings")]
    bit_decodings: HashMap<String, HashMap<String, String>>,
}

#[derive(Deserialize)]
struct RawPgn {
    #[serde(rename = "Label", default)]
    label: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "PGNLength", default)]
    pgn_length: String,
    #[serde(rename = "Rate", default)]
    rate: String,
    #[serde(rename = "SPNs", default)]
    spns: Vec<u32>,
    #[serde(rename = "SPNStartBits", default)]
    spn_start_bits: Vec<Vec<i32>>,
}

#[derive(Deserialize)]
struct RawSpn {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Units", default)]
    units: String,
    #[serde(rename = "SPNLength", default)]
    spn_length: String,
    #[serde(rename = "Offset", default)]
    offset: f64,
    #[serde(rename = "Resolution", default)]
    resolution: f64,
    #[serde(rename = "OperationalLow", default = "neg_one")]
    operational_low: f64,
    #[serde(rename = "OperationalHigh", default = "neg_one")]
    operational_high: f64,
    #[serde(rename = "DataRange", default)]
    data_range: String,
    #[serde(rename = "OperationalRange", default)]
    operational_range: String,
    #[serde(rename = "Delimiter")]
    delimiter: Option<String>,
    #[serde(rename = "StartBit")]
    start_bit: Option<i32>,
}

fn neg_one() -> f64 {
    -1.0
}

fn parse_length(raw: &str, table: &'static str, key: &str) -> Result<Length, DictionaryError> {
    if raw.is_empty() {
        return Ok(Length::Unknown);
    }
    if raw.eq_ignore_ascii_case("variable") || raw.starts_with("Variable") {
        return Ok(Length::Variable);
    }
    raw.parse::<u32>()
        .map(Length::Fixed)
        .map_err(|_| DictionaryError::InvalidKey {
            table,
            key: format!("{key} (length = {raw})"),
        })
}

fn parse_delimiter(raw: &str) -> Option<u8> {
    let trimmed = raw.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(trimmed, 16).ok()
}

fn normalize_start_bits(raw: &[i32]) -> StartBit {
    match raw {
        [-1] => StartBit::Unknown,
        [single] => StartBit::Single(*single),
        [first, second] => StartBit::Split(*first, *second),
        _ => StartBit::Unknown,
    }
}

fn parse_index<T>(table: &'static str, key: &str) -> Result<T, DictionaryError>
where
    T: std::str::FromStr,
{
    key.parse::<T>().map_err(|_| DictionaryError::InvalidKey {
        table,
        key: key.to_string(),
    })
}

/// Parses a full Digital Annex document and builds the re-indexed
/// [`Dictionary`] consumed by the rest of the crate.
pub fn load_from_str(json: &str) -> Result<Dictionary, DictionaryError> {
    let raw: RawDocument = serde_json::from_str(json)?;

    let mut pgns = HashMap::with_capacity(raw.pgn_db.len());
    for (key, pgn) in raw.pgn_db {
        let number: u32 = parse_index("J1939PGNdb", &key)?;
        if pgn.spns.len() != pgn.spn_start_bits.len() {
            return Err(DictionaryError::SpnStartBitMismatch {
                pgn: number,
                spns: pgn.spns.len(),
                start_bits: pgn.spn_start_bits.len(),
            });
        }
        let label = if pgn.label.is_empty() {
            "Unknown".to_string()
        } else {
            pgn.label
        };
        let length = parse_length(&pgn.pgn_length, "J1939PGNdb", &key)?;
        let start_bits = pgn.spn_start_bits.iter().map(|v| normalize_start_bits(v)).collect();
        pgns.insert(
            number,
            PgnRecord {
                label,
                name: pgn.name,
                length,
                rate: pgn.rate,
                spns: pgn.spns,
                start_bits,
            },
        );
    }

    let mut spns = HashMap::with_capacity(raw.spn_db.len());
    for (key, spn) in raw.spn_db {
        let number: u32 = parse_index("J1939SPNdb", &key)?;
        let length = parse_length(&spn.spn_length, "J1939SPNdb", &key)?;
        let delimiter = spn.delimiter.as_deref().and_then(parse_delimiter);
        let start_bit = spn.start_bit.map(|s| normalize_start_bits(&[s]));
        spns.insert(
            number,
            SpnRecord {
                name: spn.name,
                units: spn.units,
                length,
                offset: spn.offset,
                resolution: spn.resolution,
                operational_low: spn.operational_low,
                operational_high: spn.operational_high,
                data_range: spn.data_range,
                operational_range: spn.operational_range,
                delimiter,
                start_bit,
            },
        );
    }

    let mut addresses = HashMap::with_capacity(raw.sa_table.len());
    for (key, name) in raw.sa_table {
        let address: u16 = parse_index("J1939SATabledb", &key)?;
        addresses.insert(address as u8, name);
    }

    let mut bit_decodings = HashMap::with_capacity(raw.bit_decodings.len());
    for (key, values) in raw.bit_decodings {
        let spn: u32 = parse_index("J1939BitDecodings", &key)?;
        let mut by_value = HashMap::with_capacity(values.len());
        for (value_key, text) in values {
            let value: u64 = parse_index("J1939BitDecodings", &value_key)?;
            by_value.insert(value, text);
        }
        bit_decodings.insert(spn, by_value);
    }

    Ok(Dictionary {
        pgns,
        spns,
        addresses,
        bit_decodings,
    })
}

/// Reads a Digital Annex document from disk and parses it via
/// [`load_from_str`].
pub fn load_from_path(path: &std::path::Path) -> Result<Dictionary, DictionaryError> {
    let text = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&text)
}
