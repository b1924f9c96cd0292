//! Per-PGN SPN decoding: iterates a PGN's declared SPN list against a
//! payload, honoring a session-scoped coverage set so a partially
//! reassembled transport session never emits the same SPN twice.
use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::DescriberConfig;
use crate::dictionary::Dictionary;
use crate::protocol::decode::{decode_spn, SpnOutcome};
use crate::protocol::extract::extract_spn;
use crate::protocol::identifier::{PGN_ACK, PGN_TP_CM, PGN_TP_DT};

/// Units whose SPNs are *not* scaled/bounded physical quantities. Matched
/// case-insensitively, mirroring the `"bit"`/`"binary"` comparison the
/// value decoder already performs.
const NON_NUMERICAL_UNITS: &[&str] = &["manufacturer determined", "byte", "", "request dependent", "ascii"];

fn is_numerical(units: &str) -> bool {
    !NON_NUMERICAL_UNITS.iter().any(|candidate| units.eq_ignore_ascii_case(candidate))
}

/// Formats an `f64` the way a reader expects a decoded physical value to
/// read: Rust's own `Display` drops the trailing `.0` off whole numbers
/// (`2500.0` prints as `"2500"`), which would make every whole-number SPN
/// indistinguishable from an integer reading. This keeps at least one
/// fractional digit, e.g. `2500.0`.
fn format_physical_value(value: f64) -> String {
    let text = format!("{value}");
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

/// Decodes every SPN of `pgn_number` out of `payload`, skipping SPNs
/// already present in `coverage` and recording newly-handled ones back
/// into it. Returns an empty map immediately for a transport wrapper PGN
/// (0xEC00/0xEB00/0xE800): those payloads are only ever interpreted via
/// the reassembled session's *target* PGN, never their own.
pub fn describe_message_data(
    dictionary: &Dictionary,
    pgn_number: u32,
    payload: &[u8],
    is_complete_message: bool,
    coverage: &mut HashSet<u32>,
    config: &DescriberConfig,
) -> Map<String, Value> {
    let mut out = Map::new();

    if matches!(pgn_number, PGN_TP_CM | PGN_TP_DT | PGN_ACK) {
        return out;
    }

    let Some(pgn) = dictionary.pgn(pgn_number) else {
        log::warn!("PGN {pgn_number:#06x} not present in dictionary, no SPNs decoded");
        return out;
    };

    for &spn_number in &pgn.spns {
        if coverage.contains(&spn_number) {
            continue;
        }

        let Some(spn) = dictionary.spn(spn_number) else {
            log::warn!("SPN {spn_number} referenced by PGN {pgn_number:#06x} not present in dictionary");
            continue;
        };

        let slice = extract_spn(pgn, spn_number, spn, payload, is_complete_message);

        if is_numerical(&spn.units) {
            match decode_spn(&slice, spn, is_complete_message) {
                SpnOutcome::Incomplete => {}
                SpnOutcome::NotAvailable => {
                    if config.include_na {
                        out.insert(spn.name.clone(), Value::String("N/A".to_string()));
                    }
                    coverage.insert(spn_number);
                }
                SpnOutcome::Bits(raw) => {
                    let text = match dictionary.bit_decoding(spn_number, raw) {
                        Some(decoded) => format!("{raw} ({decoded})"),
                        None => format!("{raw} (Unknown)"),
                    };
                    out.insert(spn.name.clone(), Value::String(text));
                    coverage.insert(spn_number);
                }
                SpnOutcome::Value(value) => {
                    let text = format!("{} [{}]", format_physical_value(value), spn.units);
                    out.insert(spn.name.clone(), Value::String(text));
                    coverage.insert(spn_number);
                }
                SpnOutcome::OutOfRange(_) => {
                    let text = format!("{} (Out of range)", slice.bit_string());
                    out.insert(spn.name.clone(), Value::String(text));
                    coverage.insert(spn_number);
                }
            }
        } else {
            if slice.is_empty() && !is_complete_message {
                continue;
            }
            let text = if spn.units.eq_ignore_ascii_case("request dependent") {
                format!("{} ({})", slice.bit_string(), spn.units)
            } else if spn.units.eq_ignore_ascii_case("ascii") {
                match String::from_utf8(slice.to_bytes()) {
                    Ok(decoded) => decoded.trim_end_matches('\0').to_string(),
                    Err(_) => slice.bit_string(),
                }
            } else {
                slice.bit_string()
            };
            out.insert(spn.name.clone(), Value::String(text));
            coverage.insert(spn_number);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Length, PgnRecord, SpnRecord, StartBit};

    fn dictionary_with(pgn_number: u32, pgn: PgnRecord, spns: Vec<(u32, SpnRecord)>) -> Dictionary {
        let json_pgns = format!(
            r#""{pgn_number}": {{ "Label": "{label}", "Name": "", "PGNLength": "8", "Rate": "", "SPNs": {spns_list:?}, "SPNStartBits": {start_bits} }}"#,
            label = pgn.label,
            spns_list = pgn.spns,
            start_bits = start_bits_json(&pgn.start_bits),
        );
        let mut spn_entries = Vec::new();
        for (number, spn) in &spns {
            spn_entries.push(spn_json(*number, spn));
        }
        let json = format!(
            r#"{{"J1939PGNdb": {{{json_pgns}}}, "J1939SPNdb": {{{spn_list}}}, "J1939SATabledb": {{}}, "J1939BitDecodings": {{"190": {{"1": "On"}}}}}}"#,
            spn_list = spn_entries.join(",")
        );
        Dictionary::from_str(&json).expect("valid fixture document")
    }

    fn start_bits_json(start_bits: &[StartBit]) -> String {
        let entries: Vec<String> = start_bits
            .iter()
            .map(|sb| match sb {
                StartBit::Unknown => "[-1]".to_string(),
                StartBit::Single(s) => format!("[{s}]"),
                StartBit::Split(a, b) => format!("[{a},{b}]"),
            })
            .collect();
        format!("[{}]", entries.join(","))
    }

    fn spn_json(number: u32, spn: &SpnRecord) -> String {
        let length = match spn.length {
            Length::Fixed(len) => len.to_string(),
            Length::Variable => "\"Variable\"".to_string(),
            Length::Unknown => "\"\"".to_string(),
        };
        format!(
            r#""{number}": {{"Name": "{name}", "Units": "{units}", "SPNLength": {length}, "Offset": {offset}, "Resolution": {resolution}, "OperationalLow": {low}, "OperationalHigh": {high}, "DataRange": "", "OperationalRange": ""}}"#,
            name = spn.name,
            units = spn.units,
            offset = spn.offset,
            resolution = spn.resolution,
            low = spn.operational_low,
            high = spn.operational_high,
        )
    }

    fn engine_speed_pgn() -> (PgnRecord, Vec<(u32, SpnRecord)>) {
        let pgn = PgnRecord {
            label: "EEC1".into(),
            name: "Electronic Engine Controller 1".into(),
            length: Length::Fixed(64),
            rate: "".into(),
            spns: vec![190],
            start_bits: vec![StartBit::Single(24)],
        };
        let spn = SpnRecord {
            name: "Engine Speed".into(),
            units: "rpm".into(),
            length: Length::Fixed(16),
            offset: 0.0,
            resolution: 0.125,
            operational_low: -1.0,
            operational_high: -1.0,
            data_range: "".into(),
            operational_range: "".into(),
            delimiter: None,
            start_bit: None,
        };
        (pgn, vec![(190, spn)])
    }

    #[test]
    fn numeric_spn_is_formatted_with_units() {
        let (pgn, spns) = engine_speed_pgn();
        let dict = dictionary_with(61444, pgn, spns);
        let payload = [0x00, 0x00, 0x00, 0x20, 0x4E, 0x00, 0x00, 0x00];
        let mut coverage = HashSet::new();
        let config = DescriberConfig::default();
        let out = describe_message_data(&dict, 61444, &payload, true, &mut coverage, &config);
        assert_eq!(out.get("Engine Speed").unwrap(), "2500.0 [rpm]");
        assert!(coverage.contains(&190));
    }

    #[test]
    fn not_available_is_suppressed_unless_configured() {
        let (pgn, spns) = engine_speed_pgn();
        let dict = dictionary_with(61444, pgn, spns);
        let payload = [0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00];
        let mut coverage = HashSet::new();
        let mut config = DescriberConfig::default();
        let out = describe_message_data(&dict, 61444, &payload, true, &mut coverage, &config);
        assert!(out.get("Engine Speed").is_none());
        assert!(coverage.contains(&190));

        coverage.clear();
        config.include_na = true;
        let out = describe_message_data(&dict, 61444, &payload, true, &mut coverage, &config);
        assert_eq!(out.get("Engine Speed").unwrap(), "N/A");
    }

    #[test]
    fn bit_encoded_spn_resolves_enum_text() {
        let pgn = PgnRecord {
            label: "TEST".into(),
            name: "".into(),
            length: Length::Fixed(8),
            rate: "".into(),
            spns: vec![190],
            start_bits: vec![StartBit::Single(0)],
        };
        let spn = SpnRecord {
            name: "Switch".into(),
            units: "bit".into(),
            length: Length::Fixed(2),
            offset: 0.0,
            resolution: 1.0,
            operational_low: -1.0,
            operational_high: -1.0,
            data_range: "".into(),
            operational_range: "".into(),
            delimiter: None,
            start_bit: None,
        };
        let dict = dictionary_with(100, pgn, vec![(190, spn)]);
        let payload = [0x40u8];
        let mut coverage = HashSet::new();
        let config = DescriberConfig::default();
        let out = describe_message_data(&dict, 100, &payload, true, &mut coverage, &config);
        assert_eq!(out.get("Switch").unwrap(), "1 (On)");
    }

    #[test]
    fn transport_pgn_never_decodes_spns() {
        let dict = dictionary_with(61444, engine_speed_pgn().0, engine_speed_pgn().1);
        let mut coverage = HashSet::new();
        let config = DescriberConfig::default();
        let out = describe_message_data(&dict, PGN_TP_CM, &[0; 8], true, &mut coverage, &config);
        assert!(out.is_empty());
    }

    #[test]
    fn covered_spn_is_skipped_on_later_call() {
        let (pgn, spns) = engine_speed_pgn();
        let dict = dictionary_with(61444, pgn, spns);
        let payload = [0x00, 0x00, 0x00, 0x20, 0x4E, 0x00, 0x00, 0x00];
        let mut coverage = HashSet::from([190]);
        let config = DescriberConfig::default();
        let out = describe_message_data(&dict, 61444, &payload, true, &mut coverage, &config);
        assert!(out.is_empty());
    }
}
