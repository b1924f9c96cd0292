//! Top-level per-frame orchestration: parses the identifier, emits
//! link-layer description when configured, and routes transport
//! control/data frames through the owned [`Reassembler`], emitting a
//! transport-layer description for each session view it produces.
use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::DescriberConfig;
use crate::dictionary::Dictionary;
use crate::protocol::bits::BitView;
use crate::protocol::describe::describe_message_data;
use crate::protocol::identifier::Identifier;
use crate::protocol::transport::Reassembler;

fn identification_fields(dictionary: &Dictionary, pgn: u32, destination: u8, source: u8, pgn_key: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(pgn_key.to_string(), Value::String(format!("{}({pgn})", dictionary.pgn_label(pgn))));
    fields.insert(
        "DA".to_string(),
        Value::String(format!("{}({destination})", dictionary.source_address_name(destination))),
    );
    fields.insert(
        "SA".to_string(),
        Value::String(format!("{}({source})", dictionary.source_address_name(source))),
    );
    fields
}

/// Orchestrates the full per-frame pipeline: this is the crate's primary
/// entry point. Holds the Digital Annex dictionary by shared reference
/// (read-only, so any number of `Describer`s may share one) and owns its
/// [`Reassembler`], since transport-session state is tied to a single
/// ordered stream of arriving frames.
pub struct Describer<'a> {
    dictionary: &'a Dictionary,
    reassembler: Reassembler,
    config: DescriberConfig,
}

impl<'a> Describer<'a> {
    pub fn new(dictionary: &'a Dictionary, config: DescriberConfig) -> Self {
        Self {
            dictionary,
            reassembler: Reassembler::new(),
            config,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.dictionary
    }

    pub fn config(&self) -> &DescriberConfig {
        &self.config
    }

    /// Describes one CAN frame, given its raw 29-bit identifier and
    /// payload bytes. Returns one map per emitted description: ordinarily
    /// one (the link-layer description of a non-transport frame), zero or
    /// two for a transport control/data frame (an optional wrapper
    /// description plus zero-or-one transport-session view).
    pub fn describe_frame(&mut self, can_id: u32, data: &[u8]) -> Vec<Map<String, Value>> {
        let id = Identifier::parse(can_id);
        let mut outputs = Vec::new();

        let view = if self.config.describe_transport_layer {
            self.reassembler.process_frame(&id, data, self.config.real_time)
        } else {
            None
        };

        if !id.is_transport_pgn() {
            let mut description = Map::new();
            if self.config.describe_pgns {
                description.extend(identification_fields(self.dictionary, id.pgn(), id.destination(), id.source(), "PGN"));
            }
            if self.config.describe_spns {
                let mut coverage = HashSet::new();
                description.extend(describe_message_data(self.dictionary, id.pgn(), data, true, &mut coverage, &self.config));
            }
            outputs.push(description);
        } else if self.config.describe_link_layer {
            let mut description = Map::new();
            if self.config.describe_pgns {
                description.extend(identification_fields(self.dictionary, id.pgn(), id.destination(), id.source(), "PGN"));
            }
            outputs.push(description);
        }

        if let Some(view) = view {
            let pgn_key = if self.config.describe_link_layer { "Transport PGN" } else { "PGN" };
            let mut description = Map::new();
            if self.config.describe_pgns {
                description.extend(identification_fields(self.dictionary, view.pgn, view.destination, view.source, pgn_key));
            }
            if self.config.describe_spns {
                description.extend(describe_message_data(
                    self.dictionary,
                    view.pgn,
                    view.data,
                    view.is_last_packet,
                    view.covered,
                    &self.config,
                ));
            }
            if self.config.include_transport_rawdata && view.is_last_packet {
                let bits = BitView::new(view.data);
                let rawdata = bits.slice(0, bits.total_bits()).expect("full-length slice always succeeds").bit_string();
                description.insert("Transport Data".to_string(), Value::String(rawdata));
            }
            outputs.push(description);
        }

        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICTIONARY_JSON: &str = r#"{
        "J1939PGNdb": {
            "61444": {
                "Label": "EEC1",
                "Name": "Electronic Engine Controller 1",
                "PGNLength": "8",
                "Rate": "10 ms",
                "SPNs": [190],
                "SPNStartBits": [[24]]
            },
            "65024": {
                "Label": "CCVS1",
                "Name": "Cruise Control/Vehicle Speed 1",
                "PGNLength": "8",
                "Rate": "100 ms",
                "SPNs": [84],
                "SPNStartBits": [[8]]
            }
        },
        "J1939SPNdb": {
            "190": {
                "Name": "Engine Speed",
                "Units": "rpm",
                "SPNLength": "16",
                "Offset": 0,
                "Resolution": 0.125,
                "OperationalLow": -1,
                "OperationalHigh": -1,
                "DataRange": "",
                "OperationalRange": ""
            },
            "84": {
                "Name": "Wheel-Based Vehicle Speed",
                "Units": "km/h",
                "SPNLength": "16",
                "Offset": 0,
                "Resolution": 0.00390625,
                "OperationalLow": -1,
                "OperationalHigh": -1,
                "DataRange": "",
                "OperationalRange": ""
            }
        },
        "J1939SATabledb": { "0": "Engine #1", "255": "All" },
        "J1939BitDecodings": {}
    }"#;

    fn dictionary() -> Dictionary {
        Dictionary::from_str(DICTIONARY_JSON).expect("valid fixture document")
    }

    fn pdu2_id(pf: u8, ps: u8, sa: u8) -> u32 {
        ((pf as u32) << 16) | ((ps as u32) << 8) | sa as u32
    }

    #[test]
    fn link_layer_frame_identifies_and_decodes() {
        let dict = dictionary();
        let mut describer = Describer::new(&dict, DescriberConfig::default());
        let id = pdu2_id(0xF0, 0x04, 0x00); // PGN 0xF004 = 61444
        let payload = [0x00, 0x00, 0x00, 0x20, 0x4E, 0x00, 0x00, 0x00];
        let outputs = describer.describe_frame(id, &payload);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0]["PGN"], "EEC1(61444)");
        assert_eq!(outputs[0]["SA"], "Engine #1(0)");
        assert_eq!(outputs[0]["Engine Speed"], "2500.0 [rpm]");
    }

    #[test]
    fn bam_session_emits_transport_description_once_complete() {
        let dict = dictionary();
        let mut describer = Describer::new(&dict, DescriberConfig::default());

        let cm_id = pdu2_id(0xEC, 0xFF, 0x05);
        let announcement = [0x20, 0x08, 0x00, 0x02, 0xFF, 0x00, 0xFE, 0x00];
        let cm_outputs = describer.describe_frame(cm_id, &announcement);
        // Link-layer reporting defaults on, so the wrapper CM frame still
        // gets an identification-only map; it never triggers SPN decoding.
        assert_eq!(cm_outputs.len(), 1);
        assert_eq!(cm_outputs[0]["PGN"], "Unknown(60416)");

        let dt_id = pdu2_id(0xEB, 0xFF, 0x05);
        // SPN 84 (start bit 8, length 16) lands on session bytes [1, 2];
        // 0x000A / 0.00390625^-1 i.e. raw 2560 * (1/256) = 10.0 km/h.
        let packet1 = [0x01, 0xA1, 0x00, 0x0A, 0xA4, 0xA5, 0xA6, 0xA7];
        let outputs1 = describer.describe_frame(dt_id, &packet1);
        assert!(outputs1.iter().all(|m| !m.contains_key("Wheel-Based Vehicle Speed")));

        let packet2 = [0x02, 0xA8, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let outputs2 = describer.describe_frame(dt_id, &packet2);
        let transport = outputs2.iter().find(|m| m.contains_key("Transport PGN")).expect("transport view emitted");
        assert_eq!(transport["Transport PGN"], "CCVS1(65024)");
        assert_eq!(transport["Wheel-Based Vehicle Speed"], "10.0 [km/h]");
    }

    #[test]
    fn ack_frame_is_plain_link_layer_when_transport_pgn() {
        let dict = dictionary();
        let mut describer = Describer::new(&dict, DescriberConfig::default());
        let id = pdu2_id(0xE8, 0xFF, 0x07);
        let outputs = describer.describe_frame(id, &[0; 8]);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0]["PGN"], "Unknown(59392)");
    }
}
