//! BAM/RTS-CTS transport-protocol reassembly, keyed by (destination,
//! source) address pair.

use std::collections::{HashMap, HashSet};

use crate::protocol::identifier::Identifier;

const CONTROL_BAM: u8 = 0x20;
const CONTROL_RTS: u8 = 0x10;
const CONTROL_CTS: u8 = 0x11;
const CONTROL_EOM_ACK: u8 = 0x13;
const CONTROL_ABORT: u8 = 0xFF;

const BYTES_PER_PACKET: usize = 7;

#[derive(Debug)]
struct Session {
    pgn: u32,
    total_len: usize,
    packet_count: u8,
    buffer: Vec<u8>,
    set: Vec<bool>,
    covered: HashSet<u32>,
}

impl Session {
    fn new(total_len: usize, packet_count: u8, pgn: u32) -> Self {
        let capacity = BYTES_PER_PACKET * packet_count as usize;
        Self {
            pgn,
            total_len,
            packet_count,
            buffer: vec![0u8; capacity],
            set: vec![false; capacity],
            covered: HashSet::new(),
        }
    }

    fn write_packet(&mut self, packet_number: u8, data: &[u8]) {
        let base = BYTES_PER_PACKET * (packet_number as usize - 1);
        for i in 0..BYTES_PER_PACKET {
            if let (Some(slot), Some(&byte)) = (self.buffer.get_mut(base + i), data.get(1 + i)) {
                *slot = byte;
                self.set[base + i] = true;
            }
        }
    }

    fn prefix_ready(&self, upto: usize) -> bool {
        match self.set.get(..upto.min(self.set.len())) {
            Some(slice) if slice.len() == upto => slice.iter().all(|&b| b),
            _ => false,
        }
    }
}

/// A view into a transport session's reassembled bytes, produced either
/// incrementally (real-time mode) or once on completion (whole-message
/// mode). Borrows the session's coverage set so the Describer can record
/// which SPNs it has already emitted for this session.
pub struct SessionView<'a> {
    pub pgn: u32,
    pub destination: u8,
    pub source: u8,
    pub data: &'a [u8],
    pub is_last_packet: bool,
    pub covered: &'a mut HashSet<u32>,
}

/// Tracks BAM/RTS-CTS sessions keyed by (destination, source) and
/// stitches TP.DT data-transfer frames into reassembled payloads.
///
/// Owned by a single processing context: sessions from interleaved logs
/// processed by two different reassemblers would otherwise corrupt each
/// other, since session keys only distinguish address pairs, not origin
/// stream.
#[derive(Debug, Default)]
pub struct Reassembler {
    sessions: HashMap<(u8, u8), Session>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one frame to the reassembler. `real_time` selects whether a
    /// view is produced after every TP.DT (true) or only once the whole
    /// message has arrived (false). Returns `None` when the frame is not
    /// a transport frame, or produced no deliverable view.
    pub fn process_frame(&mut self, id: &Identifier, data: &[u8], real_time: bool) -> Option<SessionView<'_>> {
        if id.is_transport_cm() {
            self.process_control(id, data);
            return None;
        }
        if id.is_transport_dt() {
            return self.process_data(id, data, real_time);
        }
        None
    }

    fn process_control(&mut self, id: &Identifier, data: &[u8]) {
        let control = data.first().copied().unwrap_or(0);
        let key = (id.destination(), id.source());
        match control {
            CONTROL_BAM | CONTROL_RTS => {
                let total_len = (data.get(1).copied().unwrap_or(0) as usize)
                    | ((data.get(2).copied().unwrap_or(0) as usize) << 8);
                let packet_count = data.get(3).copied().unwrap_or(0);
                let pgn = (data.get(5).copied().unwrap_or(0) as u32)
                    | ((data.get(6).copied().unwrap_or(0) as u32) << 8)
                    | ((data.get(7).copied().unwrap_or(0) as u32) << 16);

                if self.sessions.contains_key(&key) {
                    log::debug!(
                        "transport session for DA={:#04x} SA={:#04x} displaced by a new announcement before completing",
                        key.0, key.1
                    );
                }
                self.sessions.insert(key, Session::new(total_len, packet_count, pgn));
            }
            CONTROL_CTS | CONTROL_EOM_ACK | CONTROL_ABORT => {
                log::debug!(
                    "transport control byte {control:#04x} for DA={:#04x} SA={:#04x} recognized, no session change",
                    key.0, key.1
                );
            }
            other => {
                log::debug!("unrecognized transport control byte {other:#04x} for DA={:#04x} SA={:#04x}", key.0, key.1);
            }
        }
    }

    fn process_data(&mut self, id: &Identifier, data: &[u8], real_time: bool) -> Option<SessionView<'_>> {
        let key = (id.destination(), id.source());
        let packet_number = data.first().copied().unwrap_or(0);
        if packet_number == 0 {
            return None;
        }

        if !self.sessions.contains_key(&key) {
            log::debug!("TP.DT for DA={:#04x} SA={:#04x} has no matching session, ignored", key.0, key.1);
            return None;
        }

        let session = self.sessions.get_mut(&key).expect("just checked presence");
        if packet_number as usize > session.packet_count as usize {
            log::debug!("TP.DT packet {packet_number} exceeds declared packet count, ignored");
            return None;
        }
        session.write_packet(packet_number, data);

        let is_last_packet = packet_number == session.packet_count;
        let ready = if real_time {
            session.prefix_ready(BYTES_PER_PACKET * packet_number as usize)
        } else {
            is_last_packet && session.prefix_ready(session.total_len)
        };

        if !ready {
            return None;
        }

        let visible_len = if real_time {
            (BYTES_PER_PACKET * packet_number as usize).min(session.total_len)
        } else {
            session.total_len
        };

        let pgn = session.pgn;
        let (destination, source) = key;
        Some(SessionView {
            pgn,
            destination,
            source,
            data: &session.buffer[..visible_len],
            is_last_packet,
            covered: &mut session.covered,
        })
    }
}
