//! Parsing of a 29-bit CAN identifier into its J1939 sub-fields.


const PF_TRANSPORT_CM: u8 = 0xEC;
const PF_TRANSPORT_DT: u8 = 0xEB;
const PF_ACK: u8 = 0xE8;

/// PGN values of the three Transport Protocol wrapper messages. A frame
/// carrying one of these as its PGN is never decoded via its own SPN
/// list: its payload belongs to the BAM/RTS-CTS reassembler instead.
pub const PGN_TP_CM: u32 = 0xEC00;
pub const PGN_TP_DT: u32 = 0xEB00;
pub const PGN_ACK: u32 = 0xE800;

/// A parsed J1939 identifier: PGN, destination address, source address,
/// plus the priority and data-page sub-fields every getter on this type
/// exposes, mirroring a CAN-ID type that surfaces every sub-field rather
/// than only the ones a given caller happens to need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    raw: u32,
    pgn: u32,
    destination: u8,
    source: u8,
}

impl Identifier {
    /// Parses a raw 29-bit extended CAN identifier.
    pub fn parse(raw: u32) -> Self {
        let source = (raw & 0xFF) as u8;
        let pf = ((raw >> 16) & 0xFF) as u8;
        let field_byte = ((raw >> 8) & 0xFF) as u8;

        let (pgn, destination) = if pf >= 240 {
            (pf as u32 * 256 + field_byte as u32, 0xFF)
        } else {
            (pf as u32 * 256, field_byte)
        };

        Self {
            raw,
            pgn,
            destination,
            source,
        }
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn pgn(&self) -> u32 {
        self.pgn
    }

    pub fn destination(&self) -> u8 {
        self.destination
    }

    pub fn source(&self) -> u8 {
        self.source
    }

    /// Bits 26-28: message priority, 0 (highest) to 7 (lowest).
    pub fn priority(&self) -> u8 {
        ((self.raw >> 26) & 0x7) as u8
    }

    /// Bit 24: the J1939 data page selector.
    pub fn data_page(&self) -> bool {
        (self.raw >> 24) & 0x1 != 0
    }

    fn pdu_format(&self) -> u8 {
        ((self.raw >> 16) & 0xFF) as u8
    }

    /// True if this identifier's PGN is one of the three transport
    /// wrapper messages (connection management, data transfer, or ack).
    pub fn is_transport_pgn(&self) -> bool {
        matches!(self.pgn, PGN_TP_CM | PGN_TP_DT | PGN_ACK)
    }

    /// True if this identifier carries a Transport Protocol Connection
    /// Management frame (BAM, RTS, CTS, EndOfMsgAck, or Abort).
    pub fn is_transport_cm(&self) -> bool {
        self.pdu_format() == PF_TRANSPORT_CM
    }

    /// True if this identifier carries a Transport Protocol Data Transfer
    /// frame.
    pub fn is_transport_dt(&self) -> bool {
        self.pdu_format() == PF_TRANSPORT_DT
    }

    /// True if this identifier carries an acknowledgment frame. Recognized
    /// but not semantically acted upon anywhere in this crate.
    pub fn is_ack(&self) -> bool {
        self.pdu_format() == PF_ACK
    }
}
