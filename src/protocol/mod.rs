//! J1939 protocol components: identifier parsing, bit extraction, SPN
//! value decoding, per-message description, and BAM/RTS-CTS transport
//! reassembly.
pub mod bits;
pub mod decode;
pub mod describe;
pub mod extract;
pub mod identifier;
pub mod transport;

