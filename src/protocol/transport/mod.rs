//! BAM/RTS-CTS Transport Protocol reassembly.
pub mod session;

pub use session::{Reassembler, SessionView};
