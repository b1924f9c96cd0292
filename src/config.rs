//! Typed configuration surface for the top-level [`crate::describe::Describer`].

/// Behavior flags controlling what a [`crate::describe::Describer`] includes
/// in its output for each frame.
///
/// All fields default to the values a reader would expect from a decoder
/// that "just describes everything it can": identification and SPN
/// decoding on, raw dumps and `N/A` noise off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriberConfig {
    /// Include the PGN/DA/SA identification block.
    pub describe_pgns: bool,
    /// Include per-SPN decoding.
    pub describe_spns: bool,
    /// Describe transport control/data frames themselves at the link layer.
    pub describe_link_layer: bool,
    /// Reassemble and describe transport-protocol sessions.
    pub describe_transport_layer: bool,
    /// Append the full reassembled payload as a bit-string on completion.
    pub include_transport_rawdata: bool,
    /// Emit `"N/A"` for not-available SPNs instead of suppressing them.
    pub include_na: bool,
    /// Emit a session view after every TP.DT rather than only on completion.
    pub real_time: bool,
}

impl Default for DescriberConfig {
    fn default() -> Self {
        Self {
            describe_pgns: true,
            describe_spns: true,
            describe_link_layer: true,
            describe_transport_layer: true,
            include_transport_rawdata: false,
            include_na: false,
            real_time: false,
        }
    }
}
