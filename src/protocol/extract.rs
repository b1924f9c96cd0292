//! Resolves an SPN's bit slice out of a PGN payload, handling fixed,
//! split, and variable-length (delimited or not) field layouts.
use crate::dictionary::{Length, PgnRecord, SpnRecord, StartBit};
use crate::protocol::bits::{BitSlice, BitView};

/// Extracts the bit slice for `spn` out of `payload`, given the PGN it
/// belongs to.
///
/// `is_complete_message` is true when `payload` is the entire message:
/// always true for link-layer frames, and true for the final view of a
/// reassembled transport session.
pub fn extract_spn(
    pgn: &PgnRecord,
    spn_number: u32,
    spn: &SpnRecord,
    payload: &[u8],
    is_complete_message: bool,
) -> BitSlice {
    let view = BitView::new(payload);
    let total_bits = view.total_bits();

    let start = match spn.start_bit {
        Some(start) => start,
        None => match pgn.ordinal_of(spn_number).and_then(|ord| pgn.start_bit_for(ord)) {
            Some(start) => start,
            None => return BitSlice::empty(),
        },
    };

    match spn.length {
        Length::Fixed(len) => extract_fixed(&view, start, len as usize, total_bits, is_complete_message),
        Length::Variable => extract_variable(pgn, spn_number, spn, &view, start, payload, is_complete_message),
        Length::Unknown => BitSlice::empty(),
    }
}

fn extract_fixed(
    view: &BitView,
    start: StartBit,
    len: usize,
    total_bits: usize,
    is_complete_message: bool,
) -> BitSlice {
    match start {
        StartBit::Unknown => BitSlice::empty(),
        StartBit::Single(s) => {
            let s = s as usize;
            if !is_complete_message && s + len > total_bits {
                return BitSlice::empty();
            }
            view.slice(s, len).unwrap_or_else(BitSlice::empty)
        }
        StartBit::Split(s1, s2) => {
            if s1 < 0 || s2 < 0 {
                return BitSlice::empty();
            }
            let s1 = s1 as usize;
            let s2 = s2 as usize;
            let left_len = match ((s2 / 8) * 8).checked_sub(s1) {
                Some(left_len) => left_len,
                None => return BitSlice::empty(),
            };
            let right_len = len.saturating_sub(left_len);
            if !is_complete_message && s2 + right_len > total_bits {
                return BitSlice::empty();
            }
            let left = view.slice(s1, left_len);
            let right = view.slice(s2, right_len);
            match (left, right) {
                (Some(left), Some(right)) => left.concat(right),
                _ => BitSlice::empty(),
            }
        }
    }
}

fn extract_variable(
    pgn: &PgnRecord,
    spn_number: u32,
    spn: &SpnRecord,
    view: &BitView,
    start: StartBit,
    payload: &[u8],
    is_complete_message: bool,
) -> BitSlice {
    let single_spn_pgn = pgn.spns.len() == 1;

    match spn.delimiter {
        None => {
            if single_spn_pgn {
                if !is_complete_message {
                    return BitSlice::empty();
                }
                let s = match start {
                    StartBit::Single(s) => s as usize,
                    StartBit::Split(s, _) => s as usize,
                    StartBit::Unknown => 0,
                };
                let remaining = view.total_bits().saturating_sub(s);
                view.slice(s, remaining).unwrap_or_else(BitSlice::empty)
            } else {
                log::warn!(
                    "SPN {spn_number} in PGN with multiple variable-length fields has no delimiter; unsupported layout"
                );
                BitSlice::empty()
            }
        }
        Some(delimiter) => extract_delimited(pgn, spn_number, start, delimiter, payload, is_complete_message),
    }
}

fn extract_delimited(
    pgn: &PgnRecord,
    spn_number: u32,
    start: StartBit,
    delimiter: u8,
    payload: &[u8],
    is_complete_message: bool,
) -> BitSlice {
    let fields: Vec<&[u8]> = split_on_delimiter(payload, delimiter);

    if fields.len() < 2 && !is_complete_message {
        return BitSlice::empty();
    }

    let n_fixed = pgn
        .start_bits
        .iter()
        .filter(|sb| !matches!(sb, StartBit::Unknown))
        .count();

    if !matches!(start, StartBit::Unknown) {
        let s = match start {
            StartBit::Single(s) => s as usize,
            StartBit::Split(s, _) => s as usize,
            StartBit::Unknown => unreachable!(),
        };
        let field0 = match fields.first() {
            Some(field) => field,
            None => return BitSlice::empty(),
        };
        let view = BitView::new(field0);
        let total = view.total_bits();
        let len = total.saturating_sub(s);
        return view.slice(s, len).unwrap_or_else(BitSlice::empty);
    }

    let ordinal = match pgn.ordinal_of(spn_number) {
        Some(ordinal) => ordinal,
        None => return BitSlice::empty(),
    };

    let index = if n_fixed > 0 {
        ordinal.checked_sub(n_fixed).map(|i| i + 1)
    } else {
        Some(ordinal)
    };

    match index.and_then(|i| fields.get(i)) {
        Some(field) => {
            let view = BitView::new(field);
            view.slice(0, view.total_bits()).unwrap_or_else(BitSlice::empty)
        }
        None => BitSlice::empty(),
    }
}

fn split_on_delimiter(payload: &[u8], delimiter: u8) -> Vec<&[u8]> {
    payload.split(|&b| b == delimiter).collect()
}
