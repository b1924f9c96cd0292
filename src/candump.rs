//! Parses `candump`-format log lines into raw `(identifier, payload)`
//! pairs. Deliberately ignorant of J1939: it only tokenizes the line and
//! decodes hex, leaving every protocol interpretation to
//! [`crate::describe::Describer`].
use std::io::BufRead;

use crate::error::CandumpError;

/// Parses one candump line: `(timestamp) interface ID#DATA`. `ID` is 3
/// hex digits (an 11-bit identifier) or 8 (a 29-bit one); `DATA` is an
/// even-length hex byte string.
pub fn parse_line(line: &str) -> Result<(u32, Vec<u8>), CandumpError> {
    let mut tokens = line.split_whitespace();
    tokens.next().ok_or(CandumpError::TooFewTokens)?; // "(timestamp)"
    tokens.next().ok_or(CandumpError::TooFewTokens)?; // interface name
    let frame = tokens.next().ok_or(CandumpError::TooFewTokens)?;

    let (id_str, data_str) = frame
        .split_once('#')
        .ok_or_else(|| CandumpError::MissingSeparator(frame.to_string()))?;

    if !matches!(id_str.len(), 3 | 8) {
        return Err(CandumpError::BadIdentifier(id_str.to_string()));
    }
    let id = u32::from_str_radix(id_str, 16).map_err(|_| CandumpError::BadIdentifier(id_str.to_string()))?;

    let data = parse_hex_bytes(data_str).ok_or_else(|| CandumpError::BadPayload(data_str.to_string()))?;

    Ok((id, data))
}

fn parse_hex_bytes(data_str: &str) -> Option<Vec<u8>> {
    if data_str.len() % 2 != 0 || !data_str.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    data_str
        .as_bytes()
        .chunks(2)
        .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).ok()?, 16).ok())
        .collect()
}

/// Iterates the lines of `reader`, yielding only the frames that parse
/// successfully. Blank or malformed lines are logged at `warn` and
/// skipped, per the decoder's "never abort the pipeline on a per-frame
/// error" rule.
pub fn parse_reader<R: BufRead>(reader: R) -> impl Iterator<Item = (u32, Vec<u8>)> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => match parse_line(&line) {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::warn!("skipping malformed candump line `{line}`: {err}");
                None
            }
        },
        Err(err) => {
            log::warn!("failed to read candump line: {err}");
            None
        }
    })
}
