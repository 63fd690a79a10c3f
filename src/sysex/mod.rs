// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! System exclusive messages for device programming.
//!
//! All builders validate their input before producing a single byte.
//! The returned messages are complete frames including the start and
//! end delimiters.

use std::borrow::Cow;

use thiserror::Error;

use crate::midi::{MIDI_SYSEX_END, MIDI_SYSEX_START};

pub mod grid;
pub mod program;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid value {value} for field {field}")]
    InvalidField {
        field: Cow<'static, str>,
        value: i64,
    },
    #[error("non-ASCII text in field {field}")]
    InvalidName { field: Cow<'static, str> },
    #[error("too many faders: {count}")]
    TooManyFaders { count: usize },
    #[error("unexpected message header")]
    InvalidHeader,
    #[error("invalid message length: expected {expected}, actual {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check that a value is within an inclusive range.
pub(crate) fn check_range<T>(
    field: impl Into<Cow<'static, str>>,
    value: T,
    min: T,
    max: T,
) -> Result<T>
where
    T: Copy + PartialOrd + Into<i64>,
{
    if value < min || value > max {
        return Err(Error::InvalidField {
            field: field.into(),
            value: value.into(),
        });
    }
    Ok(value)
}

/// Check that a collection has exactly the expected number of entries.
pub(crate) fn check_len(field: impl Into<Cow<'static, str>>, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(Error::InvalidField {
            field: field.into(),
            value: i64::try_from(len).unwrap_or(i64::MAX),
        });
    }
    Ok(())
}

/// Encode a text as a fixed-width, zero-padded field.
///
/// Longer texts are truncated. Only ASCII is accepted, because each
/// byte must fit into 7 bits.
pub fn encode_name<const N: usize>(field: impl Into<Cow<'static, str>>, name: &str) -> Result<[u8; N]> {
    if !name.is_ascii() {
        return Err(Error::InvalidName {
            field: field.into(),
        });
    }
    let mut encoded = [0; N];
    for (dst, src) in encoded.iter_mut().zip(name.bytes()) {
        *dst = src;
    }
    Ok(encoded)
}

/// Decode a zero-padded text field up to the first zero byte.
#[must_use]
pub fn decode_name(field: &[u8]) -> String {
    field
        .iter()
        .take_while(|byte| **byte != 0)
        .map(|byte| char::from(*byte & 0x7f))
        .collect()
}

/// Wrap a payload into start and end delimiters.
#[must_use]
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(body.len() + 2);
    message.push(MIDI_SYSEX_START);
    message.extend_from_slice(body);
    message.push(MIDI_SYSEX_END);
    message
}

/// Strip the start and end delimiters of a complete frame.
pub fn unframe(message: &[u8]) -> Result<&[u8]> {
    match message {
        [MIDI_SYSEX_START, body @ .., MIDI_SYSEX_END] => Ok(body),
        _ => Err(Error::InvalidHeader),
    }
}

/// Split a 14-bit value into two 7-bit bytes, most significant first.
#[must_use]
pub const fn u14_to_u7_be(value: u16) -> [u8; 2] {
    [((value >> 7) & 0x7f) as u8, (value & 0x7f) as u8]
}

#[must_use]
pub const fn u7_be_to_u14(hi: u8, lo: u8) -> u16 {
    ((hi as u16 & 0x7f) << 7) | (lo as u16 & 0x7f)
}
