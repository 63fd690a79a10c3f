// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::borrow::Cow;

use derive_more::{Display, From};
use thiserror::Error;

use crate::sysex;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Send: {msg}")]
    Send { msg: Cow<'static, str> },
    #[error(transparent)]
    SysEx(#[from] sysex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Index into the color palette of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
pub struct LedColor(u8);

impl LedColor {
    pub const OFF: Self = Self(0);

    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn to_u7(self) -> u8 {
        self.0 & 0x7f
    }
}

/// Lighting mode of a palette LED.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::FromRepr)]
#[repr(u8)]
pub enum LedMode {
    #[default]
    Static = 0,
    Flashing = 1,
    Pulsing = 2,
}
