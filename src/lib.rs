// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

#![allow(rustdoc::invalid_rust_codeblocks)]
#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(rustdoc::broken_intra_doc_links)]
// Repetitions of module/type names occur frequently when using many
// modules for keeping the size of the source files handy. Often
// types have the same name as their parent module.
#![allow(clippy::module_name_repetitions)]
// Repeating the type name in `..Default::default()` expressions
// is not needed since the context is obvious.
#![allow(clippy::default_trait_access)]

use std::borrow::Cow;

pub mod app;

pub mod controller;

pub mod devices;

mod input;
pub use self::input::{
    ButtonInput, CenterSliderInput, PadInput, SliderInput, StepEncoderInput, U7_MAX, U7_MIDPOINT,
};

pub mod keybinding;

pub mod midi;
pub use self::midi::{MidiDeviceDescriptor, MidiEvent, MidiInputHandler, MidiOutputConnection};

pub mod modes;

mod output;
pub use self::output::{Error as OutputError, LedColor, LedMode, Result as OutputResult};

mod state;
pub use self::state::PersistedState;

pub mod sysex;

pub mod timing;
pub use self::timing::{Clock, TimeStamp};

/// Common, generic device descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_name: Cow<'static, str>,
    pub product_name: Cow<'static, str>,
}

impl DeviceDescriptor {
    /// Display name of the device.
    #[must_use]
    pub fn name(&self) -> Cow<'static, str> {
        let Self {
            vendor_name,
            product_name,
        } = self;
        format!("{vendor_name} {product_name}").into()
    }
}
