// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Program format of the Akai MPK mini mk3.
//!
//! A program carries the complete configuration of the device, i.e.
//! what the pads, knobs, joystick, and keybed send and how they are
//! labeled on the display. The layout of the message is fixed:
//!
//! | Offset | Length | Content                                   |
//! |--------|--------|-------------------------------------------|
//! | 0      | 7      | header, payload length, program slot      |
//! | 7      | 16     | program name                              |
//! | 23     | 20     | global settings                           |
//! | 43     | 48     | 16 pads: note, program change, CC         |
//! | 91     | 160    | 8 knobs: mode, CC, min, max, name         |
//! | 251    | 1      | transpose                                 |

use strum::FromRepr;

use super::{
    check_len, check_range, decode_name, encode_name, frame, u14_to_u7_be, u7_be_to_u14, unframe,
    Error, Result,
};

pub const MANUFACTURER_ID: u8 = 0x47;
pub const PRODUCT_ID: u8 = 0x49;

pub const DIRECTION_OUT: u8 = 0x7f;
pub const DIRECTION_IN: u8 = 0x00;

pub const CMD_WRITE_PROGRAM: u8 = 0x64;
pub const CMD_QUERY_PROGRAM: u8 = 0x66;
pub const CMD_PROGRAM_DATA: u8 = 0x67;

/// Number of bytes following the length field.
pub const PAYLOAD_LEN: u16 = 246;

/// Length of a program message without the SysEx delimiters.
pub const MESSAGE_LEN: usize = 252;

pub const NAME_LEN: usize = 16;
pub const PAD_COUNT: usize = 16;
pub const KNOB_COUNT: usize = 8;

/// Slot 0 is volatile RAM, slots 1 to 8 are persistent.
pub const PROGRAM_SLOT_MAX: u8 = 8;

pub const KEYBED_OCTAVE_MAX: u8 = 7;
pub const DEFAULT_KEYBED_OCTAVE: u8 = 4;

pub const ARP_OCTAVE_MAX: u8 = 3;
pub const ARP_SWING_MAX: u8 = 25;

pub const TEMPO_TAPS_MIN: u8 = 2;
pub const TEMPO_TAPS_MAX: u8 = 4;
pub const DEFAULT_TEMPO_TAPS: u8 = 3;

pub const TEMPO_BPM_MIN: u16 = 60;
pub const TEMPO_BPM_MAX: u16 = 240;
pub const DEFAULT_TEMPO_BPM: u16 = 90;

pub const DEFAULT_KEYBED_CHANNEL: u8 = 0;
pub const DEFAULT_PADS_CHANNEL: u8 = 9;
pub const DEFAULT_TRANSPOSE: u8 = 0x0c;

const MIDI_CHANNEL_MAX: u8 = 15;
const U7_MAX: u8 = 127;

const OFFSET_NAME: usize = 7;
const OFFSET_GLOBALS: usize = OFFSET_NAME + NAME_LEN;
const OFFSET_PADS: usize = OFFSET_GLOBALS + 20;
const OFFSET_KNOBS: usize = OFFSET_PADS + PAD_COUNT * 3;
const KNOB_LEN: usize = 4 + NAME_LEN;
const OFFSET_TRANSPOSE: usize = OFFSET_KNOBS + KNOB_COUNT * KNOB_LEN;

const ARP_ON: u8 = 0x7f;
const ARP_OFF: u8 = 0x00;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum Aftertouch {
    #[default]
    Off = 0,
    Channel = 1,
    Polyphonic = 2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ArpMode {
    #[default]
    Up = 0,
    Down = 1,
    Exclusive = 2,
    Inclusive = 3,
    Order = 4,
    Random = 5,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ArpDivision {
    #[default]
    Quarter = 0,
    QuarterTriplet = 1,
    Eighth = 2,
    EighthTriplet = 3,
    Sixteenth = 4,
    SixteenthTriplet = 5,
    ThirtySecond = 6,
    ThirtySecondTriplet = 7,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ClockSource {
    #[default]
    Internal = 0,
    External = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum JoystickMode {
    PitchBend = 0,
    /// Single CC for both directions
    SingleCc = 1,
    /// Separate CCs for each direction
    DualCc = 2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum KnobMode {
    #[default]
    Absolute = 0,
    Relative = 1,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arpeggiator {
    pub enabled: bool,
    pub mode: ArpMode,
    pub division: ArpDivision,
    pub swing: u8,
    pub octave: u8,
    pub latch: bool,
}

/// One axis of the joystick.
///
/// `negative` and `positive` are MIDI channels in pitch bend mode
/// and CC numbers in CC modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickAxis {
    pub mode: JoystickMode,
    pub negative: u8,
    pub positive: u8,
}

impl JoystickAxis {
    pub const DEFAULT_X: Self = Self {
        mode: JoystickMode::PitchBend,
        negative: 1,
        positive: 2,
    };

    pub const DEFAULT_Y: Self = Self {
        mode: JoystickMode::DualCc,
        negative: 1,
        positive: 2,
    };

    #[must_use]
    pub const fn dual_cc(negative: u8, positive: u8) -> Self {
        Self {
            mode: JoystickMode::DualCc,
            negative,
            positive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadAssignment {
    pub note: u8,
    pub program: u8,
    pub cc: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnobAssignment {
    pub mode: KnobMode,
    pub cc: u8,
    pub min: u8,
    pub max: u8,
    pub name: String,
}

impl KnobAssignment {
    #[must_use]
    pub fn relative(cc: u8, name: impl Into<String>) -> Self {
        Self {
            mode: KnobMode::Relative,
            cc,
            min: 0,
            max: U7_MAX,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn absolute(cc: u8, min: u8, max: u8, name: impl Into<String>) -> Self {
        Self {
            mode: KnobMode::Absolute,
            cc,
            min,
            max,
            name: name.into(),
        }
    }
}

/// Complete device configuration, uploaded as a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProgram {
    pub slot: u8,
    pub name: String,
    pub pads_channel: u8,
    pub keybed_channel: u8,
    pub aftertouch: Aftertouch,
    pub keybed_octave: u8,
    pub arpeggiator: Arpeggiator,
    pub clock: ClockSource,
    pub tempo_taps: u8,
    pub tempo_bpm: u16,
    pub joystick_x: JoystickAxis,
    pub joystick_y: JoystickAxis,
    pub pads: Vec<PadAssignment>,
    pub knobs: Vec<KnobAssignment>,
    pub transpose: u8,
}

impl Default for DeviceProgram {
    fn default() -> Self {
        let pads = (0..PAD_COUNT as u8)
            .map(|index| PadAssignment {
                note: index,
                program: index,
                cc: index,
            })
            .collect();
        let knobs = (0..KNOB_COUNT as u8)
            .map(|index| KnobAssignment::absolute(index, 0, U7_MAX, format!("K{}", index + 1)))
            .collect();
        Self {
            slot: 0,
            name: String::new(),
            pads_channel: DEFAULT_PADS_CHANNEL,
            keybed_channel: DEFAULT_KEYBED_CHANNEL,
            aftertouch: Aftertouch::Off,
            keybed_octave: DEFAULT_KEYBED_OCTAVE,
            arpeggiator: Arpeggiator::default(),
            clock: ClockSource::Internal,
            tempo_taps: DEFAULT_TEMPO_TAPS,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            joystick_x: JoystickAxis::DEFAULT_X,
            joystick_y: JoystickAxis::DEFAULT_Y,
            pads,
            knobs,
            transpose: DEFAULT_TRANSPOSE,
        }
    }
}

impl DeviceProgram {
    pub fn validate(&self) -> Result<()> {
        check_range("slot", self.slot, 0, PROGRAM_SLOT_MAX)?;
        check_range("pads_channel", self.pads_channel, 0, MIDI_CHANNEL_MAX)?;
        check_range("keybed_channel", self.keybed_channel, 0, MIDI_CHANNEL_MAX)?;
        check_range("keybed_octave", self.keybed_octave, 0, KEYBED_OCTAVE_MAX)?;
        check_range("arp_swing", self.arpeggiator.swing, 0, ARP_SWING_MAX)?;
        check_range("arp_octave", self.arpeggiator.octave, 0, ARP_OCTAVE_MAX)?;
        check_range("tempo_taps", self.tempo_taps, TEMPO_TAPS_MIN, TEMPO_TAPS_MAX)?;
        check_range("tempo_bpm", self.tempo_bpm, TEMPO_BPM_MIN, TEMPO_BPM_MAX)?;
        for (field, axis) in [("joystick_x", &self.joystick_x), ("joystick_y", &self.joystick_y)] {
            let max = match axis.mode {
                JoystickMode::PitchBend => MIDI_CHANNEL_MAX,
                JoystickMode::SingleCc | JoystickMode::DualCc => U7_MAX,
            };
            check_range(format!("{field}.negative"), axis.negative, 0, max)?;
            check_range(format!("{field}.positive"), axis.positive, 0, max)?;
        }
        check_len("pads", self.pads.len(), PAD_COUNT)?;
        for (index, pad) in self.pads.iter().enumerate() {
            check_range(format!("pads[{index}].note"), pad.note, 0, U7_MAX)?;
            check_range(format!("pads[{index}].program"), pad.program, 0, U7_MAX)?;
            check_range(format!("pads[{index}].cc"), pad.cc, 0, U7_MAX)?;
        }
        check_len("knobs", self.knobs.len(), KNOB_COUNT)?;
        for (index, knob) in self.knobs.iter().enumerate() {
            check_range(format!("knobs[{index}].cc"), knob.cc, 0, U7_MAX)?;
            check_range(format!("knobs[{index}].min"), knob.min, 0, U7_MAX)?;
            check_range(format!("knobs[{index}].max"), knob.max, 0, U7_MAX)?;
            if !knob.name.is_ascii() {
                return Err(Error::InvalidName {
                    field: format!("knobs[{index}].name").into(),
                });
            }
        }
        if !self.name.is_ascii() {
            return Err(Error::InvalidName {
                field: "name".into(),
            });
        }
        check_range("transpose", self.transpose, 0, U7_MAX)?;
        Ok(())
    }

    /// Build the "write program" message.
    ///
    /// Returns a complete SysEx frame or an error if any field is
    /// out of range. Nothing is built for invalid programs.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let mut data = Vec::with_capacity(MESSAGE_LEN);
        data.extend_from_slice(&[MANUFACTURER_ID, DIRECTION_OUT, PRODUCT_ID, CMD_WRITE_PROGRAM]);
        data.extend_from_slice(&u14_to_u7_be(PAYLOAD_LEN));
        data.push(self.slot);
        // Placeholder for the name
        data.extend_from_slice(&[0; NAME_LEN]);
        debug_assert_eq!(OFFSET_GLOBALS, data.len());
        let Arpeggiator {
            enabled,
            mode,
            division,
            swing,
            octave,
            latch,
        } = self.arpeggiator;
        data.extend_from_slice(&[
            self.pads_channel,
            self.aftertouch as u8,
            self.keybed_channel,
            self.keybed_octave,
            if enabled { ARP_ON } else { ARP_OFF },
            mode as u8,
            division as u8,
            self.clock as u8,
            u8::from(latch),
            swing,
            self.tempo_taps,
        ]);
        data.extend_from_slice(&u14_to_u7_be(self.tempo_bpm));
        data.push(octave);
        for axis in [self.joystick_x, self.joystick_y] {
            data.extend_from_slice(&[axis.mode as u8, axis.negative, axis.positive]);
        }
        debug_assert_eq!(OFFSET_PADS, data.len());
        for pad in &self.pads {
            data.extend_from_slice(&[pad.note, pad.program, pad.cc]);
        }
        debug_assert_eq!(OFFSET_KNOBS, data.len());
        for (index, knob) in self.knobs.iter().enumerate() {
            data.extend_from_slice(&[knob.mode as u8, knob.cc, knob.min, knob.max]);
            let name = encode_name::<NAME_LEN>(format!("knobs[{index}].name"), &knob.name)?;
            data.extend_from_slice(&name);
        }
        debug_assert_eq!(OFFSET_TRANSPOSE, data.len());
        data.push(self.transpose);
        let name = encode_name::<NAME_LEN>("name", &self.name)?;
        data[OFFSET_NAME..OFFSET_NAME + NAME_LEN].copy_from_slice(&name);
        debug_assert_eq!(MESSAGE_LEN, data.len());
        Ok(frame(&data))
    }
}

/// Build the "query program" message for a program slot.
pub fn encode_query_program(slot: u8) -> Result<Vec<u8>> {
    check_range("slot", slot, 0, PROGRAM_SLOT_MAX)?;
    Ok(frame(&[
        MANUFACTURER_ID,
        DIRECTION_OUT,
        PRODUCT_ID,
        CMD_QUERY_PROGRAM,
        0,
        1,
        slot,
    ]))
}

fn decode_enum<T>(
    field: &'static str,
    value: u8,
    from_repr: impl FnOnce(u8) -> Option<T>,
) -> Result<T> {
    from_repr(value).ok_or(Error::InvalidField {
        field: field.into(),
        value: value.into(),
    })
}

fn decode_joystick_axis(field: &'static str, bytes: [u8; 3]) -> Result<JoystickAxis> {
    let [mode, negative, positive] = bytes;
    Ok(JoystickAxis {
        mode: decode_enum(field, mode, JoystickMode::from_repr)?,
        negative,
        positive,
    })
}

/// Parse a complete program message.
///
/// Accepts both the messages sent to the device and the program
/// data that the device sends in reply to a query.
pub fn decode_program(message: &[u8]) -> Result<DeviceProgram> {
    let data = unframe(message)?;
    if data.len() != MESSAGE_LEN {
        return Err(Error::InvalidLength {
            expected: MESSAGE_LEN,
            actual: data.len(),
        });
    }
    let &[MANUFACTURER_ID, DIRECTION_OUT | DIRECTION_IN, PRODUCT_ID, CMD_WRITE_PROGRAM | CMD_PROGRAM_DATA, len_hi, len_lo, slot] =
        &data[..OFFSET_NAME]
    else {
        return Err(Error::InvalidHeader);
    };
    let payload_len = u7_be_to_u14(len_hi, len_lo);
    if payload_len != PAYLOAD_LEN {
        return Err(Error::InvalidLength {
            expected: PAYLOAD_LEN.into(),
            actual: payload_len.into(),
        });
    }
    let name = decode_name(&data[OFFSET_NAME..OFFSET_GLOBALS]);
    let globals = &data[OFFSET_GLOBALS..OFFSET_PADS];
    let arpeggiator = Arpeggiator {
        enabled: globals[4] == ARP_ON,
        mode: decode_enum("arp_mode", globals[5], ArpMode::from_repr)?,
        division: decode_enum("arp_division", globals[6], ArpDivision::from_repr)?,
        latch: globals[8] != 0,
        swing: globals[9],
        octave: globals[13],
    };
    let pads = data[OFFSET_PADS..OFFSET_KNOBS]
        .chunks_exact(3)
        .map(|chunk| PadAssignment {
            note: chunk[0],
            program: chunk[1],
            cc: chunk[2],
        })
        .collect();
    let knobs = data[OFFSET_KNOBS..OFFSET_TRANSPOSE]
        .chunks_exact(KNOB_LEN)
        .map(|chunk| {
            Ok(KnobAssignment {
                mode: decode_enum("knob_mode", chunk[0], KnobMode::from_repr)?,
                cc: chunk[1],
                min: chunk[2],
                max: chunk[3],
                name: decode_name(&chunk[4..]),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let program = DeviceProgram {
        slot,
        name,
        pads_channel: globals[0],
        aftertouch: decode_enum("aftertouch", globals[1], Aftertouch::from_repr)?,
        keybed_channel: globals[2],
        keybed_octave: globals[3],
        arpeggiator,
        clock: decode_enum("clock", globals[7], ClockSource::from_repr)?,
        tempo_taps: globals[10],
        tempo_bpm: u7_be_to_u14(globals[11], globals[12]),
        joystick_x: decode_joystick_axis("joystick_x", [globals[14], globals[15], globals[16]])?,
        joystick_y: decode_joystick_axis("joystick_y", [globals[17], globals[18], globals[19]])?,
        pads,
        knobs,
        transpose: data[OFFSET_TRANSPOSE],
    };
    Ok(program)
}
