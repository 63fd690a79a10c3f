// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use super::{
    decode_name, encode_name,
    grid::{self, Fader, FaderOrientation, Layout},
    program::{
        decode_program, encode_query_program, Aftertouch, ArpMode, DeviceProgram, JoystickAxis,
        JoystickMode, KnobAssignment, MESSAGE_LEN,
    },
    Error,
};
use crate::{LedColor, LedMode};

fn sample_program() -> DeviceProgram {
    let mut program = DeviceProgram {
        slot: 0,
        name: "Padio MixPad".to_owned(),
        joystick_x: JoystickAxis::dual_cc(32, 33),
        ..Default::default()
    };
    for (index, knob) in program.knobs.iter_mut().enumerate() {
        *knob = KnobAssignment::relative(24 + index as u8, format!("Chain {}/{}", index + 1, index + 9));
    }
    for (index, pad) in program.pads.iter_mut().enumerate() {
        pad.cc = 8 + index as u8;
    }
    program
}

#[test]
fn encode_program_has_fixed_length() {
    let message = sample_program().encode().unwrap();
    assert_eq!(MESSAGE_LEN + 2, message.len());
    assert_eq!(0xf0, message[0]);
    assert_eq!(0xf7, message[message.len() - 1]);
    assert_eq!(&[0x47, 0x7f, 0x49, 0x64, 0x01, 0x76, 0x00], &message[1..8]);
}

#[test]
fn encode_program_global_settings() {
    let message = sample_program().encode().unwrap();
    // Globals start after the 16 byte name
    let globals = &message[24..44];
    assert_eq!(
        &[
            9, 0, 0, 4, 0, 0, 0, 0, 0, 0, 3, 0x00, 0x5a, 0, 2, 32, 33, 2, 1, 2
        ],
        globals
    );
    // Transpose is the last byte before the end delimiter
    assert_eq!(0x0c, message[message.len() - 2]);
}

#[test]
fn encode_program_tempo_uses_two_7bit_bytes() {
    let program = DeviceProgram {
        tempo_bpm: 200,
        ..Default::default()
    };
    let message = program.encode().unwrap();
    assert_eq!(&[0x01, 0x48], &message[35..37]);
}

#[test]
fn encode_program_rejects_out_of_range_fields() {
    let program = DeviceProgram {
        keybed_octave: 8,
        ..Default::default()
    };
    assert_eq!(
        Err(Error::InvalidField {
            field: "keybed_octave".into(),
            value: 8
        }),
        program.encode()
    );

    let program = DeviceProgram {
        tempo_bpm: 241,
        ..Default::default()
    };
    assert!(matches!(
        program.encode(),
        Err(Error::InvalidField { value: 241, .. })
    ));

    let program = DeviceProgram {
        slot: 9,
        ..Default::default()
    };
    assert!(program.encode().is_err());

    let mut program = DeviceProgram::default();
    program.pads[3].note = 128;
    assert_eq!(
        Err(Error::InvalidField {
            field: "pads[3].note".into(),
            value: 128
        }),
        program.encode()
    );

    let mut program = DeviceProgram::default();
    program.knobs.pop();
    assert_eq!(
        Err(Error::InvalidField {
            field: "knobs".into(),
            value: 7
        }),
        program.encode()
    );

    let program = DeviceProgram {
        pads_channel: 16,
        ..Default::default()
    };
    assert!(program.encode().is_err());
}

#[test]
fn encode_program_checks_joystick_channels_in_pitch_bend_mode() {
    let program = DeviceProgram {
        joystick_x: JoystickAxis {
            mode: JoystickMode::PitchBend,
            negative: 0,
            positive: 16,
        },
        ..Default::default()
    };
    assert_eq!(
        Err(Error::InvalidField {
            field: "joystick_x.positive".into(),
            value: 16
        }),
        program.encode()
    );

    // CC numbers may use the full range
    let program = DeviceProgram {
        joystick_x: JoystickAxis::dual_cc(16, 127),
        ..Default::default()
    };
    assert!(program.encode().is_ok());
}

#[test]
fn encode_program_rejects_non_ascii_names() {
    let program = DeviceProgram {
        name: "Über".to_owned(),
        ..Default::default()
    };
    assert_eq!(
        Err(Error::InvalidName {
            field: "name".into()
        }),
        program.encode()
    );
}

#[test]
fn decode_program_recovers_encoded_fields() {
    let mut program = sample_program();
    program.aftertouch = Aftertouch::Polyphonic;
    program.arpeggiator.enabled = true;
    program.arpeggiator.mode = ArpMode::Random;
    program.arpeggiator.swing = 25;
    program.pads[15].note = 67;
    let decoded = decode_program(&program.encode().unwrap()).unwrap();
    assert_eq!(program, decoded);
}

#[test]
fn decode_program_truncates_long_names() {
    let program = DeviceProgram {
        name: "A name that is way too long".to_owned(),
        ..Default::default()
    };
    let decoded = decode_program(&program.encode().unwrap()).unwrap();
    assert_eq!("A name that is w", decoded.name);
}

#[test]
fn decode_program_accepts_program_data_reply() {
    let mut message = DeviceProgram::default().encode().unwrap();
    message[2] = 0x00;
    message[4] = 0x67;
    assert!(decode_program(&message).is_ok());
    message[4] = 0x66;
    assert_eq!(Err(Error::InvalidHeader), decode_program(&message));
}

#[test]
fn decode_program_rejects_truncated_messages() {
    let message = DeviceProgram::default().encode().unwrap();
    let mut truncated = message[..100].to_vec();
    truncated.push(0xf7);
    assert!(matches!(
        decode_program(&truncated),
        Err(Error::InvalidLength { .. })
    ));
}

#[test]
fn query_program() {
    assert_eq!(
        vec![0xf0, 0x47, 0x7f, 0x49, 0x66, 0x00, 0x01, 0x03, 0xf7],
        encode_query_program(3).unwrap()
    );
    assert!(encode_query_program(9).is_err());
}

#[test]
fn name_fields() {
    assert_eq!(*b"Vol\0\0\0\0\0", encode_name::<8>("name", "Vol").unwrap());
    assert_eq!(*b"Stutter ", encode_name::<8>("name", "Stutter Count").unwrap());
    assert_eq!("Vol", decode_name(b"Vol\0\0\0\0\0"));
    assert_eq!("Stutter ", decode_name(b"Stutter "));
}

#[test]
fn grid_commands() {
    assert_eq!(
        vec![0xf0, 0x00, 0x20, 0x29, 0x02, 0x0d, 0x00, 0x0d, 0xf7],
        grid::select_layout(Layout::Faders)
    );
    assert_eq!(
        vec![0xf0, 0x00, 0x20, 0x29, 0x02, 0x0d, 0x10, 0x01, 0xf7],
        grid::set_daw_mode(true)
    );
    assert_eq!(
        vec![0xf0, 0x00, 0x20, 0x29, 0x02, 0x0d, 0x12, 0x01, 0x00, 0x01, 0xf7],
        grid::clear_daw_state()
    );
    assert_eq!(
        vec![0xf0, 0x00, 0x20, 0x29, 0x02, 0x0d, 0x09, 0x00, 0xf7],
        grid::set_leds_enabled(false)
    );
}

#[test]
fn grid_setup_faders() {
    let faders = [
        Some(Fader::unipolar(21)),
        None,
        Some(Fader::bipolar(23).with_color(LedColor::new(0x05))),
    ];
    assert_eq!(
        vec![
            0xf0, 0x00, 0x20, 0x29, 0x02, 0x0d, 0x01, 0x00, 0x00, //
            0x00, 0x00, 21, 0x25, //
            0x02, 0x01, 23, 0x05, //
            0xf7
        ],
        grid::setup_faders(FaderOrientation::Vertical, &faders).unwrap()
    );
}

#[test]
fn grid_setup_faders_rejects_more_than_eight() {
    let faders = [Some(Fader::unipolar(21)); 9];
    assert_eq!(
        Err(Error::TooManyFaders { count: 9 }),
        grid::setup_faders(FaderOrientation::Horizontal, &faders)
    );
}

#[test]
fn grid_led_messages() {
    let green = LedColor::new(0x15);
    assert_eq!(
        [0x90, 11, 0x15],
        grid::led_message(11, green, LedMode::Static)
    );
    assert_eq!(
        [0x92, 53, 0x15],
        grid::led_message(53, green, LedMode::Pulsing)
    );
    // Right column
    assert_eq!(
        [0xb1, 19, 0x15],
        grid::led_message(19, green, LedMode::Flashing)
    );
    // Top row
    assert_eq!([0xb0, 91, 0x15], grid::led_message(91, green, LedMode::Static));
}
