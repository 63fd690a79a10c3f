// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

#[cfg(feature = "akai-mpk-mini-mk3")]
pub mod akai_mpk_mini_mk3;

#[cfg(feature = "novation-launchpad-mini-mk3")]
pub mod novation_launchpad_mini_mk3;

// Descriptors of supported MIDI controllers for auto-detection.
pub const MIDI_CONTROLLER_DESCRIPTORS: &[&crate::MidiDeviceDescriptor] = &[
    #[cfg(feature = "akai-mpk-mini-mk3")]
    crate::devices::akai_mpk_mini_mk3::MIDI_DEVICE_DESCRIPTOR,
    #[cfg(feature = "novation-launchpad-mini-mk3")]
    crate::devices::novation_launchpad_mini_mk3::MIDI_DEVICE_DESCRIPTOR,
];

#[cfg(test)]
mod tests {
    use super::MIDI_CONTROLLER_DESCRIPTORS;

    #[test]
    fn port_name_prefixes_are_unique() {
        for (index, descriptor) in MIDI_CONTROLLER_DESCRIPTORS.iter().enumerate() {
            assert!(!descriptor.port_name_prefix.is_empty());
            assert!(MIDI_CONTROLLER_DESCRIPTORS[index + 1..]
                .iter()
                .all(|other| other.port_name_prefix != descriptor.port_name_prefix));
        }
    }
}
