// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Transport adapter for [`midir`].
//!
//! Controllers are detected by the name prefix of their ports. A
//! detected device can be connected to a [`SharedDriver`] that
//! receives the input and owns the output connection.

use midir::{
    ConnectError, Ignore, InitError, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput,
    MidiOutputConnection, MidiOutputPort, SendError,
};
use thiserror::Error;

use super::{MidiDeviceDescriptor, MidiInputHandler, MidiPortDescriptor};
use crate::{
    app::Workstation,
    controller::{Driver, SharedDriver},
    Clock, OutputError, OutputResult, TimeStamp,
};

#[derive(Debug, Error)]
pub enum MidiPortError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    ConnectInput(#[from] ConnectError<MidiInput>),
    #[error(transparent)]
    ConnectOutput(#[from] ConnectError<MidiOutput>),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl From<SendError> for OutputError {
    fn from(err: SendError) -> Self {
        OutputError::Send {
            msg: err.to_string().into(),
        }
    }
}

impl super::MidiOutputConnection for MidiOutputConnection {
    fn send_midi_output(&mut self, output: &[u8]) -> OutputResult<()> {
        self.send(output).map_err(Into::into)
    }
}

/// Control surface with a matching pair of ports.
#[allow(missing_debug_implementations)]
pub struct MidirDevice {
    descriptor: &'static MidiDeviceDescriptor,
    input_port: (MidiPortDescriptor, MidiInputPort),
    output_port: (MidiPortDescriptor, MidiOutputPort),
}

impl MidirDevice {
    #[must_use]
    pub const fn descriptor(&self) -> &'static MidiDeviceDescriptor {
        self.descriptor
    }

    #[must_use]
    pub const fn input_port_descriptor(&self) -> &MidiPortDescriptor {
        &self.input_port.0
    }

    #[must_use]
    pub const fn output_port_descriptor(&self) -> &MidiPortDescriptor {
        &self.output_port.0
    }

    /// Open the output port.
    pub fn connect_output(&self) -> Result<MidiOutputConnection, MidiPortError> {
        let (descriptor, port) = &self.output_port;
        let output = MidiOutput::new(&descriptor.name)?;
        output.connect(port, &descriptor.name).map_err(Into::into)
    }

    /// Open the input port and feed all messages into `input_handler`.
    ///
    /// Timing and active sensing messages are ignored.
    pub fn connect_input<I>(&self, input_handler: I) -> Result<MidiInputConnection<I>, MidiPortError>
    where
        I: MidiInputHandler + 'static,
    {
        let (descriptor, port) = &self.input_port;
        let mut input = MidiInput::new(&descriptor.name)?;
        input.ignore(Ignore::TimeAndActiveSense);
        input
            .connect(
                port,
                &descriptor.name,
                |micros, input, input_handler| {
                    let ts = TimeStamp::from_micros(micros);
                    if !input_handler.handle_midi_input(ts, input) {
                        log::debug!("Unhandled MIDI input {ts} {input:x?}");
                    }
                },
                input_handler,
            )
            .map_err(Into::into)
    }

    /// Connect both ports to a new driver and take control of the device.
    ///
    /// The output is connected first, because the driver owns it.
    pub fn connect_driver<W>(
        &self,
        clock: Clock,
        new_driver: impl FnOnce(MidiOutputConnection) -> Driver<W, MidiOutputConnection>,
    ) -> Result<MidirDriverConnection<W>, MidiPortError>
    where
        W: Workstation + Send + 'static,
    {
        let output = self.connect_output()?;
        let driver = SharedDriver::new(new_driver(output), clock);
        driver
            .with_driver(|driver, now| driver.init(now))
            .transpose()?;
        let input = match self.connect_input(driver.clone()) {
            Ok(input) => input,
            Err(err) => {
                if let Some(Err(err)) = driver.with_driver(|driver, now| driver.end(now)) {
                    log::warn!("Failed to release device: {err}");
                }
                return Err(err);
            }
        };
        Ok(MidirDriverConnection { driver, input })
    }
}

/// A driver that is connected to both ports of a device.
#[allow(missing_debug_implementations)]
pub struct MidirDriverConnection<W: 'static> {
    driver: SharedDriver<W, MidiOutputConnection>,
    input: MidiInputConnection<SharedDriver<W, MidiOutputConnection>>,
}

impl<W> MidirDriverConnection<W>
where
    W: Workstation + 'static,
{
    #[must_use]
    pub const fn driver(&self) -> &SharedDriver<W, MidiOutputConnection> {
        &self.driver
    }

    /// Release the device and close both ports.
    pub fn close(self) -> OutputResult<()> {
        let Self { driver, input } = self;
        input.close();
        driver
            .with_driver(|driver, now| driver.end(now))
            .unwrap_or(Ok(()))
    }
}

/// Identifies [`MidirDevice`]s by their port names.
#[allow(missing_debug_implementations)]
pub struct MidirDeviceManager {
    input: MidiInput,
    output: MidiOutput,
}

impl MidirDeviceManager {
    pub fn new() -> Result<Self, InitError> {
        let mut input = MidiInput::new("padio input port watcher")?;
        input.ignore(Ignore::None);
        let output = MidiOutput::new("padio output port watcher")?;
        Ok(Self { input, output })
    }

    /// Find all connected devices that match one of the descriptors.
    ///
    /// A device is only returned if both an input and an output port
    /// with the name prefix of its descriptor exist. The first
    /// matching port wins.
    #[must_use]
    pub fn detect_devices(
        &self,
        device_descriptors: &[&'static MidiDeviceDescriptor],
    ) -> Vec<MidirDevice> {
        let input_ports = self
            .input
            .ports()
            .into_iter()
            .filter_map(|port| Some((self.input.port_name(&port).ok()?, port)))
            .collect::<Vec<_>>();
        let output_ports = self
            .output
            .ports()
            .into_iter()
            .filter_map(|port| Some((self.output.port_name(&port).ok()?, port)))
            .collect::<Vec<_>>();
        device_descriptors
            .iter()
            .copied()
            .filter_map(|descriptor| {
                let prefix = descriptor.port_name_prefix;
                let Some((input_name, input_port)) = input_ports
                    .iter()
                    .find(|(name, _)| name.starts_with(prefix))
                else {
                    log::debug!("No input port found for \"{prefix}\"");
                    return None;
                };
                let Some((output_name, output_port)) = output_ports
                    .iter()
                    .find(|(name, _)| name.starts_with(prefix))
                else {
                    log::debug!("No output port found for \"{prefix}\"");
                    return None;
                };
                log::info!(
                    "Found {device} (input port: \"{input_name}\", output port: \"{output_name}\")",
                    device = descriptor.device.name()
                );
                Some(MidirDevice {
                    descriptor,
                    input_port: (
                        MidiPortDescriptor {
                            name: input_name.clone().into(),
                        },
                        input_port.clone(),
                    ),
                    output_port: (
                        MidiPortDescriptor {
                            name: output_name.clone().into(),
                        },
                        output_port.clone(),
                    ),
                })
            })
            .collect()
    }
}
