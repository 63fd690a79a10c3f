// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Connects the first supported controller to a workstation that only
//! logs what it is asked to do.

use std::{collections::HashMap, time::Duration};

use padio::{
    app::{
        Action, ActionSink, ChainId, ChainInfo, Mixer, MixerChannel, Sequencer, Signal,
        SignalRegistry,
    },
    controller::{Driver, DriverThread},
    devices::{akai_mpk_mini_mk3, novation_launchpad_mini_mk3, MIDI_CONTROLLER_DESCRIPTORS},
    midi::midir::MidirDeviceManager,
    Clock, MidiOutputConnection,
};

const CHAIN_COUNT: u8 = 8;

#[derive(Debug)]
struct LogWorkstation {
    active_chain: Option<ChainId>,
    levels: HashMap<MixerChannel, f32>,
    balances: HashMap<MixerChannel, f32>,
    mutes: HashMap<MixerChannel, bool>,
    solos: HashMap<MixerChannel, bool>,
    tempo: f32,
}

impl Default for LogWorkstation {
    fn default() -> Self {
        Self {
            active_chain: None,
            levels: HashMap::new(),
            balances: HashMap::new(),
            mutes: HashMap::new(),
            solos: HashMap::new(),
            tempo: 120.0,
        }
    }
}

impl ActionSink for LogWorkstation {
    fn send_action(&mut self, action: Action) {
        println!("Action: {action}");
    }
}

impl Mixer for LogWorkstation {
    fn chain_by_index(&self, index: usize) -> Option<ChainInfo> {
        // Index 0 is the main chain on the last mixer channel
        let id = ChainId::try_from(index).ok()?;
        if id > ChainId::from(CHAIN_COUNT) {
            return None;
        }
        let mixer_channel = if id == 0 {
            CHAIN_COUNT
        } else {
            MixerChannel::try_from(id - 1).ok()?
        };
        Some(ChainInfo { id, mixer_channel })
    }

    fn active_chain(&self) -> Option<ChainId> {
        self.active_chain
    }

    fn set_active_chain(&mut self, id: ChainId) {
        println!("Active chain: {id}");
        self.active_chain = Some(id);
    }

    fn level(&self, channel: MixerChannel) -> f32 {
        self.levels.get(&channel).copied().unwrap_or(0.8)
    }

    fn set_level(&mut self, channel: MixerChannel, level: f32) {
        println!("Level of channel {channel}: {level:.2}");
        self.levels.insert(channel, level);
    }

    fn balance(&self, channel: MixerChannel) -> f32 {
        self.balances.get(&channel).copied().unwrap_or_default()
    }

    fn set_balance(&mut self, channel: MixerChannel, balance: f32) {
        println!("Balance of channel {channel}: {balance:.2}");
        self.balances.insert(channel, balance);
    }

    fn mute(&self, channel: MixerChannel) -> bool {
        self.mutes.get(&channel).copied().unwrap_or_default()
    }

    fn set_mute(&mut self, channel: MixerChannel, mute: bool) {
        println!("Mute of channel {channel}: {mute}");
        self.mutes.insert(channel, mute);
    }

    fn solo(&self, channel: MixerChannel) -> bool {
        self.solos.get(&channel).copied().unwrap_or_default()
    }

    fn set_solo(&mut self, channel: MixerChannel, solo: bool) {
        println!("Solo of channel {channel}: {solo}");
        self.solos.insert(channel, solo);
    }
}

impl Sequencer for LogWorkstation {
    fn tempo(&self) -> f32 {
        self.tempo
    }

    fn set_tempo(&mut self, bpm: f32) {
        println!("Tempo: {bpm:.1} BPM");
        self.tempo = bpm;
    }

    fn send_midi(&mut self, message: &[u8]) {
        println!("MIDI: {message:02x?}");
    }
}

impl SignalRegistry for LogWorkstation {
    fn subscribe(&mut self, signal: Signal) {
        println!("Subscribed to {signal}");
    }

    fn unsubscribe(&mut self, signal: Signal) {
        println!("Unsubscribed from {signal}");
    }
}

fn new_driver<O>(port_name_prefix: &str, output: O) -> Driver<LogWorkstation, O>
where
    O: MidiOutputConnection,
{
    let app = LogWorkstation::default();
    if port_name_prefix == novation_launchpad_mini_mk3::MIDI_DEVICE_DESCRIPTOR.port_name_prefix {
        novation_launchpad_mini_mk3::new_driver(app, output)
    } else {
        akai_mpk_mini_mk3::new_driver(app, output)
    }
}

fn main() {
    pretty_env_logger::init();
    match run() {
        Ok(()) => (),
        Err(err) => println!("Error: {err}"),
    }
}

fn run() -> anyhow::Result<()> {
    let device_manager = MidirDeviceManager::new()?;
    let mut devices = device_manager.detect_devices(MIDI_CONTROLLER_DESCRIPTORS);
    if devices.is_empty() {
        anyhow::bail!("No supported controllers found");
    }
    let device = devices.remove(0);
    let prefix = device.descriptor().port_name_prefix;
    println!(
        "{device_name}: connecting",
        device_name = device.descriptor().device.name()
    );
    let connection = device
        .connect_driver(Clock::start(), |output| new_driver(prefix, output))
        .map_err(|err| anyhow::anyhow!("{err}"))?;
    let driver_thread = DriverThread::spawn(
        connection.driver().clone(),
        padio::controller::DEFAULT_POLL_INTERVAL,
    );

    println!("Running for one minute...");
    std::thread::sleep(Duration::from_secs(60));

    driver_thread.abort_and_join()?;
    connection.close().map_err(|err| anyhow::anyhow!("{err}"))?;
    Ok(())
}
