// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Keyboard shortcuts for application actions.
//!
//! Keys are identified by X11 keycodes. In configuration files they
//! are written as HTML key names optionally followed by modifier
//! names, e.g. `"Period,shift,ctrl"`.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
};

use anyhow::Context as _;

use crate::app::{Action, SwitchPress};

pub use crate::app::ParseActionError;

/// X11 keycode
pub type KeyCode = u8;

/// Bit mask of keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::From)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1);
    pub const CAPS_LOCK: Self = Self(2);
    pub const CTRL: Self = Self(4);
    pub const ALT: Self = Self(8);
    pub const NUM_LOCK: Self = Self(16);
    pub const SHIFT_RIGHT: Self = Self(32);
    pub const SUPER: Self = Self(64);
    pub const ALT_GR: Self = Self(128);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

const MODIFIER_NAMES: [(&str, Modifiers); 8] = [
    ("shift", Modifiers::SHIFT),
    ("caps", Modifiers::CAPS_LOCK),
    ("ctrl", Modifiers::CTRL),
    ("alt", Modifiers::ALT),
    ("num", Modifiers::NUM_LOCK),
    ("shift_r", Modifiers::SHIFT_RIGHT),
    ("super", Modifiers::SUPER),
    ("altgr", Modifiers::ALT_GR),
];

/// Modifier token of bindings that match any modifiers.
const ANY_MODIFIERS: &str = "*";

const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("Escape", 9),
    ("Digit1", 10),
    ("Digit2", 11),
    ("Digit3", 12),
    ("Digit4", 13),
    ("Digit5", 14),
    ("Digit6", 15),
    ("Digit7", 16),
    ("Digit8", 17),
    ("Digit9", 18),
    ("Digit0", 19),
    ("Minus", 20),
    ("Equal", 21),
    ("Backspace", 22),
    ("Tab", 23),
    ("KeyQ", 24),
    ("KeyW", 25),
    ("KeyE", 26),
    ("KeyR", 27),
    ("KeyT", 28),
    ("KeyY", 29),
    ("KeyU", 30),
    ("KeyI", 31),
    ("KeyO", 32),
    ("KeyP", 33),
    ("BracketLeft", 34),
    ("BracketRight", 35),
    ("Enter", 36),
    ("ControlLeft", 37),
    ("KeyA", 38),
    ("KeyS", 39),
    ("KeyD", 40),
    ("KeyF", 41),
    ("KeyG", 42),
    ("KeyH", 43),
    ("KeyJ", 44),
    ("KeyK", 45),
    ("KeyL", 46),
    ("Semicolon", 47),
    ("Quote", 48),
    ("Backquote", 49),
    ("ShiftLeft", 50),
    ("Backslash", 51),
    ("KeyZ", 52),
    ("KeyX", 53),
    ("KeyC", 54),
    ("KeyV", 55),
    ("KeyB", 56),
    ("KeyN", 57),
    ("KeyM", 58),
    ("Comma", 59),
    ("Period", 60),
    ("Slash", 61),
    ("ShiftRight", 62),
    ("NumpadMultiply", 63),
    ("AltLeft", 64),
    ("Space", 65),
    ("CapsLock", 66),
    ("F1", 67),
    ("F2", 68),
    ("F3", 69),
    ("F4", 70),
    ("F5", 71),
    ("F6", 72),
    ("F7", 73),
    ("F8", 74),
    ("F9", 75),
    ("F10", 76),
    ("NumLock", 77),
    ("ScrollLock", 78),
    ("Numpad7", 79),
    ("Numpad8", 80),
    ("Numpad9", 81),
    ("NumpadSubtract", 82),
    ("Numpad4", 83),
    ("Numpad5", 84),
    ("Numpad6", 85),
    ("NumpadAdd", 86),
    ("Numpad1", 87),
    ("Numpad2", 88),
    ("Numpad3", 89),
    ("Numpad0", 90),
    ("NumpadDecimal", 91),
    ("IntlBackslash", 94),
    ("F11", 95),
    ("F12", 96),
    ("NumpadEnter", 104),
    ("ControlRight", 105),
    ("NumpadDivide", 106),
    ("AltRight", 108),
    ("Home", 110),
    ("ArrowUp", 111),
    ("PageUp", 112),
    ("ArrowLeft", 113),
    ("ArrowRight", 114),
    ("End", 115),
    ("ArrowDown", 116),
    ("PageDown", 117),
    ("Insert", 118),
    ("Delete", 119),
    ("Pause", 127),
    ("ContextMenu", 135),
    ("BrowserBack", 166),
    ("BrowserForward", 167),
    ("BrowserReload", 181),
];

/// Keys of the numeric keypad, which depend on num lock.
const NUMPAD_KEYS: [KeyCode; 17] = [
    63, 77, 79, 80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 91, 104, 106,
];

#[must_use]
pub fn keycode_from_name(name: &str) -> Option<KeyCode> {
    KEY_NAMES
        .iter()
        .find_map(|(key_name, keycode)| (*key_name == name).then_some(*keycode))
}

#[must_use]
pub fn keycode_name(keycode: KeyCode) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find_map(|(key_name, other)| (*other == keycode).then_some(*key_name))
}

/// Only the modifiers that are relevant for the key.
///
/// Numeric keypad keys ignore caps lock, all other keys ignore
/// num lock.
#[must_use]
pub fn effective_modifiers(keycode: KeyCode, modifiers: Modifiers) -> Modifiers {
    if NUMPAD_KEYS.contains(&keycode) {
        modifiers.without(Modifiers::CAPS_LOCK)
    } else {
        modifiers.without(Modifiers::NUM_LOCK)
    }
}

/// A key with either explicit modifiers or any modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub keycode: KeyCode,
    /// `None` matches every combination that is not bound explicitly.
    pub modifiers: Option<Modifiers>,
}

impl KeyCombo {
    /// Drop the lock modifiers that are irrelevant for the key.
    #[must_use]
    pub fn normalized(self) -> Self {
        let Self { keycode, modifiers } = self;
        Self {
            keycode,
            modifiers: modifiers.map(|modifiers| effective_modifiers(keycode, modifiers)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseKeyComboError {
    #[error("unknown key {0}")]
    UnknownKey(String),
    #[error("unknown modifier {0}")]
    UnknownModifier(String),
}

impl std::str::FromStr for KeyCombo {
    type Err = ParseKeyComboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let key = parts.next().unwrap_or_default();
        let keycode =
            keycode_from_name(key).ok_or_else(|| ParseKeyComboError::UnknownKey(key.to_owned()))?;
        let mut modifiers = Some(Modifiers::NONE);
        for part in parts {
            if part == ANY_MODIFIERS {
                modifiers = None;
                continue;
            }
            let modifier = MODIFIER_NAMES
                .iter()
                .find_map(|(name, modifier)| (*name == part).then_some(*modifier))
                .ok_or_else(|| ParseKeyComboError::UnknownModifier(part.to_owned()))?;
            modifiers = modifiers.map(|modifiers| modifiers.union(modifier));
        }
        Ok(Self { keycode, modifiers })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match keycode_name(self.keycode) {
            Some(name) => f.write_str(name)?,
            None => write!(f, "{}", self.keycode)?,
        }
        let Some(modifiers) = self.modifiers else {
            return write!(f, ",{ANY_MODIFIERS}");
        };
        for (name, modifier) in MODIFIER_NAMES {
            if modifiers.contains(modifier) {
                write!(f, ",{name}")?;
            }
        }
        Ok(())
    }
}

const fn switch(index: u8) -> Action {
    Action::Switch {
        index,
        press: SwitchPress::Short,
    }
}

const fn encoder(index: u8, delta: i32) -> Action {
    Action::Encoder { index, delta }
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("Space", Action::AllNotesOff),
    ("Space,shift", Action::AllSoundsOff),
    ("Home,shift", Action::RestartUi),
    ("Home,ctrl", Action::Reboot),
    ("End,ctrl", Action::PowerOff),
    ("Insert,ctrl", Action::ReloadMidiConfig),
    ("KeyI", switch(0)),
    ("KeyK", switch(1)),
    ("Backspace", switch(1)),
    ("Escape", switch(1)),
    ("KeyO", switch(2)),
    ("KeyL", switch(3)),
    ("Enter", switch(3)),
    ("Period,ctrl", encoder(1, 1)),
    ("Comma,ctrl", encoder(1, -1)),
    ("Period", encoder(3, 1)),
    ("Comma", encoder(3, -1)),
    ("Period,shift,ctrl", encoder(0, 1)),
    ("Comma,shift,ctrl", encoder(0, -1)),
    ("Period,shift", encoder(2, 1)),
    ("Comma,shift", encoder(2, -1)),
    ("KeyA", Action::StartAudioRecord),
    ("KeyA,shift", Action::StopAudioRecord),
    ("KeyA,alt", Action::ToggleAudioRecord),
    ("KeyA,ctrl", Action::StartAudioPlay),
    ("KeyA,shift,ctrl", Action::StopAudioPlay),
    ("KeyA,ctrl,alt", Action::ToggleAudioPlay),
    ("KeyM", Action::StartMidiRecord),
    ("KeyM,shift", Action::StopMidiRecord),
    ("KeyM,alt", Action::ToggleMidiRecord),
    ("KeyM,ctrl", Action::StartMidiPlay),
    ("KeyM,shift,ctrl", Action::StopMidiPlay),
    ("KeyM,ctrl,alt", Action::ToggleMidiPlay),
    ("ArrowDown", Action::ArrowDown),
    ("ArrowUp", Action::ArrowUp),
    ("ArrowRight", Action::ArrowRight),
    ("ArrowLeft", Action::ArrowLeft),
    ("Numpad2", Action::ArrowDown),
    ("Numpad8", Action::ArrowUp),
    ("Numpad6", Action::ArrowRight),
    ("Numpad4", Action::ArrowLeft),
    ("NumpadEnter", switch(3)),
    ("Numpad7", switch(0)),
    ("Numpad1", switch(1)),
    ("Numpad9", switch(2)),
    ("Numpad3", switch(3)),
    ("Digit1", Action::ProgramChange(1)),
    ("Digit2", Action::ProgramChange(2)),
    ("Digit3", Action::ProgramChange(3)),
    ("Digit4", Action::ProgramChange(4)),
    ("Digit5", Action::ProgramChange(5)),
    ("Digit6", Action::ProgramChange(6)),
    ("Digit7", Action::ProgramChange(7)),
    ("Digit8", Action::ProgramChange(8)),
    ("Digit9", Action::ProgramChange(9)),
    ("Digit0", Action::ProgramChange(0)),
];

/// Maps key combinations onto actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybindings {
    bindings: HashMap<KeyCombo, Action>,
}

impl Default for Keybindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        for (combo, action) in DEFAULT_BINDINGS {
            match combo.parse() {
                Ok(combo) => {
                    bindings.bindings.insert(combo, *action);
                }
                Err(err) => {
                    log::error!("Invalid default key binding {combo}: {err}");
                }
            }
        }
        bindings
    }
}

impl Keybindings {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind an action, replacing any previous binding of the combo.
    pub fn bind(&mut self, combo: KeyCombo, action: Action) -> Option<Action> {
        self.bindings.insert(combo.normalized(), action)
    }

    pub fn unbind(&mut self, combo: KeyCombo) -> Option<Action> {
        self.bindings.remove(&combo.normalized())
    }

    /// Look up the action for a pressed key.
    ///
    /// Explicit modifiers take precedence over a wildcard binding.
    #[must_use]
    pub fn action(&self, keycode: KeyCode, modifiers: Modifiers) -> Option<Action> {
        let modifiers = effective_modifiers(keycode, modifiers);
        let action = self
            .bindings
            .get(&KeyCombo {
                keycode,
                modifiers: Some(modifiers),
            })
            .or_else(|| {
                self.bindings.get(&KeyCombo {
                    keycode,
                    modifiers: None,
                })
            })
            .copied();
        if action.is_none() {
            log::debug!(
                "No action bound to key {keycode} with modifiers {modifiers}",
                modifiers = modifiers.bits()
            );
        }
        action
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build from a map of key combo names to action strings.
    ///
    /// Invalid entries are skipped.
    #[must_use]
    pub fn from_html_map(map: &BTreeMap<String, String>) -> Self {
        let mut bindings = Self::empty();
        for (combo, action) in map {
            let combo = match combo.parse::<KeyCombo>() {
                Ok(combo) => combo,
                Err(err) => {
                    log::warn!("Failed to load key binding for {combo}: {err}");
                    continue;
                }
            };
            let action = match action.parse::<Action>() {
                Ok(action) => action,
                Err(err) => {
                    log::warn!("Failed to load key binding for {combo}: {err}");
                    continue;
                }
            };
            bindings.bind(combo, action);
        }
        bindings
    }

    #[must_use]
    pub fn to_html_map(&self) -> BTreeMap<String, String> {
        self.bindings
            .iter()
            .map(|(combo, action)| (combo.to_string(), action.to_string()))
            .collect()
    }

    /// Load from a JSON file, falling back to the defaults.
    #[must_use]
    pub fn load_from_file(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!(
                    "Failed to read key bindings from {path}: {err}",
                    path = path.display()
                );
                return Self::default();
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&json) {
            Ok(map) => Self::from_html_map(&map),
            Err(err) => {
                log::warn!(
                    "Failed to parse key bindings from {path}: {err}",
                    path = path.display()
                );
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.to_html_map())
            .context("Failed to serialize key bindings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write key bindings to {}", path.display()))?;
        log::info!("Saved key bindings to {path}", path = path.display());
        Ok(())
    }
}
