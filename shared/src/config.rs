use std::collections::BTreeSet;
use std::time::Duration;

use crate::domain::{Capability, InputDevice, KeyCode, PinId};

/// Key codes that count as backlight activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFilter {
    keys: BTreeSet<KeyCode>,
}

impl KeyFilter {
    pub fn new(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// The alphanumeric subset wired to the ultralive keypad.
    pub fn keypad() -> Self {
        Self::new([
            KeyCode::KEY_3,
            KeyCode::KEY_4,
            KeyCode::KEY_Q,
            KeyCode::KEY_W,
            KeyCode::KEY_E,
            KeyCode::KEY_R,
            KeyCode::KEY_U,
            KeyCode::KEY_I,
            KeyCode::KEY_A,
            KeyCode::KEY_S,
            KeyCode::KEY_D,
            KeyCode::KEY_F,
            KeyCode::KEY_J,
            KeyCode::KEY_K,
            KeyCode::KEY_L,
            KeyCode::KEY_C,
            KeyCode::KEY_V,
            KeyCode::KEY_N,
            KeyCode::KEY_M,
            KeyCode::KEY_COMMA,
        ])
    }

    pub fn contains(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    pub fn intersects(&self, keys: &BTreeSet<KeyCode>) -> bool {
        self.keys.iter().any(|key| keys.contains(key))
    }

    /// A device matches when it reports key events and at least one filtered key.
    pub fn matches(&self, device: &InputDevice) -> bool {
        device.capabilities.contains(Capability::Key) && self.intersects(&device.keys)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self::keypad()
    }
}

#[derive(Debug, Clone)]
pub struct BacklightConfig {
    pub pin: PinId,
    pub hold: Duration,
    pub keys: KeyFilter,
}

impl BacklightConfig {
    pub const DEFAULT_PIN: PinId = PinId(38);
    pub const DEFAULT_HOLD: Duration = Duration::from_millis(10_000);
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            pin: Self::DEFAULT_PIN,
            hold: Self::DEFAULT_HOLD,
            keys: KeyFilter::keypad(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResetConfig {
    pub pin: PinId,
    pub pulse: Duration,
}

impl ResetConfig {
    pub const DEFAULT_PIN: PinId = PinId(64);
    pub const DEFAULT_PULSE: Duration = Duration::from_millis(500);
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            pin: Self::DEFAULT_PIN,
            pulse: Self::DEFAULT_PULSE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoardConfig {
    pub backlight: BacklightConfig,
    pub gps_reset: ResetConfig,
}
