use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use enumflags2::{bitflags, BitFlags};
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u32);

impl Display for PinId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "gpio{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Level::High
        } else {
            Level::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "input{}", self.0)
    }
}

/// Linux input event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum EventType {
    Syn = 0x00,
    Key = 0x01,
    Rel = 0x02,
    Abs = 0x03,
    Msc = 0x04,
}

/// Value carried by a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum KeyValue {
    Released = 0,
    Pressed = 1,
    Repeat = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const KEY_1: KeyCode = KeyCode(2);
    pub const KEY_2: KeyCode = KeyCode(3);
    pub const KEY_3: KeyCode = KeyCode(4);
    pub const KEY_4: KeyCode = KeyCode(5);
    pub const KEY_5: KeyCode = KeyCode(6);
    pub const KEY_6: KeyCode = KeyCode(7);
    pub const KEY_7: KeyCode = KeyCode(8);
    pub const KEY_8: KeyCode = KeyCode(9);
    pub const KEY_9: KeyCode = KeyCode(10);
    pub const KEY_0: KeyCode = KeyCode(11);
    pub const KEY_Q: KeyCode = KeyCode(16);
    pub const KEY_W: KeyCode = KeyCode(17);
    pub const KEY_E: KeyCode = KeyCode(18);
    pub const KEY_R: KeyCode = KeyCode(19);
    pub const KEY_T: KeyCode = KeyCode(20);
    pub const KEY_Y: KeyCode = KeyCode(21);
    pub const KEY_U: KeyCode = KeyCode(22);
    pub const KEY_I: KeyCode = KeyCode(23);
    pub const KEY_O: KeyCode = KeyCode(24);
    pub const KEY_P: KeyCode = KeyCode(25);
    pub const KEY_A: KeyCode = KeyCode(30);
    pub const KEY_S: KeyCode = KeyCode(31);
    pub const KEY_D: KeyCode = KeyCode(32);
    pub const KEY_F: KeyCode = KeyCode(33);
    pub const KEY_G: KeyCode = KeyCode(34);
    pub const KEY_H: KeyCode = KeyCode(35);
    pub const KEY_J: KeyCode = KeyCode(36);
    pub const KEY_K: KeyCode = KeyCode(37);
    pub const KEY_L: KeyCode = KeyCode(38);
    pub const KEY_Z: KeyCode = KeyCode(44);
    pub const KEY_X: KeyCode = KeyCode(45);
    pub const KEY_C: KeyCode = KeyCode(46);
    pub const KEY_V: KeyCode = KeyCode(47);
    pub const KEY_B: KeyCode = KeyCode(48);
    pub const KEY_N: KeyCode = KeyCode(49);
    pub const KEY_M: KeyCode = KeyCode(50);
    pub const KEY_COMMA: KeyCode = KeyCode(51);

    /// Maps a printable character to the key that produces it on a US layout.
    pub fn from_char(c: char) -> Option<KeyCode> {
        let code = match c.to_ascii_lowercase() {
            '1' => Self::KEY_1,
            '2' => Self::KEY_2,
            '3' => Self::KEY_3,
            '4' => Self::KEY_4,
            '5' => Self::KEY_5,
            '6' => Self::KEY_6,
            '7' => Self::KEY_7,
            '8' => Self::KEY_8,
            '9' => Self::KEY_9,
            '0' => Self::KEY_0,
            'q' => Self::KEY_Q,
            'w' => Self::KEY_W,
            'e' => Self::KEY_E,
            'r' => Self::KEY_R,
            't' => Self::KEY_T,
            'y' => Self::KEY_Y,
            'u' => Self::KEY_U,
            'i' => Self::KEY_I,
            'o' => Self::KEY_O,
            'p' => Self::KEY_P,
            'a' => Self::KEY_A,
            's' => Self::KEY_S,
            'd' => Self::KEY_D,
            'f' => Self::KEY_F,
            'g' => Self::KEY_G,
            'h' => Self::KEY_H,
            'j' => Self::KEY_J,
            'k' => Self::KEY_K,
            'l' => Self::KEY_L,
            'z' => Self::KEY_Z,
            'x' => Self::KEY_X,
            'c' => Self::KEY_C,
            'v' => Self::KEY_V,
            'b' => Self::KEY_B,
            'n' => Self::KEY_N,
            'm' => Self::KEY_M,
            ',' => Self::KEY_COMMA,
            _ => return None,
        };

        Some(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub event_type: EventType,
    pub code: KeyCode,
    pub value: i32,
}

impl InputEvent {
    pub fn key(code: KeyCode, value: KeyValue) -> Self {
        Self {
            event_type: EventType::Key,
            code,
            value: value.into(),
        }
    }

    pub fn is_key_press(&self) -> bool {
        self.event_type == EventType::Key
            && matches!(KeyValue::try_from(self.value), Ok(KeyValue::Pressed))
    }
}

/// Event classes a device advertises.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Key = 0b0000_0001,
    Rel = 0b0000_0010,
    Abs = 0b0000_0100,
    Msc = 0b0000_1000,
    Led = 0b0001_0000,
}

/// Capability descriptor handed over when an input device shows up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub id: DeviceId,
    pub name: String,
    pub capabilities: BitFlags<Capability>,
    pub keys: BTreeSet<KeyCode>,
}

impl InputDevice {
    pub fn keyboard(id: DeviceId, name: &str, keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            id,
            name: name.to_string(),
            capabilities: Capability::Key.into(),
            keys: keys.into_iter().collect(),
        }
    }
}
