use ultralive_shared::domain::PinId;

use super::mapping::PinsMapping;

pub struct Ultralive {}

impl Ultralive {
    pub const KEYPAD_BACKLIGHT: PinId = PinId(38);
    pub const GPS_RESET: PinId = PinId(64);
}

impl PinsMapping for Ultralive {
    fn backlight_pin(&self) -> PinId {
        Self::KEYPAD_BACKLIGHT
    }

    fn gps_reset_pin(&self) -> PinId {
        Self::GPS_RESET
    }
}
