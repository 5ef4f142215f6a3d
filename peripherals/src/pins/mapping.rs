use ultralive_shared::config::{BacklightConfig, BoardConfig, ResetConfig};
use ultralive_shared::domain::PinId;

/// Board specific line numbers.
pub trait PinsMapping {
    fn backlight_pin(&self) -> PinId;

    fn gps_reset_pin(&self) -> PinId;

    fn board_config(&self) -> BoardConfig {
        BoardConfig {
            backlight: BacklightConfig {
                pin: self.backlight_pin(),
                ..BacklightConfig::default()
            },
            gps_reset: ResetConfig {
                pin: self.gps_reset_pin(),
                ..ResetConfig::default()
            },
        }
    }
}
