pub mod backlight;
pub mod backlight_module;
pub mod gps_reset;
pub mod input_listener;
pub mod lifecycle;
pub mod logging_module;
pub mod timer;
