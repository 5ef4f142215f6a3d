//! Keypad backlight and GPS reset control for the ultralive board.

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod gpio;
pub mod input;
pub mod message_bus;
pub mod modules;
