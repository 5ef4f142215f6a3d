use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::time::sleep;

use ultralive_peripherals::gpio_sim::SimulatedGpio;
use ultralive_peripherals::input_sim::SimulatedInput;
use ultralive_peripherals::pins::mapping::PinsMapping;
use ultralive_peripherals::pins::ultralive::Ultralive;
use ultralive_shared::commands::Commands;
use ultralive_shared::domain::{DeviceId, InputEvent, KeyCode, KeyValue};
use ultralive_shared::events::Events;
use ultralive_shared::message_bus::MessageBus;
use ultralive_shared::modules::lifecycle::LifecycleManager;

extern crate ultralive_shared;

const KEYPAD: DeviceId = DeviceId(0);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .worker_threads(2)
        .build()?;

    rt.block_on(async { main_async().await })?;
    Ok(())
}

async fn main_async() -> Result<(), Box<dyn std::error::Error>> {
    let board = Ultralive {};
    let mut config = board.board_config();

    if let Ok(hold_ms) = std::env::var("ULTRALIVE_HOLD_MS") {
        config.backlight.hold = Duration::from_millis(hold_ms.parse()?);
    }

    info!(
        "backlight on {} for {:?}, GPS reset on {}",
        config.backlight.pin, config.backlight.hold, config.gps_reset.pin
    );

    let message_bus = MessageBus::new();
    let gpio = Arc::new(SimulatedGpio::new());
    let input = SimulatedInput::new(4);

    let lifecycle = LifecycleManager::start(&message_bus, gpio.clone(), input, config);

    let bus = message_bus.clone();
    let startup_sequence = async move {
        // let the modules subscribe before the keypad shows up
        sleep(Duration::from_millis(10)).await;
        bus.send_event(Events::DeviceConnected(SimulatedInput::keypad(KEYPAD)));

        let keys_task = tokio::task::spawn_blocking(move || read_keys(bus));

        if let Err(err) = keys_task.await {
            warn!("stdin reader failed: {}", err);
        }
    };

    let (report, _) = tokio::join!(lifecycle, startup_sequence);

    info!(
        "backlight {:?}, GPS reset {:?}",
        gpio.transitions(board.backlight_pin()),
        gpio.history(board.gps_reset_pin())
    );

    if !report.is_ok() {
        return Err(format!("{:?}", report).into());
    }

    Ok(())
}

fn read_keys(bus: MessageBus) {
    info!("type keys and press enter, 'q' to quit");

    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };

        if line.trim() == "q" {
            break;
        }

        for c in line.chars() {
            match KeyCode::from_char(c) {
                Some(code) => {
                    let press = InputEvent::key(code, KeyValue::Pressed);
                    let release = InputEvent::key(code, KeyValue::Released);

                    bus.send_event(Events::Input(KEYPAD, press));
                    bus.send_event(Events::Input(KEYPAD, release));
                }
                None => warn!("no key for {:?}", c),
            }
        }
    }

    bus.send_cmd(Commands::Shutdown);
}
