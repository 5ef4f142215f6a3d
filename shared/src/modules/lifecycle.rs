use std::sync::Arc;

use log::{error, info};
use tokio::join;

use crate::commands::Commands;
use crate::config::BoardConfig;
use crate::error::Error;
use crate::gpio::OutputLineService;
use crate::input::InputSource;
use crate::message_bus::MessageBus;
use crate::modules::backlight_module::BacklightModule;
use crate::modules::gps_reset::GpsResetModule;
use crate::modules::logging_module::LoggingModule;

/// Outcome of each board module, reported once everything has shut down.
#[derive(Debug)]
pub struct LifecycleReport {
    pub gps_reset: Result<(), Error>,
    pub backlight: Result<(), Error>,
}

impl LifecycleReport {
    pub fn is_ok(&self) -> bool {
        self.gps_reset.is_ok() && self.backlight.is_ok()
    }
}

pub struct LifecycleManager {}

impl LifecycleManager {
    /// Brings up the GPS reset and the backlight independently and runs them
    /// until `Commands::Shutdown` is sent on `bus`.
    ///
    /// A module that fails to initialize is reported and left out, the other
    /// one keeps running. When neither starts, this returns right away.
    pub async fn start<S, I>(
        bus: &MessageBus,
        gpio: Arc<S>,
        input: I,
        config: BoardConfig,
    ) -> LifecycleReport
    where
        S: OutputLineService,
        I: InputSource,
    {
        info!("starting...");

        let logging_task = LoggingModule::start(bus.subscriber());
        let gps_reset_task = GpsResetModule::start(bus.subscriber(), gpio.clone(), config.gps_reset);
        let backlight_task = BacklightModule::start(bus.subscriber(), gpio, input, config.backlight);

        let sender = bus.sender();
        let modules_task = async move {
            let (gps_reset, backlight) = join!(gps_reset_task, backlight_task);

            if gps_reset.is_err() && backlight.is_err() {
                error!("no module is running, shutting down");
                sender.send_cmd(Commands::Shutdown);
            }

            (gps_reset, backlight)
        };

        let (_, (gps_reset, backlight)) = join!(logging_task, modules_task);

        let report = LifecycleReport {
            gps_reset,
            backlight,
        };

        if report.is_ok() {
            info!("done.");
        } else {
            error!("done with failures {:?}", report);
        }

        report
    }
}
