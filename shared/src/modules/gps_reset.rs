use std::sync::Arc;

use log::{error, info};
use tokio::time::sleep;

use crate::commands::Commands;
use crate::config::ResetConfig;
use crate::domain::Level;
use crate::error::Error;
use crate::events::Events;
use crate::gpio::{OutputLine, OutputLineService};
use crate::message_bus::{BusHandler, BusSender, ContextStub, MessageBus};

/// Pulses the GPS receiver reset line low once and keeps the line reserved
/// until teardown.
pub struct ResetSequencer<S: OutputLineService> {
    service: Arc<S>,
    line: Option<OutputLine<S::Line>>,
}

impl<S: OutputLineService> ResetSequencer<S> {
    pub const LABEL: &'static str = "gps_reset";

    pub async fn init(service: Arc<S>, config: &ResetConfig) -> Result<Self, Error> {
        let mut line = OutputLine::acquire(service.as_ref(), config.pin, Self::LABEL, Level::High)?;

        line.set_low();
        sleep(config.pulse).await;
        line.set_high();

        info!("GPS reset completed");

        Ok(Self {
            service,
            line: Some(line),
        })
    }

    pub fn teardown(mut self) {
        self.release();
        info!("GPS reset unloaded");
    }

    fn release(&mut self) {
        if let Some(line) = self.line.take() {
            line.release(self.service.as_ref());
        }
    }
}

impl<S: OutputLineService> Drop for ResetSequencer<S> {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct GpsResetModule {}

impl BusHandler<ContextStub> for GpsResetModule {
    async fn event_handler(_bus: &BusSender, _context: &mut ContextStub, _event: Events) {}

    async fn command_handler(_bus: &BusSender, _context: &mut ContextStub, _command: Commands) {}
}

impl GpsResetModule {
    /// Resets the receiver, then holds the line until `Commands::Shutdown`.
    pub async fn start<S: OutputLineService>(
        bus: MessageBus,
        gpio: Arc<S>,
        config: ResetConfig,
    ) -> Result<(), Error> {
        info!("starting...");

        let sequencer = match ResetSequencer::init(gpio, &config).await {
            Ok(sequencer) => sequencer,
            Err(err) => {
                error!("failed to reset GPS: {}", err);
                return Err(err);
            }
        };

        bus.send_event(Events::ResetCompleted(config.pin));

        MessageBus::handle::<ContextStub, Self>(bus, ContextStub {}).await;

        sequencer.teardown();

        info!("done.");

        Ok(())
    }
}
