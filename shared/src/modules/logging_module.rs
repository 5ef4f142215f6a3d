use log::{debug, info};

use crate::commands::Commands;
use crate::events::Events;
use crate::message_bus::{BusHandler, BusSender, ContextStub, MessageBus};

pub struct LoggingModule {}

impl BusHandler<ContextStub> for LoggingModule {
    async fn event_handler(_bus: &BusSender, _context: &mut ContextStub, event: Events) {
        match event {
            Events::Input(device, input) => {
                debug!("{} {:?}", device, input);
            }
            Events::DeviceConnected(device) => {
                info!("{} {} connected", device.id, device.name);
            }
            _ => {
                info!("{}", event.as_ref());
            }
        }
    }

    async fn command_handler(_bus: &BusSender, _context: &mut ContextStub, command: Commands) {
        info!("{:?}", command);
    }
}

impl LoggingModule {
    pub async fn start(bus: MessageBus) {
        MessageBus::handle::<ContextStub, Self>(bus, ContextStub {}).await;
    }
}
