use std::marker::PhantomData;
use std::sync::Arc;

use log::{error, info, warn};

use crate::commands::Commands;
use crate::config::BacklightConfig;
use crate::error::Error;
use crate::events::Events;
use crate::gpio::OutputLineService;
use crate::input::InputSource;
use crate::message_bus::{BusHandler, BusSender, MessageBus};
use crate::modules::backlight::BacklightController;
use crate::modules::input_listener::InputListener;

pub struct BacklightModule<S, I> {
    _marker: PhantomData<(S, I)>,
}

pub struct Context<S: OutputLineService, I: InputSource> {
    controller: Arc<BacklightController<S>>,
    listener: InputListener<I, Arc<BacklightController<S>>>,
}

impl<S: OutputLineService, I: InputSource> BusHandler<Context<S, I>> for BacklightModule<S, I> {
    async fn event_handler(bus: &BusSender, context: &mut Context<S, I>, event: Events) {
        match event {
            Events::DeviceConnected(device) => {
                if let Err(err) = context.listener.on_device_discovered(&device) {
                    warn!("skipping {}: {}", device.name, err);
                }
            }
            Events::DeviceDisconnected(device) => {
                context.listener.on_device_removed(device);
            }
            Events::Input(device, input) => {
                if context.listener.on_event(device, &input) {
                    bus.send_event(Events::Activity(input.code));
                }
            }
            _ => {}
        }
    }

    async fn command_handler(_bus: &BusSender, context: &mut Context<S, I>, command: Commands) {
        if let Commands::ForceActivity = command {
            context.controller.notify_activity();
        }
    }
}

impl<S: OutputLineService, I: InputSource> BacklightModule<S, I> {
    /// Runs the backlight until `Commands::Shutdown`.
    ///
    /// `bus` should be a [`MessageBus::subscriber`] so devices announced while
    /// the module starts up are not lost.
    pub async fn start(
        bus: MessageBus,
        gpio: Arc<S>,
        input: I,
        config: BacklightConfig,
    ) -> Result<(), Error> {
        info!("starting...");

        let initialized =
            BacklightController::initialize_on_bus(gpio, config.pin, config.hold, bus.sender());

        let controller = match initialized {
            Ok(controller) => Arc::new(controller),
            Err(err) => {
                error!("failed to start backlight: {}", err);
                return Err(err);
            }
        };

        let listener = InputListener::new(input, config.keys, controller.clone());

        let context = Context {
            controller,
            listener,
        };

        let mut context = MessageBus::handle::<Context<S, I>, Self>(bus, context).await;

        context.listener.unbind();
        context.controller.shutdown();

        info!("done.");

        Ok(())
    }
}
