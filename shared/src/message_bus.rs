use std::{any::type_name, future::Future, mem};

use log::{debug, error, info, warn};
use tokio::{
    select,
    sync::broadcast::{channel, error::RecvError, Receiver, Sender},
};

use crate::{commands::Commands, events::Events};

pub struct BusSender {
    commands_sender: Sender<Commands>,
    events_sender: Sender<Events>,
}

pub struct MessageBus {
    sender: BusSender,
    commands_recv: Option<Receiver<Commands>>,
    events_recv: Option<Receiver<Events>>,
}

pub struct ContextStub {}

pub trait BusHandler<TContext> {
    fn event_handler(
        bus: &BusSender,
        context: &mut TContext,
        event: Events,
    ) -> impl Future<Output = ()> + Send;
    fn command_handler(
        bus: &BusSender,
        context: &mut TContext,
        command: Commands,
    ) -> impl Future<Output = ()> + Send;
}

impl Clone for MessageBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            commands_recv: None,
            events_recv: None,
        }
    }
}

impl BusSender {
    pub fn send_cmd(&self, command: Commands) {
        if let Err(err) = self.commands_sender.send(command) {
            warn!("no receivers for {:?}", err.0);
        }
    }

    pub fn send_event(&self, event: Events) {
        if let Err(err) = self.events_sender.send(event) {
            warn!("no receivers for {}", err.0.as_ref());
        }
    }
}

impl Clone for BusSender {
    fn clone(&self) -> Self {
        Self {
            commands_sender: self.commands_sender.clone(),
            events_sender: self.events_sender.clone(),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        let (commands_sender, commands_recv) = channel::<Commands>(20);
        let (events_sender, events_recv) = channel::<Events>(64);

        Self {
            sender: BusSender {
                commands_sender,
                events_sender,
            },
            commands_recv: Some(commands_recv),
            events_recv: Some(events_recv),
        }
    }

    /// A clone that is already subscribed, so nothing sent from now on is missed
    /// even if the handle loop starts later.
    pub fn subscriber(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            commands_recv: Some(self.sender.commands_sender.subscribe()),
            events_recv: Some(self.sender.events_sender.subscribe()),
        }
    }

    pub fn sender(&self) -> BusSender {
        self.sender.clone()
    }

    #[inline]
    pub async fn handle<TContext, THandler>(mut bus: MessageBus, mut context: TContext) -> TContext
    where
        THandler: BusHandler<TContext>,
    {
        let handler_type = type_name::<THandler>();

        let size_of_context = mem::size_of::<TContext>();

        debug!("context {} bytes", size_of_context);

        info!("starting handle loop... {}", handler_type);

        let commands_receiver = bus
            .commands_recv
            .get_or_insert_with(|| bus.sender.commands_sender.subscribe());
        let events_receiver = bus
            .events_recv
            .get_or_insert_with(|| bus.sender.events_sender.subscribe());

        loop {
            let break_loop = Self::handle_command_or_event::<TContext, THandler>(
                &bus.sender,
                commands_receiver,
                events_receiver,
                &mut context,
                handler_type,
            )
            .await;

            if break_loop {
                break;
            }
        }

        info!("done {}", handler_type);

        context
    }

    async fn handle_command_or_event<TContext, THandler>(
        sender: &BusSender,
        commands_receiver: &mut Receiver<Commands>,
        events_receiver: &mut Receiver<Events>,
        context: &mut TContext,
        handler_type: &str,
    ) -> bool
    where
        THandler: BusHandler<TContext>,
    {
        let mut break_loop = false;

        select! {
            command_res = commands_receiver.recv() => {
                match command_res {
                    Ok(command) => {
                        if matches!(command, Commands::Shutdown) {
                            break_loop = true;
                        }

                        THandler::command_handler(sender, context, command).await;
                    },
                    Err(RecvError::Closed) => {
                        break_loop = true;
                    },
                    Err(err) => {error!("{:?} {:?}", err, handler_type)},
                }
             }
             event_res = events_receiver.recv() => {
                match event_res {
                    Ok(event) => THandler::event_handler(sender, context, event).await,
                    Err(RecvError::Closed) => {
                        break_loop = true;
                    },
                    Err(err) => {error!("{:?} {:?}", err, handler_type)},
                }
            }
        }

        break_loop
    }

    pub fn send_cmd(&self, command: Commands) {
        self.sender.send_cmd(command);
    }

    pub fn send_event(&self, event: Events) {
        self.sender.send_event(event);
    }

    pub async fn wait_for(&mut self, target_event: Events) {
        let events_receiver = self
            .events_recv
            .get_or_insert_with(|| self.sender.events_sender.subscribe());

        info!("waiting for {}...", target_event.as_ref());

        loop {
            match events_receiver.recv().await {
                Ok(event) => {
                    if mem::discriminant(&event) == mem::discriminant(&target_event) {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
                Err(err) => {
                    error!("waiting for {} {:?}", target_event.as_ref(), err)
                }
            }
        }

        info!("resuming after {}", target_event.as_ref());
    }
}
