use std::sync::Arc;
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::domain::{Level, PinId};
use crate::error::Error;
use crate::events::Events;
use crate::gpio::{OutputLine, OutputLineService};
use crate::message_bus::BusSender;
use crate::modules::input_listener::ActivitySink;
use crate::modules::timer::{Arming, RetriggerableTimer, TimerState};

/// State guarded together with the timer arming.
struct Backlight<L: OutputPin> {
    line: Option<OutputLine<L>>,
    notifier: Option<BusSender>,
    timeouts: u64,
}

impl<L: OutputPin> Backlight<L> {
    fn announce(&self, event: Events) {
        if let Some(bus) = &self.notifier {
            bus.send_event(event);
        }
    }
}

/// Keeps the backlight lit for `hold` after the last activity.
pub struct BacklightController<S: OutputLineService> {
    service: Arc<S>,
    hold: Duration,
    timer: RetriggerableTimer<Backlight<S::Line>>,
}

impl<S: OutputLineService> BacklightController<S> {
    pub const LABEL: &'static str = "output_gpio";

    /// Acquires `pin` low, then lights it for one full hold window.
    ///
    /// Must be called from within a tokio runtime. Nothing is armed and no line
    /// stays reserved when this fails.
    pub fn initialize(service: Arc<S>, pin: PinId, hold: Duration) -> Result<Self, Error> {
        Self::create(service, pin, hold, None)
    }

    /// Same as [`BacklightController::initialize`], and publishes
    /// `BacklightOn`/`BacklightOff` on every level transition.
    pub fn initialize_on_bus(
        service: Arc<S>,
        pin: PinId,
        hold: Duration,
        bus: BusSender,
    ) -> Result<Self, Error> {
        Self::create(service, pin, hold, Some(bus))
    }

    fn create(
        service: Arc<S>,
        pin: PinId,
        hold: Duration,
        notifier: Option<BusSender>,
    ) -> Result<Self, Error> {
        let line = OutputLine::acquire(service.as_ref(), pin, Self::LABEL, Level::Low)?;

        let backlight = Backlight {
            line: Some(line),
            notifier,
            timeouts: 0,
        };

        let controller = Self {
            service,
            hold,
            timer: RetriggerableTimer::new(backlight, Self::on_timeout),
        };

        controller.notify_activity();

        Ok(controller)
    }

    pub fn notify_activity(&self) {
        let mut backlight = self.timer.lock();

        let Some(line) = backlight.line.as_mut() else {
            debug!("activity after shutdown ignored");
            return;
        };

        let was_lit = line.level() == Level::High;
        line.set_high();

        backlight.reschedule(self.hold);

        if !was_lit {
            info!("backlight on");
            backlight.announce(Events::BacklightOn);
        }
    }

    fn on_timeout(backlight: &mut Backlight<S::Line>, _arming: Arming) {
        let Some(line) = backlight.line.as_mut() else {
            return;
        };

        line.set_low();
        backlight.timeouts += 1;

        info!("backlight off");
        backlight.announce(Events::BacklightOff);
    }

    /// Cancels the timer, forces the line low and releases it. Idempotent.
    pub fn shutdown(&self) {
        let mut backlight = self.timer.lock();

        backlight.cancel();

        if let Some(mut line) = backlight.line.take() {
            line.set_low();
            line.release(self.service.as_ref());
            info!("backlight controller shut down");
        }
    }

    pub fn level(&self) -> Level {
        self.timer
            .lock()
            .line
            .as_ref()
            .map_or(Level::Low, |line| line.level())
    }

    pub fn is_lit(&self) -> bool {
        self.level() == Level::High
    }

    pub fn is_released(&self) -> bool {
        self.timer.lock().line.is_none()
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.lock().state()
    }

    /// Number of hold windows that ran out.
    pub fn timeouts(&self) -> u64 {
        self.timer.lock().timeouts
    }
}

impl<S: OutputLineService> ActivitySink for BacklightController<S> {
    fn notify_activity(&self) {
        BacklightController::notify_activity(self);
    }
}

impl<S: OutputLineService> Drop for BacklightController<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
