use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::domain::{Level, PinId};
use crate::error::Error;

/// Platform digital output service.
///
/// A line handed out by [`OutputLineService::acquire`] is exclusively owned by
/// the caller until it is passed back to [`OutputLineService::release`].
pub trait OutputLineService: Send + Sync + 'static {
    type Line: OutputPin + Send + 'static;

    fn acquire(&self, pin: PinId, label: &str) -> Result<Self::Line, Error>;

    fn configure_output(&self, line: &mut Self::Line, initial: Level) -> Result<(), Error>;

    fn release(&self, line: Self::Line);
}

/// An acquired, output-configured line.
pub struct OutputLine<L: OutputPin> {
    pin: PinId,
    line: L,
    level: Level,
}

impl<L: OutputPin> OutputLine<L> {
    /// Acquires `pin` and configures it as an output at `initial`.
    ///
    /// The reservation is handed back to the service when configuration fails.
    pub fn acquire<S>(service: &S, pin: PinId, label: &str, initial: Level) -> Result<Self, Error>
    where
        S: OutputLineService<Line = L>,
    {
        let mut line = service.acquire(pin, label)?;

        if let Err(err) = service.configure_output(&mut line, initial) {
            service.release(line);
            return Err(err);
        }

        info!("{} acquired as {} output, {:?}", pin, label, initial);

        Ok(Self {
            pin,
            line,
            level: initial,
        })
    }

    pub fn release<S>(self, service: &S)
    where
        S: OutputLineService<Line = L>,
    {
        service.release(self.line);
        info!("{} released", self.pin);
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn set_high(&mut self) {
        self.set(Level::High);
    }

    pub fn set_low(&mut self) {
        self.set(Level::Low);
    }

    pub fn set(&mut self, level: Level) {
        let result = match level {
            Level::High => self.line.set_high(),
            Level::Low => self.line.set_low(),
        };

        if let Err(err) = result {
            warn!("{} write {:?} failed: {:?}", self.pin, level, err);
        }

        self.level = level;
    }
}
