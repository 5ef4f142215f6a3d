use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::sync::Arc;

use critical_section::Mutex;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::debug;
use tokio::time::Instant;

use ultralive_shared::domain::{Level, PinId};
use ultralive_shared::error::Error;
use ultralive_shared::gpio::OutputLineService;

#[derive(Debug, Default)]
struct LineRecord {
    owner: Option<String>,
    output: bool,
    history: Vec<(Instant, Level)>,
}

#[derive(Debug, Default)]
struct Lines {
    lines: BTreeMap<PinId, LineRecord>,
    rejected: BTreeSet<PinId>,
    rejected_output: BTreeSet<PinId>,
}

impl Lines {
    fn record(&mut self, pin: PinId, level: Level) {
        let line = self.lines.entry(pin).or_default();
        line.history.push((Instant::now(), level));
    }
}

/// In-memory line service that keeps the level history of every pin.
#[derive(Clone)]
pub struct SimulatedGpio {
    lines: Arc<Mutex<RefCell<Lines>>>,
}

pub struct SimulatedLine {
    pin: PinId,
    lines: Arc<Mutex<RefCell<Lines>>>,
}

impl Default for SimulatedGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(RefCell::new(Lines::default()))),
        }
    }

    /// Makes every acquire of `pin` fail as if the platform refused it.
    pub fn reject(&self, pin: PinId) {
        self.with_lines(|lines| {
            lines.rejected.insert(pin);
        });
    }

    /// Makes the output direction change of `pin` fail.
    pub fn reject_output(&self, pin: PinId) {
        self.with_lines(|lines| {
            lines.rejected_output.insert(pin);
        });
    }

    /// Reserves `pin` for somebody else.
    pub fn reserve(&self, pin: PinId, owner: &str) {
        self.with_lines(|lines| {
            lines.lines.entry(pin).or_default().owner = Some(owner.to_string());
        });
    }

    pub fn is_reserved(&self, pin: PinId) -> bool {
        self.with_lines(|lines| lines.lines.get(&pin).is_some_and(|line| line.owner.is_some()))
    }

    pub fn is_output(&self, pin: PinId) -> bool {
        self.with_lines(|lines| lines.lines.get(&pin).is_some_and(|line| line.output))
    }

    pub fn owner(&self, pin: PinId) -> Option<String> {
        self.with_lines(|lines| lines.lines.get(&pin).and_then(|line| line.owner.clone()))
    }

    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.with_lines(|lines| {
            lines
                .lines
                .get(&pin)
                .and_then(|line| line.history.last())
                .map(|(_, level)| *level)
        })
    }

    pub fn history(&self, pin: PinId) -> Vec<Level> {
        self.timed_history(pin)
            .into_iter()
            .map(|(_, level)| level)
            .collect()
    }

    pub fn timed_history(&self, pin: PinId) -> Vec<(Instant, Level)> {
        self.with_lines(|lines| {
            lines
                .lines
                .get(&pin)
                .map(|line| line.history.clone())
                .unwrap_or_default()
        })
    }

    /// Level transitions only, repeated writes of the same level collapsed.
    pub fn transitions(&self, pin: PinId) -> Vec<Level> {
        let mut transitions = self.history(pin);
        transitions.dedup();
        transitions
    }

    fn with_lines<R>(&self, f: impl FnOnce(&mut Lines) -> R) -> R {
        critical_section::with(|cs| {
            let lines = &mut *self.lines.borrow_ref_mut(cs);
            f(lines)
        })
    }
}

impl OutputLineService for SimulatedGpio {
    type Line = SimulatedLine;

    fn acquire(&self, pin: PinId, label: &str) -> Result<Self::Line, Error> {
        self.with_lines(|lines| {
            if lines.rejected.contains(&pin) {
                return Err(Error::PinUnavailable(pin));
            }

            let line = lines.lines.entry(pin).or_default();

            if let Some(owner) = &line.owner {
                debug!("{} already owned by {}", pin, owner);
                return Err(Error::PinUnavailable(pin));
            }

            line.owner = Some(label.to_string());
            line.output = false;

            Ok(())
        })?;

        Ok(SimulatedLine {
            pin,
            lines: self.lines.clone(),
        })
    }

    fn configure_output(&self, line: &mut Self::Line, initial: Level) -> Result<(), Error> {
        self.with_lines(|lines| {
            if lines.rejected_output.contains(&line.pin) {
                return Err(Error::ConfigurationError(line.pin));
            }

            lines.lines.entry(line.pin).or_default().output = true;
            lines.record(line.pin, initial);

            Ok(())
        })
    }

    fn release(&self, line: Self::Line) {
        self.with_lines(|lines| {
            if let Some(record) = lines.lines.get_mut(&line.pin) {
                record.owner = None;
                record.output = false;
            }
        });
    }
}

impl SimulatedLine {
    fn write(&mut self, level: Level) {
        critical_section::with(|cs| {
            self.lines.borrow_ref_mut(cs).record(self.pin, level);
        });
    }
}

impl ErrorType for SimulatedLine {
    type Error = Infallible;
}

impl OutputPin for SimulatedLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(Level::High);
        Ok(())
    }
}
