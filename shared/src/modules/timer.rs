use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::trace;
use tokio::select;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// One scheduling of the timer. Rescheduling always produces a new arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arming(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Armed { arming: Arming, expires_at: Instant },
}

struct Slot<T> {
    state: TimerState,
    armings: u64,
    data: T,
}

/// Single-shot countdown that can be restarted at any time before it fires.
///
/// The timer owns the data its expiry callback works on, and both sit behind
/// one lock. The driver task takes that lock, checks that the arming it slept
/// for is still the current one, moves to `Idle` and only then runs the
/// callback. Whatever is done through [`RetriggerableTimer::lock`] is therefore
/// serialized with expiry: after `cancel` or `reschedule` returns, no callback
/// runs for an earlier arming.
pub struct RetriggerableTimer<T> {
    slot: Arc<Mutex<Slot<T>>>,
    schedule: watch::Sender<TimerState>,
    driver: JoinHandle<()>,
}

/// Exclusive access to the timer and its data.
pub struct TimerGuard<'a, T> {
    slot: MutexGuard<'a, Slot<T>>,
    schedule: &'a watch::Sender<TimerState>,
}

impl<T: Send + 'static> RetriggerableTimer<T> {
    /// Spawns the expiry driver on the current tokio runtime.
    ///
    /// `on_expiry` runs on the driver task with the lock held and must not block.
    pub fn new<F>(data: T, on_expiry: F) -> Self
    where
        F: Fn(&mut T, Arming) + Send + Sync + 'static,
    {
        let slot = Arc::new(Mutex::new(Slot {
            state: TimerState::Idle,
            armings: 0,
            data,
        }));

        let (schedule, schedule_recv) = watch::channel(TimerState::Idle);
        let driver = tokio::spawn(Self::expiry_loop(
            Arc::downgrade(&slot),
            schedule_recv,
            on_expiry,
        ));

        Self {
            slot,
            schedule,
            driver,
        }
    }

    pub fn lock(&self) -> TimerGuard<'_, T> {
        TimerGuard {
            slot: self.slot.lock().unwrap_or_else(PoisonError::into_inner),
            schedule: &self.schedule,
        }
    }

    async fn expiry_loop<F>(
        slot: Weak<Mutex<Slot<T>>>,
        mut schedule_recv: watch::Receiver<TimerState>,
        on_expiry: F,
    ) where
        F: Fn(&mut T, Arming) + Send + Sync + 'static,
    {
        loop {
            let current = *schedule_recv.borrow_and_update();

            let TimerState::Armed { arming, expires_at } = current else {
                if schedule_recv.changed().await.is_err() {
                    break;
                }
                continue;
            };

            select! {
                _ = sleep_until(expires_at) => {
                    let Some(slot) = slot.upgrade() else {
                        break;
                    };

                    Self::fire(&slot, arming, &on_expiry);
                    drop(slot);

                    if schedule_recv.changed().await.is_err() {
                        break;
                    }
                }
                changed = schedule_recv.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }

    fn fire<F>(slot: &Mutex<Slot<T>>, arming: Arming, on_expiry: &F)
    where
        F: Fn(&mut T, Arming),
    {
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let state = slot.state;

        match state {
            TimerState::Armed { arming: current, .. } if current == arming => {
                slot.state = TimerState::Idle;
                on_expiry(&mut slot.data, arming);
            }
            _ => trace!("{:?} superseded", arming),
        }
    }
}

impl<T> Drop for RetriggerableTimer<T> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

impl<T> TimerGuard<'_, T> {
    /// Arms the timer for `duration` from now, replacing any pending arming.
    pub fn schedule(&mut self, duration: Duration) -> Arming {
        self.slot.armings += 1;

        let arming = Arming(self.slot.armings);
        let now = Instant::now();
        let expires_at = now
            .checked_add(duration)
            .unwrap_or_else(|| now + FAR_FUTURE);

        self.slot.state = TimerState::Armed { arming, expires_at };
        self.schedule.send_replace(self.slot.state);

        arming
    }

    /// Replaces the pending arming, discarding its progress.
    pub fn reschedule(&mut self, duration: Duration) -> Arming {
        self.schedule(duration)
    }

    pub fn cancel(&mut self) {
        if self.slot.state == TimerState::Idle {
            return;
        }

        self.slot.state = TimerState::Idle;
        self.schedule.send_replace(TimerState::Idle);
    }

    pub fn state(&self) -> TimerState {
        self.slot.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.slot.state, TimerState::Armed { .. })
    }
}

impl<T> Deref for TimerGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.slot.data
    }
}

impl<T> DerefMut for TimerGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.slot.data
    }
}
