use log::{debug, info, trace, warn};

use crate::config::KeyFilter;
use crate::domain::{DeviceId, InputDevice, InputEvent};
use crate::error::Error;
use crate::input::{InputHandle, InputSource};

/// Receiver of qualifying key presses.
pub trait ActivitySink: Send + Sync {
    fn notify_activity(&self);
}

impl<T: ActivitySink> ActivitySink for std::sync::Arc<T> {
    fn notify_activity(&self) {
        self.as_ref().notify_activity();
    }
}

#[derive(Debug)]
struct Binding {
    handle: InputHandle,
    device_name: String,
}

/// Tracks the single bound input device and forwards its filtered key presses.
///
/// A newly discovered matching device replaces the current binding, the
/// previous handle is closed once the new one is open.
pub struct InputListener<I: InputSource, A: ActivitySink> {
    source: I,
    keys: KeyFilter,
    sink: A,
    binding: Option<Binding>,
}

impl<I: InputSource, A: ActivitySink> InputListener<I, A> {
    pub const HANDLE_NAME: &'static str = "buttons_backlight";

    pub fn new(source: I, keys: KeyFilter, sink: A) -> Self {
        Self {
            source,
            keys,
            sink,
            binding: None,
        }
    }

    /// Returns `Ok(false)` when the device does not match the filter.
    pub fn on_device_discovered(&mut self, device: &InputDevice) -> Result<bool, Error> {
        if !self.keys.matches(device) {
            debug!("ignoring {} ({})", device.id, device.name);
            return Ok(false);
        }

        let handle = self.source.open(device, Self::HANDLE_NAME)?;

        let binding = Binding {
            handle,
            device_name: device.name.clone(),
        };

        if let Some(previous) = self.binding.replace(binding) {
            warn!(
                "{} ({}) replaces {} ({})",
                device.id, device.name, previous.handle.device, previous.device_name
            );
            self.source.close(previous.handle);
        } else {
            info!("bound to {} ({})", device.id, device.name);
        }

        Ok(true)
    }

    /// Returns `true` when the event was forwarded as activity.
    pub fn on_event(&self, device: DeviceId, event: &InputEvent) -> bool {
        if self.bound_device() != Some(device) {
            trace!("dropping event from unbound {}", device);
            return false;
        }

        if !event.is_key_press() || !self.keys.contains(event.code) {
            trace!("filtered {:?}", event);
            return false;
        }

        self.sink.notify_activity();

        true
    }

    pub fn on_device_removed(&mut self, device: DeviceId) {
        if self.bound_device() != Some(device) {
            return;
        }

        self.unbind();
    }

    pub fn unbind(&mut self) {
        if let Some(binding) = self.binding.take() {
            self.source.close(binding.handle);
            info!("unbound {} ({})", binding.handle.device, binding.device_name);
        }
    }

    pub fn bound_device(&self) -> Option<DeviceId> {
        self.binding.as_ref().map(|binding| binding.handle.device)
    }
}

impl<I: InputSource, A: ActivitySink> Drop for InputListener<I, A> {
    fn drop(&mut self) {
        self.unbind();
    }
}
