use crate::domain::{DeviceId, InputDevice};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputHandle {
    pub device: DeviceId,
    pub slot: u32,
}

/// Platform input pipeline. Devices come and go through bus events, this trait
/// only covers opening and closing a handle on one of them.
pub trait InputSource: Send + 'static {
    /// Requests exclusive delivery of the device events under `name`.
    fn open(&mut self, device: &InputDevice, name: &str) -> Result<InputHandle, Error>;

    fn close(&mut self, handle: InputHandle);
}
