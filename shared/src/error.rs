use std::fmt::{Display, Formatter};

use crate::domain::{DeviceId, PinId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The line is reserved by another owner or the platform rejected it.
    PinUnavailable(PinId),
    /// The platform refused the direction or level configuration.
    ConfigurationError(PinId),
    /// No input binding could be allocated for the device.
    ResourceExhausted(DeviceId),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::PinUnavailable(pin) => write!(f, "pin {} is unavailable", pin),
            Error::ConfigurationError(pin) => write!(f, "failed to configure {} as output", pin),
            Error::ResourceExhausted(device) => {
                write!(f, "cannot allocate input binding for {}", device)
            }
        }
    }
}

impl std::error::Error for Error {}
