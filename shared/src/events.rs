use crate::domain::{DeviceId, InputDevice, InputEvent, KeyCode, PinId};
use strum_macros::AsRefStr;

#[derive(Clone, Debug, AsRefStr)]
pub enum Events {
    DeviceConnected(InputDevice),
    DeviceDisconnected(DeviceId),
    Input(DeviceId, InputEvent),
    Activity(KeyCode),
    BacklightOn,
    BacklightOff,
    ResetCompleted(PinId),
}
