use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use critical_section::Mutex;
use enumflags2::BitFlags;
use log::debug;

use ultralive_shared::domain::{Capability, DeviceId, InputDevice, KeyCode};
use ultralive_shared::error::Error;
use ultralive_shared::input::{InputHandle, InputSource};

#[derive(Debug)]
struct OpenHandle {
    device: DeviceId,
    name: String,
}

#[derive(Debug)]
struct Handles {
    capacity: usize,
    next_slot: u32,
    open: BTreeMap<u32, OpenHandle>,
}

/// Input pipeline with a fixed number of handle slots.
#[derive(Clone)]
pub struct SimulatedInput {
    handles: Arc<Mutex<RefCell<Handles>>>,
}

impl SimulatedInput {
    pub fn new(capacity: usize) -> Self {
        Self {
            handles: Arc::new(Mutex::new(RefCell::new(Handles {
                capacity,
                next_slot: 0,
                open: BTreeMap::new(),
            }))),
        }
    }

    /// The ultralive keypad: every alphanumeric key plus comma.
    pub fn keypad(id: DeviceId) -> InputDevice {
        let keys = "1234567890qwertyuiopasdfghjklzxcvbnm,"
            .chars()
            .filter_map(KeyCode::from_char);

        InputDevice::keyboard(id, "ultralive-keypad", keys)
    }

    /// A device without keys, e.g. an accelerometer.
    pub fn motion_sensor(id: DeviceId) -> InputDevice {
        InputDevice {
            id,
            name: "motion-sensor".to_string(),
            capabilities: BitFlags::from(Capability::Abs),
            keys: Default::default(),
        }
    }

    pub fn open_devices(&self) -> Vec<DeviceId> {
        critical_section::with(|cs| {
            self.handles
                .borrow_ref(cs)
                .open
                .values()
                .map(|handle| handle.device)
                .collect()
        })
    }

    pub fn is_open(&self, device: DeviceId) -> bool {
        self.open_devices().contains(&device)
    }

    pub fn handle_names(&self) -> Vec<String> {
        critical_section::with(|cs| {
            self.handles
                .borrow_ref(cs)
                .open
                .values()
                .map(|handle| handle.name.clone())
                .collect()
        })
    }
}

impl InputSource for SimulatedInput {
    fn open(&mut self, device: &InputDevice, name: &str) -> Result<InputHandle, Error> {
        critical_section::with(|cs| {
            let handles = &mut *self.handles.borrow_ref_mut(cs);

            if handles.open.len() >= handles.capacity {
                return Err(Error::ResourceExhausted(device.id));
            }

            let slot = handles.next_slot;
            handles.next_slot += 1;
            handles.open.insert(
                slot,
                OpenHandle {
                    device: device.id,
                    name: name.to_string(),
                },
            );

            debug!("{} opened in slot {}", device.id, slot);

            Ok(InputHandle {
                device: device.id,
                slot,
            })
        })
    }

    fn close(&mut self, handle: InputHandle) {
        critical_section::with(|cs| {
            self.handles.borrow_ref_mut(cs).open.remove(&handle.slot);
        });
    }
}
