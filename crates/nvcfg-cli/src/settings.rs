use bytemuck::{CheckedBitPattern, NoUninit};
use serde::Serialize;

/// Demonstration record managed by the CLI.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern, Serialize)]
pub struct DeviceSettings {
    pub setting1: u8,
    pub enabled: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            setting1: 1,
            enabled: true,
        }
    }
}

impl DeviceSettings {
    /// Advance the counter (wrapping) and flip the flag.
    pub fn bump(&mut self) {
        self.setting1 = self.setting1.wrapping_add(1);
        self.enabled = !self.enabled;
    }
}
