//! Board-level odds and ends: activity LED, CPU identity, USB enumeration
//!
//! None of these are on any hot path; they exist so the system monitor and
//! the shell's hardware commands have real collaborators to talk to.

use serde::{Deserialize, Serialize};

/// Activity LED.
pub trait LedDevice {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);
    fn status(&self) -> bool;
}

/// Simulated LED: a single bit.
#[derive(Default)]
pub struct SimLed {
    lit: bool,
}

impl SimLed {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedDevice for SimLed {
    fn on(&mut self) {
        self.lit = true;
    }

    fn off(&mut self) {
        self.lit = false;
    }

    fn toggle(&mut self) {
        self.lit = !self.lit;
    }

    fn status(&self) -> bool {
        self.lit
    }
}

/// CPU identity, as read from board registers at boot.
pub trait CpuInfo {
    fn name(&self) -> &str;
    fn freq_mhz(&self) -> u32;
    fn cores(&self) -> u32;
}

/// The simulated board reports itself as the QEMU virt default.
pub struct SimCpu {
    name: String,
    freq_mhz: u32,
    cores: u32,
}

impl SimCpu {
    pub fn new() -> Self {
        Self {
            name: "Cortex-A72 (sim)".to_string(),
            freq_mhz: 1800,
            cores: 4,
        }
    }
}

impl Default for SimCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuInfo for SimCpu {
    fn name(&self) -> &str {
        &self.name
    }

    fn freq_mhz(&self) -> u32 {
        self.freq_mhz
    }

    fn cores(&self) -> u32 {
        self.cores
    }
}

/// One enumerated USB device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub name: String,
}

/// USB bus enumeration.
pub trait UsbBus {
    fn device_count(&self) -> usize;
    fn device_info(&self, index: usize) -> Option<UsbDeviceInfo>;
}

/// Simulated bus with a fixed device list.
#[derive(Default)]
pub struct SimUsbBus {
    devices: Vec<UsbDeviceInfo>,
}

impl SimUsbBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, vendor_id: u16, product_id: u16, name: &str) -> Self {
        self.devices.push(UsbDeviceInfo {
            vendor_id,
            product_id,
            name: name.to_string(),
        });
        self
    }
}

impl UsbBus for SimUsbBus {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device_info(&self, index: usize) -> Option<UsbDeviceInfo> {
        self.devices.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_toggle() {
        let mut led = SimLed::new();
        assert!(!led.status());
        led.toggle();
        assert!(led.status());
        led.off();
        assert!(!led.status());
    }

    #[test]
    fn test_usb_enumeration() {
        let bus = SimUsbBus::new().with_device(0x046D, 0xC077, "Optical Mouse");
        assert_eq!(bus.device_count(), 1);
        let info = bus.device_info(0).unwrap();
        assert_eq!(info.vendor_id, 0x046D);
        assert!(bus.device_info(1).is_none());
    }
}
