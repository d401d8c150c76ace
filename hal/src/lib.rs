//! # Hardware Abstraction Layer (HAL)
//!
//! Every device the kernel runtime core touches is an external collaborator
//! behind a trait defined here: filesystem, RTC, keyboard, mouse, DMA,
//! sound, network, LEDs, CPU identity, USB.
//!
//! ## Philosophy
//!
//! **The core never talks to hardware; it talks to traits.**
//!
//! On real hardware these traits are implemented by chipset drivers. In
//! this repository each trait ships with a deterministic in-memory
//! implementation (`RamVfs`, `ScriptedKeyboard`, `FixedRtc`, ...) so the
//! whole kernel boots and runs under `cargo test` with no QEMU and no
//! timing dependence.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same script of inputs, same observable behavior
//! 2. **Non-blocking**: devices never park the CPU; blocking is the
//!    scheduler's job
//! 3. **Sentinel-friendly**: fallible operations return `Option`/`Result`
//!    that the kernel facade maps onto the historic −1/null convention

pub mod dma;
pub mod keyboard;
pub mod mouse;
pub mod net;
pub mod platform;
pub mod rtc;
pub mod sound;
pub mod vfs;

pub use dma::{DmaEngine, SimDma};
pub use keyboard::{KeyboardDevice, ScriptedKeyboard};
pub use mouse::{MouseDevice, SimMouse};
pub use net::{LoopbackNet, NetError, NetworkStack, SocketId};
pub use platform::{CpuInfo, LedDevice, SimCpu, SimLed, SimUsbBus, UsbBus, UsbDeviceInfo};
pub use rtc::{FixedRtc, RtcDevice};
pub use sound::{SimSound, SoundDevice, SoundError, PCM_SAMPLE_RATE};
pub use vfs::{DirEntry, RamVfs, Vfs, VfsError};
