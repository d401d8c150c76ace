//! Test utilities
//!
//! Builder for booting a kernel under test. The point of the builder is
//! shared device handles: the kernel owns its devices as boxed traits, so
//! a test that wants to keep typing into the keyboard after boot gets an
//! `Rc<RefCell<ScriptedKeyboard>>` clone of the very device the kernel is
//! polling.

use crate::{Devices, Kernel, KernelConfig, ProgramEntry};
use hal::{RamVfs, ScriptedKeyboard, SimDma, SimMouse};
use std::cell::RefCell;
use std::rc::Rc;

/// A booted kernel plus the input handles a test drives it with.
pub struct TestKernel {
    pub kernel: Kernel,
    pub keyboard: Rc<RefCell<ScriptedKeyboard>>,
    pub mouse: Rc<RefCell<SimMouse>>,
}

impl TestKernel {
    /// Types a string on the simulated keyboard.
    pub fn type_str(&self, s: &str) {
        self.keyboard.borrow_mut().push_str(s);
    }

    pub fn press(&self, code: i32) {
        self.keyboard.borrow_mut().push_key(code);
    }
}

/// Assembles config, seeded files, programs and devices for one test boot.
pub struct TestKernelBuilder {
    config: KernelConfig,
    vfs: RamVfs,
    dma_present: bool,
    programs: Vec<(String, ProgramEntry)>,
}

impl TestKernelBuilder {
    pub fn new() -> Self {
        Self {
            config: KernelConfig::default(),
            vfs: RamVfs::new(),
            dma_present: true,
            programs: Vec::new(),
        }
    }

    pub fn config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    /// Seeds a file into the RAM filesystem before boot.
    pub fn file(mut self, path: &str, contents: &[u8]) -> Self {
        self.vfs = self.vfs.with_file(path, contents);
        self
    }

    /// Registers a program under an absolute path.
    pub fn program(mut self, path: &str, entry: ProgramEntry) -> Self {
        self.programs.push((path.to_string(), entry));
        self
    }

    /// Boots without a DMA engine, forcing the scalar fallbacks.
    pub fn without_dma(mut self) -> Self {
        self.dma_present = false;
        self
    }

    pub fn build(self) -> TestKernel {
        let keyboard = Rc::new(RefCell::new(ScriptedKeyboard::new()));
        let mouse = Rc::new(RefCell::new(SimMouse::new()));
        let dma = if self.dma_present {
            SimDma::new()
        } else {
            SimDma::absent()
        };
        let devices = Devices {
            vfs: Box::new(self.vfs),
            keyboard: Box::new(keyboard.clone()),
            mouse: Box::new(mouse.clone()),
            dma: Box::new(dma),
            ..Devices::default()
        };
        let kernel = Kernel::new(self.config, devices);
        for (path, entry) in self.programs {
            kernel.register_program(&path, entry);
        }
        TestKernel {
            kernel,
            keyboard,
            mouse,
        }
    }
}

impl Default for TestKernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::program;

    #[test]
    fn test_builder_boots_and_runs_a_program() {
        let t = TestKernelBuilder::new()
            .program("/bin/hello", program(|api, _argv| async move {
                api.puts("hello\n");
                0
            }))
            .build();
        let pid = t.kernel.spawn("/bin/hello", &[]).unwrap();
        t.kernel.run_until_idle();
        assert_eq!(
            t.kernel.process_state(pid),
            core_types::ProcessState::Zombie
        );
        assert_eq!(t.kernel.console_line(0), "hello");
    }

    #[test]
    fn test_scripted_keyboard_feeds_getc() {
        let t = TestKernelBuilder::new()
            .program("/bin/echo1", program(|api, _argv| async move {
                let key = api.getc().await;
                api.putc(key as u8);
                0
            }))
            .build();
        t.type_str("Z");
        t.kernel.spawn("/bin/echo1", &[]).unwrap();
        t.kernel.run_until_idle();
        assert_eq!(t.kernel.console_line(0), "Z");
    }
}
