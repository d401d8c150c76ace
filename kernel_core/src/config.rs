//! Kernel configuration

/// Boot-time knobs. Everything here is fixed for the lifetime of the
/// kernel; there is no runtime reconfiguration surface.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Kernel heap arena size in bytes.
    pub heap_size: usize,
    /// Ticks the clock advances per dispatch quantum. One dispatch of a
    /// task models one 10 ms timer interrupt interval.
    pub quantum_ticks: u64,
    /// Kernel log ring capacity in bytes.
    pub klog_capacity: usize,
    /// Screen geometry.
    pub fb_width: usize,
    pub fb_height: usize,
    /// Whether the board provides a hardware double buffer.
    pub fb_double_buffer: bool,
    /// Total RAM the diagnostics surface reports.
    pub ram_total: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            heap_size: 1024 * 1024,
            quantum_ticks: 1,
            klog_capacity: 64 * 1024,
            fb_width: 640,
            fb_height: 480,
            fb_double_buffer: false,
            ram_total: 256 * 1024 * 1024,
        }
    }
}
