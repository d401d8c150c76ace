//! Sound collaborator
//!
//! Playback is modeled as a countdown in timer ticks: starting a clip
//! computes its duration, and the kernel's clock drives progress by calling
//! `on_tick`. Pause freezes the countdown. This keeps the blocking PCM
//! variant schedulable without real audio hardware.

use thiserror::Error;

/// Sample rate the PCM entry points assume, matching the original driver.
pub const PCM_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SoundError {
    #[error("unsupported or corrupt WAV data")]
    BadWav,
    #[error("sound hardware rejected the request")]
    Device,
}

/// Audio output contract.
pub trait SoundDevice {
    /// Starts a WAV clip. Returns its duration in timer ticks.
    fn play_wav(&mut self, data: &[u8]) -> Result<u64, SoundError>;

    /// Starts raw 16-bit mono PCM at [`PCM_SAMPLE_RATE`]. Returns duration
    /// in timer ticks.
    fn play_pcm(&mut self, samples: &[i16]) -> Result<u64, SoundError>;

    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn pause(&mut self);
    fn resume(&mut self);
    fn is_paused(&self) -> bool;

    /// Advances playback by one timer tick.
    fn on_tick(&mut self);
}

/// Simulated sound device: tracks remaining ticks, produces no audio.
#[derive(Default)]
pub struct SimSound {
    remaining_ticks: u64,
    paused: bool,
}

impl SimSound {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&mut self, ticks: u64) -> u64 {
        self.remaining_ticks = ticks;
        self.paused = false;
        ticks
    }
}

impl SoundDevice for SimSound {
    fn play_wav(&mut self, data: &[u8]) -> Result<u64, SoundError> {
        // Minimal RIFF sanity check; duration from data-chunk size at
        // 16-bit mono 44.1 kHz.
        if data.len() < 44 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            return Err(SoundError::BadWav);
        }
        let samples = (data.len() - 44) / 2;
        let ticks = (samples as u64 * 100).div_ceil(PCM_SAMPLE_RATE as u64);
        Ok(self.start(ticks))
    }

    fn play_pcm(&mut self, samples: &[i16]) -> Result<u64, SoundError> {
        let ticks = (samples.len() as u64 * 100).div_ceil(PCM_SAMPLE_RATE as u64);
        Ok(self.start(ticks))
    }

    fn stop(&mut self) {
        self.remaining_ticks = 0;
        self.paused = false;
    }

    fn is_playing(&self) -> bool {
        self.remaining_ticks > 0
    }

    fn pause(&mut self) {
        if self.is_playing() {
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn on_tick(&mut self) {
        if !self.paused && self.remaining_ticks > 0 {
            self.remaining_ticks -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_duration_in_ticks() {
        let mut snd = SimSound::new();
        // 44100 samples = 1 second = 100 ticks
        let ticks = snd.play_pcm(&vec![0i16; 44_100]).unwrap();
        assert_eq!(ticks, 100);
        assert!(snd.is_playing());
    }

    #[test]
    fn test_playback_finishes_after_ticks() {
        let mut snd = SimSound::new();
        snd.play_pcm(&vec![0i16; 441]).unwrap(); // 1 tick
        assert!(snd.is_playing());
        snd.on_tick();
        assert!(!snd.is_playing());
    }

    #[test]
    fn test_pause_freezes_countdown() {
        let mut snd = SimSound::new();
        snd.play_pcm(&vec![0i16; 882]).unwrap(); // 2 ticks
        snd.pause();
        snd.on_tick();
        snd.on_tick();
        assert!(snd.is_playing());
        assert!(snd.is_paused());
        snd.resume();
        snd.on_tick();
        snd.on_tick();
        assert!(!snd.is_playing());
    }

    #[test]
    fn test_bad_wav_rejected() {
        let mut snd = SimSound::new();
        assert_eq!(snd.play_wav(b"not a wav"), Err(SoundError::BadWav));
        assert!(!snd.is_playing());
    }
}
