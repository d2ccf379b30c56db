use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform Choices
================

The catalog only needs the four classic analog shapes. Their character, in
rough order of harmonic richness:

  Sine:     fundamental only. Pure, hollow. Used for chirps and sub bass.
  Triangle: odd harmonics falling off as 1/n². Soft; barely-there drones.
  Square:   odd harmonics falling off as 1/n. Hollow but punchy thuds.
  Sawtooth: all harmonics falling off as 1/n. Bright, buzzy; the raw
            material for filtered hums and sweeps.

All shapes are naive (not bandlimited). For short UI effects and low-pitched
loops the aliasing is inaudible, and naive shapes keep the per-sample cost at
a couple of arithmetic ops.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Free-running oscillator with a stable phase accumulator in `[0, 1)`.
///
/// Frequency is supplied per sample rather than stored, because it is an
/// automated parameter that may change every sample.
#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    wave: Waveform,
    phase: f32,
}

impl Oscillator {
    pub fn new(wave: Waveform) -> Self {
        Self { wave, phase: 0.0 }
    }

    pub fn waveform(&self) -> Waveform {
        self.wave
    }

    /// Produce the sample at the current phase, then advance.
    #[inline]
    pub fn next_sample(&mut self, frequency_hz: f32, sample_rate: f32) -> f32 {
        let sample = match self.wave {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 4.0 * (self.phase - 0.5).abs() - 1.0,
        };

        self.phase += frequency_hz.max(0.0) / sample_rate;
        self.phase -= self.phase.floor();

        sample
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
