use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| response  | passes          | rejects      |
| --------- | --------------- | ------------ |
| low-pass  | below cutoff    | above cutoff |
| high-pass | above cutoff    | below cutoff |
| band-pass | around cutoff   | outside      |
| notch     | outside cutoff  | around it    |

The state-variable topology produces all four responses from the same two
integrators, so supporting them costs nothing beyond the final selection.
The engine's hum only ever asks for low-pass.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Lowpass,
    Highpass,
    Bandpass,
    Notch,
}

/// Topology-preserving state-variable filter.
///
/// Cutoff is settable at any time, including every sample; the pre-warped
/// coefficient is recomputed per sample for that reason.
#[derive(Debug, Clone, Copy)]
pub struct SvFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    resonance: f32,
    mode: FilterMode,
}

impl SvFilter {
    pub fn new(mode: FilterMode, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            resonance: 0.0,
            mode,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterMode::Lowpass, cutoff_hz)
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        // Keep the pre-warp stable: tan() blows up at Nyquist
        self.cutoff_hz = cutoff_hz.clamp(1.0, 20_000.0);
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 0.95);
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        let wd = TAU * self.cutoff_hz;
        let wa = (2.0 * sample_rate) * (wd / (2.0 * sample_rate)).tan();
        wa / (2.0 * sample_rate)
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, sample_rate: f32) -> f32 {
        let g = self.compute_g(sample_rate);
        let k = 2.0 - (2.0 * self.resonance);

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.mode {
            FilterMode::Lowpass => v2,
            FilterMode::Bandpass => v1,
            FilterMode::Highpass => sample - k * v1 - v2,
            FilterMode::Notch => sample - k * v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, sample_rate);
        }
    }
}
