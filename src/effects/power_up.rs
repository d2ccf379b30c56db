//! Power-up sweep - something charging into readiness.
//!
//! A sawtooth rising 100 → 600 Hz with a quick linear fade-in so the buzz
//! doesn't pop in, then a longer fade-out as the sweep tops out.

use crate::dsp::Waveform;
use crate::effects::{Breakpoint, Curve, Envelope, OneShot};

/// Create the power-up sweep.
pub fn power_up() -> OneShot {
    OneShot {
        wave: Waveform::Sawtooth,
        duration: 0.4,
        frequency: Envelope {
            start: 100.0,
            ramps: &[Breakpoint {
                at: 0.4,
                value: 600.0,
                curve: Curve::Exponential,
            }],
        },
        amplitude: Envelope {
            start: 0.0,
            ramps: &[
                Breakpoint {
                    at: 0.1,
                    value: 0.1,
                    curve: Curve::Linear,
                },
                Breakpoint {
                    at: 0.4,
                    value: 0.0,
                    curve: Curve::Linear,
                },
            ],
        },
    }
}
