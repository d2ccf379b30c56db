//! Power-down sweep - the mirror of power-up, winding to a halt.
//!
//! A square wave falling 400 → 50 Hz under a straight linear fade. The
//! hollow square timbre plus the dive reads as machinery losing power.

use crate::dsp::Waveform;
use crate::effects::{Breakpoint, Curve, Envelope, OneShot};

/// Create the power-down sweep.
pub fn power_down() -> OneShot {
    OneShot {
        wave: Waveform::Square,
        duration: 0.3,
        frequency: Envelope {
            start: 400.0,
            ramps: &[Breakpoint {
                at: 0.3,
                value: 50.0,
                curve: Curve::Exponential,
            }],
        },
        amplitude: Envelope {
            start: 0.1,
            ramps: &[Breakpoint {
                at: 0.3,
                value: 0.0,
                curve: Curve::Linear,
            }],
        },
    }
}
