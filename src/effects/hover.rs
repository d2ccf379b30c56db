//! Hover chirp - high-pitched confirmation that the pointer found a target.
//!
//! A sine sweep rising an octave in a tenth of a second. Both the pitch rise
//! and the decay are exponential: short upward sweeps read as "attention"
//! without demanding any, and the fast fade keeps repeated hovers from
//! stacking into a tone.

use crate::dsp::Waveform;
use crate::effects::{Breakpoint, Curve, Envelope, OneShot};

/// Create the hover chirp.
pub fn hover() -> OneShot {
    OneShot {
        wave: Waveform::Sine,
        duration: 0.1,
        frequency: Envelope {
            start: 2000.0,
            ramps: &[Breakpoint {
                at: 0.1,
                value: 4000.0,
                curve: Curve::Exponential,
            }],
        },
        amplitude: Envelope {
            start: 0.05,
            ramps: &[Breakpoint {
                at: 0.1,
                value: 0.001,
                curve: Curve::Exponential,
            }],
        },
    }
}
