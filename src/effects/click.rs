//! Click thud - mechanical acknowledgement of an activation.
//!
//! A square wave falling from 150 Hz to 40 Hz. The downward pitch and the
//! square's odd harmonics give a woody, switch-like thunk; the exponential
//! amplitude decay mimics how struck objects actually lose energy.

use crate::dsp::Waveform;
use crate::effects::{Breakpoint, Curve, Envelope, OneShot};

/// Create the click thud.
pub fn click() -> OneShot {
    OneShot {
        wave: Waveform::Square,
        duration: 0.15,
        frequency: Envelope {
            start: 150.0,
            ramps: &[Breakpoint {
                at: 0.15,
                value: 40.0,
                curve: Curve::Exponential,
            }],
        },
        amplitude: Envelope {
            start: 0.1,
            ramps: &[Breakpoint {
                at: 0.15,
                value: 0.001,
                curve: Curve::Exponential,
            }],
        },
    }
}
