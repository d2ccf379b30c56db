//! Startup sweep - the "coming online" moment.
//!
//! Two overlapping voices:
//!
//! 1. A bass sine climbing four octaves over two seconds - the spool-up
//! 2. A sawtooth sparkle on top, brighter and gone after the first second
//!
//! The layering is what sells it: the bass carries the weight, the sparkle
//! marks the instant. This is the effect wired to the gesture that grants
//! audio permission, which is why the engine lets it auto-initialize.

use crate::dsp::Waveform;
use crate::effects::{Breakpoint, Curve, Envelope, OneShot};

/// Create both startup voices: `[bass, sparkle]`.
pub fn startup() -> [OneShot; 2] {
    let bass = OneShot {
        wave: Waveform::Sine,
        duration: 2.0,
        frequency: Envelope {
            start: 50.0,
            ramps: &[Breakpoint {
                at: 2.0,
                value: 800.0,
                curve: Curve::Exponential,
            }],
        },
        amplitude: Envelope {
            start: 0.2,
            ramps: &[Breakpoint {
                at: 2.0,
                value: 0.001,
                curve: Curve::Exponential,
            }],
        },
    };

    let sparkle = OneShot {
        wave: Waveform::Sawtooth,
        duration: 1.0,
        frequency: Envelope {
            start: 2000.0,
            ramps: &[Breakpoint {
                at: 1.0,
                value: 6000.0,
                curve: Curve::Exponential,
            }],
        },
        amplitude: Envelope {
            start: 0.05,
            ramps: &[Breakpoint {
                at: 0.5,
                value: 0.0,
                curve: Curve::Linear,
            }],
        },
    };

    [bass, sparkle]
}
