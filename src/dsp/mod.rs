//! Low-level DSP primitives used by the rendering graph.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside graph nodes. They intentionally stay focused on the
//! signal-processing math so the graph layer can handle wiring, scheduling,
//! and reclamation.

/// Scheduled parameter automation: timed set/ramp/approach events.
pub mod automation;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Oscillator waveforms.
pub mod oscillator;

pub use automation::{AutomationEvent, ParamTimeline};
pub use filter::FilterMode;
pub use oscillator::Waveform;
