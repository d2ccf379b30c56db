//! The seam between the control layer and whatever renders the audio.
//!
//! A `Transport` supplies the clock, node primitives, and scheduled parameter
//! automation; the engine and the effect catalog are written purely against
//! this trait. Two backends ship with the crate: [`OfflineTransport`] renders
//! into buffers on the calling thread (tests, bounce), and
//! [`RealtimeTransport`] renders through the system audio device.

/// Buffer-rendering backend with full introspection.
pub mod offline;
/// Device-rendering backend over cpal. Requires the `realtime` feature.
#[cfg(feature = "realtime")]
pub mod realtime;

use thiserror::Error;

use crate::dsp::automation::AutomationEvent;
use crate::dsp::{FilterMode, Waveform};
use crate::graph::{NodeId, Param};

pub use offline::OfflineTransport;
#[cfg(feature = "realtime")]
pub use realtime::RealtimeTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Running,
    /// The output is paused (platform policy or an explicit `suspend`); the
    /// clock does not advance until `resume`.
    Suspended,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no default output device available")]
    NoOutputDevice,
    #[cfg(feature = "realtime")]
    #[error("failed to read default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[cfg(feature = "realtime")]
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[cfg(feature = "realtime")]
    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[cfg(feature = "realtime")]
    #[error("failed to pause output stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Clock, node primitives, and sample-accurate parameter scheduling.
///
/// All times are seconds on the transport's own monotonically non-decreasing
/// clock (`now`). Operations on handles whose nodes are gone are silent
/// no-ops; absence of sound is never an error here.
pub trait Transport {
    /// Current time in seconds. Monotonically non-decreasing; frozen while
    /// suspended.
    fn now(&self) -> f64;

    fn sample_rate(&self) -> f32;

    fn state(&self) -> TransportState;

    fn suspend(&mut self) -> Result<(), TransportError>;

    fn resume(&mut self) -> Result<(), TransportError>;

    /// The terminal output node every audible chain must reach.
    fn destination(&self) -> NodeId;

    fn create_oscillator(&mut self, wave: Waveform, frequency_hz: f32) -> NodeId;

    fn create_gain(&mut self, level: f32) -> NodeId;

    fn create_filter(&mut self, mode: FilterMode, cutoff_hz: f32) -> NodeId;

    fn connect(&mut self, source: NodeId, dest: NodeId);

    /// Pin a long-lived node against the graph's self-reclamation.
    fn retain(&mut self, node: NodeId);

    fn schedule(&mut self, node: NodeId, param: Param, event: AutomationEvent);

    fn cancel_scheduled(&mut self, node: NodeId, param: Param, from: f64);

    fn start(&mut self, node: NodeId, at: f64);

    fn stop(&mut self, node: NodeId, at: f64);

    // Convenience wrappers for the four scheduling shapes.

    fn set_value_at(&mut self, node: NodeId, param: Param, value: f32, at: f64) {
        self.schedule(node, param, AutomationEvent::SetValue { value, at });
    }

    fn linear_ramp_to(&mut self, node: NodeId, param: Param, value: f32, at: f64) {
        self.schedule(node, param, AutomationEvent::LinearRampTo { value, at });
    }

    fn exponential_ramp_to(&mut self, node: NodeId, param: Param, value: f32, at: f64) {
        self.schedule(node, param, AutomationEvent::ExponentialRampTo { value, at });
    }

    fn set_target_at(
        &mut self,
        node: NodeId,
        param: Param,
        target: f32,
        at: f64,
        time_constant: f64,
    ) {
        self.schedule(
            node,
            param,
            AutomationEvent::SetTarget {
                target,
                at,
                time_constant,
            },
        );
    }
}
