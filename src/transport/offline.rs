//! Offline transport: renders the graph into plain buffers.
//!
//! Time advances only when the caller renders, which makes behavior exactly
//! reproducible - the integration tests and benchmarks run against this
//! backend, and callers can use it to bounce effects faster than realtime.

use crate::dsp::automation::AutomationEvent;
use crate::dsp::{FilterMode, Waveform};
use crate::graph::{AudioGraph, NodeId, Param};
use crate::transport::{Transport, TransportError, TransportState};

pub struct OfflineTransport {
    graph: AudioGraph,
    state: TransportState,
}

impl OfflineTransport {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            graph: AudioGraph::new(sample_rate),
            state: TransportState::Running,
        }
    }

    /// Start suspended, the way platform autoplay policies leave a fresh
    /// output context until a user gesture resumes it.
    pub fn suspended(sample_rate: f32) -> Self {
        Self {
            graph: AudioGraph::new(sample_rate),
            state: TransportState::Suspended,
        }
    }

    /// Render `frames` mono samples, advancing the clock. While suspended the
    /// clock is frozen and the output is silence.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; frames];
        if self.state == TransportState::Running {
            self.graph.render(&mut out);
        }
        out
    }

    /// Render a whole number of seconds.
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds * self.graph.sample_rate() as f64).round() as usize;
        self.render(frames)
    }

    /// The underlying graph, for inspection.
    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }
}

impl Transport for OfflineTransport {
    fn now(&self) -> f64 {
        self.graph.current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.graph.sample_rate()
    }

    fn state(&self) -> TransportState {
        self.state
    }

    fn suspend(&mut self) -> Result<(), TransportError> {
        self.state = TransportState::Suspended;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), TransportError> {
        self.state = TransportState::Running;
        Ok(())
    }

    fn destination(&self) -> NodeId {
        self.graph.destination()
    }

    fn create_oscillator(&mut self, wave: Waveform, frequency_hz: f32) -> NodeId {
        self.graph.create_oscillator(wave, frequency_hz)
    }

    fn create_gain(&mut self, level: f32) -> NodeId {
        self.graph.create_gain(level)
    }

    fn create_filter(&mut self, mode: FilterMode, cutoff_hz: f32) -> NodeId {
        self.graph.create_filter(mode, cutoff_hz)
    }

    fn connect(&mut self, source: NodeId, dest: NodeId) {
        self.graph.connect(source, dest);
    }

    fn retain(&mut self, node: NodeId) {
        self.graph.retain(node);
    }

    fn schedule(&mut self, node: NodeId, param: Param, event: AutomationEvent) {
        self.graph.schedule(node, param, event);
    }

    fn cancel_scheduled(&mut self, node: NodeId, param: Param, from: f64) {
        self.graph.cancel_scheduled(node, param, from);
    }

    fn start(&mut self, node: NodeId, at: f64) {
        self.graph.start(node, at);
    }

    fn stop(&mut self, node: NodeId, at: f64) {
        self.graph.stop(node, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_transport_freezes_the_clock() {
        let mut t = OfflineTransport::suspended(1_000.0);
        assert_eq!(t.state(), TransportState::Suspended);

        let silence = t.render(100);
        assert_eq!(t.now(), 0.0);
        assert!(silence.iter().all(|&s| s == 0.0));

        t.resume().unwrap();
        t.render(100);
        assert!((t.now() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn render_seconds_advances_exactly() {
        let mut t = OfflineTransport::new(48_000.0);
        t.render_seconds(0.25);
        assert!((t.now() - 0.25).abs() < 1e-9);
    }
}
