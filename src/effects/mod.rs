//! Fixed catalog of one-shot interface sounds.
//!
//! Each effect is a pure value: waveform, duration, and a pair of envelope
//! tables. Triggering is `spawn`, which builds oscillator → gain → output
//! against a transport, schedules the envelopes, and forgets the handles -
//! the graph reclaims the chain once the scheduled stop elapses, so there is
//! nothing to tear down.
//!
//! # Example
//!
//! ```ignore
//! use hud_sfx::effects;
//!
//! let out = transport.destination();
//! effects::click().spawn(&mut transport, out);
//! for voice in effects::startup() {
//!     voice.spawn(&mut transport, out);
//! }
//! ```

mod click;
mod hover;
mod power_down;
mod power_up;
mod startup;

pub use click::click;
pub use hover::hover;
pub use power_down::power_down;
pub use power_up::power_up;
pub use startup::startup;

use crate::dsp::Waveform;
use crate::graph::{NodeId, Param};
use crate::transport::Transport;

/// Interpolation shape of a single envelope segment.
///
/// Exponential segments suit pitch and energy sweeps (perception is
/// logarithmic); linear segments suit plain fade-in/out where no curvature
/// is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    Exponential,
}

/// One envelope segment: reach `value` at `at` seconds after the trigger.
#[derive(Debug, Clone, Copy)]
pub struct Breakpoint {
    pub at: f64,
    pub value: f32,
    pub curve: Curve,
}

/// An envelope table: the value at trigger time, then the segments.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub start: f32,
    pub ramps: &'static [Breakpoint],
}

/// A complete one-shot voice description.
#[derive(Debug, Clone, Copy)]
pub struct OneShot {
    pub wave: Waveform,
    pub duration: f64,
    pub frequency: Envelope,
    pub amplitude: Envelope,
}

impl OneShot {
    /// Build and schedule this voice now. The oscillator's stop is scheduled
    /// at the envelope's end, so the chain expires on its own.
    pub fn spawn<T: Transport + ?Sized>(&self, transport: &mut T, out: NodeId) {
        let at = transport.now();

        let osc = transport.create_oscillator(self.wave, self.frequency.start);
        let gain = transport.create_gain(self.amplitude.start);

        schedule_envelope(transport, osc, Param::Frequency, &self.frequency, at);
        schedule_envelope(transport, gain, Param::Gain, &self.amplitude, at);

        transport.connect(osc, gain);
        transport.connect(gain, out);

        transport.start(osc, at);
        transport.stop(osc, at + self.duration);
    }
}

fn schedule_envelope<T: Transport + ?Sized>(
    transport: &mut T,
    node: NodeId,
    param: Param,
    envelope: &Envelope,
    at: f64,
) {
    transport.set_value_at(node, param, envelope.start, at);
    for ramp in envelope.ramps {
        match ramp.curve {
            Curve::Linear => transport.linear_ramp_to(node, param, ramp.value, at + ramp.at),
            Curve::Exponential => {
                transport.exponential_ramp_to(node, param, ramp.value, at + ramp.at)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::automation::AutomationEvent;
    use crate::graph::NodeKind;
    use crate::transport::{OfflineTransport, Transport};

    #[test]
    fn spawn_builds_one_chain_and_schedules_its_expiry() {
        let mut t = OfflineTransport::new(48_000.0);
        let out = t.destination();

        hover().spawn(&mut t, out);

        let graph = t.graph();
        assert_eq!(graph.created_nodes(), 2);

        let osc = graph
            .ids()
            .into_iter()
            .find(|&id| matches!(graph.kind(id), Some(NodeKind::Oscillator(_))))
            .unwrap();
        assert_eq!(graph.lifetime(osc), Some((Some(0.0), Some(0.1))));
    }

    #[test]
    fn spawned_voice_actually_sounds_and_then_expires() {
        let mut t = OfflineTransport::new(48_000.0);
        let out = t.destination();
        click().spawn(&mut t, out);

        let body = t.render_seconds(0.15);
        let peak = body.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!(peak > 0.05, "click should be audible, peak {peak}");

        t.render_seconds(0.05);
        assert_eq!(
            t.graph().ids().len(),
            1,
            "only the destination should remain"
        );
    }

    #[test]
    fn envelopes_anchor_at_the_trigger_time() {
        let mut t = OfflineTransport::new(48_000.0);
        let out = t.destination();
        t.render_seconds(1.0); // trigger later than time zero

        power_down().spawn(&mut t, out);

        let graph = t.graph();
        let osc = graph
            .ids()
            .into_iter()
            .find(|&id| matches!(graph.kind(id), Some(NodeKind::Oscillator(_))))
            .unwrap();
        let events = graph.timeline(osc, Param::Frequency).unwrap().events();
        assert!(matches!(
            events[0],
            AutomationEvent::SetValue { value, at } if value == 400.0 && (at - 1.0).abs() < 1e-9
        ));
    }
}
