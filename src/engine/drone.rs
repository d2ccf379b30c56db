//! Background drone - the ambient bed under everything else.
//!
//! A single triangle wave on low A, barely above the noise floor. It starts
//! with the engine and runs for the whole session; deliberately, there is no
//! stop. Ambient background is not something the user toggles, and a loop
//! that never ends needs no lifecycle beyond "started once".

use crate::dsp::Waveform;
use crate::graph::{NodeId, Param};
use crate::transport::Transport;

const DRONE_FREQUENCY_HZ: f32 = 55.0; // Low A
const DRONE_LEVEL: f32 = 0.02; // Very quiet

pub(crate) struct Drone {
    nodes: Option<(NodeId, NodeId)>,
}

impl Drone {
    pub fn new() -> Self {
        Self { nodes: None }
    }

    pub fn is_running(&self) -> bool {
        self.nodes.is_some()
    }

    /// Build and start the drone chain. No-op if already running.
    pub fn start<T: Transport + ?Sized>(&mut self, transport: &mut T, out: NodeId) {
        if self.nodes.is_some() {
            return;
        }
        let now = transport.now();

        let osc = transport.create_oscillator(Waveform::Triangle, DRONE_FREQUENCY_HZ);
        let gain = transport.create_gain(DRONE_LEVEL);
        transport.set_value_at(osc, Param::Frequency, DRONE_FREQUENCY_HZ, now);
        transport.set_value_at(gain, Param::Gain, DRONE_LEVEL, now);

        transport.connect(osc, gain);
        transport.connect(gain, out);
        transport.start(osc, now);

        self.nodes = Some((osc, gain));
        log::debug!("background drone running");
    }
}
