//! The repulsor hum - a continuous, intensity-modulated loop voice.
//!
//! A sawtooth through a low-pass filter: closed, it is a muffled idle hum;
//! opened, the upper harmonics come through as a growl. Intensity drives both
//! the oscillator pitch and the filter cutoff as smoothed retargets, so rapid
//! repeated modulation glides instead of stepping.
//!
//! Lifecycle is an explicit three-state machine:
//!
//! ```text
//! Idle --start--> Running --stop--> StoppingFadeOut --(deadline)--> Idle
//! ```
//!
//! The fade-out deadline lives on the transport clock and is checked at the
//! entry of every operation. `start` is guarded on the state, not a flag: a
//! start issued during the 0.2 s fade window is ignored, and a fresh start
//! becomes possible the moment the deadline has passed.

use crate::dsp::automation::{AutomationEvent, ParamTimeline};
use crate::dsp::{FilterMode, Waveform};
use crate::graph::{NodeId, Param};
use crate::transport::Transport;

const START_FREQUENCY_HZ: f32 = 100.0;
const START_CUTOFF_HZ: f32 = 200.0;
const HUM_LEVEL: f32 = 0.15;
const FADE_IN_SECS: f64 = 0.5;
const FADE_OUT_SECS: f64 = 0.2;

// Intensity 0..1 maps linearly onto these spans. Out-of-range intensity
// produces out-of-range targets; clamping is the caller's call.
const FREQUENCY_FLOOR_HZ: f32 = 80.0;
const FREQUENCY_SPAN_HZ: f32 = 120.0;
const CUTOFF_FLOOR_HZ: f32 = 150.0;
const CUTOFF_SPAN_HZ: f32 = 1850.0;

/// Smoothing time constant for modulation retargets.
const GLIDE_TIME_CONSTANT: f64 = 0.1;

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumState {
    Idle,
    Running,
    StoppingFadeOut,
}

struct HumNodes {
    osc: NodeId,
    filter: NodeId,
    gain: NodeId,
}

enum Machine {
    Idle,
    Running {
        nodes: HumNodes,
        /// Local mirror of everything scheduled on the gain, so `stop` can
        /// pin the instantaneous level without a read-back channel to the
        /// render side.
        gain_plan: ParamTimeline,
    },
    Stopping {
        until: f64,
    },
}

pub(crate) struct RepulsorHum {
    machine: Machine,
}

impl RepulsorHum {
    pub fn new() -> Self {
        Self {
            machine: Machine::Idle,
        }
    }

    pub fn state(&self) -> HumState {
        match self.machine {
            Machine::Idle => HumState::Idle,
            Machine::Running { .. } => HumState::Running,
            Machine::Stopping { .. } => HumState::StoppingFadeOut,
        }
    }

    /// Drive the deadline transition. Called at the entry of every operation.
    pub fn settle(&mut self, now: f64) {
        if let Machine::Stopping { until } = self.machine {
            if now >= until {
                self.machine = Machine::Idle;
                log::debug!("repulsor hum fade-out complete");
            }
        }
    }

    /// Build the chain and fade in. Valid only from `Idle`; no-op otherwise.
    pub fn start<T: Transport + ?Sized>(&mut self, transport: &mut T, out: NodeId) {
        self.settle(transport.now());
        if !matches!(self.machine, Machine::Idle) {
            return;
        }
        let now = transport.now();

        let osc = transport.create_oscillator(Waveform::Sawtooth, START_FREQUENCY_HZ);
        let filter = transport.create_filter(FilterMode::Lowpass, START_CUTOFF_HZ);
        let gain = transport.create_gain(0.0);

        transport.set_value_at(gain, Param::Gain, 0.0, now);
        transport.linear_ramp_to(gain, Param::Gain, HUM_LEVEL, now + FADE_IN_SECS);

        transport.connect(osc, filter);
        transport.connect(filter, gain);
        transport.connect(gain, out);
        transport.start(osc, now);

        let mut gain_plan = ParamTimeline::new(0.0);
        gain_plan.schedule(AutomationEvent::SetValue { value: 0.0, at: now });
        gain_plan.schedule(AutomationEvent::LinearRampTo {
            value: HUM_LEVEL,
            at: now + FADE_IN_SECS,
        });

        self.machine = Machine::Running {
            nodes: HumNodes { osc, filter, gain },
            gain_plan,
        };
        log::debug!("repulsor hum running");
    }

    /// Retarget pitch and cutoff from an intensity factor. Valid only while
    /// `Running`; no-op otherwise.
    pub fn modulate<T: Transport + ?Sized>(&mut self, transport: &mut T, intensity: f32) {
        self.settle(transport.now());
        let Machine::Running { nodes, .. } = &self.machine else {
            return;
        };
        let now = transport.now();

        let frequency = FREQUENCY_FLOOR_HZ + intensity * FREQUENCY_SPAN_HZ;
        let cutoff = CUTOFF_FLOOR_HZ + intensity * CUTOFF_SPAN_HZ;

        transport.set_target_at(nodes.osc, Param::Frequency, frequency, now, GLIDE_TIME_CONSTANT);
        transport.set_target_at(nodes.filter, Param::Cutoff, cutoff, now, GLIDE_TIME_CONSTANT);
    }

    /// Fade out and schedule the oscillator stop. Valid only while `Running`;
    /// no-op otherwise, so a second stop cannot double-schedule the fade.
    pub fn stop<T: Transport + ?Sized>(&mut self, transport: &mut T) {
        self.settle(transport.now());
        let Machine::Running { nodes, gain_plan } = &self.machine else {
            return;
        };
        let now = transport.now();

        // Pin the instantaneous level first, then replace the pending plan
        // with the fade. Stopping mid-fade-in fades from wherever it got to.
        let current = gain_plan.value_at(now);
        transport.cancel_scheduled(nodes.gain, Param::Gain, now);
        transport.set_value_at(nodes.gain, Param::Gain, current, now);
        transport.linear_ramp_to(nodes.gain, Param::Gain, 0.0, now + FADE_OUT_SECS);
        transport.stop(nodes.osc, now + FADE_OUT_SECS);

        self.machine = Machine::Stopping {
            until: now + FADE_OUT_SECS,
        };
        log::debug!("repulsor hum stopping");
    }
}
