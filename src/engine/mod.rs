//! The engine facade: one master bus, a fixed effect catalog, two loops.
//!
//! `SoundEngine` owns the only transport and the single gain stage all sound
//! passes through. Everything degrades gracefully: before initialization (and
//! while muted, for the gated effects) every trigger is a silent no-op,
//! because audio here is an enhancement, never something a caller should have
//! to error-handle.
//!
//! Initialization is lazy and idempotent. The transport is spawned on the
//! first `init` - or by `play_startup`, the one effect tied to the user
//! gesture that grants audio permission and therefore allowed to
//! self-initialize.

mod drone;
mod repulsor;

pub use repulsor::HumState;

use drone::Drone;
use repulsor::RepulsorHum;

use crate::effects::{self, OneShot};
use crate::graph::{NodeId, Param};
use crate::transport::{Transport, TransportError, TransportState};

/// Time constant for the mute/unmute gain ramp. Short enough to feel
/// immediate, long enough to avoid a click.
const MUTE_RAMP_TIME_CONSTANT: f64 = 0.05;

pub struct SoundEngine<T: Transport> {
    spawn: Box<dyn FnMut() -> Result<T, TransportError>>,
    transport: Option<T>,
    master: Option<NodeId>,
    muted: bool,
    drone: Drone,
    repulsor: RepulsorHum,
}

impl<T: Transport> SoundEngine<T> {
    /// Create an engine that will spawn its transport lazily through the
    /// given factory. At most one transport ever exists per engine.
    pub fn new(spawn: impl FnMut() -> Result<T, TransportError> + 'static) -> Self {
        Self {
            spawn: Box::new(spawn),
            transport: None,
            master: None,
            muted: false,
            drone: Drone::new(),
            repulsor: RepulsorHum::new(),
        }
    }

    /// Idempotent. The first call spawns the transport, wires the master bus
    /// to the output, and starts the background drone; later calls only
    /// resume a suspended transport. Spawn or resume failure is the
    /// collaborator's error, passed through untouched.
    pub fn init(&mut self) -> Result<(), TransportError> {
        if let Some(transport) = self.transport.as_mut() {
            if transport.state() == TransportState::Suspended {
                transport.resume()?;
                log::debug!("audio transport resumed");
            }
            return Ok(());
        }

        let mut transport = (self.spawn)()?;
        let now = transport.now();

        let master = transport.create_gain(1.0);
        transport.set_value_at(master, Param::Gain, 1.0, now);
        transport.retain(master);
        let destination = transport.destination();
        transport.connect(master, destination);

        self.drone.start(&mut transport, master);

        self.master = Some(master);
        self.transport = Some(transport);
        log::info!("sound engine initialized");
        Ok(())
    }

    /// Flip the mute state, ramping the master bus to silence or back to
    /// unity. Returns the new state; before initialization this is the
    /// current (false) state and nothing else happens.
    pub fn toggle_mute(&mut self) -> bool {
        let (Some(transport), Some(master)) = (self.transport.as_mut(), self.master) else {
            return self.muted;
        };

        self.muted = !self.muted;
        let target = if self.muted { 0.0 } else { 1.0 };
        let now = transport.now();
        transport.set_target_at(master, Param::Gain, target, now, MUTE_RAMP_TIME_CONSTANT);
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    // --- one-shot catalog -------------------------------------------------

    pub fn play_hover(&mut self) {
        self.trigger(&effects::hover());
    }

    pub fn play_click(&mut self) {
        self.trigger(&effects::click());
    }

    pub fn play_power_up(&mut self) {
        self.trigger(&effects::power_up());
    }

    pub fn play_power_down(&mut self) {
        self.trigger(&effects::power_down());
    }

    /// The startup sweep. The only effect that self-initializes (it is tied
    /// to the deliberate user action that establishes audio permission), and
    /// the only one that plays regardless of mute - the master bus still
    /// gates what is actually heard.
    pub fn play_startup(&mut self) -> Result<(), TransportError> {
        self.init()?;
        let (Some(transport), Some(master)) = (self.transport.as_mut(), self.master) else {
            return Ok(());
        };
        for voice in effects::startup() {
            voice.spawn(transport, master);
        }
        Ok(())
    }

    fn trigger(&mut self, effect: &OneShot) {
        if self.muted {
            return;
        }
        let (Some(transport), Some(master)) = (self.transport.as_mut(), self.master) else {
            return;
        };
        if transport.state() != TransportState::Running {
            return;
        }
        effect.spawn(transport, master);
    }

    // --- loop voices ------------------------------------------------------

    pub fn start_repulsor_hum(&mut self) {
        let (Some(transport), Some(master)) = (self.transport.as_mut(), self.master) else {
            return;
        };
        self.repulsor.start(transport, master);
    }

    pub fn stop_repulsor_hum(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        self.repulsor.stop(transport);
    }

    /// Map an intensity factor onto the hum's pitch and brightness. The
    /// expected range is `[0, 1]` but nothing clamps it; out-of-range input
    /// produces out-of-range targets.
    pub fn modulate_repulsor(&mut self, intensity: f32) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        self.repulsor.modulate(transport, intensity);
    }

    /// Lifecycle state of the hum as of the last operation on it. The
    /// fade-out deadline is evaluated on operations, not on this read.
    pub fn repulsor_state(&self) -> HumState {
        self.repulsor.state()
    }

    // --- plumbing ---------------------------------------------------------

    /// The transport, once spawned. Mainly for offline rendering and tests.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }
}
