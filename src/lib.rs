pub mod dsp;
pub mod effects; // Fixed catalog of one-shot sound effects
pub mod engine; // Facade: master bus, mute toggle, loop voices
pub mod graph; // Rendering node graph with scheduled automation
pub mod transport; // Clock + device seam (offline and realtime backends)

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f64 = 1.0 / 48_000.0;
