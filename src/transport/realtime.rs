//! Realtime transport: renders the graph through the system audio device.
//!
//! The audio callback owns the graph outright. The control side allocates
//! node ids, mirrors nothing, and ships every mutation across a lock-free
//! ring as [`Command`] values; the callback drains the ring at the top of
//! each buffer, renders mono blocks, and fans them out to however many
//! channels the device wants. The only state shared between the threads is
//! the frame counter behind the clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};

use crate::dsp::automation::AutomationEvent;
use crate::dsp::{FilterMode, Waveform};
use crate::graph::{AudioGraph, Command, NodeId, Param};
use crate::transport::{Transport, TransportError, TransportState};
use crate::MAX_BLOCK_SIZE;

/// Pending-command capacity. A full ring drops the command: losing a UI
/// chirp under pathological load beats blocking the caller.
const COMMAND_RING_CAPACITY: usize = 1024;

pub struct RealtimeTransport {
    stream: cpal::Stream,
    commands: Producer<Command>,
    frames: Arc<AtomicU64>,
    sample_rate: f32,
    state: TransportState,
    next_id: u32,
}

impl RealtimeTransport {
    /// Acquire the default output device and start rendering.
    pub fn open() -> Result<Self, TransportError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(TransportError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (commands, mut pending) = RingBuffer::<Command>::new(COMMAND_RING_CAPACITY);
        let frames = Arc::new(AtomicU64::new(0));
        let rendered = Arc::clone(&frames);

        let mut graph = AudioGraph::new(sample_rate);
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                while let Ok(command) = pending.pop() {
                    graph.apply(command);
                }

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let mono = &mut block[..frames_to_render];
                    graph.render(mono);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in mono.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }

                rendered.fetch_add(total_frames as u64, Ordering::Release);
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;
        stream.play()?;

        log::info!("realtime transport running: {sample_rate} Hz, {channels} channel(s)");

        Ok(Self {
            stream,
            commands,
            frames,
            sample_rate,
            state: TransportState::Running,
            next_id: 1, // 0 is the graph's built-in destination
        })
    }

    fn push(&mut self, command: Command) {
        let _ = self.commands.push(command);
    }

    fn alloc_id(&mut self) -> NodeId {
        // Mirrors the graph's own monotonic allocation, kept in sync because
        // only creates allocate and commands apply in issue order
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Transport for RealtimeTransport {
    fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn state(&self) -> TransportState {
        self.state
    }

    fn suspend(&mut self) -> Result<(), TransportError> {
        if self.state == TransportState::Running {
            self.stream.pause()?;
            self.state = TransportState::Suspended;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), TransportError> {
        if self.state == TransportState::Suspended {
            self.stream.play()?;
            self.state = TransportState::Running;
        }
        Ok(())
    }

    fn destination(&self) -> NodeId {
        NodeId(0)
    }

    fn create_oscillator(&mut self, wave: Waveform, frequency_hz: f32) -> NodeId {
        let id = self.alloc_id();
        self.push(Command::CreateOscillator {
            id,
            wave,
            frequency_hz,
        });
        id
    }

    fn create_gain(&mut self, level: f32) -> NodeId {
        let id = self.alloc_id();
        self.push(Command::CreateGain { id, level });
        id
    }

    fn create_filter(&mut self, mode: FilterMode, cutoff_hz: f32) -> NodeId {
        let id = self.alloc_id();
        self.push(Command::CreateFilter {
            id,
            mode,
            cutoff_hz,
        });
        id
    }

    fn connect(&mut self, source: NodeId, dest: NodeId) {
        self.push(Command::Connect { source, dest });
    }

    fn retain(&mut self, node: NodeId) {
        self.push(Command::Retain { node });
    }

    fn schedule(&mut self, node: NodeId, param: Param, event: AutomationEvent) {
        self.push(Command::Schedule { node, param, event });
    }

    fn cancel_scheduled(&mut self, node: NodeId, param: Param, from: f64) {
        self.push(Command::CancelScheduled { node, param, from });
    }

    fn start(&mut self, node: NodeId, at: f64) {
        self.push(Command::Start { node, at });
    }

    fn stop(&mut self, node: NodeId, at: f64) {
        self.push(Command::Stop { node, at });
    }
}
