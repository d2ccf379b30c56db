//! The rendering node graph.
//!
//! `AudioGraph` owns nodes (oscillators, gain stages, filters, the output
//! destination), the connections between them, and every parameter's
//! automation timeline. Rendering evaluates the graph one sample at a time in
//! topological order; the destination node's input is the output signal.
//!
//! The graph also reclaims itself: once an oscillator's scheduled stop time
//! has elapsed it is removed, cascading to downstream nodes that lose their
//! last input. Callers therefore never tear down one-shot chains - they build
//! them, schedule the stop, and forget the handles.

/// Node handles and parameter identifiers.
pub mod node;

use std::collections::HashMap;

use crate::dsp::automation::{AutomationEvent, ParamTimeline};
use crate::dsp::filter::SvFilter;
use crate::dsp::oscillator::Oscillator;
use crate::dsp::{FilterMode, Waveform};

pub use node::{NodeId, NodeKind, Param};

/// A graph mutation as plain data, so a control thread can drive a graph that
/// lives inside an audio callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    CreateOscillator {
        id: NodeId,
        wave: Waveform,
        frequency_hz: f32,
    },
    CreateGain {
        id: NodeId,
        level: f32,
    },
    CreateFilter {
        id: NodeId,
        mode: FilterMode,
        cutoff_hz: f32,
    },
    Connect {
        source: NodeId,
        dest: NodeId,
    },
    Schedule {
        node: NodeId,
        param: Param,
        event: AutomationEvent,
    },
    CancelScheduled {
        node: NodeId,
        param: Param,
        from: f64,
    },
    Start {
        node: NodeId,
        at: f64,
    },
    Stop {
        node: NodeId,
        at: f64,
    },
    Retain {
        node: NodeId,
    },
}

struct NodeSlot {
    kind: NodeKind,
    params: Vec<(Param, ParamTimeline)>,
    osc: Option<Oscillator>,
    filter: Option<SvFilter>,
    start_at: Option<f64>,
    stop_at: Option<f64>,
    /// Whether this node ever had an input connected. A node that was never
    /// fed (a freshly created master bus, say) is not a candidate for
    /// cascade reclamation.
    fed: bool,
    /// Pinned by the owner of its handle; never reclaimed.
    retained: bool,
}

impl NodeSlot {
    fn new(kind: NodeKind, param: Param, initial: f32) -> Self {
        Self {
            kind,
            params: vec![(param, ParamTimeline::new(initial))],
            osc: None,
            filter: None,
            start_at: None,
            stop_at: None,
            fed: false,
            retained: false,
        }
    }

    fn timeline(&self, param: Param) -> Option<&ParamTimeline> {
        self.params
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, tl)| tl)
    }

    fn timeline_mut(&mut self, param: Param) -> Option<&mut ParamTimeline> {
        self.params
            .iter_mut()
            .find(|(p, _)| *p == param)
            .map(|(_, tl)| tl)
    }

    #[inline]
    fn param_at(&self, param: Param, t: f64) -> f32 {
        self.timeline(param).map_or(0.0, |tl| tl.value_at(t))
    }

    #[inline]
    fn process(&mut self, input: f32, t: f64, sample_rate: f32) -> f32 {
        match self.kind {
            NodeKind::Oscillator(_) => {
                let started = self.start_at.is_some_and(|s| t >= s);
                let stopped = self.stop_at.is_some_and(|s| t >= s);
                if !started || stopped {
                    return 0.0;
                }
                let frequency = self.param_at(Param::Frequency, t);
                match self.osc.as_mut() {
                    Some(osc) => osc.next_sample(frequency, sample_rate),
                    None => 0.0,
                }
            }
            NodeKind::Gain => input * self.param_at(Param::Gain, t),
            NodeKind::Filter(_) => {
                let cutoff = self.param_at(Param::Cutoff, t);
                match self.filter.as_mut() {
                    Some(filter) => {
                        filter.set_cutoff(cutoff);
                        filter.next_sample(input, sample_rate)
                    }
                    None => input,
                }
            }
            NodeKind::Destination => input,
        }
    }
}

/// Cached render order, invalidated by any structural change.
struct RenderPlan {
    order: Vec<NodeId>,
    /// For each node in `order`, the positions (earlier in `order`) of its
    /// sources. Duplicate connections sum twice, as issued.
    inputs: Vec<Vec<usize>>,
    dest_pos: Option<usize>,
}

pub struct AudioGraph {
    sample_rate: f32,
    /// Frames rendered so far. The clock derives from this count so it never
    /// accumulates floating-point drift against scheduled times.
    frames: u64,
    nodes: HashMap<u32, NodeSlot>,
    edges: Vec<(NodeId, NodeId)>,
    plan: Option<RenderPlan>,
    scratch: Vec<f32>,
    next_id: u32,
    created_nodes: u64,
    scheduled_events: u64,
}

const DESTINATION_ID: u32 = 0;

impl AudioGraph {
    pub fn new(sample_rate: f32) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            DESTINATION_ID,
            NodeSlot {
                kind: NodeKind::Destination,
                params: Vec::new(),
                osc: None,
                filter: None,
                start_at: None,
                stop_at: None,
                fed: false,
                retained: true,
            },
        );

        Self {
            sample_rate,
            frames: 0,
            nodes,
            edges: Vec::new(),
            plan: None,
            scratch: Vec::new(),
            next_id: DESTINATION_ID + 1,
            created_nodes: 0,
            scheduled_events: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Seconds rendered so far.
    pub fn current_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn destination(&self) -> NodeId {
        NodeId(DESTINATION_ID)
    }

    // --- construction -----------------------------------------------------

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, id: NodeId, slot: NodeSlot) {
        self.nodes.insert(id.0, slot);
        self.created_nodes += 1;
        self.plan = None;
    }

    pub fn create_oscillator(&mut self, wave: Waveform, frequency_hz: f32) -> NodeId {
        let id = self.alloc_id();
        self.create_oscillator_at(id, wave, frequency_hz);
        id
    }

    fn create_oscillator_at(&mut self, id: NodeId, wave: Waveform, frequency_hz: f32) {
        let mut slot = NodeSlot::new(NodeKind::Oscillator(wave), Param::Frequency, frequency_hz);
        slot.osc = Some(Oscillator::new(wave));
        self.insert(id, slot);
    }

    pub fn create_gain(&mut self, level: f32) -> NodeId {
        let id = self.alloc_id();
        self.create_gain_at(id, level);
        id
    }

    fn create_gain_at(&mut self, id: NodeId, level: f32) {
        self.insert(id, NodeSlot::new(NodeKind::Gain, Param::Gain, level));
    }

    pub fn create_filter(&mut self, mode: FilterMode, cutoff_hz: f32) -> NodeId {
        let id = self.alloc_id();
        self.create_filter_at(id, mode, cutoff_hz);
        id
    }

    fn create_filter_at(&mut self, id: NodeId, mode: FilterMode, cutoff_hz: f32) {
        let mut slot = NodeSlot::new(NodeKind::Filter(mode), Param::Cutoff, cutoff_hz);
        slot.filter = Some(SvFilter::new(mode, cutoff_hz));
        self.insert(id, slot);
    }

    pub fn connect(&mut self, source: NodeId, dest: NodeId) {
        if !self.nodes.contains_key(&source.0) || !self.nodes.contains_key(&dest.0) {
            return;
        }
        self.edges.push((source, dest));
        if let Some(slot) = self.nodes.get_mut(&dest.0) {
            slot.fed = true;
        }
        self.plan = None;
    }

    // --- scheduling -------------------------------------------------------

    pub fn schedule(&mut self, node: NodeId, param: Param, event: AutomationEvent) {
        if let Some(tl) = self
            .nodes
            .get_mut(&node.0)
            .and_then(|slot| slot.timeline_mut(param))
        {
            tl.schedule(event);
            self.scheduled_events += 1;
        }
    }

    pub fn cancel_scheduled(&mut self, node: NodeId, param: Param, from: f64) {
        if let Some(tl) = self
            .nodes
            .get_mut(&node.0)
            .and_then(|slot| slot.timeline_mut(param))
        {
            tl.cancel_from(from);
        }
    }

    /// The parameter's value at the current graph time.
    pub fn param_value(&self, node: NodeId, param: Param) -> f32 {
        let now = self.current_time();
        self.nodes
            .get(&node.0)
            .map_or(0.0, |slot| slot.param_at(param, now))
    }

    pub fn start(&mut self, node: NodeId, at: f64) {
        if let Some(slot) = self.nodes.get_mut(&node.0) {
            if matches!(slot.kind, NodeKind::Oscillator(_)) && slot.start_at.is_none() {
                slot.start_at = Some(at);
            }
        }
    }

    pub fn stop(&mut self, node: NodeId, at: f64) {
        if let Some(slot) = self.nodes.get_mut(&node.0) {
            if matches!(slot.kind, NodeKind::Oscillator(_)) {
                // Last call wins, so a fade-out can tighten an earlier stop
                slot.stop_at = Some(at);
            }
        }
    }

    /// Pin a node against reclamation. The graph frees one-shot chains on its
    /// own; a caller that keeps a handle to a long-lived node (a master bus)
    /// declares that here.
    pub fn retain(&mut self, node: NodeId) {
        if let Some(slot) = self.nodes.get_mut(&node.0) {
            slot.retained = true;
        }
    }

    /// Apply a mutation issued by a remote producer. Creates use the
    /// producer's pre-allocated ids; everything else matches the inherent
    /// methods.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::CreateOscillator {
                id,
                wave,
                frequency_hz,
            } => {
                self.next_id = self.next_id.max(id.0 + 1);
                self.create_oscillator_at(id, wave, frequency_hz);
            }
            Command::CreateGain { id, level } => {
                self.next_id = self.next_id.max(id.0 + 1);
                self.create_gain_at(id, level);
            }
            Command::CreateFilter {
                id,
                mode,
                cutoff_hz,
            } => {
                self.next_id = self.next_id.max(id.0 + 1);
                self.create_filter_at(id, mode, cutoff_hz);
            }
            Command::Connect { source, dest } => self.connect(source, dest),
            Command::Schedule { node, param, event } => self.schedule(node, param, event),
            Command::CancelScheduled { node, param, from } => {
                self.cancel_scheduled(node, param, from)
            }
            Command::Start { node, at } => self.start(node, at),
            Command::Stop { node, at } => self.stop(node, at),
            Command::Retain { node } => self.retain(node),
        }
    }

    // --- rendering --------------------------------------------------------

    fn build_plan(&self) -> RenderPlan {
        // Kahn's algorithm; ids sorted first so the order is deterministic.
        // Nodes caught in a connection cycle are left out and render nothing.
        let mut ids: Vec<u32> = self.nodes.keys().copied().collect();
        ids.sort_unstable();

        let mut indegree: HashMap<u32, usize> = ids.iter().map(|&id| (id, 0)).collect();
        for &(source, dest) in &self.edges {
            if self.nodes.contains_key(&source.0) {
                if let Some(count) = indegree.get_mut(&dest.0) {
                    *count += 1;
                }
            }
        }

        let mut ready: Vec<u32> = ids
            .iter()
            .copied()
            .filter(|id| indegree[id] == 0)
            .collect();
        let mut order: Vec<NodeId> = Vec::with_capacity(ids.len());

        while let Some(id) = ready.pop() {
            order.push(NodeId(id));
            for &(source, dest) in &self.edges {
                if source.0 == id {
                    if let Some(count) = indegree.get_mut(&dest.0) {
                        *count -= 1;
                        if *count == 0 {
                            ready.push(dest.0);
                        }
                    }
                }
            }
        }

        let pos: HashMap<u32, usize> = order
            .iter()
            .enumerate()
            .map(|(index, id)| (id.0, index))
            .collect();

        let mut inputs: Vec<Vec<usize>> = vec![Vec::new(); order.len()];
        for &(source, dest) in &self.edges {
            if let (Some(&s), Some(&d)) = (pos.get(&source.0), pos.get(&dest.0)) {
                inputs[d].push(s);
            }
        }

        RenderPlan {
            order,
            inputs,
            dest_pos: pos.get(&DESTINATION_ID).copied(),
        }
    }

    /// Render `out.len()` mono samples, advancing the graph clock, then
    /// reclaim finished chains and compact long-lived timelines.
    pub fn render(&mut self, out: &mut [f32]) {
        if out.is_empty() {
            return;
        }
        if self.plan.is_none() {
            self.plan = Some(self.build_plan());
        }
        let Some(plan) = self.plan.take() else {
            return;
        };

        self.scratch.resize(plan.order.len(), 0.0);
        let sample_rate = self.sample_rate;

        for frame in out.iter_mut() {
            let t = self.frames as f64 / sample_rate as f64;
            for (index, id) in plan.order.iter().enumerate() {
                let input: f32 = plan.inputs[index]
                    .iter()
                    .map(|&source| self.scratch[source])
                    .sum();
                self.scratch[index] = match self.nodes.get_mut(&id.0) {
                    Some(slot) => slot.process(input, t, sample_rate),
                    None => 0.0,
                };
            }
            *frame = plan.dest_pos.map_or(0.0, |pos| self.scratch[pos]);
            self.frames += 1;
        }

        self.plan = Some(plan);
        self.reclaim_finished();
    }

    /// Remove oscillators whose stop time has elapsed, cascade to downstream
    /// nodes that lose their last input, and fold elapsed automation history.
    fn reclaim_finished(&mut self) {
        let now = self.current_time();

        let expired: Vec<u32> = self
            .nodes
            .iter()
            .filter(|(_, slot)| {
                matches!(slot.kind, NodeKind::Oscillator(_))
                    && !slot.retained
                    && slot.stop_at.is_some_and(|stop| stop <= now)
            })
            .map(|(&id, _)| id)
            .collect();
        for id in &expired {
            self.remove_node(*id);
        }

        if !expired.is_empty() {
            loop {
                let orphans: Vec<u32> = self
                    .nodes
                    .iter()
                    .filter(|(&id, slot)| {
                        !matches!(slot.kind, NodeKind::Oscillator(_))
                            && !slot.retained
                            && slot.fed
                            && !self.edges.iter().any(|&(_, dest)| dest.0 == id)
                    })
                    .map(|(&id, _)| id)
                    .collect();
                if orphans.is_empty() {
                    break;
                }
                for id in orphans {
                    self.remove_node(id);
                }
            }
        }

        for slot in self.nodes.values_mut() {
            for (_, tl) in &mut slot.params {
                tl.compact(now);
            }
        }
    }

    fn remove_node(&mut self, id: u32) {
        self.nodes.remove(&id);
        self.edges
            .retain(|&(source, dest)| source.0 != id && dest.0 != id);
        self.plan = None;
    }

    // --- introspection ----------------------------------------------------

    /// Live node ids, sorted.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().map(|&id| NodeId(id)).collect();
        ids.sort_unstable();
        ids
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node.0).map(|slot| slot.kind)
    }

    pub fn timeline(&self, node: NodeId, param: Param) -> Option<&ParamTimeline> {
        self.nodes.get(&node.0).and_then(|slot| slot.timeline(param))
    }

    /// Scheduled (start, stop) window of an oscillator.
    pub fn lifetime(&self, node: NodeId) -> Option<(Option<f64>, Option<f64>)> {
        self.nodes
            .get(&node.0)
            .map(|slot| (slot.start_at, slot.stop_at))
    }

    pub fn connections(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Total nodes ever created (excluding the built-in destination);
    /// monotonic, unaffected by reclamation.
    pub fn created_nodes(&self) -> u64 {
        self.created_nodes
    }

    /// Total automation events ever scheduled; monotonic.
    pub fn scheduled_events(&self) -> u64 {
        self.scheduled_events
    }
}
