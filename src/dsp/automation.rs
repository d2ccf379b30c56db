use crate::MIN_TIME;

/*
Scheduled Parameter Automation
==============================

Every automatable parameter (oscillator frequency, gain level, filter cutoff)
carries a `ParamTimeline`: an ordered list of scheduled events that fully
determines the parameter's value at any point on the transport clock. The
control side schedules; the render side evaluates. Nothing is applied
immediately - even "set it now" is an event at the current time.

Vocabulary
----------

  base      The value before the first event (the constructor argument).

  event     One scheduled change. Four kinds:

              SetValue          hold `value` from `at` onward.
              LinearRampTo      straight line from the previous event's
                                value/time to (`at`, `value`).
              ExponentialRampTo geometric curve over the same span. Matches
                                pitch/energy perception better than linear,
                                which is why sweeps use it.
              SetTarget         exponential approach that never quite arrives:
                                target + (v0 - target) * e^(-(t-at)/tau).
                                Repeated retargeting produces a continuous
                                glide instead of stepping artifacts.

  anchor    The (time, value) pair a ramp interpolates from: the previous
            event's scheduled value at its own time. Ramps scheduled with no
            prior event anchor at time zero on the base value.

The Shape
---------

  value
    v1 |         ____          target ~~~~~~~~
       |        /    \            ___---
    v0 |___----       \____---~~~
       +-------------------------------------> time
         set   ramp    ramp   set_target

Evaluation walks the events in time order, carrying the value forward. Equal
timestamps keep insertion order, so a SetValue followed by a ramp at the same
instant behaves as issued.

Two deliberate deviations from the strictest reading of the scheduling calls:

  - An exponential ramp whose endpoints straddle or touch zero has no
    geometric interpolation; the segment degrades to linear instead of being
    rejected. Audio here is an enhancement, not a place to signal errors.
  - A ramp scheduled while an approach is still active anchors to the
    approach's starting value, not its instantaneous value. Callers that mix
    the two first cancel and pin the current value, so the case never arises
    in practice.

`compact` exists because loop voices live for the whole session: a master bus
toggled for hours, or a hum retargeted every animation frame, would otherwise
accumulate unbounded history. Folding fully-elapsed events into a synthetic
anchor keeps evaluation O(pending events) forever.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue {
        value: f32,
        at: f64,
    },
    LinearRampTo {
        value: f32,
        at: f64,
    },
    ExponentialRampTo {
        value: f32,
        at: f64,
    },
    SetTarget {
        target: f32,
        at: f64,
        time_constant: f64,
    },
}

impl AutomationEvent {
    /// The time this event takes (or finishes taking) effect. For ramps this
    /// is the end of the segment.
    pub fn at(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { at, .. }
            | AutomationEvent::LinearRampTo { at, .. }
            | AutomationEvent::ExponentialRampTo { at, .. }
            | AutomationEvent::SetTarget { at, .. } => at,
        }
    }
}

/// An exponential approach in progress: captured when evaluation passes a
/// `SetTarget` event.
#[derive(Debug, Clone, Copy)]
struct Approach {
    target: f32,
    start: f64,
    time_constant: f64,
    from: f32,
}

impl Approach {
    fn value_at(&self, t: f64) -> f32 {
        let tau = self.time_constant.max(MIN_TIME);
        let decay = (-(t - self.start) / tau).exp() as f32;
        self.target + (self.from - self.target) * decay
    }
}

/// Evaluation state at a query time: the carried value, the anchor for a
/// pending ramp, any active approach, and the index of the first future event.
struct StateAt {
    value: f32,
    anchor_at: f64,
    approach: Option<Approach>,
    next_index: usize,
}

#[derive(Debug, Clone)]
pub struct ParamTimeline {
    base: f32,
    events: Vec<AutomationEvent>,
}

impl ParamTimeline {
    pub fn new(initial: f32) -> Self {
        Self {
            base: initial,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Insert an event keeping the list ordered by effect time. Equal times
    /// preserve insertion order.
    pub fn schedule(&mut self, event: AutomationEvent) {
        let at = event.at();
        let index = self.events.partition_point(|e| e.at() <= at);
        self.events.insert(index, event);
    }

    /// Drop every event scheduled at or after `from`. Ramps count by their
    /// end time, so an in-flight ramp is removed too.
    pub fn cancel_from(&mut self, from: f64) {
        self.events.retain(|e| e.at() < from);
    }

    fn state_at(&self, t: f64) -> StateAt {
        let mut value = self.base;
        let mut anchor_at = 0.0f64;
        let mut approach: Option<Approach> = None;
        let mut next_index = self.events.len();

        for (index, event) in self.events.iter().enumerate() {
            if event.at() > t {
                next_index = index;
                break;
            }

            // A later event supersedes an active approach at its own time
            if let Some(active) = approach.take() {
                value = active.value_at(event.at());
            }

            match *event {
                AutomationEvent::SetValue { value: v, at }
                | AutomationEvent::LinearRampTo { value: v, at }
                | AutomationEvent::ExponentialRampTo { value: v, at } => {
                    value = v;
                    anchor_at = at;
                }
                AutomationEvent::SetTarget {
                    target,
                    at,
                    time_constant,
                } => {
                    approach = Some(Approach {
                        target,
                        start: at,
                        time_constant,
                        from: value,
                    });
                    anchor_at = at;
                }
            }
        }

        StateAt {
            value,
            anchor_at,
            approach,
            next_index,
        }
    }

    /// Evaluate the timeline at `t`. Queries may be made in any order.
    pub fn value_at(&self, t: f64) -> f32 {
        let state = self.state_at(t);

        if let Some(approach) = state.approach {
            return approach.value_at(t);
        }

        // An in-flight ramp interpolates from the anchor to its own end
        if let Some(event) = self.events.get(state.next_index) {
            match *event {
                AutomationEvent::LinearRampTo { value, at } => {
                    return interpolate_linear(state.value, state.anchor_at, value, at, t);
                }
                AutomationEvent::ExponentialRampTo { value, at } => {
                    return interpolate_exponential(state.value, state.anchor_at, value, at, t);
                }
                _ => {}
            }
        }

        state.value
    }

    /// Fold events that can no longer influence values at or after `t` into a
    /// synthetic anchor, preserving `value_at` for all times `>= t`.
    pub fn compact(&mut self, t: f64) {
        let split = self.events.partition_point(|e| e.at() <= t);
        if split <= 1 {
            return;
        }

        let state = self.state_at(t);
        debug_assert_eq!(state.next_index, split);

        let last_at = self.events[split - 1].at();
        let tail = self.events.split_off(split);
        self.events.clear();

        match state.approach {
            Some(approach) => {
                // A live approach needs both its starting value and the event
                self.events.push(AutomationEvent::SetValue {
                    value: approach.from,
                    at: approach.start,
                });
                self.events.push(AutomationEvent::SetTarget {
                    target: approach.target,
                    at: approach.start,
                    time_constant: approach.time_constant,
                });
            }
            None => {
                self.events.push(AutomationEvent::SetValue {
                    value: state.value,
                    at: last_at,
                });
            }
        }
        self.events.extend(tail);
    }
}

#[inline]
fn interpolate_linear(v0: f32, t0: f64, v1: f32, t1: f64, t: f64) -> f32 {
    let span = t1 - t0;
    if span <= 0.0 {
        return v1;
    }
    let progress = ((t - t0) / span).clamp(0.0, 1.0) as f32;
    v0 + (v1 - v0) * progress
}

#[inline]
fn interpolate_exponential(v0: f32, t0: f64, v1: f32, t1: f64, t: f64) -> f32 {
    // Geometric interpolation needs same-signed, non-zero endpoints
    if v0 == 0.0 || v1 == 0.0 || (v0 < 0.0) != (v1 < 0.0) {
        return interpolate_linear(v0, t0, v1, t1, t);
    }
    let span = t1 - t0;
    if span <= 0.0 {
        return v1;
    }
    let progress = ((t - t0) / span).clamp(0.0, 1.0) as f32;
    v0 * (v1 / v0).powf(progress)
}
