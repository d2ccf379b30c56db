//! End-to-end behavior of the engine over the offline transport: lazy
//! initialization, mute gating, the one-shot catalog, and the repulsor hum's
//! lifecycle, all observed through the graph the transport exposes.

use hud_sfx::dsp::automation::AutomationEvent;
use hud_sfx::dsp::{FilterMode, Waveform};
use hud_sfx::engine::{HumState, SoundEngine};
use hud_sfx::graph::{NodeId, NodeKind, Param};
use hud_sfx::transport::{OfflineTransport, Transport, TransportState};

const SAMPLE_RATE: f32 = 48_000.0;

fn engine() -> SoundEngine<OfflineTransport> {
    SoundEngine::new(|| Ok(OfflineTransport::new(SAMPLE_RATE)))
}

fn oscillators(t: &OfflineTransport) -> Vec<(NodeId, Waveform)> {
    t.graph()
        .ids()
        .into_iter()
        .filter_map(|id| match t.graph().kind(id) {
            Some(NodeKind::Oscillator(wave)) => Some((id, wave)),
            _ => None,
        })
        .collect()
}

fn oscillator_of(t: &OfflineTransport, wave: Waveform) -> NodeId {
    let matches: Vec<NodeId> = oscillators(t)
        .into_iter()
        .filter(|&(_, w)| w == wave)
        .map(|(id, _)| id)
        .collect();
    assert_eq!(matches.len(), 1, "expected exactly one {wave:?} oscillator");
    matches[0]
}

/// The gain node a given source feeds.
fn gain_after(t: &OfflineTransport, source: NodeId) -> NodeId {
    let dest = t
        .graph()
        .connections()
        .iter()
        .find(|&&(s, _)| s == source)
        .map(|&(_, d)| d)
        .expect("source should be connected");
    assert_eq!(t.graph().kind(dest), Some(NodeKind::Gain));
    dest
}

fn last_target(t: &OfflineTransport, node: NodeId, param: Param) -> f32 {
    match t
        .graph()
        .timeline(node, param)
        .expect("timeline should exist")
        .events()
        .last()
    {
        Some(AutomationEvent::SetTarget { target, .. }) => *target,
        other => panic!("expected a SetTarget event, got {other:?}"),
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[test]
fn nothing_happens_before_init() {
    let mut engine = engine();

    engine.play_hover();
    engine.play_click();
    engine.play_power_up();
    engine.play_power_down();
    engine.start_repulsor_hum();
    engine.modulate_repulsor(1.0);
    engine.stop_repulsor_hum();

    assert!(!engine.is_initialized(), "no call should have spawned audio");
    assert!(!engine.toggle_mute(), "mute reports current state, unchanged");
    assert!(!engine.is_initialized());
}

#[test]
fn init_is_idempotent_and_starts_the_drone_once() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.init().unwrap();

    let transport = engine.transport().unwrap();
    // Master gain + drone oscillator + drone gain, exactly once
    assert_eq!(transport.graph().created_nodes(), 3);

    let oscs = oscillators(transport);
    assert_eq!(oscs.len(), 1);
    assert_eq!(oscs[0].1, Waveform::Triangle);
}

#[test]
fn drone_is_audible_after_init() {
    let mut engine = engine();
    engine.init().unwrap();

    let body = engine.transport_mut().unwrap().render_seconds(0.1);
    let peak = peak(&body);
    assert!(
        peak > 0.01 && peak < 0.05,
        "drone should murmur at its set level, peak {peak}"
    );
}

#[test]
fn toggle_mute_alternates_and_reports_the_new_state() {
    let mut engine = engine();
    engine.init().unwrap();

    assert!(engine.toggle_mute());
    assert!(engine.is_muted());
    assert!(!engine.toggle_mute());
    assert!(!engine.is_muted());
    assert!(engine.toggle_mute());
}

#[test]
fn mute_ramps_the_master_bus_to_silence_and_back() {
    let mut engine = engine();
    engine.init().unwrap();

    engine.transport_mut().unwrap().render_seconds(0.1);
    engine.toggle_mute();
    let fade = engine.transport_mut().unwrap().render_seconds(1.0);
    assert!(
        peak(&fade[fade.len() - 100..]) < 1e-3,
        "muted output should have decayed to silence"
    );

    engine.toggle_mute();
    let restored = engine.transport_mut().unwrap().render_seconds(1.0);
    assert!(
        peak(&restored[restored.len() - 4_800..]) > 0.01,
        "unmuting should restore the drone"
    );
}

#[test]
fn hover_builds_the_catalog_envelope() {
    let mut engine = engine();
    engine.init().unwrap();
    let t0 = engine.transport().unwrap().now();

    engine.play_hover();

    let transport = engine.transport().unwrap();
    let osc = oscillator_of(transport, Waveform::Sine);
    let graph = transport.graph();

    let freq = graph.timeline(osc, Param::Frequency).unwrap().events();
    assert!(matches!(
        freq[0],
        AutomationEvent::SetValue { value, at } if value == 2000.0 && at == t0
    ));
    assert!(matches!(
        freq[1],
        AutomationEvent::ExponentialRampTo { value, at }
            if value == 4000.0 && (at - (t0 + 0.1)).abs() < 1e-9
    ));

    let gain = gain_after(transport, osc);
    let amp = graph.timeline(gain, Param::Gain).unwrap().events();
    assert!(matches!(
        amp[0],
        AutomationEvent::SetValue { value, .. } if value == 0.05
    ));
    assert!(matches!(
        amp[1],
        AutomationEvent::ExponentialRampTo { value, .. } if value == 0.001
    ));

    assert_eq!(graph.lifetime(osc), Some((Some(t0), Some(t0 + 0.1))));
}

#[test]
fn gated_effects_are_no_ops_while_muted() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.toggle_mute();

    let before = engine.transport().unwrap().graph().created_nodes();
    engine.play_hover();
    engine.play_click();
    engine.play_power_up();
    engine.play_power_down();
    assert_eq!(engine.transport().unwrap().graph().created_nodes(), before);
}

#[test]
fn startup_auto_initializes_and_layers_two_voices() {
    let mut engine = engine();
    engine.play_startup().unwrap();

    assert!(engine.is_initialized());
    let transport = engine.transport().unwrap();
    let graph = transport.graph();
    let t0 = 0.0;

    // Drone (triangle) plus the two startup voices
    assert_eq!(oscillators(transport).len(), 3);

    let bass = oscillator_of(transport, Waveform::Sine);
    let bass_freq = graph.timeline(bass, Param::Frequency).unwrap().events();
    assert!(matches!(
        bass_freq[0],
        AutomationEvent::SetValue { value, .. } if value == 50.0
    ));
    assert!(matches!(
        bass_freq[1],
        AutomationEvent::ExponentialRampTo { value, at } if value == 800.0 && at == t0 + 2.0
    ));
    assert_eq!(graph.lifetime(bass), Some((Some(t0), Some(t0 + 2.0))));

    let bass_amp = graph
        .timeline(gain_after(transport, bass), Param::Gain)
        .unwrap()
        .events();
    assert!(matches!(
        bass_amp[0],
        AutomationEvent::SetValue { value, .. } if value == 0.2
    ));

    let sparkle = oscillator_of(transport, Waveform::Sawtooth);
    let sparkle_freq = graph.timeline(sparkle, Param::Frequency).unwrap().events();
    assert!(matches!(
        sparkle_freq[1],
        AutomationEvent::ExponentialRampTo { value, at } if value == 6000.0 && at == t0 + 1.0
    ));
    let sparkle_amp = graph
        .timeline(gain_after(transport, sparkle), Param::Gain)
        .unwrap()
        .events();
    assert!(matches!(
        sparkle_amp[1],
        AutomationEvent::LinearRampTo { value, at } if value == 0.0 && at == t0 + 0.5
    ));
    assert_eq!(graph.lifetime(sparkle), Some((Some(t0), Some(t0 + 1.0))));
}

#[test]
fn startup_plays_even_while_muted() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.toggle_mute();

    let before = engine.transport().unwrap().graph().created_nodes();
    engine.play_startup().unwrap();
    assert_eq!(
        engine.transport().unwrap().graph().created_nodes(),
        before + 4,
        "both startup voices should build despite mute"
    );
}

#[test]
fn repulsor_lifecycle_start_modulate_stop_stop() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.start_repulsor_hum();
    assert_eq!(engine.repulsor_state(), HumState::Running);

    let transport = engine.transport().unwrap();
    let osc = oscillator_of(transport, Waveform::Sawtooth);
    let graph = transport.graph();

    // Chain is oscillator -> lowpass -> gain, with the fade-in scheduled
    let filter = graph
        .connections()
        .iter()
        .find(|&&(s, _)| s == osc)
        .map(|&(_, d)| d)
        .unwrap();
    assert_eq!(graph.kind(filter), Some(NodeKind::Filter(FilterMode::Lowpass)));
    let gain = gain_after(transport, filter);
    let fade_in = graph.timeline(gain, Param::Gain).unwrap().events();
    assert!(matches!(
        fade_in[1],
        AutomationEvent::LinearRampTo { value, at } if value == 0.15 && (at - 0.5).abs() < 1e-9
    ));

    // A second start is a no-op
    let created = graph.created_nodes();
    engine.start_repulsor_hum();
    assert_eq!(
        engine.transport().unwrap().graph().created_nodes(),
        created
    );

    engine.modulate_repulsor(1.0);
    let transport = engine.transport().unwrap();
    assert_eq!(last_target(transport, osc, Param::Frequency), 200.0);
    assert_eq!(last_target(transport, filter, Param::Cutoff), 2000.0);

    engine.stop_repulsor_hum();
    assert_eq!(engine.repulsor_state(), HumState::StoppingFadeOut);
    let transport = engine.transport().unwrap();
    let fade_out = transport.graph().timeline(gain, Param::Gain).unwrap().events();
    assert!(matches!(
        fade_out.last(),
        Some(AutomationEvent::LinearRampTo { value, at }) if *value == 0.0 && (at - 0.2).abs() < 1e-9
    ));
    assert_eq!(
        transport.graph().lifetime(osc),
        Some((Some(0.0), Some(0.2)))
    );

    // A second stop must not double-schedule the fade
    let events = transport.graph().scheduled_events();
    engine.stop_repulsor_hum();
    assert_eq!(engine.repulsor_state(), HumState::StoppingFadeOut);
    assert_eq!(
        engine.transport().unwrap().graph().scheduled_events(),
        events
    );
}

#[test]
fn modulate_mapping_is_exact_linear_interpolation() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.start_repulsor_hum();

    let transport = engine.transport().unwrap();
    let osc = oscillator_of(transport, Waveform::Sawtooth);
    let filter = transport
        .graph()
        .connections()
        .iter()
        .find(|&&(s, _)| s == osc)
        .map(|&(_, d)| d)
        .unwrap();

    for (intensity, frequency, cutoff) in
        [(0.0, 80.0, 150.0), (0.5, 140.0, 1075.0), (1.0, 200.0, 2000.0)]
    {
        engine.modulate_repulsor(intensity);
        let transport = engine.transport().unwrap();
        assert_eq!(last_target(transport, osc, Param::Frequency), frequency);
        assert_eq!(last_target(transport, filter, Param::Cutoff), cutoff);
    }
}

#[test]
fn modulate_outside_running_is_a_no_op() {
    let mut engine = engine();
    engine.init().unwrap();

    let baseline = engine.transport().unwrap().graph().scheduled_events();
    engine.modulate_repulsor(0.7);
    assert_eq!(
        engine.transport().unwrap().graph().scheduled_events(),
        baseline
    );

    engine.start_repulsor_hum();
    engine.stop_repulsor_hum();
    let during_fade = engine.transport().unwrap().graph().scheduled_events();
    engine.modulate_repulsor(0.7);
    assert_eq!(
        engine.transport().unwrap().graph().scheduled_events(),
        during_fade
    );
}

#[test]
fn repulsor_restarts_cleanly_after_the_fade() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.start_repulsor_hum();
    engine.stop_repulsor_hum();

    // Render past the 0.2 s fade horizon: chain reclaimed, deadline passed
    engine.transport_mut().unwrap().render_seconds(0.25);
    assert_eq!(
        oscillators(engine.transport().unwrap())
            .iter()
            .filter(|&&(_, w)| w == Waveform::Sawtooth)
            .count(),
        0,
        "faded hum chain should have been reclaimed"
    );

    engine.start_repulsor_hum();
    assert_eq!(engine.repulsor_state(), HumState::Running);
    assert_eq!(
        oscillators(engine.transport().unwrap())
            .iter()
            .filter(|&&(_, w)| w == Waveform::Sawtooth)
            .count(),
        1
    );
}

#[test]
fn one_shot_chains_expire_on_their_own() {
    let mut engine = engine();
    engine.init().unwrap();
    engine.play_click();

    engine.transport_mut().unwrap().render_seconds(0.2);

    // Destination + master + drone chain; the click left nothing behind
    assert_eq!(engine.transport().unwrap().graph().ids().len(), 4);
}

#[test]
fn suspended_transport_gates_effects_until_resumed() {
    let mut engine = SoundEngine::new(|| Ok(OfflineTransport::suspended(SAMPLE_RATE)));

    // First init builds on the suspended transport (platform autoplay policy)
    engine.init().unwrap();
    assert_eq!(
        engine.transport().unwrap().state(),
        TransportState::Suspended
    );

    let before = engine.transport().unwrap().graph().created_nodes();
    engine.play_hover();
    assert_eq!(
        engine.transport().unwrap().graph().created_nodes(),
        before,
        "one-shots are no-ops while suspended"
    );

    // The next user gesture resumes it and effects flow again
    engine.init().unwrap();
    assert_eq!(engine.transport().unwrap().state(), TransportState::Running);
    engine.play_hover();
    assert_eq!(
        engine.transport().unwrap().graph().created_nodes(),
        before + 2
    );
}
