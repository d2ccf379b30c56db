//! Benchmarks for the render path.
//!
//! Run with: cargo bench
//!
//! These measure the per-block cost of the steady-state session graph (drone
//! plus modulated repulsor hum) and the timeline evaluation it leans on, to
//! keep the engine comfortably inside realtime deadlines.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use hud_sfx::dsp::automation::{AutomationEvent, ParamTimeline};
use hud_sfx::engine::SoundEngine;
use hud_sfx::transport::OfflineTransport;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    // A busy but realistic timeline: anchor, two ramps, a live approach
    let mut timeline = ParamTimeline::new(0.0);
    timeline.schedule(AutomationEvent::SetValue { value: 100.0, at: 0.0 });
    timeline.schedule(AutomationEvent::ExponentialRampTo { value: 400.0, at: 0.5 });
    timeline.schedule(AutomationEvent::LinearRampTo { value: 200.0, at: 1.0 });
    timeline.schedule(AutomationEvent::SetTarget {
        target: 150.0,
        at: 1.5,
        time_constant: 0.1,
    });

    group.bench_function("value_at", |b| {
        let mut t = 0.0f64;
        b.iter(|| {
            t += 1.0 / 48_000.0;
            black_box(timeline.value_at(black_box(t % 2.0)))
        })
    });

    group.finish();
}

fn bench_session_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/render");

    for &size in BLOCK_SIZES {
        let mut engine = SoundEngine::new(|| Ok(OfflineTransport::new(48_000.0)));
        engine.init().expect("offline transport always spawns");
        engine.start_repulsor_hum();
        engine.modulate_repulsor(0.8);

        group.bench_with_input(BenchmarkId::new("session", size), &size, |b, &size| {
            b.iter(|| {
                let out = engine.transport_mut().unwrap().render(size);
                black_box(out)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_automation, bench_session_render);
criterion_main!(benches);
