//! Benchmarks for the sequencer tick and the sample renderer.
//!
//! Run with: cargo bench --bench engine_bench -p atm-engine

use std::hint::black_box;
use std::sync::Arc;

use atm_engine::{DoubleBuffer, Engine, Half, SINK_SAMPLES_PER_HALF};
use atm_ir::{Song, SongBuilder, TrackBuilder};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Four busy channels that loop forever.
fn busy_song() -> Arc<Song> {
    let lead = TrackBuilder::new()
        .set_volume(40)
        .arpeggio(0x47, 0x01)
        .vibrato(8, 0x04)
        .note(25)
        .delay(3)
        .note(28)
        .delay(3)
        .ret();
    let bass = TrackBuilder::new()
        .set_volume(50)
        .slide_volume_advanced(-1, 0x01)
        .note(13)
        .delay(2)
        .note(20)
        .delay(2)
        .ret();
    let pad = TrackBuilder::new()
        .set_volume(60)
        .glissando(0x02)
        .note(37)
        .delay(8)
        .ret();
    let drums = TrackBuilder::new()
        .set_volume(48)
        .retrigger((50 << 2) | 1)
        .note_cut(0x01)
        .note(1)
        .delay(4)
        .ret();
    Arc::new(
        SongBuilder::new()
            .track(lead)
            .track(bass)
            .track(pad)
            .track(drums)
            .start_tracks([0, 1, 2, 3])
            .build(),
    )
}

fn bench_tick(c: &mut Criterion) {
    let mut engine = Engine::new();
    engine.play(busy_song()).expect("valid song");

    c.bench_function("sequencer_tick", |b| {
        b.iter(|| black_box(engine.tick().expect("tick")));
    });
}

fn bench_render_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_samples");

    let mut engine = Engine::new();
    engine.play(busy_song()).expect("valid song");
    for _ in 0..8 {
        engine.tick().expect("tick");
    }
    let mut renderer = engine.renderer();

    for count in [128usize, 1250, 31_250].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                for _ in 0..count {
                    black_box(renderer.render_sample());
                }
            });
        });
    }

    group.finish();
}

fn bench_refill_half(c: &mut Criterion) {
    let engine = Engine::new();
    let mut renderer = engine.renderer();
    let mut buffer = DoubleBuffer::new();
    engine.shared().oscillators[0].set_freq(440);
    engine.shared().oscillators[0].set_vol(40);

    c.bench_function("refill_half", |b| {
        b.iter(|| {
            buffer.refill(Half::First, &mut renderer);
            black_box(buffer.half(Half::First)[SINK_SAMPLES_PER_HALF - 1]);
        });
    });
}

criterion_group!(benches, bench_tick, bench_render_samples, bench_refill_half);
criterion_main!(benches);
