use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smd_engine::{RenderLength, Scheduler, SessionConfig, Sequencer};
use smd_ir::{Action, Song, TickSlot};

/// Eight looping tracks of short notes and pauses.
fn busy_song() -> Song {
    let mut body = vec![0xA0, 4, 0x99];
    for key in 0..12u8 {
        body.extend_from_slice(&[0x60, 0x60 | key, 6, 0x8D]);
    }
    body.push(0x98);
    Song::from_track_buffers("bench", 48, (0..8).map(|_| body.clone())).unwrap()
}

fn generate_one_second(c: &mut Criterion) {
    let mut seq = Sequencer::silent(busy_song(), SessionConfig::default()).unwrap();
    c.bench_function("generate 96 ticks x 8 tracks", |b| {
        b.iter(|| black_box(seq.generate(RenderLength::Ticks(96)).unwrap()))
    });
}

fn scheduler_push_pop(c: &mut Criterion) {
    c.bench_function("scheduler push/pop 1024", |b| {
        b.iter(|| {
            let mut queue = Scheduler::new();
            for i in 0..1024u64 {
                queue.push(TickSlot((i * 7919) % 512), Action::ResumeTrack { track: 0 });
            }
            while let Ok(ev) = queue.pop_min() {
                black_box(ev);
            }
        })
    });
}

criterion_group!(benches, generate_one_second, scheduler_push_pop);
criterion_main!(benches);
