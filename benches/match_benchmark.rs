//! Benchmarks for running complete matches.
//!
//! Native scripts measure the game loop alone; Lua scripts add the sandbox.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;
use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use tickarena::game::Robot;
use tickarena::geometry::Vec2;
use tickarena::sandbox::{Api, FnScript, Script};
use tickarena::{Arena, ArenaConfig, Entrant, Scenario};

/// A native bot that circles and throws whenever it can.
fn circler() -> Box<dyn Script> {
    Box::new(FnScript(|api: &mut Api| {
        let tick = api.state().tick;
        api.turn(if tick % 20 < 10 { 15.0 } else { -15.0 });
        api.move_by(8.0);
        if let Some(target) = api.scan(api.direction(), 45.0).first() {
            api.toss(target.distance);
        }
    }))
}

fn native_arena(robots: u8) -> Arena {
    let entrants = (1..=robots)
        .map(|id| {
            let angle = f64::from(id) * 360.0 / f64::from(robots);
            Entrant {
                robot: Robot::new(id, format!("c{id}"), Vec2::from_heading(angle).scale(200.0), angle + 180.0, 100),
                script: circler(),
            }
        })
        .collect();
    Arena::new(ArenaConfig::default(), entrants, 42).unwrap()
}

fn bench_native_match(c: &mut Criterion) {
    c.bench_function("native_match_2p", |b| {
        b.iter(|| {
            let mut arena = native_arena(2);
            black_box(arena.run())
        });
    });

    c.bench_function("native_match_8p", |b| {
        b.iter(|| {
            let mut arena = native_arena(8);
            black_box(arena.run())
        });
    });
}

fn bench_lua_match(c: &mut Criterion) {
    let bots = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("bots");
    let scripts = vec![bots.join("spiral_hunter.lua"), bots.join("orbit_evader.lua")];
    let scenario = Scenario::from_scripts(&scripts, ArenaConfig::default(), 42);

    c.bench_function("lua_match_2p", |b| {
        b.iter(|| {
            let mut arena = scenario.build().unwrap();
            black_box(arena.run())
        });
    });
}

fn bench_single_tick(c: &mut Criterion) {
    c.bench_function("single_tick_8p", |b| {
        b.iter_batched(
            || native_arena(8),
            |mut arena| black_box(arena.step()),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_native_match, bench_lua_match, bench_single_tick);
criterion_main!(benches);
