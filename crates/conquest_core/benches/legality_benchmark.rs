//! Legality engine benchmark: full check chain against a worst-case
//! interior cell on a large map.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use conquest_core::{legality, FactionDirectory, WarConfig, WorldMap};
use conquest_shared::{Coord, FactionId};

/// 16x16 grid of 4x4-cell regions, all owned by the defender.
fn build_world() -> (WorldMap, FactionDirectory, FactionId) {
    let mut factions = FactionDirectory::new();
    let attacker = factions.add_faction("veldt", None);
    let defender = factions.add_faction("mire", None);
    factions.make_enemies(attacker, defender);

    let mut map = WorldMap::new();
    for rx in 0..16 {
        for rz in 0..16 {
            let x0 = rx * 4;
            let z0 = rz * 4;
            let mut cells = Vec::with_capacity(16);
            for x in x0..x0 + 4 {
                for z in z0..z0 + 4 {
                    cells.push(Coord::new(x, z));
                }
            }
            let frontier = rx == 0 || rz == 0 || rx == 15 || rz == 15;
            map.add_region(
                &format!("r{rx}_{rz}"),
                Coord::new(x0, z0),
                cells,
                frontier,
                Some(defender),
            );
        }
    }

    (map, factions, attacker)
}

fn bench_check_attack(c: &mut Criterion) {
    let (map, factions, attacker) = build_world();
    let config = WarConfig::default();

    // edge cell: passes the whole chain
    c.bench_function("check_attack_edge_cell", |b| {
        b.iter(|| {
            black_box(legality::check_attack(
                &map,
                &factions,
                &config,
                false,
                attacker,
                black_box(Coord::new(0, 0)),
            ))
        });
    });

    // interior cell: fails on the final (most expensive) adjacency check
    c.bench_function("check_attack_interior_cell", |b| {
        b.iter(|| {
            black_box(legality::check_attack(
                &map,
                &factions,
                &config,
                false,
                attacker,
                black_box(Coord::new(31, 31)),
            ))
        });
    });
}

criterion_group!(benches, bench_check_attack);
criterion_main!(benches);
