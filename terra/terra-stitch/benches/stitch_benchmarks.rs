//! Benchmarks for the stitching passes.
//!
//! Run with: cargo bench -p terra-stitch

#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use terra_feature::{Feature, FeatureId};
use terra_stitch::{
    NodeColumnStore, StitchParams, WallParams, construct_vertical_walls, fix_bowties, stitch_lifted_features,
};
use terra_types::{FeatureKind, Point2};

// =============================================================================
// Test Data Generation
// =============================================================================

/// A `side` x `side` grid of unit cells with mixed classes and heights.
fn grid(side: usize) -> Vec<Feature> {
    let kinds = [
        FeatureKind::Terrain,
        FeatureKind::Road,
        FeatureKind::Forest,
        FeatureKind::Water,
        FeatureKind::Building,
        FeatureKind::Separation,
    ];
    let mut features: Vec<Feature> = (0..side * side)
        .map(|i| {
            let (x0, y0) = ((i % side) as f64, (i / side) as f64);
            let kind = kinds[(i * 7 + i / side) % kinds.len()];
            let ring = vec![
                Point2::new(x0, y0),
                Point2::new(x0 + 1.0, y0),
                Point2::new(x0 + 1.0, y0 + 1.0),
                Point2::new(x0, y0 + 1.0),
            ];
            let mut f = Feature::from_rings(format!("cell-{i}"), kind, ring, vec![]).unwrap();
            let z = ((i * 37) % 300) as i32;
            if kind == FeatureKind::Building {
                f.set_building_heights(z, z + 900);
            } else {
                f.set_all_elevations(z);
            }
            f
        })
        .collect();

    // Grid neighbours (including diagonals, which share a corner)
    for i in 0..features.len() {
        let (cx, cy) = ((i % side) as i64, (i / side) as i64);
        let mut adjacent = Vec::new();
        for dy in -1..=1_i64 {
            for dx in -1..=1_i64 {
                let (nx, ny) = (cx + dx, cy + dy);
                if (dx, dy) != (0, 0) && (0..side as i64).contains(&nx) && (0..side as i64).contains(&ny) {
                    adjacent.push(FeatureId((ny * side as i64 + nx) as u32));
                }
            }
        }
        features[i].set_adjacent(adjacent);
    }
    features
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_vertex_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitch_lifted_features");
    for side in [10_usize, 30, 60] {
        let features = grid(side);
        group.throughput(Throughput::Elements(features.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(features.len()), &features, |b, features| {
            b.iter(|| {
                let mut features = features.clone();
                let mut columns = NodeColumnStore::new();
                stitch_lifted_features(&mut features, &mut columns, &StitchParams::default()).unwrap();
                black_box(columns.len())
            });
        });
    }
    group.finish();
}

fn bench_bowties_and_walls(c: &mut Criterion) {
    let mut features = grid(30);
    let mut columns = NodeColumnStore::new();
    stitch_lifted_features(&mut features, &mut columns, &StitchParams::default()).unwrap();
    columns.normalize();

    c.bench_function("fix_bowties_900", |b| {
        b.iter(|| {
            let mut features = features.clone();
            black_box(fix_bowties(&mut features).unwrap())
        });
    });
    c.bench_function("construct_vertical_walls_900", |b| {
        b.iter(|| {
            let mut features = features.clone();
            black_box(construct_vertical_walls(&mut features, &columns, &WallParams::default()).unwrap())
        });
    });
}

criterion_group!(benches, bench_vertex_pass, bench_bowties_and_walls);
criterion_main!(benches);
