//! End-to-end runs of the lift-stitch-triangulate pipeline on small
//! synthetic scenes.

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use terra::feature::ClassFilter;
use terra::prelude::*;
use terra::tin::TinError;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2<f64>> {
    vec![
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}

fn z_at(f: &Feature, x: f64, y: f64) -> i32 {
    f.elevation(f.find_point(&Point2::new(x, y)).unwrap())
}

/// Samples at cell centres of `[x0, x1] x [y0, y1]` (1 m cells).
fn cells(x0: i32, x1: i32, y0: i32, y1: i32, z: f64, class: u8) -> Vec<PointSample> {
    (x0..x1)
        .flat_map(|x| (y0..y1).map(move |y| (x, y)))
        .map(|(x, y)| PointSample::new(f64::from(x) + 0.5, f64::from(y) + 0.5, z, class))
        .collect()
}

#[test]
fn building_on_terrain() {
    let mut config = ThreeDfyConfig::default();
    config.lifting.building.roof_classes = ClassFilter::only([6]);
    config.lifting.terrain.classes = ClassFilter::only([2]);
    let mut landscape = Landscape::new(config).unwrap();
    landscape
        .add_polygon(PolygonRecord::new("house", FeatureKind::Building, rect(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    landscape
        .add_polygon(PolygonRecord::new("field", FeatureKind::Terrain, rect(10.0, 0.0, 20.0, 10.0)))
        .unwrap();
    landscape
        .add_polygon(PolygonRecord::new("pond", FeatureKind::Water, rect(100.0, 100.0, 110.0, 110.0)))
        .unwrap();

    let mut samples = cells(0, 10, 0, 10, 10.0, 6);
    samples.extend(cells(10, 20, 0, 10, 0.4, 2));
    let kept = landscape.add_point_cloud(samples);
    assert_eq!(kept, 200);

    let report = landscape.three_dfy().unwrap();
    assert_eq!(report.features, 3);
    assert_eq!(report.lifted, 2);
    assert_eq!(report.adjacency_links, 2);

    let [house, field, _] = landscape.features() else {
        panic!("three features expected");
    };
    assert_eq!(house.base_height(), 40);
    assert_eq!(house.roof_height(), 1000);
    assert_eq!(z_at(field, 10.0, 0.0), 40);
    assert_eq!(z_at(field, 20.0, 10.0), 40);
    assert!(landscape.node_columns().get(&Point2::new(10.0, 10.0)).contains(&1000));

    // Four walls from floor to roof, nothing from the field
    assert_eq!(report.stitch.wall_triangles, 8);
    let (lo, hi) = house.wall_mesh().z_range().unwrap();
    assert_relative_eq!(lo, 0.4);
    assert_relative_eq!(hi, 10.0);
    assert!(field.wall_mesh().is_empty());

    let surfaces = landscape.construct_surfaces();
    assert_eq!(surfaces.meshes, 2);
    assert_eq!(surfaces.failures.len(), 1);
    assert_eq!(surfaces.failures[0].id, "pond");
    assert_eq!(surfaces.failures[0].reason, TinError::NoElevation(0));

    let [house, field, _] = landscape.features() else {
        panic!("three features expected");
    };
    assert!(house.surface_mesh().vertices.iter().all(|v| (v.z - 10.0).abs() < 1e-9));
    assert_relative_eq!(field.surface_mesh().surface_area(), 100.0, epsilon = 1e-6);
    assert!(field.interior_points().is_empty());
}

#[test]
fn road_against_separation_keeps_the_jump() {
    let mut config = ThreeDfyConfig::default().with_stitching(StitchParams::with_threshold(50));
    config.lifting.road.classes = ClassFilter::only([11]);
    config.lifting.separation.classes = ClassFilter::only([64]);
    let mut landscape = Landscape::new(config).unwrap();
    landscape
        .add_polygon(PolygonRecord::new("road", FeatureKind::Road, rect(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    landscape
        .add_polygon(PolygonRecord::new("dike", FeatureKind::Separation, rect(10.0, 0.0, 12.0, 10.0)))
        .unwrap();

    let mut samples = cells(0, 10, 0, 10, 1.0, 11);
    samples.extend(cells(10, 12, 0, 10, 1.8, 64));
    landscape.add_point_cloud(samples);

    let report = landscape.three_dfy().unwrap();
    assert_eq!(report.stitch.jumps, 2);
    let [road, dike] = landscape.features() else {
        panic!("two features expected");
    };
    assert_eq!(z_at(road, 10.0, 0.0), 100);
    assert_eq!(z_at(dike, 10.0, 0.0), 180);
    assert!(road.has_vertical_walls());
    assert!(dike.has_vertical_walls());
    assert_eq!(landscape.node_columns().get(&Point2::new(10.0, 0.0)), &[100, 180]);

    // One quad along the shared edge, on the higher side
    assert_eq!(report.stitch.wall_triangles, 2);
    assert_eq!(dike.wall_mesh().face_count(), 2);
    assert!(road.wall_mesh().is_empty());
    let (lo, hi) = dike.wall_mesh().z_range().unwrap();
    assert_relative_eq!(lo, 1.0);
    assert_relative_eq!(hi, 1.8);
}

#[test]
fn rerunning_keeps_lifted_heights() {
    let mut landscape = Landscape::new(ThreeDfyConfig::default()).unwrap();
    landscape
        .add_polygon(PolygonRecord::new("lake", FeatureKind::Water, rect(0.0, 0.0, 4.0, 4.0)))
        .unwrap();
    landscape.add_point_cloud(cells(0, 4, 0, 4, 2.5, 9));

    let first = landscape.three_dfy().unwrap();
    let second = landscape.three_dfy().unwrap();
    assert_eq!(first, second);
    assert!(landscape.features()[0].elevations()[0].iter().all(|&z| z == 250));
}
