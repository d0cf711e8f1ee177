//! Vertical wall and building wall synthesis.
//!
//! Walls are quad strips between the two endpoints of a boundary edge. The
//! levels at each endpoint come from the node column, so a wall meets every
//! feature stitched at that location without gaps.

// Mesh indices are u32 and wall meshes stay far below 2^32 vertices
#![allow(clippy::cast_possible_truncation)]

use terra_feature::Feature;
use terra_tin::Triangulation;
use terra_types::{FeatureKind, Point2, Point3, RingVertex, TerrainMesh, is_no_data, to_meters};
use tracing::{info, warn};

use crate::bowtie::shared_edge;
use crate::column::NodeColumnStore;
use crate::error::StitchResult;
use crate::params::WallParams;
use crate::vertex::check_adjacency;

/// Append a wall strip over edge `(a, b)` to `mesh`.
///
/// `a_levels` and `b_levels` are ascending elevations (cm) at each endpoint.
/// The two lists are walked in lock-step, always climbing the side whose
/// next level is lower, which covers `[min, max]` of both lists without gaps
/// or overlaps. Triangles face right of `a -> b`, i.e. outward for a feature
/// whose interior lies to the left. Returns the number of triangles added.
pub fn wall_strip(
    mesh: &mut TerrainMesh,
    a: &Point2<f64>,
    b: &Point2<f64>,
    a_levels: &[i32],
    b_levels: &[i32],
) -> usize {
    if a_levels.is_empty() || b_levels.is_empty() || (a_levels.len() == 1 && b_levels.len() == 1) {
        return 0;
    }
    let first = mesh.vertices.len() as u32;
    mesh.vertices
        .extend(a_levels.iter().map(|&z| Point3::new(a.x, a.y, to_meters(z))));
    mesh.vertices
        .extend(b_levels.iter().map(|&z| Point3::new(b.x, b.y, to_meters(z))));
    let av = |i: usize| first + i as u32;
    let bv = |j: usize| first + (a_levels.len() + j) as u32;

    let (mut i, mut j) = (0, 0);
    let mut added = 0;
    while i + 1 < a_levels.len() || j + 1 < b_levels.len() {
        let climb_b = j + 1 < b_levels.len() && (i + 1 >= a_levels.len() || b_levels[j + 1] <= a_levels[i + 1]);
        if climb_b {
            mesh.faces.push([av(i), bv(j), bv(j + 1)]);
            j += 1;
        } else {
            mesh.faces.push([av(i), bv(j), av(i + 1)]);
            i += 1;
        }
        added += 1;
    }
    added
}

/// Build the wall meshes of every feature.
///
/// Buildings always get their walls (see [`WallParams`] for the floor and
/// shared-wall options). Other features get walls only when stitching marked
/// them. Existing wall meshes are replaced. Returns the number of wall
/// triangles.
///
/// # Errors
///
/// Returns [`StitchError::UnknownNeighbour`](crate::StitchError::UnknownNeighbour)
/// if an adjacency list names a feature outside `features`.
pub fn construct_vertical_walls(
    features: &mut [Feature],
    columns: &NodeColumnStore,
    params: &WallParams,
) -> StitchResult<usize> {
    check_adjacency(features)?;
    let view: &[Feature] = features;
    let meshes: Vec<Option<TerrainMesh>> = (0..view.len())
        .map(|f| {
            if view[f].kind() == FeatureKind::Building {
                Some(building_walls(view, f, columns, params))
            } else if view[f].has_vertical_walls() {
                Some(feature_walls(view, f, columns))
            } else {
                None
            }
        })
        .collect();

    let mut triangles = 0;
    for (feature, mesh) in features.iter_mut().zip(meshes) {
        if let Some(mesh) = mesh {
            triangles += mesh.face_count();
            *feature.wall_mesh_mut() = mesh;
        }
    }
    info!(triangles, "Vertical walls constructed");
    Ok(triangles)
}

/// Edge `(a, b)` of a feature starting at vertex `a`.
fn edge(feature: &Feature, a: RingVertex) -> (RingVertex, Point2<f64>, Point2<f64>) {
    let polygon = feature.polygon();
    let b = polygon.next(a);
    (b, *polygon.vertex(a), *polygon.vertex(b))
}

fn feature_walls(features: &[Feature], f: usize, columns: &NodeColumnStore) -> TerrainMesh {
    let feature = &features[f];
    let top_bridge = feature.kind() == FeatureKind::Bridge && feature.is_top_level();
    let mut mesh = TerrainMesh::new();

    for (a, _) in feature.polygon().vertices() {
        let Some((g, ga, gb)) = shared_edge(features, f, a) else {
            continue;
        };
        let other = &features[g];
        let (b, pa, pb) = edge(feature, a);
        let (az, bz) = (feature.elevation(a), feature.elevation(b));
        let (gaz, gbz) = (other.elevation(ga), other.elevation(gb));
        if [az, bz, gaz, gbz].into_iter().any(is_no_data) {
            continue;
        }
        if columns.get(&pa).is_empty() && columns.get(&pb).is_empty() {
            continue;
        }

        // Decks hang their walls down (or up) to whatever they meet
        if top_bridge {
            wall_strip(&mut mesh, &pa, &pb, &columns.levels(&pa, az, gaz), &columns.levels(&pb, bz, gbz));
            continue;
        }
        // Water climbs to the floor of the building it touches
        if feature.kind() == FeatureKind::Water && other.kind() == FeatureKind::Building {
            let base = other.base_height();
            if !is_no_data(base) {
                wall_strip(
                    &mut mesh,
                    &pa,
                    &pb,
                    &columns.levels(&pa, az, az.max(base)),
                    &columns.levels(&pb, bz, bz.max(base)),
                );
            }
            continue;
        }
        if feature.kind() == FeatureKind::Bridge || other.kind() == FeatureKind::Bridge {
            continue;
        }
        if az < gaz || bz < gbz || (az == gaz && bz == gbz) {
            continue;
        }
        wall_strip(&mut mesh, &pa, &pb, &columns.levels(&pa, gaz, az), &columns.levels(&pb, gbz, bz));
    }
    mesh
}

/// Height ranges of a building wall facing a neighbouring building.
fn building_ranges(base: i32, roof: i32, neighbour: Option<(i32, i32)>, inner_walls: bool) -> Vec<(i32, i32)> {
    let Some((other_base, other_roof)) = neighbour.filter(|&(b, r)| !is_no_data(b) && !is_no_data(r)) else {
        return vec![(base, roof)];
    };
    if inner_walls {
        return vec![(base, roof)];
    }
    let mut ranges = Vec::with_capacity(2);
    let below = other_base.max(base).min(roof);
    if below > base {
        ranges.push((base, below));
    }
    let above = other_roof.min(roof).max(base);
    if roof > above {
        ranges.push((above, roof));
    }
    ranges
}

fn building_walls(features: &[Feature], f: usize, columns: &NodeColumnStore, params: &WallParams) -> TerrainMesh {
    let feature = &features[f];
    let (base, roof) = (feature.base_height(), feature.roof_height());
    let mut mesh = TerrainMesh::new();
    if is_no_data(base) || is_no_data(roof) {
        warn!(feature = feature.id(), "Building without heights, no walls");
        return mesh;
    }

    for (a, _) in feature.polygon().vertices() {
        let (_, pa, pb) = edge(feature, a);
        let neighbour = shared_edge(features, f, a)
            .map(|(g, _, _)| &features[g])
            .filter(|g| g.kind() == FeatureKind::Building)
            .map(|g| (g.base_height(), g.roof_height()));
        for (lo, hi) in building_ranges(base, roof, neighbour, params.building_inner_walls) {
            wall_strip(&mut mesh, &pa, &pb, &columns.levels(&pa, lo, hi), &columns.levels(&pb, lo, hi));
        }
    }

    if params.building_include_floor {
        let z = to_meters(base);
        let rings: Vec<Vec<Point3<f64>>> = feature
            .polygon()
            .rings()
            .map(|ring| ring.iter().map(|p| Point3::new(p.x, p.y, z)).collect())
            .collect();
        match Triangulation::from_rings(&rings) {
            Ok(tin) => {
                let mut floor = tin.to_mesh();
                // Floor faces down
                for face in &mut floor.faces {
                    face.swap(1, 2);
                }
                mesh.merge(&floor);
            }
            Err(err) => warn!(feature = feature.id(), %err, "Floor triangulation failed"),
        }
    }
    mesh
}
