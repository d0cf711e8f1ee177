//! Incremental constrained Delaunay triangulation of a polygon domain.
//!
//! The rings are ear-clipped first, then made Delaunay with Lawson flips that
//! never cross a ring edge. Points are inserted one at a time: a point inside
//! a triangle splits it in three, a point on an edge splits both incident
//! triangles (and the constraint, if the edge is a ring edge), and every new
//! edge is legalised with the incircle test.
//!
//! Coordinates are stored relative to the lower-left corner of the domain to
//! keep the orientation predicates well conditioned.

// Vertex and triangle counts fit in u32
#![allow(clippy::cast_possible_truncation)]
// Geometry predicates use the usual single-letter names
#![allow(clippy::many_single_char_names)]

use hashbrown::{HashMap, HashSet};
use terra_types::{Point2, Point3, TerrainMesh};

use crate::error::{TinError, TinResult};

/// Distance below which a point is considered to lie on a line.
const ON_LINE: f64 = 1e-9;

/// Squared distance below which two points are the same vertex (1 mm).
const SAME_VERTEX_SQ: f64 = 1e-6;

/// Relative tolerance of the incircle predicate.
const INCIRCLE_REL: f64 = 1e-12;

/// Where a point falls in the triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location {
    /// Strictly inside a triangle.
    Inside(u32),
    /// On the directed edge `(u, v)` of a triangle.
    OnEdge(u32, u32, u32),
    /// On an existing vertex.
    OnVertex(u32),
    /// Outside the domain.
    Outside,
}

/// Triangles touched by one insertion.
#[derive(Debug, Clone, Default)]
pub(crate) struct Insertion {
    /// Triangles alive before the insertion that no longer exist.
    pub removed: Vec<u32>,
    /// Triangles created by the insertion that are still alive.
    pub created: Vec<u32>,
}

fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Signed distance of `p` from the line `a -> b` (positive on the left).
fn side(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> f64 {
    let len = (b - a).norm();
    if len == 0.0 {
        return (p - a).norm();
    }
    orient(a, b, p) / len
}

/// Whether `d` is strictly inside the circumcircle of CCW triangle `abc`.
fn in_circle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> bool {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);
    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;
    let det = alift * (bdx * cdy - bdy * cdx) + blift * (cdx * ady - cdy * adx)
        + clift * (adx * bdy - ady * bdx);
    let bound = alift * (bdx * cdy).abs().max((bdy * cdx).abs())
        + blift * (cdx * ady).abs().max((cdy * adx).abs())
        + clift * (adx * bdy).abs().max((ady * bdx).abs());
    det > INCIRCLE_REL * bound
}

fn undirected(u: u32, v: u32) -> (u32, u32) {
    if u < v { (u, v) } else { (v, u) }
}

/// A constrained triangulation whose boundary is a set of polygon rings.
#[derive(Debug, Clone)]
pub struct Triangulation {
    origin: Point2<f64>,
    /// Local xy plus absolute z.
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    alive: Vec<bool>,
    edges: HashMap<(u32, u32), u32>,
    constraints: HashSet<(u32, u32)>,
    hint: u32,
}

impl Triangulation {
    /// Triangulate the domain bounded by `rings` (outer first, then holes).
    ///
    /// # Errors
    ///
    /// Returns [`TinError::Triangulation`] if ear clipping fails and
    /// [`TinError::EmptyDomain`] if it yields no triangle.
    pub fn from_rings(rings: &[Vec<Point3<f64>>]) -> TinResult<Self> {
        let origin = rings
            .iter()
            .flatten()
            .fold(Point2::new(f64::INFINITY, f64::INFINITY), |o, p| {
                Point2::new(o.x.min(p.x), o.y.min(p.y))
            });
        if !origin.x.is_finite() {
            return Err(TinError::EmptyDomain);
        }

        let mut tin = Self {
            origin,
            vertices: Vec::new(),
            triangles: Vec::new(),
            alive: Vec::new(),
            edges: HashMap::new(),
            constraints: HashSet::new(),
            hint: 0,
        };

        let mut flat = Vec::new();
        let mut holes = Vec::new();
        let mut ring_ranges = Vec::new();
        for (r, ring) in rings.iter().enumerate() {
            if r > 0 {
                holes.push(tin.vertices.len());
            }
            let start = tin.vertices.len() as u32;
            for p in ring {
                let local = Point3::new(p.x - origin.x, p.y - origin.y, p.z);
                flat.push(local.x);
                flat.push(local.y);
                tin.vertices.push(local);
            }
            ring_ranges.push((start, ring.len() as u32));
        }

        let indices = earcutr::earcut(&flat, &holes, 2)
            .map_err(|e| TinError::Triangulation(e.to_string()))?;
        for t in indices.chunks_exact(3) {
            let [a, b, c] = [t[0] as u32, t[1] as u32, t[2] as u32];
            let o = orient(&tin.xy(a), &tin.xy(b), &tin.xy(c));
            if o > 0.0 {
                tin.add_triangle([a, b, c]);
            } else if o < 0.0 {
                tin.add_triangle([a, c, b]);
            }
        }
        if tin.triangles.is_empty() {
            return Err(TinError::EmptyDomain);
        }

        // Ear clipping drops collinear ring vertices; constrain the edges
        // between the vertices it kept and splice the others back in.
        let used: HashSet<u32> = tin.triangles.iter().flatten().copied().collect();
        let mut missing = Vec::new();
        for &(start, len) in &ring_ranges {
            let kept: Vec<u32> = (start..start + len).filter(|v| used.contains(v)).collect();
            for (i, &u) in kept.iter().enumerate() {
                let v = kept[(i + 1) % kept.len()];
                if u != v {
                    tin.constraints.insert(undirected(u, v));
                }
            }
            missing.extend((start..start + len).filter(|v| !used.contains(v)));
        }

        tin.make_delaunay();
        for v in missing {
            tin.insert_vertex(v);
        }
        Ok(tin)
    }

    #[inline]
    fn xy(&self, v: u32) -> Point2<f64> {
        let p = &self.vertices[v as usize];
        Point2::new(p.x, p.y)
    }

    fn local(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::new(p.x - self.origin.x, p.y - self.origin.y)
    }

    /// Number of vertices (used or not).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    /// Live triangles as CCW vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles
            .iter()
            .zip(&self.alive)
            .filter(|(_, a)| **a)
            .map(|(t, _)| *t)
    }

    /// Whether `(u, v)` is a ring edge.
    #[must_use]
    pub fn is_constrained(&self, u: u32, v: u32) -> bool {
        self.constraints.contains(&undirected(u, v))
    }

    // ---- bookkeeping -----------------------------------------------------

    fn add_triangle(&mut self, t: [u32; 3]) -> u32 {
        let id = self.triangles.len() as u32;
        for i in 0..3 {
            self.edges.insert((t[i], t[(i + 1) % 3]), id);
        }
        self.triangles.push(t);
        self.alive.push(true);
        self.hint = id;
        id
    }

    fn kill_triangle(&mut self, id: u32) {
        let t = self.triangles[id as usize];
        for i in 0..3 {
            let e = (t[i], t[(i + 1) % 3]);
            if self.edges.get(&e) == Some(&id) {
                self.edges.remove(&e);
            }
        }
        self.alive[id as usize] = false;
    }

    /// Third vertex of triangle `t` given its directed edge `(u, v)`.
    fn opposite(&self, t: u32, u: u32, v: u32) -> u32 {
        let tri = self.triangles[t as usize];
        tri.into_iter().find(|&w| w != u && w != v).unwrap_or(u)
    }

    // ---- flips -----------------------------------------------------------

    /// Flip the edge shared by the triangles on `(u, v)` and `(v, u)` if it is
    /// illegal. Returns the two new triangles.
    fn try_flip(&mut self, u: u32, v: u32) -> Option<(u32, u32)> {
        if self.is_constrained(u, v) {
            return None;
        }
        let t1 = *self.edges.get(&(u, v))?;
        let t2 = *self.edges.get(&(v, u))?;
        let w = self.opposite(t1, u, v);
        let x = self.opposite(t2, v, u);
        let (pu, pv, pw, px) = (self.xy(u), self.xy(v), self.xy(w), self.xy(x));
        if !in_circle(&pu, &pv, &pw, &px) {
            return None;
        }
        // The new diagonal must leave two proper CCW triangles
        if orient(&pu, &px, &pw) <= 0.0 || orient(&px, &pv, &pw) <= 0.0 {
            return None;
        }
        self.kill_triangle(t1);
        self.kill_triangle(t2);
        let n1 = self.add_triangle([u, x, w]);
        let n2 = self.add_triangle([x, v, w]);
        Some((n1, n2))
    }

    fn make_delaunay(&mut self) {
        let mut stack: Vec<(u32, u32)> = self
            .edges
            .keys()
            .filter(|(u, v)| u < v)
            .copied()
            .collect();
        stack.sort_unstable();
        let n = self.vertices.len();
        let mut budget = 4 * n * n + 16;
        while let Some((u, v)) = stack.pop() {
            if budget == 0 {
                break;
            }
            budget -= 1;
            if let Some((n1, n2)) = self.try_flip(u, v) {
                for t in [n1, n2] {
                    let tri = self.triangles[t as usize];
                    for i in 0..3 {
                        stack.push((tri[i], tri[(i + 1) % 3]));
                    }
                }
            }
        }
    }

    // ---- point location --------------------------------------------------

    fn classify(&self, t: u32, p: &Point2<f64>) -> Option<Location> {
        let tri = self.triangles[t as usize];
        for &v in &tri {
            if (self.xy(v) - p).norm_squared() <= SAME_VERTEX_SQ {
                return Some(Location::OnVertex(v));
            }
        }
        let mut on_edge = None;
        for i in 0..3 {
            let (u, v) = (tri[i], tri[(i + 1) % 3]);
            let s = side(&self.xy(u), &self.xy(v), p);
            if s < -ON_LINE {
                return None;
            }
            if s <= ON_LINE {
                on_edge = Some((u, v));
            }
        }
        Some(match on_edge {
            Some((u, v)) => Location::OnEdge(t, u, v),
            None => Location::Inside(t),
        })
    }

    /// Locate a point given in local coordinates.
    fn locate_local(&self, p: &Point2<f64>) -> Location {
        let mut t = self.hint;
        if !self.alive.get(t as usize).copied().unwrap_or(false) {
            match self.alive.iter().position(|&a| a) {
                Some(i) => t = i as u32,
                None => return Location::Outside,
            }
        }

        // Visibility walk, falling back to a scan on the domain boundary
        for _ in 0..=self.triangles.len() {
            let tri = self.triangles[t as usize];
            let mut next = None;
            for i in 0..3 {
                let (u, v) = (tri[i], tri[(i + 1) % 3]);
                if side(&self.xy(u), &self.xy(v), p) < -ON_LINE {
                    next = Some(self.edges.get(&(v, u)).copied());
                    break;
                }
            }
            match next {
                None => {
                    if let Some(loc) = self.classify(t, p) {
                        return loc;
                    }
                    break;
                }
                Some(Some(n)) => t = n,
                Some(None) => break,
            }
        }

        (0..self.triangles.len() as u32)
            .filter(|&t| self.alive[t as usize])
            .find_map(|t| self.classify(t, p))
            .unwrap_or(Location::Outside)
    }

    /// Locate a point given in world coordinates.
    pub(crate) fn locate(&self, p: &Point2<f64>) -> Location {
        self.locate_local(&self.local(p))
    }

    /// Whether triangle `t` contains the world point `p` (boundary included).
    pub(crate) fn triangle_contains(&self, t: u32, p: &Point2<f64>) -> bool {
        self.alive[t as usize] && self.classify(t, &self.local(p)).is_some()
    }

    /// Height of the plane of triangle `t` at world point `p`.
    pub(crate) fn interpolate(&self, t: u32, p: &Point2<f64>) -> f64 {
        let [a, b, c] = self.triangles[t as usize].map(|v| self.vertices[v as usize]);
        let q = self.local(p);
        let (pa, pb, pc) = (
            Point2::new(a.x, a.y),
            Point2::new(b.x, b.y),
            Point2::new(c.x, c.y),
        );
        let area = orient(&pa, &pb, &pc);
        if area.abs() < f64::EPSILON {
            return a.z;
        }
        let wa = orient(&pb, &pc, &q) / area;
        let wb = orient(&pc, &pa, &q) / area;
        let wc = 1.0 - wa - wb;
        wa * a.z + wb * b.z + wc * c.z
    }

    // ---- insertion -------------------------------------------------------

    /// Insert a world point. Returns its vertex index, or `None` when it
    /// duplicates an existing vertex or falls outside the domain.
    pub fn insert(&mut self, p: Point3<f64>) -> Option<u32> {
        let v = self.vertices.len() as u32;
        self.insert_tracked(p).map(|_| v)
    }

    pub(crate) fn insert_tracked(&mut self, p: Point3<f64>) -> Option<Insertion> {
        let local = Point3::new(p.x - self.origin.x, p.y - self.origin.y, p.z);
        let loc = self.locate_local(&Point2::new(local.x, local.y));
        if matches!(loc, Location::OnVertex(_) | Location::Outside) {
            return None;
        }
        let v = self.vertices.len() as u32;
        self.vertices.push(local);
        Some(self.split(v, loc))
    }

    /// Splice an existing (unused) vertex into the triangulation.
    fn insert_vertex(&mut self, v: u32) -> Option<Insertion> {
        let loc = self.locate_local(&self.xy(v));
        if matches!(loc, Location::OnVertex(_) | Location::Outside) {
            return None;
        }
        Some(self.split(v, loc))
    }

    fn split(&mut self, p: u32, loc: Location) -> Insertion {
        let mut removed = Vec::new();
        let mut created = Vec::new();
        let mut to_legalize = Vec::new();

        match loc {
            Location::Inside(t) => {
                let [a, b, c] = self.triangles[t as usize];
                self.kill_triangle(t);
                removed.push(t);
                for (u, v) in [(a, b), (b, c), (c, a)] {
                    created.push(self.add_triangle([u, v, p]));
                    to_legalize.push((u, v));
                }
            }
            Location::OnEdge(t, u, v) => {
                let w = self.opposite(t, u, v);
                let other = self.edges.get(&(v, u)).copied();
                if self.constraints.remove(&undirected(u, v)) {
                    self.constraints.insert(undirected(u, p));
                    self.constraints.insert(undirected(p, v));
                }
                self.kill_triangle(t);
                removed.push(t);
                created.push(self.add_triangle([u, p, w]));
                created.push(self.add_triangle([p, v, w]));
                to_legalize.push((v, w));
                to_legalize.push((w, u));
                if let Some(t2) = other {
                    let x = self.opposite(t2, v, u);
                    self.kill_triangle(t2);
                    removed.push(t2);
                    created.push(self.add_triangle([v, p, x]));
                    created.push(self.add_triangle([p, u, x]));
                    to_legalize.push((u, x));
                    to_legalize.push((x, v));
                }
            }
            Location::OnVertex(_) | Location::Outside => {}
        }

        // Each edge (u, v) sits in a triangle (u, v, p)
        while let Some((u, v)) = to_legalize.pop() {
            let Some(&before) = self.edges.get(&(u, v)) else {
                continue;
            };
            if self.opposite(before, u, v) != p {
                continue;
            }
            let across = self.edges.get(&(v, u)).copied();
            if let Some((n1, n2)) = self.try_flip(u, v) {
                for t in std::iter::once(before).chain(across) {
                    if created.contains(&t) {
                        created.retain(|&c| c != t);
                    } else {
                        removed.push(t);
                    }
                }
                created.push(n1);
                created.push(n2);
                let x = self.opposite(n1, u, p);
                to_legalize.push((u, x));
                to_legalize.push((x, v));
            }
        }

        Insertion { removed, created }
    }

    // ---- checks and output -----------------------------------------------

    /// Whether every unconstrained interior edge satisfies the empty
    /// circumcircle property.
    #[must_use]
    pub fn is_delaunay(&self) -> bool {
        self.edges.iter().all(|(&(u, v), &t1)| {
            if self.is_constrained(u, v) {
                return true;
            }
            let Some(&t2) = self.edges.get(&(v, u)) else {
                return true;
            };
            let w = self.opposite(t1, u, v);
            let x = self.opposite(t2, v, u);
            !in_circle(&self.xy(u), &self.xy(v), &self.xy(w), &self.xy(x))
        })
    }

    /// Export the live triangles in world coordinates.
    #[must_use]
    pub fn to_mesh(&self) -> TerrainMesh {
        TerrainMesh {
            vertices: self
                .vertices
                .iter()
                .map(|p| Point3::new(p.x + self.origin.x, p.y + self.origin.y, p.z))
                .collect(),
            faces: self.triangles().collect(),
        }
    }
}
