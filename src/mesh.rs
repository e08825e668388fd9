//! Correspondence mesh between the source and target images.
//!
//! The mesh holds two triangulations, one per image, in exact
//! triangle-for-triangle correspondence. Each side owns a vertex table; faces
//! are index triples into it, and the pairing is an insertion-ordered list of
//! `(source face, target face)` records. Every mutation removes whole pairs and
//! appends whole pairs, so both sides always stay in lockstep.
//!
//! Target coordinates live on the combined side-by-side canvas: the target
//! space is the source space shifted right by `size`.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::MorphConfig;
use crate::geometry::{circumcircle_with_threshold, in_circle, point_in_triangle};
use crate::math::vec2::Vec2;
use crate::triangle::{Face, Triangle};

/// Which image a coordinate or triangle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The "before" image.
    Source,
    /// The "after" image, offset by `size` along x.
    Target,
}

/// A source face and the target face it maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrianglePair {
    pub source: Face,
    pub target: Face,
}

/// A pair of corresponding points picked on the combined canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointPair {
    pub source: Vec2,
    pub target: Vec2,
}

impl PointPair {
    pub fn new(source: impl Into<Vec2>, target: impl Into<Vec2>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// What [`CorrespondenceMesh::insert_point`] did with a point pair.
///
/// Only `Inserted` changes the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The containing triangle was split in three; `flips` edge flips followed.
    Inserted { flips: usize },
    /// One of the points lies outside its own half of the canvas.
    OutOfBounds,
    /// No source triangle contains the source point.
    NotContained,
}

/// The edge two faces have in common, described by each face's apex, i.e. the
/// position of the one vertex not on the shared edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedEdge {
    pub apex_a: usize,
    pub apex_b: usize,
}

impl SharedEdge {
    /// Compares every vertex of `a` with every vertex of `b`. The positions left
    /// unmatched on each face are collected; an edge is shared only when
    /// exactly two such positions remain, one per face.
    pub fn between(a: &Face, b: &Face) -> Option<SharedEdge> {
        let (a_idx, b_idx) = (a.indices(), b.indices());
        let mut matched_a = [false; 3];
        let mut matched_b = [false; 3];

        for i in 0..3 {
            for j in 0..3 {
                if a_idx[i] == b_idx[j] {
                    matched_a[i] = true;
                    matched_b[j] = true;
                }
            }
        }

        let rest: Vec<usize> = (0..3)
            .filter(|&i| !matched_a[i])
            .chain((0..3).filter(|&j| !matched_b[j]))
            .collect();

        match rest.as_slice() {
            [apex_a, apex_b] => Some(SharedEdge {
                apex_a: *apex_a,
                apex_b: *apex_b,
            }),
            _ => None,
        }
    }

    /// Swaps the diagonal of the quadrilateral formed by `a` and `b`.
    ///
    /// Both new faces start with the two apexes, so the apex-to-apex segment
    /// becomes the shared edge; the third vertex is the shared-edge vertex just
    /// before and just after the apex of `a`.
    pub fn flip(&self, a: &Face, b: &Face) -> (Face, Face) {
        let j = self.apex_a;
        let apex_a = a.vertex(j);
        let apex_b = b.vertex(self.apex_b);

        let first = Face::new(apex_a, apex_b, a.vertex(j + 2));
        let second = Face::new(apex_a, apex_b, a.vertex(j + 1));
        (first, second)
    }
}

/// Paired source/target triangulations covering the working region.
#[derive(Debug, Clone)]
pub struct CorrespondenceMesh {
    config: MorphConfig,
    source_vertices: Vec<Vec2>,
    target_vertices: Vec<Vec2>,
    pairs: Vec<TrianglePair>,
}

impl Default for CorrespondenceMesh {
    fn default() -> Self {
        Self::new(MorphConfig::default())
    }
}

impl CorrespondenceMesh {
    /// Creates the initial mesh: the `size x size` square split along its main
    /// diagonal, on both sides.
    pub fn new(config: MorphConfig) -> Self {
        let s = config.extent();
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(s, s),
            Vec2::new(s, 0.0),
            Vec2::new(0.0, s),
        ];

        let source_vertices = corners.to_vec();
        let target_vertices = corners.iter().map(|p| p.offset_x(s)).collect();

        let upper = Face::new(0, 1, 2);
        let lower = Face::new(0, 3, 1);

        Self {
            config,
            source_vertices,
            target_vertices,
            pairs: vec![
                TrianglePair {
                    source: upper,
                    target: upper,
                },
                TrianglePair {
                    source: lower,
                    target: lower,
                },
            ],
        }
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    /// Number of triangle pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Face pairs in mesh order.
    pub fn faces(&self) -> &[TrianglePair] {
        &self.pairs
    }

    pub fn vertices(&self, side: Side) -> &[Vec2] {
        match side {
            Side::Source => &self.source_vertices,
            Side::Target => &self.target_vertices,
        }
    }

    /// Resolves a face on `side` to its coordinates.
    pub fn triangle(&self, side: Side, face: &Face) -> Triangle {
        let vertices = self.vertices(side);
        Triangle::new([vertices[face.a], vertices[face.b], vertices[face.c]])
    }

    /// `(source, target)` triangles in mesh order.
    pub fn pairs(&self) -> impl Iterator<Item = (Triangle, Triangle)> + '_ {
        self.pairs.iter().map(|pair| {
            (
                self.triangle(Side::Source, &pair.source),
                self.triangle(Side::Target, &pair.target),
            )
        })
    }

    pub fn source_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.pairs
            .iter()
            .map(|pair| self.triangle(Side::Source, &pair.source))
    }

    pub fn target_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.pairs
            .iter()
            .map(|pair| self.triangle(Side::Target, &pair.target))
    }

    fn face_on(pair: &TrianglePair, side: Side) -> &Face {
        match side {
            Side::Source => &pair.source,
            Side::Target => &pair.target,
        }
    }

    /// Index of the first pair whose `side` triangle contains `point`.
    fn locate(&self, point: Vec2, side: Side) -> Option<usize> {
        self.pairs.iter().position(|pair| {
            let triangle = self.triangle(side, Self::face_on(pair, side));
            point_in_triangle(point, &triangle)
        })
    }

    /// First triangle on `side`, in mesh order, that contains `point`.
    ///
    /// Points on an edge shared by two triangles resolve to whichever comes
    /// first.
    pub fn find_containing_triangle(&self, point: Vec2, side: Side) -> Option<Triangle> {
        self.locate(point, side)
            .map(|idx| self.triangle(side, Self::face_on(&self.pairs[idx], side)))
    }

    /// Returns true if each point lies in its own image's half of the canvas.
    ///
    /// Only the upper bounds of the source point and the target's lower x and
    /// upper y bounds are checked.
    pub fn accepts(&self, source: Vec2, target: Vec2) -> bool {
        let size = self.config.extent();
        !(source.x > size || source.y > size || target.y > size || target.x < size)
    }

    pub fn insert_pair(&mut self, pair: PointPair) -> InsertOutcome {
        self.insert_point(pair.source, pair.target)
    }

    /// Inserts a constraint point pair.
    ///
    /// The source triangle containing `source` and its paired target triangle are
    /// each fanned into three triangles around the new points, then every new
    /// source triangle gets one legalization attempt.
    pub fn insert_point(&mut self, source: Vec2, target: Vec2) -> InsertOutcome {
        if !self.accepts(source, target) {
            debug!(
                "rejecting point pair ({}, {}) -> ({}, {}): outside canvas halves",
                source.x, source.y, target.x, target.y
            );
            return InsertOutcome::OutOfBounds;
        }

        let Some(idx) = self.locate(source, Side::Source) else {
            debug!(
                "no triangle contains ({}, {}); point pair ignored",
                source.x, source.y
            );
            return InsertOutcome::NotContained;
        };

        let split = self.pairs.remove(idx);
        let s = intern(&mut self.source_vertices, source);
        let t = intern(&mut self.target_vertices, target);

        let mut created = [Face::new(0, 0, 0); 3];
        for (i, slot) in created.iter_mut().enumerate() {
            let new_source = Face::new(split.source.vertex(i), split.source.vertex(i + 1), s);
            let new_target = Face::new(split.target.vertex(i), split.target.vertex(i + 1), t);
            self.pairs.push(TrianglePair {
                source: new_source,
                target: new_target,
            });
            *slot = new_source;
        }

        let mut flips = 0;
        for face in &created {
            if self.legalize(face) {
                flips += 1;
            }
        }

        debug!(
            "inserted ({}, {}) -> ({}, {}): {} pairs, {} flips",
            source.x,
            source.y,
            target.x,
            target.y,
            self.pairs.len(),
            flips
        );
        InsertOutcome::Inserted { flips }
    }

    /// One local Delaunay check for the source face `face`.
    ///
    /// Finds the first other source triangle lying entirely inside the
    /// circumcircle of `face`. If the two share an edge, that edge is flipped on
    /// both sides of the mesh. Returns true if a flip happened. Faces no longer
    /// in the mesh are skipped.
    pub fn legalize(&mut self, face: &Face) -> bool {
        let Some(a_idx) = self.pairs.iter().position(|pair| pair.source == *face) else {
            trace!("face {:?} already replaced, skipping legalization", face);
            return false;
        };

        let triangle = self.triangle(Side::Source, face);
        let circle = circumcircle_with_threshold(&triangle, self.config.degenerate_threshold);
        if circle.is_degenerate() {
            trace!("face {:?} is degenerate, skipping legalization", face);
            return false;
        }

        let slack = self.config.circle_slack;
        let violation = self.pairs.iter().position(|pair| {
            pair.source != *face
                && in_circle(&circle, &self.triangle(Side::Source, &pair.source), slack)
        });
        let Some(b_idx) = violation else {
            return false;
        };

        let a = self.pairs[a_idx];
        let b = self.pairs[b_idx];

        let Some(source_edge) = SharedEdge::between(&a.source, &b.source) else {
            trace!(
                "circumcircle of {:?} contains {:?} but they share no edge",
                a.source,
                b.source
            );
            return false;
        };
        let Some(target_edge) = SharedEdge::between(&a.target, &b.target) else {
            warn!(
                "target faces {:?} and {:?} share no edge; flip skipped",
                a.target, b.target
            );
            return false;
        };

        let (source_first, source_second) = source_edge.flip(&a.source, &b.source);
        let (target_first, target_second) = target_edge.flip(&a.target, &b.target);

        // Remove the later index first so the earlier one stays valid.
        self.pairs.remove(a_idx.max(b_idx));
        self.pairs.remove(a_idx.min(b_idx));
        self.pairs.push(TrianglePair {
            source: source_first,
            target: target_first,
        });
        self.pairs.push(TrianglePair {
            source: source_second,
            target: target_second,
        });

        debug!(
            "flipped {:?}/{:?} into {:?}/{:?}",
            a.source, b.source, source_first, source_second
        );
        true
    }
}

/// Index of `point` in `vertices`, appending it if no vertex has exactly the
/// same coordinates.
fn intern(vertices: &mut Vec<Vec2>, point: Vec2) -> usize {
    match vertices.iter().position(|v| *v == point) {
        Some(idx) => idx,
        None => {
            vertices.push(point);
            vertices.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle_area;
    use approx::assert_relative_eq;

    const S: f64 = 512.0;

    fn total_area(triangles: impl Iterator<Item = Triangle>) -> f64 {
        triangles.map(|t| triangle_area(&t)).sum()
    }

    fn assert_sides_match(mesh: &CorrespondenceMesh) {
        for (source, target) in mesh.pairs() {
            assert_eq!(target, source.offset_x(S));
        }
    }

    #[test]
    fn test_initial_mesh() {
        let mesh = CorrespondenceMesh::default();
        assert_eq!(mesh.len(), 2);

        let sources: Vec<Triangle> = mesh.source_triangles().collect();
        assert_eq!(
            sources[0],
            Triangle::new([(0.0, 0.0).into(), (S, S).into(), (S, 0.0).into()])
        );
        assert_eq!(
            sources[1],
            Triangle::new([(0.0, 0.0).into(), (0.0, S).into(), (S, S).into()])
        );
        assert_relative_eq!(total_area(mesh.source_triangles()), S * S);
        assert_sides_match(&mesh);
    }

    #[test]
    fn test_insert_adds_two_pairs() {
        let mut mesh = CorrespondenceMesh::default();
        let points = [(100.0, 40.0), (400.0, 300.0), (50.0, 450.0), (260.0, 200.0)];
        for (i, &(x, y)) in points.iter().enumerate() {
            let before = mesh.len();
            let outcome = mesh.insert_point(Vec2::new(x, y), Vec2::new(x + S, y));
            assert!(matches!(outcome, InsertOutcome::Inserted { .. }));
            assert_eq!(mesh.len(), before + 2, "after insertion {i}");
        }
        assert_eq!(mesh.len(), 2 + 2 * points.len());
    }

    #[test]
    fn test_vertices_contained_by_their_triangles() {
        let mut mesh = CorrespondenceMesh::default();
        for &(x, y) in &[(120.0, 80.0), (300.0, 280.0), (60.0, 400.0), (450.0, 90.0)] {
            mesh.insert_point(Vec2::new(x, y), Vec2::new(x + S + 7.0, y - 3.0));
        }
        for (source, target) in mesh.pairs() {
            for v in source.points {
                assert!(point_in_triangle(v, &source));
            }
            for v in target.points {
                assert!(point_in_triangle(v, &target));
            }
        }
    }

    #[test]
    fn test_sides_stay_in_lockstep() {
        let mut mesh = CorrespondenceMesh::default();
        let points = [
            (256.0, 100.0),
            (300.0, 280.0),
            (20.0, 500.0),
            (480.0, 30.0),
            (200.0, 210.0),
            (130.0, 330.0),
        ];
        for &(x, y) in &points {
            mesh.insert_point(Vec2::new(x, y), Vec2::new(x + S, y));
            assert_eq!(mesh.source_triangles().count(), mesh.target_triangles().count());
            assert_sides_match(&mesh);
        }
        assert_eq!(mesh.vertices(Side::Source).len(), 4 + points.len());
        assert_eq!(mesh.vertices(Side::Target).len(), 4 + points.len());
    }

    #[test]
    fn test_flip_on_diagonal_insertion() {
        let mut mesh = CorrespondenceMesh::default();
        let outcome = mesh.insert_point(Vec2::new(300.0, 280.0), Vec2::new(812.0, 280.0));
        assert_eq!(outcome, InsertOutcome::Inserted { flips: 1 });

        let faces: Vec<Face> = mesh.faces().iter().map(|p| p.source).collect();
        assert_eq!(
            faces,
            vec![
                Face::new(1, 2, 4),
                Face::new(2, 0, 4),
                Face::new(4, 3, 1),
                Face::new(4, 3, 0),
            ]
        );
        let targets: Vec<Face> = mesh.faces().iter().map(|p| p.target).collect();
        assert_eq!(faces, targets);
        assert_relative_eq!(total_area(mesh.source_triangles()), S * S, epsilon = 1e-6);
    }

    #[test]
    fn test_flip_preserves_area() {
        let mut mesh = CorrespondenceMesh::default();
        let mut total_flips = 0;
        for &(x, y) in &[(300.0, 280.0), (100.0, 90.0), (400.0, 390.0), (256.0, 250.0)] {
            if let InsertOutcome::Inserted { flips } =
                mesh.insert_point(Vec2::new(x, y), Vec2::new(x + S, y))
            {
                total_flips += flips;
            }
            assert_relative_eq!(total_area(mesh.source_triangles()), S * S, epsilon = 1e-6);
            assert_relative_eq!(total_area(mesh.target_triangles()), S * S, epsilon = 1e-6);
        }
        assert!(total_flips >= 1);
    }

    #[test]
    fn test_rejects_cross_canvas_pairs() {
        let mut mesh = CorrespondenceMesh::default();
        let before: Vec<TrianglePair> = mesh.faces().to_vec();

        for target in [(700.0, 10.0), (100.0, 10.0), (0.0, 0.0)] {
            let outcome = mesh.insert_point(Vec2::new(600.0, 10.0), target.into());
            assert_eq!(outcome, InsertOutcome::OutOfBounds);
        }
        // target point on the source half
        let outcome = mesh.insert_point(Vec2::new(10.0, 10.0), Vec2::new(100.0, 10.0));
        assert_eq!(outcome, InsertOutcome::OutOfBounds);
        // target below the canvas
        let outcome = mesh.insert_point(Vec2::new(10.0, 10.0), Vec2::new(700.0, 600.0));
        assert_eq!(outcome, InsertOutcome::OutOfBounds);

        assert_eq!(mesh.faces(), before.as_slice());
        assert_eq!(mesh.vertices(Side::Source).len(), 4);
    }

    #[test]
    fn test_point_outside_mesh_is_ignored() {
        let mut mesh = CorrespondenceMesh::default();
        // Negative coordinates pass the bounds check but no triangle holds them.
        let outcome = mesh.insert_point(Vec2::new(-5.0, 10.0), Vec2::new(600.0, 10.0));
        assert_eq!(outcome, InsertOutcome::NotContained);
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.vertices(Side::Target).len(), 4);
    }

    #[test]
    fn test_find_containing_triangle() {
        let mesh = CorrespondenceMesh::default();
        let upper = mesh.find_containing_triangle(Vec2::new(400.0, 10.0), Side::Source);
        assert_eq!(upper, mesh.source_triangles().next());

        let lower = mesh.find_containing_triangle(Vec2::new(10.0, 400.0), Side::Source);
        assert_eq!(lower, mesh.source_triangles().nth(1));

        // shared diagonal resolves to the first triangle
        let tie = mesh.find_containing_triangle(Vec2::new(256.0, 256.0), Side::Source);
        assert_eq!(tie, mesh.source_triangles().next());

        let target = mesh.find_containing_triangle(Vec2::new(522.0, 400.0), Side::Target);
        assert_eq!(target, mesh.target_triangles().nth(1));

        assert!(mesh
            .find_containing_triangle(Vec2::new(-1.0, 5.0), Side::Source)
            .is_none());
    }

    #[test]
    fn test_shared_edge() {
        let a = Face::new(0, 1, 4);
        let b = Face::new(0, 3, 1);
        assert_eq!(
            SharedEdge::between(&a, &b),
            Some(SharedEdge {
                apex_a: 2,
                apex_b: 1
            })
        );

        // single shared vertex
        assert_eq!(SharedEdge::between(&a, &Face::new(4, 5, 6)), None);
        // identical faces
        assert_eq!(SharedEdge::between(&a, &a), None);
        // disjoint
        assert_eq!(SharedEdge::between(&a, &Face::new(7, 8, 9)), None);
    }

    #[test]
    fn test_flip_construction() {
        let a = Face::new(0, 1, 4);
        let b = Face::new(0, 3, 1);
        let edge = SharedEdge::between(&a, &b).unwrap();
        let (first, second) = edge.flip(&a, &b);
        assert_eq!(first, Face::new(4, 3, 1));
        assert_eq!(second, Face::new(4, 3, 0));
    }

    #[test]
    fn test_point_pair_from_json() {
        let pairs: Vec<PointPair> =
            serde_json::from_str(r#"[{"source": [10, 20], "target": [530.5, 21]}]"#).unwrap();
        assert_eq!(pairs, vec![PointPair::new((10.0, 20.0), (530.5, 21.0))]);
    }
}
