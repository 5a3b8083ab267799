//! Immediate-mode shape batching.
//!
//! Callers bracket drawing with `begin`/`end`; every `draw_*` call
//! tessellates one logical shape straight into a fixed scratch pool. When a
//! shape would overflow the pool, the pending batch is submitted early and
//! the shape starts from an empty pool; batches are sized by content, never
//! by a fixed shape count.
//!
//! Convention:
//! - geometry is in logical pixels (top-left origin, +Y down)
//! - every shape contributes whole triangles with consistent winding
//! - nothing here touches the GPU except through [`DrawBackend`]

mod backend;
mod pool;
mod vertex;

pub use backend::DrawBackend;
pub use vertex::Vertex;

use crate::coords::{Affine, ColorRgba, Mat4, Vec2};
use crate::error::{Error, Result};
use pool::BufferPool;

/// Lines thinner than this are drawn at this thickness.
pub const MIN_LINE_THICKNESS: f32 = 1.0;
/// Lines thicker than this are clamped down to this thickness.
pub const MAX_LINE_THICKNESS: f32 = 10.0;

/// Fewest segments a circle may be approximated with.
pub const MIN_CIRCLE_POINTS: u32 = 3;
/// Most segments a circle may be approximated with.
pub const MAX_CIRCLE_POINTS: u32 = 256;

/// Default vertex capacity of the scratch pool. Index capacity is always
/// three times the vertex capacity.
pub const DEFAULT_MAX_VERTICES: usize = 1024;

/// The smallest shape (a quad) needs this many vertices; pools below this
/// could never hold anything.
const MIN_POOL_VERTICES: usize = 4;

const QUAD_VERTICES: usize = 4;
const QUAD_INDICES: usize = 6;

/// Immediate-mode batch renderer for filled and outlined 2D primitives.
///
/// State machine: Idle → (`begin`) → Started → (`end`) → Idle. Drawing and
/// flushing are valid only while started; violations surface as
/// [`Error::InvalidState`].
///
/// The vertex/index pool is private to the batch for its entire lifetime and
/// reused across flushes; no shape survives a flush.
pub struct ShapeBatch<B: DrawBackend> {
    backend: B,
    pool: BufferPool,
    projection: Mat4,
    started: bool,
}

impl<B: DrawBackend> ShapeBatch<B> {
    /// Creates a batch with the default pool capacity.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pool: BufferPool::new(DEFAULT_MAX_VERTICES),
            projection: Mat4::IDENTITY,
            started: false,
        }
    }

    /// Creates a batch with a custom vertex capacity (indices get 3×).
    ///
    /// Fails with [`Error::Configuration`] if the capacity cannot hold even
    /// the smallest shape.
    pub fn with_capacity(backend: B, max_vertices: usize) -> Result<Self> {
        if max_vertices < MIN_POOL_VERTICES {
            return Err(Error::Configuration(format!(
                "vertex capacity {max_vertices} cannot hold any shape (minimum {MIN_POOL_VERTICES})"
            )));
        }
        Ok(Self {
            backend,
            pool: BufferPool::new(max_vertices),
            projection: Mat4::IDENTITY,
            started: false,
        })
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the batch, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Starts a pass: sizes the orthographic projection to the backend's
    /// current viewport and allows drawing.
    pub fn begin(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::InvalidState("batch already started"));
        }

        self.projection = Mat4::ortho(self.backend.viewport(), 0.0, 1.0);
        self.started = true;
        Ok(())
    }

    /// Ends the pass. Always flushes first; the flush no-ops when nothing is
    /// pending.
    pub fn end(&mut self) -> Result<()> {
        self.ensure_started()?;
        self.flush()?;
        self.started = false;
        Ok(())
    }

    /// Submits the pending batch, if any, as one indexed draw call and
    /// rewinds the pool.
    ///
    /// A partially filled pool is valid and submitted as-is. Backend
    /// failures propagate unretried; the pool is left unreset so the caller
    /// observes a consistent state.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_started()?;
        if self.pool.is_empty() {
            return Ok(());
        }

        self.backend.apply_shading_state(&self.projection)?;
        self.backend
            .submit_indexed_triangles(self.pool.vertices(), self.pool.indices())?;
        self.pool.reset();
        Ok(())
    }

    /// Filled axis-aligned rectangle.
    ///
    /// Corners run clockwise from top-left. Negative `width`/`height` are
    /// passed through un-normalized; the caller owns that meaning.
    pub fn draw_rectangle_fill(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: ColorRgba,
    ) -> Result<()> {
        self.ensure_started()?;
        self.ensure_space(QUAD_VERTICES, QUAD_INDICES)?;

        let left = x;
        let right = x + width;
        let top = y;
        let bottom = y + height;

        let base = self.pool.base_index();
        for i in [0, 1, 2, 0, 2, 3] {
            self.pool.push_index(base + i);
        }

        self.pool.push_vertex(Vertex::new(Vec2::new(left, top), color));
        self.pool.push_vertex(Vertex::new(Vec2::new(right, top), color));
        self.pool.push_vertex(Vertex::new(Vec2::new(right, bottom), color));
        self.pool.push_vertex(Vertex::new(Vec2::new(left, bottom), color));

        self.pool.finish_shape();
        Ok(())
    }

    /// Rectangle outline: four independent thick lines (top, right, bottom,
    /// left), each clamped and space-checked on its own.
    ///
    /// A zero-extent edge is rejected as degenerate; edges appended before
    /// the rejection stay in the batch.
    pub fn draw_rectangle(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
        color: ColorRgba,
    ) -> Result<()> {
        let left = x;
        let right = x + width;
        let top = y;
        let bottom = y + height;

        self.draw_line(Vec2::new(left, top), Vec2::new(right, top), thickness, color)?;
        self.draw_line(Vec2::new(right, top), Vec2::new(right, bottom), thickness, color)?;
        self.draw_line(Vec2::new(right, bottom), Vec2::new(left, bottom), thickness, color)?;
        self.draw_line(Vec2::new(left, bottom), Vec2::new(left, top), thickness, color)?;
        Ok(())
    }

    /// Thick line segment with square end caps.
    ///
    /// Thickness is clamped to `[MIN_LINE_THICKNESS, MAX_LINE_THICKNESS]`.
    /// The quad extends half a thickness past both endpoints and half a
    /// thickness to each side. Zero-length (or near-zero) segments are
    /// rejected with [`Error::DegenerateInput`] before touching the pool.
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, thickness: f32, color: ColorRgba) -> Result<()> {
        self.ensure_started()?;

        let d = end - start;
        let len_sq = d.length_sq();
        if len_sq <= f32::EPSILON {
            return Err(Error::DegenerateInput("zero-length line segment"));
        }

        self.ensure_space(QUAD_VERTICES, QUAD_INDICES)?;

        let half = thickness.clamp(MIN_LINE_THICKNESS, MAX_LINE_THICKNESS) / 2.0;

        // One sqrt, reciprocal scaling; no normalize-then-rescale.
        let inv_len = 1.0 / len_sq.sqrt();
        let e1 = d * (inv_len * half);
        let n1 = Vec2::new(-e1.y, e1.x);

        let q1 = start + n1 - e1;
        let q2 = end + n1 + e1;
        let q3 = end - n1 + e1;
        let q4 = start - n1 - e1;

        let base = self.pool.base_index();
        for i in [2, 0, 3, 2, 1, 0] {
            self.pool.push_index(base + i);
        }
        for q in [q1, q2, q3, q4] {
            self.pool.push_vertex(Vertex::new(q, color));
        }

        self.pool.finish_shape();
        Ok(())
    }

    /// Scalar-coordinate convenience for [`draw_line`](Self::draw_line).
    #[inline]
    pub fn draw_line_xy(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: ColorRgba,
    ) -> Result<()> {
        self.draw_line(Vec2::new(x1, y1), Vec2::new(x2, y2), thickness, color)
    }

    /// Circle outline approximated by `points` thick line segments.
    ///
    /// `points` is clamped to `[MIN_CIRCLE_POINTS, MAX_CIRCLE_POINTS]`.
    /// Successive points come from a rotation-matrix recurrence starting at
    /// `(radius, 0)`, so only one sin/cos pair is evaluated. Each segment is
    /// its own shape with its own space check, so a circle may span a flush.
    pub fn draw_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        points: u32,
        thickness: f32,
        color: ColorRgba,
    ) -> Result<()> {
        self.ensure_started()?;

        let points = points.clamp(MIN_CIRCLE_POINTS, MAX_CIRCLE_POINTS);
        let rotation = std::f32::consts::TAU / points as f32;
        let (sin, cos) = rotation.sin_cos();

        let mut ax = radius;
        let mut ay = 0.0f32;

        for _ in 0..points {
            let bx = cos * ax - sin * ay;
            let by = sin * ax + cos * ay;

            self.draw_line(
                Vec2::new(ax + center.x, ay + center.y),
                Vec2::new(bx + center.x, by + center.y),
                thickness,
                color,
            )?;

            ax = bx;
            ay = by;
        }
        Ok(())
    }

    /// Filled circle: one shape of `points` vertices and a fan of
    /// `points - 2` triangles `(0, k, k+1)`, reserved with a single space
    /// check.
    pub fn draw_circle_fill(
        &mut self,
        center: Vec2,
        radius: f32,
        points: u32,
        color: ColorRgba,
    ) -> Result<()> {
        self.ensure_started()?;

        let points = points.clamp(MIN_CIRCLE_POINTS, MAX_CIRCLE_POINTS) as usize;
        let shape_triangles = points - 2;
        self.ensure_space(points, shape_triangles * 3)?;

        let base = self.pool.base_index();
        for k in 1..=shape_triangles as u32 {
            self.pool.push_index(base);
            self.pool.push_index(base + k);
            self.pool.push_index(base + k + 1);
        }

        let rotation = std::f32::consts::TAU / points as f32;
        let (sin, cos) = rotation.sin_cos();

        let mut ax = radius;
        let mut ay = 0.0f32;

        for _ in 0..points {
            self.pool
                .push_vertex(Vertex::new(Vec2::new(ax + center.x, ay + center.y), color));

            let (px, py) = (ax, ay);
            ax = cos * px - sin * py;
            ay = sin * px + cos * py;
        }

        self.pool.finish_shape();
        Ok(())
    }

    /// Closed polygon outline: one thick line per edge, wrapping the last
    /// point back to the first. Space is checked per edge, never for the
    /// whole polygon, so an outline larger than the pool still renders.
    pub fn draw_polygon(&mut self, points: &[Vec2], thickness: f32, color: ColorRgba) -> Result<()> {
        self.ensure_started()?;
        if points.len() < 3 {
            return Err(Error::DegenerateInput("polygon outline needs at least 3 points"));
        }

        for i in 0..points.len() {
            self.draw_line(points[i], points[(i + 1) % points.len()], thickness, color)?;
        }
        Ok(())
    }

    /// Filled polygon from caller-supplied triangulation.
    ///
    /// `triangles` indexes into `points` and must describe whole triangles
    /// with every index in range; the batch performs no triangulation of its
    /// own. Every point is mapped through `transform` before it is appended,
    /// which lets callers animate local-space geometry without recomputing
    /// it. Empty input is a no-op.
    pub fn draw_polygon_fill(
        &mut self,
        points: &[Vec2],
        triangles: &[u32],
        transform: Affine,
        color: ColorRgba,
    ) -> Result<()> {
        self.ensure_started()?;
        if points.is_empty() || triangles.is_empty() {
            return Ok(());
        }
        if triangles.len() % 3 != 0 {
            return Err(Error::DegenerateInput(
                "triangle index list length is not a multiple of 3",
            ));
        }
        if triangles.iter().any(|&i| i as usize >= points.len()) {
            return Err(Error::DegenerateInput("triangle index out of range"));
        }

        self.ensure_space(points.len(), triangles.len())?;

        let base = self.pool.base_index();
        for &i in triangles {
            self.pool.push_index(base + i);
        }
        for &p in points {
            self.pool.push_vertex(Vertex::new(transform.apply(p), color));
        }

        self.pool.finish_shape();
        Ok(())
    }

    fn ensure_started(&self) -> Result<()> {
        if self.started {
            Ok(())
        } else {
            Err(Error::InvalidState("batch not started"))
        }
    }

    /// Backpressure: errors if the shape can never fit, flushes if it cannot
    /// fit right now.
    fn ensure_space(&mut self, shape_vertices: usize, shape_indices: usize) -> Result<()> {
        if shape_vertices > self.pool.max_vertices() {
            return Err(Error::Capacity {
                needed: shape_vertices,
                capacity: self.pool.max_vertices(),
                kind: "vertices",
            });
        }
        if shape_indices > self.pool.max_indices() {
            return Err(Error::Capacity {
                needed: shape_indices,
                capacity: self.pool.max_indices(),
                kind: "indices",
            });
        }

        if !self.pool.fits(shape_vertices, shape_indices) {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;

    const EPS: f32 = 1e-4;

    struct Submission {
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    }

    /// Backend double: records every shading application and submission.
    struct RecordingBackend {
        viewport: Viewport,
        shading_applied: usize,
        last_projection: Option<Mat4>,
        submissions: Vec<Submission>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                viewport: Viewport::new(320.0, 240.0),
                shading_applied: 0,
                last_projection: None,
                submissions: Vec::new(),
            }
        }
    }

    impl DrawBackend for RecordingBackend {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn apply_shading_state(&mut self, projection: &Mat4) -> anyhow::Result<()> {
            self.shading_applied += 1;
            self.last_projection = Some(*projection);
            Ok(())
        }

        fn submit_indexed_triangles(&mut self, vertices: &[Vertex], indices: &[u32]) -> anyhow::Result<()> {
            self.submissions.push(Submission {
                vertices: vertices.to_vec(),
                indices: indices.to_vec(),
            });
            Ok(())
        }
    }

    fn batch() -> ShapeBatch<RecordingBackend> {
        ShapeBatch::new(RecordingBackend::new())
    }

    fn white() -> ColorRgba {
        ColorRgba::white()
    }

    fn positions(s: &Submission) -> Vec<[f32; 2]> {
        s.vertices.iter().map(|v| v.position).collect()
    }

    fn assert_pos_close(actual: [f32; 2], expected: [f32; 2]) {
        assert!(
            (actual[0] - expected[0]).abs() < EPS && (actual[1] - expected[1]).abs() < EPS,
            "{actual:?} != {expected:?}"
        );
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn begin_twice_fails() {
        let mut b = batch();
        b.begin().unwrap();
        assert!(matches!(b.begin(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn end_without_begin_fails() {
        let mut b = batch();
        assert!(matches!(b.end(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn flush_without_begin_fails() {
        let mut b = batch();
        assert!(matches!(b.flush(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn draw_without_begin_fails() {
        let mut b = batch();
        let err = b.draw_rectangle_fill(0.0, 0.0, 10.0, 10.0, white());
        assert!(matches!(err, Err(Error::InvalidState(_))));
        assert!(b.backend().submissions.is_empty());
    }

    #[test]
    fn end_returns_to_idle() {
        let mut b = batch();
        b.begin().unwrap();
        b.end().unwrap();
        assert!(!b.is_started());
        b.begin().unwrap();
        b.end().unwrap();
    }

    // ── flush protocol ────────────────────────────────────────────────────

    #[test]
    fn empty_flush_is_a_noop() {
        let mut b = batch();
        b.begin().unwrap();
        b.flush().unwrap();
        b.flush().unwrap();
        assert_eq!(b.backend().shading_applied, 0);
        assert!(b.backend().submissions.is_empty());
    }

    #[test]
    fn empty_end_submits_nothing() {
        let mut b = batch();
        b.begin().unwrap();
        b.end().unwrap();
        assert!(b.backend().submissions.is_empty());
    }

    #[test]
    fn end_flushes_pending_shapes() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_rectangle_fill(0.0, 0.0, 5.0, 5.0, white()).unwrap();
        assert!(b.backend().submissions.is_empty());
        b.end().unwrap();
        assert_eq!(b.backend().submissions.len(), 1);
        assert_eq!(b.backend().shading_applied, 1);
    }

    #[test]
    fn explicit_flush_splits_submissions() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_rectangle_fill(0.0, 0.0, 5.0, 5.0, white()).unwrap();
        b.flush().unwrap();
        b.draw_rectangle_fill(10.0, 0.0, 5.0, 5.0, white()).unwrap();
        b.end().unwrap();

        assert_eq!(b.backend().submissions.len(), 2);
        // Cursors rewound: the second submission starts at index 0 again.
        assert_eq!(b.backend().submissions[1].indices[0], 0);
    }

    #[test]
    fn overflow_triggers_exactly_one_extra_flush() {
        // Room for exactly 3 rectangles (12 vertices).
        let mut b = ShapeBatch::with_capacity(RecordingBackend::new(), 12).unwrap();
        b.begin().unwrap();
        for i in 0..4 {
            b.draw_rectangle_fill(i as f32 * 10.0, 0.0, 5.0, 5.0, white()).unwrap();
        }
        b.end().unwrap();

        let subs = &b.backend().submissions;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].vertices.len(), 12);
        assert_eq!(subs[0].indices.len(), 18);
        assert_eq!(subs[1].vertices.len(), 4);
        assert_eq!(subs[1].indices.len(), 6);
    }

    #[test]
    fn oversized_shape_fails_without_submission() {
        let mut b = ShapeBatch::with_capacity(RecordingBackend::new(), 8).unwrap();
        b.begin().unwrap();

        let err = b.draw_circle_fill(Vec2::zero(), 10.0, 16, white());
        assert!(matches!(err, Err(Error::Capacity { kind: "vertices", .. })));
        assert!(b.backend().submissions.is_empty());

        // The pool is untouched; normal drawing continues.
        b.draw_rectangle_fill(0.0, 0.0, 5.0, 5.0, white()).unwrap();
        b.end().unwrap();
        assert_eq!(b.backend().submissions.len(), 1);
        assert_eq!(b.backend().submissions[0].vertices.len(), 4);
    }

    #[test]
    fn with_capacity_too_small_is_a_configuration_error() {
        let err = ShapeBatch::with_capacity(RecordingBackend::new(), 3);
        assert!(matches!(err, Err(Error::Configuration(_))));
    }

    #[test]
    fn begin_builds_projection_from_viewport() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_rectangle_fill(0.0, 0.0, 1.0, 1.0, white()).unwrap();
        b.end().unwrap();

        let proj = b.backend().last_projection.expect("projection applied");
        let top_left = proj.transform_point(0.0, 0.0, 0.0);
        let bottom_right = proj.transform_point(320.0, 240.0, 0.0);
        assert_pos_close([top_left[0], top_left[1]], [-1.0, 1.0]);
        assert_pos_close([bottom_right[0], bottom_right[1]], [1.0, -1.0]);
    }

    // ── rectangles ────────────────────────────────────────────────────────

    #[test]
    fn rectangle_fill_geometry() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_rectangle_fill(0.0, 0.0, 10.0, 10.0, white()).unwrap();
        b.end().unwrap();

        let s = &b.backend().submissions[0];
        assert_eq!(
            positions(s),
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
        );
        assert_eq!(s.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(s.vertices.iter().all(|v| v.color == [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn rectangle_outline_is_four_lines() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_rectangle(10.0, 20.0, 60.0, 60.0, 1.0, white()).unwrap();
        b.end().unwrap();

        let s = &b.backend().submissions[0];
        assert_eq!(s.vertices.len(), 16);
        assert_eq!(s.indices.len(), 24);
    }

    // ── lines ─────────────────────────────────────────────────────────────

    #[test]
    fn line_quad_covers_segment_with_caps() {
        let mut b = batch();
        b.begin().unwrap();
        // Horizontal segment, thickness 2 → half-thickness 1.
        b.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 2.0, white()).unwrap();
        b.end().unwrap();

        let s = &b.backend().submissions[0];
        let p = positions(s);
        assert_pos_close(p[0], [-1.0, 1.0]);
        assert_pos_close(p[1], [11.0, 1.0]);
        assert_pos_close(p[2], [11.0, -1.0]);
        assert_pos_close(p[3], [-1.0, -1.0]);
        assert_eq!(s.indices, vec![2, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn line_thickness_clamps_low() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.001, white()).unwrap();
        b.end().unwrap();

        // Effective half-thickness is MIN_LINE_THICKNESS / 2.
        let p = positions(&b.backend().submissions[0]);
        assert_pos_close(p[0], [-0.5, 0.5]);
        assert_pos_close(p[2], [10.5, -0.5]);
    }

    #[test]
    fn line_thickness_clamps_high() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 1000.0, white()).unwrap();
        b.end().unwrap();

        // Effective half-thickness is MAX_LINE_THICKNESS / 2.
        let p = positions(&b.backend().submissions[0]);
        assert_pos_close(p[0], [-5.0, 5.0]);
        assert_pos_close(p[2], [15.0, -5.0]);
    }

    #[test]
    fn zero_length_line_is_rejected() {
        let mut b = batch();
        b.begin().unwrap();
        let p = Vec2::new(5.0, 5.0);
        assert!(matches!(
            b.draw_line(p, p, 1.0, white()),
            Err(Error::DegenerateInput(_))
        ));

        // Nothing was appended.
        b.end().unwrap();
        assert!(b.backend().submissions.is_empty());
    }

    #[test]
    fn draw_line_xy_matches_vector_form() {
        let mut a = batch();
        a.begin().unwrap();
        a.draw_line_xy(1.0, 2.0, 9.0, 7.0, 3.0, white()).unwrap();
        a.end().unwrap();

        let mut b = batch();
        b.begin().unwrap();
        b.draw_line(Vec2::new(1.0, 2.0), Vec2::new(9.0, 7.0), 3.0, white()).unwrap();
        b.end().unwrap();

        assert_eq!(
            positions(&a.backend().submissions[0]),
            positions(&b.backend().submissions[0])
        );
    }

    // ── circles ───────────────────────────────────────────────────────────

    #[test]
    fn circle_fill_four_points_recurrence() {
        let r = 8.0;
        let mut b = batch();
        b.begin().unwrap();
        b.draw_circle_fill(Vec2::zero(), r, 4, white()).unwrap();
        b.end().unwrap();

        let s = &b.backend().submissions[0];
        let p = positions(s);
        assert_eq!(p.len(), 4);
        assert_pos_close(p[0], [r, 0.0]);
        assert_pos_close(p[1], [0.0, r]);
        assert_pos_close(p[2], [-r, 0.0]);
        assert_pos_close(p[3], [0.0, -r]);
        assert_eq!(s.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn circle_fill_is_centered() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_circle_fill(Vec2::new(100.0, 50.0), 4.0, 4, white()).unwrap();
        b.end().unwrap();

        let p = positions(&b.backend().submissions[0]);
        assert_pos_close(p[0], [104.0, 50.0]);
        assert_pos_close(p[3], [100.0, 46.0]);
    }

    #[test]
    fn circle_fill_point_count_clamps() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_circle_fill(Vec2::zero(), 5.0, 0, white()).unwrap();
        b.end().unwrap();

        // Clamped up to the 3-point minimum: a single triangle.
        let s = &b.backend().submissions[0];
        assert_eq!(s.vertices.len(), 3);
        assert_eq!(s.indices.len(), 3);
    }

    #[test]
    fn circle_fill_is_one_shape() {
        // 32 points fit a 32-vertex pool exactly; no flush may intervene.
        let mut b = ShapeBatch::with_capacity(RecordingBackend::new(), 32).unwrap();
        b.begin().unwrap();
        b.draw_circle_fill(Vec2::zero(), 5.0, 32, white()).unwrap();
        b.end().unwrap();

        let subs = &b.backend().submissions;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].vertices.len(), 32);
        assert_eq!(subs[0].indices.len(), 30 * 3);
    }

    #[test]
    fn circle_outline_is_per_segment() {
        // 4 segments × 4 vertices = 16 > 12: the outline must span a flush,
        // which a single-shape reservation could not.
        let mut b = ShapeBatch::with_capacity(RecordingBackend::new(), 12).unwrap();
        b.begin().unwrap();
        b.draw_circle(Vec2::zero(), 50.0, 4, 1.0, white()).unwrap();
        b.end().unwrap();

        let subs = &b.backend().submissions;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].vertices.len(), 12);
        assert_eq!(subs[1].vertices.len(), 4);
    }

    #[test]
    fn circle_outline_chords_touch_the_circle_points() {
        let r = 10.0;
        let mut b = batch();
        b.begin().unwrap();
        b.draw_circle(Vec2::zero(), r, 4, 2.0, white()).unwrap();
        b.end().unwrap();

        // First segment runs from (r, 0) to (0, r); its quad is that chord
        // widened by the half-thickness. Recover the chord midpoint from the
        // quad corners and check it sits on the segment between the points.
        let s = &b.backend().submissions[0];
        assert_eq!(s.vertices.len(), 16);
        let p = positions(s);
        let mid = [
            (p[0][0] + p[2][0]) / 2.0,
            (p[0][1] + p[2][1]) / 2.0,
        ];
        assert_pos_close(mid, [r / 2.0, r / 2.0]);
    }

    // ── polygons ──────────────────────────────────────────────────────────

    #[test]
    fn polygon_outline_closes_the_loop() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        let mut b = batch();
        b.begin().unwrap();
        b.draw_polygon(&square, 1.0, white()).unwrap();
        b.end().unwrap();

        // One line quad per edge, including last → first.
        let s = &b.backend().submissions[0];
        assert_eq!(s.vertices.len(), 16);
        assert_eq!(s.indices.len(), 24);
    }

    #[test]
    fn polygon_with_too_few_points_is_rejected() {
        let mut b = batch();
        b.begin().unwrap();
        let two = [Vec2::zero(), Vec2::new(1.0, 1.0)];
        assert!(matches!(
            b.draw_polygon(&two, 1.0, white()),
            Err(Error::DegenerateInput(_))
        ));
        b.end().unwrap();
        assert!(b.backend().submissions.is_empty());
    }

    #[test]
    fn polygon_fill_identity_reproduces_positions() {
        let points = [
            Vec2::new(10.0, 10.0),
            Vec2::new(50.0, 5.0),
            Vec2::new(70.0, 80.0),
            Vec2::new(40.0, 100.0),
        ];
        let triangles = [0, 1, 2, 0, 2, 3];

        let mut b = batch();
        b.begin().unwrap();
        b.draw_polygon_fill(&points, &triangles, Affine::IDENTITY, white()).unwrap();
        b.end().unwrap();

        let s = &b.backend().submissions[0];
        for (v, p) in s.vertices.iter().zip(points.iter()) {
            assert_eq!(v.position, [p.x, p.y]);
        }
        assert_eq!(s.indices, triangles.to_vec());
    }

    #[test]
    fn polygon_fill_translation_shifts_every_vertex() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)];
        let triangles = [0, 1, 2];

        let mut b = batch();
        b.begin().unwrap();
        b.draw_polygon_fill(&points, &triangles, Affine::translation(7.0, -2.0), white())
            .unwrap();
        b.end().unwrap();

        let p = positions(&b.backend().submissions[0]);
        assert_eq!(p, vec![[7.0, -2.0], [11.0, -2.0], [7.0, 1.0]]);
    }

    #[test]
    fn polygon_fill_offsets_indices_by_cursor() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let triangles = [0, 1, 2];

        let mut b = batch();
        b.begin().unwrap();
        b.draw_rectangle_fill(0.0, 0.0, 5.0, 5.0, white()).unwrap();
        b.draw_polygon_fill(&points, &triangles, Affine::IDENTITY, white()).unwrap();
        b.end().unwrap();

        let s = &b.backend().submissions[0];
        assert_eq!(&s.indices[6..], &[4, 5, 6]);
    }

    #[test]
    fn polygon_fill_rejects_malformed_triangulation() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];

        let mut b = batch();
        b.begin().unwrap();
        assert!(matches!(
            b.draw_polygon_fill(&points, &[0, 1], Affine::IDENTITY, white()),
            Err(Error::DegenerateInput(_))
        ));
        assert!(matches!(
            b.draw_polygon_fill(&points, &[0, 1, 3], Affine::IDENTITY, white()),
            Err(Error::DegenerateInput(_))
        ));
        b.end().unwrap();
        assert!(b.backend().submissions.is_empty());
    }

    #[test]
    fn polygon_fill_empty_input_is_a_noop() {
        let mut b = batch();
        b.begin().unwrap();
        b.draw_polygon_fill(&[], &[], Affine::IDENTITY, white()).unwrap();
        b.end().unwrap();
        assert!(b.backend().submissions.is_empty());
    }
}
