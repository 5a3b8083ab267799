use bytemuck::{Pod, Zeroable};

use super::Viewport;

/// Column-major 4×4 matrix, laid out for direct upload as a WGSL `mat4x4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Top-left-origin orthographic projection over `viewport`.
    ///
    /// Maps x ∈ [0, width] → [-1, 1], y ∈ [0, height] → [1, -1] (y-down, so
    /// y = 0 lands at the top of clip space), z ∈ [near, far] → [0, 1].
    ///
    /// Degenerate viewport extents are clamped to 1 logical pixel so the
    /// matrix stays finite.
    pub fn ortho(viewport: Viewport, near: f32, far: f32) -> Self {
        let w = viewport.width.max(1.0);
        let h = viewport.height.max(1.0);
        let inv_depth = 1.0 / (far - near);

        Mat4 {
            cols: [
                [2.0 / w, 0.0, 0.0, 0.0],
                [0.0, -2.0 / h, 0.0, 0.0],
                [0.0, 0.0, inv_depth, 0.0],
                [-1.0, 1.0, -near * inv_depth, 1.0],
            ],
        }
    }

    /// Transforms a point, assuming w = 1 (affine use only).
    pub fn transform_point(self, x: f32, y: f32, z: f32) -> [f32; 3] {
        let c = self.cols;
        [
            c[0][0] * x + c[1][0] * y + c[2][0] * z + c[3][0],
            c[0][1] * x + c[1][1] * y + c[2][1] * z + c[3][1],
            c[0][2] * x + c[1][2] * y + c[2][2] * z + c[3][2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f32; 3], b: [f32; 3]) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn ortho_maps_corners() {
        let m = Mat4::ortho(Viewport::new(640.0, 480.0), 0.0, 1.0);

        // Top-left of the viewport is the top-left of clip space.
        assert_close(m.transform_point(0.0, 0.0, 0.0), [-1.0, 1.0, 0.0]);
        assert_close(m.transform_point(640.0, 480.0, 0.0), [1.0, -1.0, 0.0]);
        assert_close(m.transform_point(320.0, 240.0, 0.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn ortho_depth_range() {
        let m = Mat4::ortho(Viewport::new(100.0, 100.0), 0.0, 1.0);
        assert!((m.transform_point(0.0, 0.0, 0.0)[2] - 0.0).abs() < 1e-5);
        assert!((m.transform_point(0.0, 0.0, 1.0)[2] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ortho_clamps_zero_viewport() {
        let m = Mat4::ortho(Viewport::new(0.0, 0.0), 0.0, 1.0);
        assert!(m.cols.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn identity_is_noop() {
        assert_close(Mat4::IDENTITY.transform_point(3.0, -2.0, 0.5), [3.0, -2.0, 0.5]);
    }
}
