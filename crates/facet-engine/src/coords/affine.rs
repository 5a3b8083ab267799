use super::Vec2;

/// 2D affine transform: linear part plus translation.
///
/// Maps a point as:
/// ```text
/// x' = m11·x + m12·y + tx
/// y' = m21·x + m22·y + ty
/// ```
///
/// Used by the filled-polygon path to place caller-supplied local-space
/// geometry (for example, rotating a shape around a pivot) without the caller
/// re-tessellating every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    #[inline]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            tx,
            ty,
        }
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m11: sx,
            m12: 0.0,
            m21: 0.0,
            m22: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Rotation by `angle` radians about the origin.
    ///
    /// In the y-down screen space this rotates clockwise for positive angles.
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            m11: cos,
            m12: -sin,
            m21: sin,
            m22: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    #[inline]
    pub fn apply(self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.m11 * p.x + self.m12 * p.y + self.tx,
            self.m21 * p.x + self.m22 * p.y + self.ty,
        )
    }

    /// Returns the transform equivalent to applying `self` first, `after` second.
    #[inline]
    pub fn then(self, after: Affine) -> Affine {
        Affine {
            m11: after.m11 * self.m11 + after.m12 * self.m21,
            m12: after.m11 * self.m12 + after.m12 * self.m22,
            m21: after.m21 * self.m11 + after.m22 * self.m21,
            m22: after.m21 * self.m12 + after.m22 * self.m22,
            tx: after.m11 * self.tx + after.m12 * self.ty + after.tx,
            ty: after.m21 * self.tx + after.m22 * self.ty + after.ty,
        }
    }
}
