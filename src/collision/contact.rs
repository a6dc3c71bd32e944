use glam::DVec3;

use crate::core::store::BodyId;

/// Single-point contact manifold between two bodies.
///
/// Convention: `normal` is unit length and points from `b` toward `a`.
#[derive(Debug, Clone, Copy)]
pub struct Manifold {
    pub a: BodyId,
    pub b: BodyId,
    pub normal: DVec3,
    pub penetration: f64,
}
