use glam::DVec3;

use crate::collision::shapes::Shape;
use crate::core::rigidbody::RigidBody;

/// Computes the world-space AABB of a body for broadphase insertion.
///
/// Returns `None` for unbounded shapes (planes); the world pairs those
/// against every other body instead of inserting them into the grid.
pub fn compute(body: &RigidBody) -> Option<(DVec3, DVec3)> {
    let c = body.position();
    match *body.shape() {
        Shape::Sphere { radius } => Some((c - DVec3::splat(radius), c + DVec3::splat(radius))),
        Shape::Box { half_extents } => Some((c - half_extents, c + half_extents)),
        Shape::Plane { .. } => None,
    }
}
