use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Collision geometry of a rigid body, centered on the body position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Shape {
    Sphere {
        radius: f64,
    },
    /// Axis-aligned box described by its half-extents.
    Box {
        half_extents: DVec3,
    },
    /// Infinite plane n·x = d with unit normal `normal`.
    Plane {
        normal: DVec3,
        d: f64,
    },
}

impl Shape {
    pub fn sphere(radius: f64) -> Self {
        assert!(radius > 0.0, "sphere radius must be positive, got {radius}");
        Shape::Sphere { radius }
    }

    pub fn cuboid(half_extents: DVec3) -> Self {
        assert!(
            half_extents.x > 0.0 && half_extents.y > 0.0 && half_extents.z > 0.0,
            "box half-extents must be positive, got {half_extents}"
        );
        Shape::Box { half_extents }
    }

    /// Builds a plane from any non-zero normal; the stored normal is unit
    /// length.
    pub fn plane(normal: DVec3, d: f64) -> Self {
        let len = normal.length();
        assert!(len > 0.0, "plane normal must be non-zero");
        Shape::Plane {
            normal: normal / len,
            d,
        }
    }

    /// The common ground plane y = 0.
    pub fn ground_y0() -> Self {
        Shape::plane(DVec3::Y, 0.0)
    }

    pub fn is_plane(&self) -> bool {
        matches!(self, Shape::Plane { .. })
    }
}
