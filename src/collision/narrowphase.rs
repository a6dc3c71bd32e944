use glam::DVec3;

use crate::collision::contact::Manifold;
use crate::collision::shapes::Shape;
use crate::core::rigidbody::RigidBody;

/// Resting tolerance (m) for sphere–plane contacts. Micro-penetrations at
/// or below this emit no manifold; the soft-contact stabilizer owns them.
const SNAP_SLOP: f64 = 1e-3;

/// Dispatches the pair test matching the two bodies' shape tags.
///
/// Returns `None` when the shapes do not interpenetrate, and always for
/// plane–plane. Every emitted manifold has a unit normal pointing from the
/// second body toward the first.
pub fn collide(a: &RigidBody, b: &RigidBody) -> Option<Manifold> {
    match (a.shape(), b.shape()) {
        (Shape::Sphere { .. }, Shape::Sphere { .. }) => sphere_sphere(a, b),
        (Shape::Sphere { .. }, Shape::Plane { .. }) | (Shape::Plane { .. }, Shape::Sphere { .. }) => {
            sphere_plane(a, b)
        }
        (Shape::Sphere { .. }, Shape::Box { .. }) => sphere_box(a, b),
        (Shape::Box { .. }, Shape::Sphere { .. }) => sphere_box(b, a),
        (Shape::Box { .. }, Shape::Plane { .. }) => box_plane(a, b),
        (Shape::Plane { .. }, Shape::Box { .. }) => box_plane(b, a),
        (Shape::Box { .. }, Shape::Box { .. }) => box_box(a, b),
        (Shape::Plane { .. }, Shape::Plane { .. }) => None,
    }
}

/// Sphere vs. sphere. Concentric centers fall back to a +X normal.
pub fn sphere_sphere(a: &RigidBody, b: &RigidBody) -> Option<Manifold> {
    let (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) = (*a.shape(), *b.shape())
    else {
        return None;
    };

    let diff = b.position() - a.position();
    let dist = diff.length();
    let r = ra + rb;
    if dist >= r {
        return None;
    }

    let normal = if dist > 0.0 { -diff / dist } else { DVec3::X };
    Some(Manifold {
        a: a.id(),
        b: b.id(),
        normal,
        penetration: r - dist,
    })
}

/// Sphere vs. plane, accepting the arguments in either order.
///
/// The manifold keeps the caller's (a, b) order; when the plane came first
/// the normal is flipped so it still points from `b` toward `a`.
pub fn sphere_plane(a: &RigidBody, b: &RigidBody) -> Option<Manifold> {
    let (sphere, plane_body, swapped) = match (a.shape(), b.shape()) {
        (Shape::Sphere { .. }, Shape::Plane { .. }) => (a, b, false),
        (Shape::Plane { .. }, Shape::Sphere { .. }) => (b, a, true),
        _ => return None,
    };
    let Shape::Sphere { radius } = *sphere.shape() else {
        return None;
    };
    let Shape::Plane { normal: n, d } = *plane_body.shape() else {
        return None;
    };

    // signed distance of the sphere center to the plane surface
    let dist = n.dot(sphere.position()) - d;
    let penetration = radius - dist;
    if penetration <= SNAP_SLOP {
        return None;
    }

    let normal = if swapped { -n } else { n };
    Some(Manifold {
        a: a.id(),
        b: b.id(),
        normal,
        penetration,
    })
}

/// Sphere vs. axis-aligned box. The manifold is always (sphere, box); the
/// normal points from the box toward the sphere.
pub fn sphere_box(sphere: &RigidBody, box_body: &RigidBody) -> Option<Manifold> {
    let Shape::Sphere { radius } = *sphere.shape() else {
        return None;
    };
    let Shape::Box { half_extents } = *box_body.shape() else {
        return None;
    };

    let c = sphere.position();
    let b_min = box_body.position() - half_extents;
    let b_max = box_body.position() + half_extents;
    let closest = c.clamp(b_min, b_max);

    let to_sphere = c - closest;
    let dist = to_sphere.length();

    if dist == 0.0 {
        // center inside the box: take the nearest face, toward the sphere
        // center. Strict comparisons make ties favor the earlier candidate
        // (x before y before z, min side before max side).
        let faces = [
            (c.x - b_min.x, DVec3::X),
            (b_max.x - c.x, DVec3::NEG_X),
            (c.y - b_min.y, DVec3::Y),
            (b_max.y - c.y, DVec3::NEG_Y),
            (c.z - b_min.z, DVec3::Z),
            (b_max.z - c.z, DVec3::NEG_Z),
        ];
        let (mut best, mut normal) = faces[0];
        for &(face_dist, face_normal) in &faces[1..] {
            if face_dist < best {
                best = face_dist;
                normal = face_normal;
            }
        }

        return Some(Manifold {
            a: sphere.id(),
            b: box_body.id(),
            normal,
            penetration: radius + best,
        });
    }

    if dist >= radius {
        return None;
    }

    Some(Manifold {
        a: sphere.id(),
        b: box_body.id(),
        normal: to_sphere / dist,
        penetration: radius - dist,
    })
}

/// Axis-aligned box vs. plane. The manifold is (box, plane) and reuses the
/// plane normal.
pub fn box_plane(box_body: &RigidBody, plane_body: &RigidBody) -> Option<Manifold> {
    let Shape::Box { half_extents } = *box_body.shape() else {
        return None;
    };
    let Shape::Plane { normal: n, d } = *plane_body.shape() else {
        return None;
    };

    // projection of the half-extents onto the plane normal
    let r = half_extents.dot(n.abs());
    let dist = n.dot(box_body.position()) - d;

    let penetration = r - dist;
    if penetration <= 0.0 {
        return None;
    }

    Some(Manifold {
        a: box_body.id(),
        b: plane_body.id(),
        normal: n,
        penetration,
    })
}

/// Axis-aligned box vs. box. Penetration is the smallest per-axis overlap;
/// equal overlaps resolve to the earliest axis (x, then y, then z).
pub fn box_box(a: &RigidBody, b: &RigidBody) -> Option<Manifold> {
    let (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) =
        (*a.shape(), *b.shape())
    else {
        return None;
    };

    let delta = b.position() - a.position();
    let overlap = ha + hb - delta.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
        return None;
    }

    let (mut penetration, mut offset, mut axis) = (overlap.x, delta.x, DVec3::X);
    if overlap.y < penetration {
        (penetration, offset, axis) = (overlap.y, delta.y, DVec3::Y);
    }
    if overlap.z < penetration {
        (penetration, offset, axis) = (overlap.z, delta.z, DVec3::Z);
    }

    // b→a is opposite the center offset; dead-center overlap takes the
    // positive axis direction
    let dir = if offset == 0.0 { 1.0 } else { -offset.signum() };
    let normal = axis * dir;

    Some(Manifold {
        a: a.id(),
        b: b.id(),
        normal,
        penetration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::BodyId;

    fn body(id: u32, mass: f64, shape: Shape, position: DVec3) -> RigidBody {
        let mut body = RigidBody::new(position, mass, shape);
        body.id = BodyId(id);
        body
    }

    fn sphere(id: u32, radius: f64, position: DVec3) -> RigidBody {
        body(id, 1.0, Shape::sphere(radius), position)
    }

    fn cuboid(id: u32, half_extents: DVec3, position: DVec3) -> RigidBody {
        body(id, 1.0, Shape::cuboid(half_extents), position)
    }

    fn ground(id: u32) -> RigidBody {
        body(id, 0.0, Shape::ground_y0(), DVec3::ZERO)
    }

    #[test]
    fn overlapping_spheres_produce_a_b_to_a_normal() {
        let a = sphere(0, 1.0, DVec3::ZERO);
        let b = sphere(1, 1.0, DVec3::new(1.5, 0.0, 0.0));

        let m = sphere_sphere(&a, &b).expect("overlapping spheres should collide");
        assert_eq!(m.a, BodyId(0));
        assert_eq!(m.b, BodyId(1));
        // b sits at +x, so b→a points along -x
        assert!((m.normal - DVec3::NEG_X).length() < 1e-12, "normal was {}", m.normal);
        assert!((m.normal.length() - 1.0).abs() < 1e-9);
        assert!((m.penetration - 0.5).abs() < 1e-12);
    }

    #[test]
    fn separated_spheres_do_not_collide() {
        let a = sphere(0, 1.0, DVec3::ZERO);
        let b = sphere(1, 1.0, DVec3::new(3.0, 0.0, 0.0));
        assert!(sphere_sphere(&a, &b).is_none());
    }

    #[test]
    fn concentric_spheres_fall_back_to_x_normal() {
        let a = sphere(0, 1.0, DVec3::ZERO);
        let b = sphere(1, 0.5, DVec3::ZERO);

        let m = sphere_sphere(&a, &b).expect("concentric spheres overlap");
        assert_eq!(m.normal, DVec3::X);
        assert!((m.penetration - 1.5).abs() < 1e-12);
    }

    #[test]
    fn resting_sphere_on_plane_emits_no_manifold() {
        // 0.5 mm of penetration: below the resting slop, soft contact's job
        let ball = sphere(0, 0.25, DVec3::new(0.0, 0.2495, 0.0));
        let plane = ground(1);
        assert!(sphere_plane(&ball, &plane).is_none());
    }

    #[test]
    fn penetrating_sphere_on_plane_keeps_caller_order() {
        let ball = sphere(0, 0.25, DVec3::new(0.0, 0.2, 0.0));
        let plane = ground(1);

        let m = sphere_plane(&ball, &plane).expect("deep penetration should collide");
        assert_eq!((m.a, m.b), (BodyId(0), BodyId(1)));
        assert_eq!(m.normal, DVec3::Y);
        assert!((m.penetration - 0.05).abs() < 1e-12);

        // swapped call: same pair order as given, flipped normal
        let m = sphere_plane(&plane, &ball).expect("order must not matter");
        assert_eq!((m.a, m.b), (BodyId(1), BodyId(0)));
        assert_eq!(m.normal, DVec3::NEG_Y);
        assert!((m.penetration - 0.05).abs() < 1e-12);
    }

    #[test]
    fn sphere_touching_box_face_gets_face_normal() {
        let box_body = cuboid(1, DVec3::splat(0.5), DVec3::ZERO);
        let ball = sphere(0, 0.3, DVec3::new(0.7, 0.0, 0.0));

        let m = sphere_box(&ball, &box_body).expect("sphere overlaps the +x face");
        assert_eq!((m.a, m.b), (BodyId(0), BodyId(1)));
        assert_eq!(m.normal, DVec3::X);
        assert!((m.penetration - 0.1).abs() < 1e-12);
    }

    #[test]
    fn sphere_center_inside_box_picks_nearest_face() {
        let box_body = cuboid(1, DVec3::splat(0.5), DVec3::ZERO);
        // nearest face is +y (0.1 away), every other face is farther
        let ball = sphere(0, 0.25, DVec3::new(0.1, 0.4, -0.2));

        let m = sphere_box(&ball, &box_body).expect("center inside always collides");
        assert_eq!(m.normal, DVec3::NEG_Y);
        assert!((m.penetration - (0.25 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn sphere_center_inside_box_ties_favor_x() {
        let box_body = cuboid(1, DVec3::splat(0.5), DVec3::ZERO);
        // dead center: all six faces are equally near, x-min wins
        let ball = sphere(0, 0.25, DVec3::ZERO);

        let m = sphere_box(&ball, &box_body).expect("center inside always collides");
        assert_eq!(m.normal, DVec3::X);
        assert!((m.penetration - 0.75).abs() < 1e-12);
    }

    #[test]
    fn separated_sphere_and_box_do_not_collide() {
        let box_body = cuboid(1, DVec3::splat(0.5), DVec3::ZERO);
        let ball = sphere(0, 0.3, DVec3::new(2.0, 0.0, 0.0));
        assert!(sphere_box(&ball, &box_body).is_none());
    }

    #[test]
    fn box_resting_through_plane_projects_half_extents() {
        let box_body = cuboid(0, DVec3::new(0.3, 0.2, 0.25), DVec3::new(0.0, 0.1, 0.0));
        let plane = ground(1);

        let m = box_plane(&box_body, &plane).expect("box dips under the plane");
        assert_eq!((m.a, m.b), (BodyId(0), BodyId(1)));
        assert_eq!(m.normal, DVec3::Y);
        // r = 0.2 along +y, center at 0.1 → penetration 0.1
        assert!((m.penetration - 0.1).abs() < 1e-12);
    }

    #[test]
    fn box_above_plane_does_not_collide() {
        let box_body = cuboid(0, DVec3::splat(0.25), DVec3::new(0.0, 1.0, 0.0));
        assert!(box_plane(&box_body, &ground(1)).is_none());
    }

    #[test]
    fn box_box_picks_minimum_overlap_axis() {
        let a = cuboid(0, DVec3::splat(0.5), DVec3::ZERO);
        // y overlap (0.2) is smaller than x (0.6) and z (1.0)
        let b = cuboid(1, DVec3::splat(0.5), DVec3::new(0.4, 0.8, 0.0));

        let m = box_box(&a, &b).expect("boxes overlap");
        // b is above a, so b→a points down
        assert_eq!(m.normal, DVec3::NEG_Y);
        assert!((m.penetration - 0.2).abs() < 1e-12);
    }

    #[test]
    fn box_box_equal_overlaps_resolve_to_x() {
        let a = cuboid(0, DVec3::splat(0.5), DVec3::ZERO);
        let b = cuboid(1, DVec3::splat(0.5), DVec3::new(0.5, 0.5, 0.5));

        let m = box_box(&a, &b).expect("boxes overlap");
        assert_eq!(m.normal, DVec3::NEG_X);
        assert!((m.penetration - 0.5).abs() < 1e-12);
    }

    #[test]
    fn coincident_boxes_take_the_positive_axis() {
        let a = cuboid(0, DVec3::splat(0.5), DVec3::ZERO);
        let b = cuboid(1, DVec3::splat(0.4), DVec3::ZERO);

        let m = box_box(&a, &b).expect("coincident boxes overlap");
        assert_eq!(m.normal, DVec3::X);
        assert!((m.penetration - 0.9).abs() < 1e-12);
    }

    #[test]
    fn separated_boxes_do_not_collide() {
        let a = cuboid(0, DVec3::splat(0.5), DVec3::ZERO);
        let b = cuboid(1, DVec3::splat(0.5), DVec3::new(1.1, 0.0, 0.0));
        assert!(box_box(&a, &b).is_none());
    }

    #[test]
    fn dispatch_covers_swapped_argument_orders() {
        let plane = ground(0);
        let box_body = cuboid(1, DVec3::new(0.3, 0.2, 0.25), DVec3::new(0.0, 0.1, 0.0));

        // (plane, box) resolves to a (box, plane) manifold
        let m = collide(&plane, &box_body).expect("box is under the plane surface");
        assert_eq!((m.a, m.b), (BodyId(1), BodyId(0)));
        assert_eq!(m.normal, DVec3::Y);

        let ball = sphere(2, 0.3, DVec3::new(0.5, 0.1, 0.0));
        let m = collide(&box_body, &ball).expect("sphere overlaps the box");
        assert_eq!((m.a, m.b), (BodyId(2), BodyId(1)), "manifold must be (sphere, box)");

        assert!(collide(&plane, &ground(3)).is_none(), "plane–plane never collides");
    }

    #[test]
    fn every_manifold_normal_is_unit_length() {
        let bodies = [
            sphere(0, 0.4, DVec3::new(0.1, 0.3, -0.1)),
            sphere(1, 0.3, DVec3::new(0.4, 0.25, 0.1)),
            cuboid(2, DVec3::splat(0.3), DVec3::new(0.0, 0.25, 0.0)),
            ground(3),
        ];

        for a in &bodies {
            for b in &bodies {
                if a.id() == b.id() {
                    continue;
                }
                if let Some(m) = collide(a, b) {
                    assert!(
                        (m.normal.length() - 1.0).abs() < 1e-9,
                        "non-unit normal {} for pair ({:?}, {:?})",
                        m.normal,
                        a.id(),
                        b.id()
                    );
                    assert!(m.penetration > 0.0);
                }
            }
        }
    }
}
