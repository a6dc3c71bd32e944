use glam::DVec3;
use impulse3d::World;

#[test]
fn box_falls_and_rests_on_ground() {
    let mut world = World::new();
    world.set_fixed_time_step(1.0 / 120.0);
    world.set_substeps(4);

    let (hx, hy, hz) = (0.3, 0.2, 0.25);
    world.add_body(World::static_plane(DVec3::Y, 0.0));
    let cube = world.add_body(World::dynamic_box(
        DVec3::new(0.0, 2.0, 0.0),
        DVec3::new(hx, hy, hz),
        2.0,
    ));
    world.body_mut(cube).expect("box exists").set_restitution(0.3);

    let render_dt = 1.0 / 60.0;
    let mut min_y = f64::INFINITY;
    let mut max_penetration: f64 = 0.0;
    for _ in 0..(5.0 / render_dt) as usize {
        world.update(render_dt);
        // the box bottom face should stay at the plane, center at y = hy
        let y = world.body(cube).expect("box exists").position().y;
        min_y = min_y.min(y);
        max_penetration = max_penetration.max(hy - y);
    }

    let final_y = world.body(cube).expect("box exists").position().y;
    assert!(final_y >= hy - 1e-3, "box sank into the ground: final y = {final_y}");
    assert!(max_penetration < 2e-3, "max penetration too high: {max_penetration}");
}
