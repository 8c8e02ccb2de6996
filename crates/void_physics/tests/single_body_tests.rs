//! Move, reset and synchronization behaviour of single-body models

use approx::assert_abs_diff_eq;
use void_entity::{EmbodiedEntity, SharedEntity};
use void_physics::prelude::*;

const EPS: f32 = 1e-5;

fn cube_collider() -> ColliderDesc {
    ColliderDesc::new(ColliderShape::cuboid(0.5, 0.5, 0.5))
}

fn zero_gravity() -> PhysicsConfig {
    PhysicsConfig::default().with_gravity(0.0, 0.0, 0.0)
}

fn spawn_cube(world: &mut PhysicsWorld, desc: RigidBodyDesc, position: Vec3, orientation: Quat) -> SingleBodyModel {
    let entity = EmbodiedEntity::new("cube", position, orientation).into_shared();
    spawn_with(world, entity, desc, &[cube_collider()])
}

fn spawn_with(
    world: &mut PhysicsWorld,
    entity: SharedEntity,
    desc: RigidBodyDesc,
    colliders: &[ColliderDesc],
) -> SingleBodyModel {
    let pose = entity.read().pose();
    let body = world.create_body(&desc.with_pose(pose), colliders).unwrap();
    SingleBodyModel::bind(world, entity, body).unwrap()
}

fn assert_vec_eq(a: Vec3, b: Vec3) {
    assert_abs_diff_eq!(a.x, b.x, epsilon = EPS);
    assert_abs_diff_eq!(a.y, b.y, epsilon = EPS);
    assert_abs_diff_eq!(a.z, b.z, epsilon = EPS);
}

fn body_pose(world: &PhysicsWorld, model: &SingleBodyModel) -> Pose {
    world.body_pose(model.body().handle()).unwrap()
}

#[test]
fn check_only_move_never_moves_the_body() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let tilt = Quat::from_rotation_y(0.3);
    let mut model = spawn_cube(&mut world, RigidBodyDesc::dynamic(), Vec3::new(0.0, 1.0, 0.0), tilt);
    let _wall = spawn_cube(
        &mut world,
        RigidBodyDesc::fixed(),
        Vec3::new(4.0, 1.0, 0.0),
        Quat::IDENTITY,
    );

    let before = body_pose(&world, &model);
    let anchor_before = model.entity().read().pose();

    let clear = model
        .move_to(&mut world, Vec3::new(-4.0, 1.0, 0.0), Quat::IDENTITY, true)
        .unwrap();
    assert_eq!(clear, MoveOutcome::CheckClear);
    assert!(clear.is_collision_free());
    assert_eq!(body_pose(&world, &model), before);

    let blocked = model
        .move_to(&mut world, Vec3::new(4.2, 1.0, 0.0), Quat::IDENTITY, true)
        .unwrap();
    assert_eq!(blocked, MoveOutcome::CheckBlocked);
    assert!(!blocked.is_collision_free());
    assert_eq!(body_pose(&world, &model), before);

    assert_eq!(model.entity().read().pose(), anchor_before);
    assert!(world.is_dynamic(model.body().handle()).unwrap());
}

#[test]
fn blocked_move_restores_exact_pose() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let start = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.7);
    let mut model = spawn_cube(&mut world, RigidBodyDesc::dynamic(), Vec3::new(0.1, 2.3, -0.7), start);
    let _wall = spawn_cube(
        &mut world,
        RigidBodyDesc::fixed(),
        Vec3::new(3.0, 2.0, 0.0),
        Quat::IDENTITY,
    );

    let before = body_pose(&world, &model);
    let bounds_before = *model.bounding_box();

    let outcome = model
        .move_to(&mut world, Vec3::new(3.3, 2.0, 0.0), Quat::from_rotation_z(1.0), false)
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Blocked);
    // Bit-exact, not approximately equal
    let after = body_pose(&world, &model);
    assert_eq!(after.position.to_array(), before.position.to_array());
    assert_eq!(after.orientation.to_array(), before.orientation.to_array());
    assert_eq!(*model.bounding_box(), bounds_before);

    // The rolled back body no longer overlaps anything
    assert!(!model.is_colliding_with_something(&world).unwrap());
}

#[test]
fn accepted_move_updates_body_and_anchor() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut model = spawn_cube(
        &mut world,
        RigidBodyDesc::dynamic(),
        Vec3::new(0.0, 1.0, 0.0),
        Quat::IDENTITY,
    );

    let target = Vec3::new(2.5, 1.5, -3.0);
    let orientation = Quat::from_rotation_y(1.2);
    let outcome = model.move_to(&mut world, target, orientation, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);

    let pose = body_pose(&world, &model);
    assert_vec_eq(pose.position, target);
    assert!(pose.orientation.same_rotation(orientation, EPS));

    let anchor = model.entity().read().pose();
    assert_vec_eq(anchor.position, target);
    assert!(anchor.orientation.same_rotation(orientation, EPS));

    assert_vec_eq(model.bounding_box().center(), target);
    assert!(world.is_dynamic(model.body().handle()).unwrap());
}

#[test]
fn static_body_is_immovable() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut model = spawn_cube(
        &mut world,
        RigidBodyDesc::fixed(),
        Vec3::new(0.0, 1.0, 0.0),
        Quat::IDENTITY,
    );
    assert!(!model.is_dynamic());

    let before = body_pose(&world, &model);
    for check_only in [false, true] {
        let outcome = model
            .move_to(&mut world, Vec3::new(5.0, 1.0, 0.0), Quat::IDENTITY, check_only)
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Immovable);
        assert!(!outcome.is_collision_free());
    }
    assert_eq!(body_pose(&world, &model), before);

    // Reset ignores the entity on static bodies
    model
        .entity()
        .write()
        .origin_anchor_mut()
        .set_pose(Pose::from_position(Vec3::new(9.0, 9.0, 9.0)));
    model.reset(&mut world).unwrap();
    assert_eq!(body_pose(&world, &model), before);
    assert_eq!(
        world.body_type(model.body().handle()).unwrap(),
        RigidBodyType::Static
    );
}

#[test]
fn reset_is_idempotent_and_clears_dynamics() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let start = Vec3::new(0.0, 3.0, 0.0);
    let mut model = spawn_cube(&mut world, RigidBodyDesc::dynamic(), start, Quat::IDENTITY);
    let handle = model.body().handle();

    world.add_force(handle, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    world.add_torque(handle, Vec3::new(0.0, 2.0, 0.0)).unwrap();
    for _ in 0..10 {
        world.step(1.0 / 60.0);
    }
    assert!(body_pose(&world, &model).position.distance(start) > 1e-3);

    model.reset(&mut world).unwrap();
    let first = body_pose(&world, &model);
    assert_eq!(world.body_forces(handle).unwrap(), (Vec3::ZERO, Vec3::ZERO));
    assert_eq!(world.linear_velocity(handle).unwrap(), Vec3::ZERO);
    assert_vec_eq(first.position, start);

    model.reset(&mut world).unwrap();
    let second = body_pose(&world, &model);
    assert_eq!(second, first);
    assert_eq!(world.body_forces(handle).unwrap(), (Vec3::ZERO, Vec3::ZERO));
    assert!(world.is_dynamic(handle).unwrap());
}

#[test]
fn own_shapes_never_block() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let entity = EmbodiedEntity::new("dumbbell", Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY).into_shared();
    // Overlapping shapes of the same body
    let mut model = spawn_with(
        &mut world,
        entity,
        RigidBodyDesc::dynamic(),
        &[
            cube_collider(),
            ColliderDesc::new(ColliderShape::sphere(0.6)).with_offset(0.5, 0.0, 0.0),
            ColliderDesc::new(ColliderShape::sphere(0.6)).with_offset(-0.5, 0.0, 0.0),
        ],
    );

    assert!(!model.is_colliding_with_something(&world).unwrap());

    let here = body_pose(&world, &model);
    let outcome = model
        .move_to(&mut world, here.position, here.orientation, false)
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);
}

#[test]
fn obstacle_scenario() {
    let mut world = PhysicsWorld::new(zero_gravity()).unwrap();
    let a = Vec3::new(0.0, 1.0, 0.0);
    let b = Vec3::new(3.0, 1.0, 0.0);
    let c = Vec3::new(-3.0, 1.0, 2.0);

    let mut model = spawn_cube(&mut world, RigidBodyDesc::dynamic(), a, Quat::IDENTITY);
    let _obstacle = spawn_cube(&mut world, RigidBodyDesc::dynamic(), b, Quat::IDENTITY);

    let outcome = model.move_to(&mut world, b, Quat::IDENTITY, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Blocked);
    assert_vec_eq(body_pose(&world, &model).position, a);
    assert_vec_eq(model.entity().read().pose().position, a);

    let outcome = model.move_to(&mut world, c, Quat::IDENTITY, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);
    assert_vec_eq(body_pose(&world, &model).position, c);

    // Clobber the anchor, then let a step write it back
    model
        .entity()
        .write()
        .origin_anchor_mut()
        .set_pose(Pose::IDENTITY);
    world.step(1.0 / 60.0);
    model.update_entity_status(&world).unwrap();
    assert_vec_eq(model.entity().read().pose().position, c);
}

#[test]
fn ground_is_static_and_ignored() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let ground = world.ground_body().unwrap();
    let ground_collider = world.ground_collider().unwrap();
    assert!(!world.is_dynamic(ground).unwrap());

    // Sunk slightly into the ground
    let mut model = spawn_cube(
        &mut world,
        RigidBodyDesc::dynamic(),
        Vec3::new(0.0, 0.45, 0.0),
        Quat::IDENTITY,
    );

    let hits = world
        .query()
        .overlapping(
            &ColliderShape::cuboid(0.5, 0.5, 0.5),
            &body_pose(&world, &model),
            QueryScope::STATIC,
            &IgnoreSet::new(),
        )
        .unwrap();
    assert!(hits.contains(&ground_collider));

    assert!(!model.is_colliding_with_something(&world).unwrap());
    let outcome = model
        .move_to(&mut world, Vec3::new(1.0, 0.3, 0.0), Quat::IDENTITY, false)
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);
}

#[test]
fn sensors_only_block_when_configured() {
    for (query_sensors, expected) in [(false, MoveOutcome::Accepted), (true, MoveOutcome::Blocked)] {
        let mut world = PhysicsWorld::new(zero_gravity().with_query_sensors(query_sensors)).unwrap();
        let trigger = world
            .create_body(
                &RigidBodyDesc::fixed().with_position(4.0, 1.0, 0.0),
                &[ColliderDesc::sensor(ColliderShape::sphere(1.0))],
            )
            .unwrap();
        let mut model = spawn_cube(
            &mut world,
            RigidBodyDesc::dynamic(),
            Vec3::new(0.0, 1.0, 0.0),
            Quat::IDENTITY,
        );

        let outcome = model
            .move_to(&mut world, Vec3::new(4.0, 1.0, 0.0), Quat::IDENTITY, false)
            .unwrap();
        assert_eq!(outcome, expected);
        drop(trigger);
    }
}

#[test]
fn simulation_syncs_anchor_each_step() {
    let mut sim = PhysicsSimulation::new(PhysicsConfig::default()).unwrap();
    let entity = EmbodiedEntity::new("ball", Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY).into_shared();
    let id = sim
        .spawn(
            entity.clone(),
            &RigidBodyDesc::dynamic(),
            &[ColliderDesc::new(ColliderShape::sphere(0.5))],
        )
        .unwrap();

    for _ in 0..30 {
        sim.step(1.0 / 60.0).unwrap();
        let body = sim.model(id).unwrap().body().handle();
        let engine = sim.world().body_pose(body).unwrap();
        assert_eq!(entity.read().pose(), engine);
    }
    assert!(entity.read().pose().position.y < 5.0);

    sim.reset_models().unwrap();
    assert_vec_eq(
        sim.world()
            .body_pose(sim.model(id).unwrap().body().handle())
            .unwrap()
            .position,
        entity.read().pose().position,
    );
}

#[test]
fn degenerate_target_is_rejected_untouched() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut model = spawn_cube(
        &mut world,
        RigidBodyDesc::dynamic(),
        Vec3::new(0.0, 1.0, 0.0),
        Quat::from_rotation_y(0.4),
    );
    let before = body_pose(&world, &model);
    let anchor_before = model.entity().read().pose();
    let bounds_before = *model.bounding_box();

    let targets = [
        (Vec3::new(3.0, 1.0, 0.0), Quat::new(0.0, 0.0, 0.0, 0.0)),
        (Vec3::new(f32::NAN, 1.0, 0.0), Quat::IDENTITY),
        (Vec3::new(0.0, f32::INFINITY, 0.0), Quat::IDENTITY),
        (Vec3::new(3.0, 1.0, 0.0), Quat::new(f32::NAN, 0.0, 0.0, 1.0)),
    ];
    for (position, orientation) in targets {
        for check_only in [false, true] {
            let result = model.move_to(&mut world, position, orientation, check_only);
            assert!(matches!(result, Err(PhysicsError::InvalidPose(_))));

            let after = body_pose(&world, &model);
            assert_eq!(after.position.to_array(), before.position.to_array());
            assert_eq!(after.orientation.to_array(), before.orientation.to_array());
            assert_eq!(model.entity().read().pose(), anchor_before);
            assert_eq!(*model.bounding_box(), bounds_before);
            assert!(world.is_dynamic(model.body().handle()).unwrap());
        }
    }

    // Still movable afterwards
    let outcome = model
        .move_to(&mut world, Vec3::new(3.0, 1.0, 0.0), Quat::IDENTITY, false)
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);
}

#[test]
fn reset_rejects_degenerate_entity_pose() {
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut model = spawn_cube(
        &mut world,
        RigidBodyDesc::dynamic(),
        Vec3::new(0.0, 1.0, 0.0),
        Quat::IDENTITY,
    );
    let before = body_pose(&world, &model);

    model
        .entity()
        .write()
        .origin_anchor_mut()
        .set_pose(Pose::new(Vec3::new(2.0, 1.0, 0.0), Quat::new(0.0, 0.0, 0.0, 0.0)));

    assert!(matches!(
        model.reset(&mut world),
        Err(PhysicsError::InvalidPose(_))
    ));
    assert_eq!(body_pose(&world, &model), before);
    assert!(world.is_dynamic(model.body().handle()).unwrap());
}

#[test]
fn query_index_follows_only_kept_moves() {
    let mut world = PhysicsWorld::new(zero_gravity()).unwrap();
    let start = Vec3::new(0.0, 1.0, 0.0);
    let target = Vec3::new(6.0, 1.0, 0.0);
    let mut model = spawn_cube(&mut world, RigidBodyDesc::dynamic(), start, Quat::IDENTITY);
    let own = world.body_colliders(model.body().handle()).unwrap()[0];

    let found_at = |world: &PhysicsWorld, at: Vec3| {
        world
            .query()
            .overlapping(
                &ColliderShape::sphere(0.2),
                &Pose::from_position(at),
                QueryScope::SOLID,
                &IgnoreSet::new(),
            )
            .unwrap()
            .contains(&own)
    };
    assert!(found_at(&world, start));

    let outcome = model.move_to(&mut world, target, Quat::IDENTITY, true).unwrap();
    assert_eq!(outcome, MoveOutcome::CheckClear);
    assert!(found_at(&world, start));
    assert!(!found_at(&world, target));

    let outcome = model.move_to(&mut world, target, Quat::IDENTITY, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);
    assert!(found_at(&world, target));
    assert!(!found_at(&world, start));

    // A second model now sees the moved body where it stands
    let mut other = spawn_cube(
        &mut world,
        RigidBodyDesc::dynamic(),
        Vec3::new(0.0, 1.0, 3.0),
        Quat::IDENTITY,
    );
    let outcome = other.move_to(&mut world, target, Quat::IDENTITY, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Blocked);
    let outcome = other.move_to(&mut world, start, Quat::IDENTITY, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Accepted);
}

#[test]
fn set_pose_is_visible_to_queries() {
    let mut world = PhysicsWorld::new(zero_gravity()).unwrap();
    let model = spawn_cube(
        &mut world,
        RigidBodyDesc::dynamic(),
        Vec3::new(0.0, 1.0, 0.0),
        Quat::IDENTITY,
    );
    let own = world.body_colliders(model.body().handle()).unwrap()[0];
    let target = Pose::from_position(Vec3::new(-5.0, 2.0, 1.0));

    world.set_body_pose(model.body().handle(), &target).unwrap();
    let hits = world
        .query()
        .overlapping(&ColliderShape::sphere(0.2), &target, QueryScope::SOLID, &IgnoreSet::new())
        .unwrap();
    assert_eq!(hits, vec![own]);
}
