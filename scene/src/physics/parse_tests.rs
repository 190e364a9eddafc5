use super::*;
use crate::physics::desc::{Axis, JointFamily, ShapeGeometry, SpherePoint};
use crate::prim::AttrValue;
use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};

// ========================================================================
// Helpers
// ========================================================================

fn path(s: &str) -> ScenePath {
    ScenePath::parse(s).unwrap()
}

/// Captured report calls.
#[derive(Default)]
struct Reports {
    calls: Vec<(ObjectType, Vec<ScenePath>, Vec<ObjectDesc>)>,
}

impl Reports {
    fn types(&self) -> Vec<ObjectType> {
        self.calls.iter().map(|(t, _, _)| *t).collect()
    }

    fn paths(&self, object_type: ObjectType) -> Vec<String> {
        self.calls
            .iter()
            .filter(|(t, _, _)| *t == object_type)
            .flat_map(|(_, paths, _)| paths.iter().map(|p| p.to_string()))
            .collect()
    }

    fn desc(&self, object_type: ObjectType, prim: &str) -> &ObjectDesc {
        self.calls
            .iter()
            .filter(|(t, _, _)| *t == object_type)
            .flat_map(|(_, _, descs)| descs.iter())
            .find(|d| d.prim_path.as_str() == prim)
            .unwrap()
    }
}

fn parse(stage: &Stage, include: &[&str], options: &ParseOptions) -> (Reports, ParseSummary) {
    let include: Vec<ScenePath> = include.iter().map(|p| path(p)).collect();
    let mut reports = Reports::default();
    let summary = load_physics_from_range(
        stage,
        &include,
        |object_type, paths: &[ScenePath], descs: &[ObjectDesc], _: &()| {
            reports.calls.push((object_type, paths.to_vec(), descs.to_vec()));
        },
        &(),
        options,
    )
    .unwrap();
    (reports, summary)
}

/// /World
///   PhysicsScene
///   Ground (Plane, collider)
///   Box (Cube, rigid body + collider)
///     Cap (Capsule, collider)
///   Ball (Sphere, rigid body + collider, owned by /World/PhysicsScene)
///   Hinge (revolute joint Box <-> Ball)
///   Steel (material)
fn physics_stage() -> Stage {
    let mut stage = Stage::new();
    stage.define("/World", Some("Xform")).unwrap();

    let scene = stage.define("/World/PhysicsScene", Some("PhysicsScene")).unwrap();
    let prim = stage.prim_mut(scene).unwrap();
    prim.set_attribute("physics:gravityDirection", AttrValue::Float3([0.0, -1.0, 0.0]));
    prim.set_attribute("physics:gravityMagnitude", AttrValue::Float(9.81));

    let ground = stage.define("/World/Ground", Some("Plane")).unwrap();
    let prim = stage.prim_mut(ground).unwrap();
    prim.apply_api("PhysicsCollisionAPI");
    prim.set_attribute("axis", AttrValue::Token("Y".to_string()));

    let cube = stage.define("/World/Box", Some("Cube")).unwrap();
    let prim = stage.prim_mut(cube).unwrap();
    prim.apply_api("PhysicsRigidBodyAPI");
    prim.apply_api("PhysicsCollisionAPI");
    prim.set_attribute("size", AttrValue::Float(4.0));
    prim.set_targets("material:binding:physics", vec![path("/World/Steel")]);

    let cap = stage.define("/World/Box/Cap", Some("Capsule")).unwrap();
    stage.prim_mut(cap).unwrap().apply_api("PhysicsCollisionAPI");

    let ball = stage.define("/World/Ball", Some("Sphere")).unwrap();
    let prim = stage.prim_mut(ball).unwrap();
    prim.apply_api("PhysicsRigidBodyAPI");
    prim.apply_api("PhysicsCollisionAPI");
    prim.set_attribute("radius", AttrValue::Float(0.25));
    prim.set_attribute("physics:kinematicEnabled", AttrValue::Bool(true));
    prim.set_targets("physics:simulationOwner", vec![path("/World/PhysicsScene")]);

    let hinge = stage.define("/World/Hinge", Some("PhysicsRevoluteJoint")).unwrap();
    let prim = stage.prim_mut(hinge).unwrap();
    prim.set_targets("physics:body0", vec![path("/World/Box")]);
    prim.set_targets("physics:body1", vec![path("/World/Ball")]);
    prim.set_attribute("physics:axis", AttrValue::Token("Z".to_string()));

    let steel = stage.define("/World/Steel", Some("Material")).unwrap();
    let prim = stage.prim_mut(steel).unwrap();
    prim.apply_api("PhysicsMaterialAPI");
    prim.set_attribute("physics:staticFriction", AttrValue::Float(0.7));

    stage
}

// ========================================================================
// Collection and Reporting
// ========================================================================

#[test]
fn test_reports_grouped_by_type_in_order() {
    let stage = physics_stage();
    let (reports, summary) = parse(&stage, &["/World"], &ParseOptions::default());

    assert_eq!(
        reports.types(),
        vec![
            ObjectType::Scene,
            ObjectType::RigidBody,
            ObjectType::SphereShape,
            ObjectType::CubeShape,
            ObjectType::CapsuleShape,
            ObjectType::PlaneShape,
            ObjectType::RevoluteJoint,
            ObjectType::RigidBodyMaterial,
        ]
    );
    assert_eq!(summary.visited, 8);
    assert_eq!(summary.groups, 8);
    assert_eq!(summary.reported, 9);
    assert_eq!(reports.paths(ObjectType::RigidBody), vec!["/World/Box", "/World/Ball"]);
}

#[test]
fn test_paths_match_descriptors() {
    let stage = physics_stage();
    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());

    for (_, paths, descs) in &reports.calls {
        assert_eq!(paths.len(), descs.len());
        for (path, desc) in paths.iter().zip(descs) {
            assert_eq!(path, &desc.prim_path);
        }
    }
}

#[test]
fn test_descriptor_fields() {
    let stage = physics_stage();
    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());

    match &reports.desc(ObjectType::Scene, "/World/PhysicsScene").kind {
        ObjectKind::Scene(scene) => {
            assert_eq!(scene.gravity_direction, cgmath::Vector3::new(0.0, -1.0, 0.0));
            assert_eq!(scene.gravity_magnitude, 9.81);
        }
        other => panic!("unexpected {:?}", other),
    }

    match &reports.desc(ObjectType::CubeShape, "/World/Box").kind {
        ObjectKind::Shape(shape) => {
            assert_eq!(
                shape.geometry,
                ShapeGeometry::Cube {
                    half_extents: cgmath::Vector3::new(2.0, 2.0, 2.0)
                }
            );
            assert_eq!(shape.materials, vec![path("/World/Steel")]);
        }
        other => panic!("unexpected {:?}", other),
    }

    match &reports.desc(ObjectType::PlaneShape, "/World/Ground").kind {
        ObjectKind::Shape(shape) => {
            assert_eq!(shape.geometry, ShapeGeometry::Plane { axis: Axis::Y });
            assert_eq!(shape.rigid_body, None);
        }
        other => panic!("unexpected {:?}", other),
    }

    match &reports.desc(ObjectType::RevoluteJoint, "/World/Hinge").kind {
        ObjectKind::Joint(joint) => {
            assert_eq!(joint.body0, Some(path("/World/Box")));
            assert_eq!(joint.body1, Some(path("/World/Ball")));
            assert_eq!(joint.family.axis(), Some(Axis::Z));
            assert!(joint.joint_enabled);
            assert!(joint.break_force.is_infinite());
        }
        other => panic!("unexpected {:?}", other),
    }

    match &reports.desc(ObjectType::RigidBodyMaterial, "/World/Steel").kind {
        ObjectKind::RigidBodyMaterial(material) => {
            assert_eq!(material.static_friction, 0.7);
            assert_eq!(material.dynamic_friction, 0.0);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_shapes_linked_to_nearest_body() {
    let stage = physics_stage();
    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());

    match &reports.desc(ObjectType::CapsuleShape, "/World/Box/Cap").kind {
        ObjectKind::Shape(shape) => assert_eq!(shape.rigid_body, Some(path("/World/Box"))),
        other => panic!("unexpected {:?}", other),
    }
    match &reports.desc(ObjectType::RigidBody, "/World/Box").kind {
        ObjectKind::RigidBody(body) => {
            assert_eq!(body.collisions, vec![path("/World/Box"), path("/World/Box/Cap")]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

fn vec_close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a - b).magnitude() < 1e-4
}

#[test]
fn test_body_world_pose_and_shape_local_pose() {
    let mut stage = Stage::new();
    let world = stage.define("/World", Some("Xform")).unwrap();
    stage
        .prim_mut(world)
        .unwrap()
        .set_attribute("xformOp:translate", AttrValue::Float3([0.0, 5.0, 0.0]));

    let turn = Quaternion::from_angle_z(Deg(90.0));
    let body = stage.define("/World/Body", Some("Xform")).unwrap();
    let prim = stage.prim_mut(body).unwrap();
    prim.apply_api("PhysicsRigidBodyAPI");
    prim.set_attribute("xformOp:translate", AttrValue::Float3([1.0, 0.0, 0.0]));
    prim.set_attribute("xformOp:orient", AttrValue::Float4([turn.s, turn.v.x, turn.v.y, turn.v.z]));
    prim.set_attribute("physics:velocity", AttrValue::Float3([0.0, 0.0, 3.0]));

    let collider = stage.define("/World/Body/Collider", Some("Sphere")).unwrap();
    let prim = stage.prim_mut(collider).unwrap();
    prim.apply_api("PhysicsCollisionAPI");
    prim.set_attribute("xformOp:translate", AttrValue::Float3([0.0, 2.0, 0.0]));
    prim.set_attribute("xformOp:scale", AttrValue::Float3([2.0, 2.0, 2.0]));

    let ground = stage.define("/World/Ground", Some("Plane")).unwrap();
    stage.prim_mut(ground).unwrap().apply_api("PhysicsCollisionAPI");

    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());

    match &reports.desc(ObjectType::RigidBody, "/World/Body").kind {
        ObjectKind::RigidBody(body) => {
            assert!(vec_close(body.position, Vector3::new(1.0, 5.0, 0.0)));
            assert!(body.rotation.dot(turn).abs() > 1.0 - 1e-4);
            assert!(vec_close(body.scale, Vector3::new(1.0, 1.0, 1.0)));
            assert_eq!(body.linear_velocity, Vector3::new(0.0, 0.0, 3.0));
        }
        other => panic!("unexpected {:?}", other),
    }
    match &reports.desc(ObjectType::SphereShape, "/World/Body/Collider").kind {
        ObjectKind::Shape(shape) => {
            assert!(vec_close(shape.local_pos, Vector3::new(0.0, 2.0, 0.0)));
            assert!(vec_close(shape.local_scale, Vector3::new(2.0, 2.0, 2.0)));
            assert!(shape.local_rot.dot(Quaternion::new(1.0, 0.0, 0.0, 0.0)).abs() > 1.0 - 1e-4);
        }
        other => panic!("unexpected {:?}", other),
    }
    // Static colliders carry their world pose
    match &reports.desc(ObjectType::PlaneShape, "/World/Ground").kind {
        ObjectKind::Shape(shape) => {
            assert_eq!(shape.rigid_body, None);
            assert!(vec_close(shape.local_pos, Vector3::new(0.0, 5.0, 0.0)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_sphere_points_collider() {
    let mut stage = Stage::new();
    let cloud = stage.define("/Cloud", Some("Points")).unwrap();
    let prim = stage.prim_mut(cloud).unwrap();
    prim.apply_api("PhysicsRigidBodyAPI");
    prim.apply_api("PhysicsCollisionAPI");
    prim.set_attribute("points", AttrValue::Float3Array(vec![[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]]));
    prim.set_attribute("widths", AttrValue::FloatArray(vec![0.5]));

    let (reports, _) = parse(&stage, &["/Cloud"], &ParseOptions::default());

    assert_eq!(
        reports.types(),
        vec![ObjectType::RigidBody, ObjectType::SpherePointsShape]
    );
    match &reports.desc(ObjectType::SpherePointsShape, "/Cloud").kind {
        ObjectKind::Shape(shape) => {
            assert_eq!(shape.rigid_body, Some(path("/Cloud")));
            assert_eq!(
                shape.geometry,
                ShapeGeometry::SpherePoints {
                    points: vec![
                        SpherePoint {
                            center: Vector3::new(0.0, 1.0, 0.0),
                            radius: 0.25
                        },
                        SpherePoint {
                            center: Vector3::new(0.0, -1.0, 0.0),
                            radius: 0.25
                        },
                    ]
                }
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_user_data_passed_through() {
    let stage = physics_stage();
    let include = [path("/World")];
    let context = String::from("ctx");
    let mut seen = Vec::new();

    load_physics_from_range(
        &stage,
        &include,
        |_, _: &[ScenePath], _: &[ObjectDesc], data: &str| seen.push(data.to_string()),
        context.as_str(),
        &ParseOptions::default(),
    )
    .unwrap();

    assert!(!seen.is_empty());
    assert!(seen.iter().all(|s| s == "ctx"));
}

#[test]
fn test_no_physics_reports_nothing() {
    let mut stage = Stage::new();
    stage.define("/Empty/Child", Some("Xform")).unwrap();
    let (reports, summary) = parse(&stage, &["/Empty"], &ParseOptions::default());

    assert!(reports.calls.is_empty());
    assert_eq!(summary.visited, 2);
    assert_eq!(summary.groups, 0);
}

#[test]
fn test_empty_stage_from_root() {
    let stage = Stage::new();
    let (reports, summary) = parse(&stage, &["/"], &ParseOptions::default());

    assert!(reports.calls.is_empty());
    assert_eq!(summary.visited, 1);
    assert_eq!(summary.reported, 0);
}

// ========================================================================
// Traversal Configuration
// ========================================================================

#[test]
fn test_exclude_paths_prune_subtrees() {
    let stage = physics_stage();
    let options = ParseOptions {
        exclude_paths: vec![path("/World/Box"), path("/World/Steel")],
        ..Default::default()
    };
    let (reports, summary) = parse(&stage, &["/World"], &options);

    assert_eq!(summary.visited, 5);
    assert!(reports.paths(ObjectType::CubeShape).is_empty());
    assert!(reports.paths(ObjectType::CapsuleShape).is_empty());
    assert!(reports.paths(ObjectType::RigidBodyMaterial).is_empty());
    assert_eq!(reports.paths(ObjectType::RigidBody), vec!["/World/Ball"]);
}

#[test]
fn test_multiple_roots_single_pass() {
    let stage = physics_stage();
    let (reports, summary) = parse(&stage, &["/World/Hinge", "/World/Ball"], &ParseOptions::default());

    assert_eq!(summary.visited, 2);
    assert_eq!(
        reports.types(),
        vec![ObjectType::RigidBody, ObjectType::SphereShape, ObjectType::RevoluteJoint]
    );
}

#[test]
fn test_multiple_roots_with_exclusions() {
    let stage = physics_stage();
    let options = ParseOptions {
        exclude_paths: vec![path("/World/Box/Cap")],
        ..Default::default()
    };
    let (reports, summary) = parse(&stage, &["/World/Box", "/World/Ground"], &options);

    assert_eq!(summary.visited, 2);
    assert_eq!(reports.paths(ObjectType::CubeShape), vec!["/World/Box"]);
    assert_eq!(reports.paths(ObjectType::PlaneShape), vec!["/World/Ground"]);
}

#[test]
fn test_nested_include_paths_visit_once() {
    let stage = physics_stage();
    let (_, nested) = parse(&stage, &["/World", "/World/Box"], &ParseOptions::default());
    let (_, single) = parse(&stage, &["/World"], &ParseOptions::default());

    assert_eq!(nested, single);
}

#[test]
fn test_inactive_subtree_skipped() {
    let mut stage = physics_stage();
    let id = stage.get_prim_id(&path("/World/Box")).unwrap();
    stage.prim_mut(id).unwrap().set_active(false);

    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());
    assert!(reports.paths(ObjectType::CapsuleShape).is_empty());

    // An inactive root contributes nothing
    let (reports, summary) = parse(&stage, &["/World/Box", "/World/Ground"], &ParseOptions::default());
    assert_eq!(summary.visited, 1);
    assert_eq!(reports.types(), vec![ObjectType::PlaneShape]);
}

#[test]
fn test_point_instancer_pruned() {
    let mut stage = physics_stage();
    stage.define("/World/Instancer", Some("PointInstancer")).unwrap();
    let proto = stage.define("/World/Instancer/Proto", Some("Sphere")).unwrap();
    stage.prim_mut(proto).unwrap().apply_api("PhysicsCollisionAPI");

    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());
    assert_eq!(reports.paths(ObjectType::SphereShape), vec!["/World/Ball"]);
}

#[test]
fn test_custom_tokens() {
    let mut stage = Stage::new();
    stage.define("/Rig/Blob", Some("BlobShape")).unwrap();
    stage.define("/Rig/Rope", Some("RopeJoint")).unwrap();
    stage.define("/Rig/Crowd", Some("CrowdInstancer")).unwrap();
    let hidden = stage.define("/Rig/Crowd/Member", Some("Sphere")).unwrap();
    stage.prim_mut(hidden).unwrap().apply_api("PhysicsCollisionAPI");

    let options = ParseOptions {
        custom_tokens: CustomPhysicsTokens {
            joint_tokens: vec!["RopeJoint".to_string()],
            shape_tokens: vec!["BlobShape".to_string()],
            instancer_tokens: vec!["CrowdInstancer".to_string()],
        },
        ..Default::default()
    };
    let (reports, _) = parse(&stage, &["/Rig"], &options);

    assert_eq!(reports.types(), vec![ObjectType::CustomShape, ObjectType::CustomJoint]);
    match &reports.desc(ObjectType::CustomJoint, "/Rig/Rope").kind {
        ObjectKind::Joint(joint) => assert_eq!(
            joint.family,
            JointFamily::Custom {
                token: "RopeJoint".to_string()
            }
        ),
        other => panic!("unexpected {:?}", other),
    }
}

// ========================================================================
// Simulation Owners
// ========================================================================

#[test]
fn test_simulation_owner_filter() {
    let stage = physics_stage();
    let options = ParseOptions {
        simulation_owners: Some(vec![path("/World/PhysicsScene")]),
        ..Default::default()
    };
    let (reports, _) = parse(&stage, &["/World"], &options);

    assert_eq!(reports.paths(ObjectType::Scene), vec!["/World/PhysicsScene"]);
    assert_eq!(reports.paths(ObjectType::RigidBody), vec!["/World/Ball"]);
    assert_eq!(reports.paths(ObjectType::SphereShape), vec!["/World/Ball"]);
    // Box is filtered out along with its shapes; the ground has no owner
    assert!(reports.paths(ObjectType::CubeShape).is_empty());
    assert!(reports.paths(ObjectType::CapsuleShape).is_empty());
    assert!(reports.paths(ObjectType::PlaneShape).is_empty());
    // The hinge still connects to a kept body
    assert_eq!(reports.paths(ObjectType::RevoluteJoint), vec!["/World/Hinge"]);
}

#[test]
fn test_simulation_owner_root_keeps_unowned() {
    let stage = physics_stage();
    let options = ParseOptions {
        simulation_owners: Some(vec![ScenePath::root()]),
        ..Default::default()
    };
    let (reports, _) = parse(&stage, &["/World"], &options);

    assert!(reports.paths(ObjectType::Scene).is_empty());
    assert_eq!(reports.paths(ObjectType::RigidBody), vec!["/World/Box"]);
    assert_eq!(reports.paths(ObjectType::PlaneShape), vec!["/World/Ground"]);
    assert_eq!(reports.paths(ObjectType::CapsuleShape), vec!["/World/Box/Cap"]);
    assert!(reports.paths(ObjectType::SphereShape).is_empty());
}

// ========================================================================
// Post-pass Linking
// ========================================================================

#[test]
fn test_collision_group_membership() {
    let mut stage = physics_stage();
    let group = stage.define("/World/Group", Some("PhysicsCollisionGroup")).unwrap();
    stage
        .prim_mut(group)
        .unwrap()
        .set_targets("collection:colliders:includes", vec![path("/World/Box")]);

    let (reports, _) = parse(&stage, &["/World"], &ParseOptions::default());

    for (object_type, prim, expected) in [
        (ObjectType::CubeShape, "/World/Box", vec![path("/World/Group")]),
        (ObjectType::CapsuleShape, "/World/Box/Cap", vec![path("/World/Group")]),
        (ObjectType::PlaneShape, "/World/Ground", vec![]),
    ] {
        match &reports.desc(object_type, prim).kind {
            ObjectKind::Shape(shape) => assert_eq!(shape.collision_groups, expected),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_joint_with_missing_body_is_invalid() {
    let mut stage = Stage::new();
    let joint = stage.define("/J", Some("PhysicsFixedJoint")).unwrap();
    stage
        .prim_mut(joint)
        .unwrap()
        .set_targets("physics:body0", vec![path("/Nowhere")]);

    let (reports, _) = parse(&stage, &["/J"], &ParseOptions::default());
    assert!(!reports.desc(ObjectType::FixedJoint, "/J").is_valid);
}

// ========================================================================
// Errors
// ========================================================================

#[test]
fn test_errors() {
    let stage = physics_stage();
    let report = |_: ObjectType, _: &[ScenePath], _: &[ObjectDesc], _: &()| {};

    let err = load_physics_from_range(&stage, &[], report, &(), &ParseOptions::default());
    assert!(matches!(err, Err(ParseError::NoIncludePaths)));

    let err = load_physics_from_range(
        &stage,
        &[path("/Missing")],
        report,
        &(),
        &ParseOptions::default(),
    );
    assert!(matches!(err, Err(ParseError::PrimNotFound(p)) if p == path("/Missing")));
}

#[test]
fn test_resolve_roots_drops_nested() {
    let stage = physics_stage();
    let roots = resolve_roots(
        &stage,
        &[path("/World/Box/Cap"), path("/World/Ground"), path("/World/Box")],
    )
    .unwrap();

    let keys: Vec<&str> = roots.keys().map(ScenePath::as_str).collect();
    assert_eq!(keys, vec!["/World/Box", "/World/Ground"]);
}

#[test]
fn test_build_cursors_strategy() {
    let stage = physics_stage();
    let one = resolve_roots(&stage, &[path("/World")]).unwrap();
    let two = resolve_roots(&stage, &[path("/World/Box"), path("/World/Ball")]).unwrap();

    let kinds = |cursors: Vec<TraversalCursor>| cursors.iter().map(|c| c.kind()).collect::<Vec<_>>();

    assert_eq!(kinds(build_cursors(&stage, &one, &[])), vec!["range"]);
    assert_eq!(kinds(build_cursors(&stage, &two, &[])), vec!["map-range"]);
    assert_eq!(
        kinds(build_cursors(&stage, &two, &[path("/World/Box/Cap")])),
        vec!["exclude-list", "exclude-list"]
    );
}
