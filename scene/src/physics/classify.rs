//! Per-prim classification into physics descriptors.
//!
//! [`PhysicsClassifier`] is the [`PrimVisitor`] handed to the cursor walk.
//! It decides, from a prim's type name and applied schemas, which
//! descriptors the prim contributes and whether the walk should descend.

use cgmath::Vector3;

use crate::path::ScenePath;
use crate::prim::Prim;
use crate::tree::PrimVisitor;

use super::desc::{
    ArticulationDesc, Axis, CollisionGroupDesc, JointDesc, JointDof, JointDrive, JointFamily,
    JointLimit, ObjectDesc, ObjectKind, RigidBodyDesc, RigidBodyMaterialDesc, SceneDesc,
    ShapeDesc, ShapeGeometry, SpherePoint,
};
use super::tokens::{self, match_token, CustomPhysicsTokens};

/// Collects descriptors for every prim the walk reaches.
pub struct PhysicsClassifier<'t> {
    custom_tokens: &'t CustomPhysicsTokens,
    descs: Vec<ObjectDesc>,
    pruned_instancers: usize,
}

impl<'t> PhysicsClassifier<'t> {
    pub fn new(custom_tokens: &'t CustomPhysicsTokens) -> Self {
        Self {
            custom_tokens,
            descs: Vec::new(),
            pruned_instancers: 0,
        }
    }

    pub fn pruned_instancers(&self) -> usize {
        self.pruned_instancers
    }

    pub fn descs(&self) -> &[ObjectDesc] {
        &self.descs
    }

    pub fn into_descs(self) -> Vec<ObjectDesc> {
        self.descs
    }

    fn is_instancer(&self, prim: &Prim) -> bool {
        prim.is_a(tokens::POINT_INSTANCER)
            || match_token(prim, &self.custom_tokens.instancer_tokens).is_some()
    }

    fn push(&mut self, prim: &Prim, kind: ObjectKind) {
        self.descs.push(ObjectDesc::new(prim.path().clone(), kind));
    }
}

impl PrimVisitor for PhysicsClassifier<'_> {
    fn enter_prim(&mut self, prim: &Prim) -> bool {
        if self.is_instancer(prim) {
            log::debug!("Skipping instancer subtree {}", prim.path());
            self.pruned_instancers += 1;
            return false;
        }

        if prim.is_a(tokens::PHYSICS_SCENE) {
            self.push(prim, ObjectKind::Scene(parse_scene(prim)));
        }
        if prim.is_a(tokens::COLLISION_GROUP) {
            self.push(prim, ObjectKind::CollisionGroup(parse_collision_group(prim)));
        }
        if let Some(joint) = parse_joint(prim, self.custom_tokens) {
            self.push(prim, ObjectKind::Joint(joint));
        }
        if prim.has_api(tokens::RIGID_BODY_API) {
            self.push(prim, ObjectKind::RigidBody(parse_rigid_body(prim)));
        }
        if let Some(shape) = parse_shape(prim, self.custom_tokens) {
            self.push(prim, ObjectKind::Shape(shape));
        }
        if prim.has_api(tokens::MATERIAL_API) {
            self.push(prim, ObjectKind::RigidBodyMaterial(parse_material(prim)));
        }
        if prim.has_api(tokens::ARTICULATION_ROOT_API) {
            self.push(prim, ObjectKind::Articulation(parse_articulation(prim)));
        }

        true
    }
}

// ============================================================================
// Descriptor Parsing
// ============================================================================

fn targets(prim: &Prim, name: &str) -> Vec<ScenePath> {
    prim.targets(name).to_vec()
}

fn single_target(prim: &Prim, name: &str) -> Option<ScenePath> {
    let targets = prim.targets(name);
    if targets.len() > 1 {
        log::warn!(
            "{} on {} has {} targets, using the first",
            name,
            prim.path(),
            targets.len()
        );
    }
    targets.first().cloned()
}

fn filtered_pairs(prim: &Prim) -> Vec<ScenePath> {
    if prim.has_api(tokens::FILTERED_PAIRS_API) {
        targets(prim, tokens::FILTERED_PAIRS)
    } else {
        Vec::new()
    }
}

fn axis_attr(prim: &Prim, name: &str, default: Axis) -> Axis {
    match prim.get_token(name) {
        Some(token) => Axis::from_token(token).unwrap_or_else(|| {
            log::warn!("Invalid axis '{}' on {}, using {:?}", token, prim.path(), default);
            default
        }),
        None => default,
    }
}

pub(crate) fn parse_scene(prim: &Prim) -> SceneDesc {
    let defaults = SceneDesc::default();
    SceneDesc {
        gravity_direction: prim
            .get_vec3(tokens::GRAVITY_DIRECTION)
            .unwrap_or(defaults.gravity_direction),
        gravity_magnitude: prim
            .get_float(tokens::GRAVITY_MAGNITUDE)
            .unwrap_or(defaults.gravity_magnitude),
    }
}

pub(crate) fn parse_collision_group(prim: &Prim) -> CollisionGroupDesc {
    CollisionGroupDesc {
        filtered_groups: targets(prim, tokens::FILTERED_GROUPS),
        invert_filtered_groups: prim.get_bool(tokens::INVERT_FILTERED_GROUPS).unwrap_or(false),
        merge_group_name: prim.get_token(tokens::MERGE_GROUP).map(str::to_string),
        includes: targets(prim, tokens::COLLIDERS_INCLUDES),
    }
}

pub(crate) fn parse_rigid_body(prim: &Prim) -> RigidBodyDesc {
    RigidBodyDesc {
        rigid_body_enabled: prim.get_bool(tokens::RIGID_BODY_ENABLED).unwrap_or(true),
        kinematic_body: prim.get_bool(tokens::KINEMATIC_ENABLED).unwrap_or(false),
        starts_asleep: prim.get_bool(tokens::STARTS_ASLEEP).unwrap_or(false),
        simulation_owners: targets(prim, tokens::SIMULATION_OWNER),
        filtered_collisions: filtered_pairs(prim),
        linear_velocity: prim.get_vec3(tokens::VELOCITY).unwrap_or(Vector3::new(0.0, 0.0, 0.0)),
        angular_velocity: prim
            .get_vec3(tokens::ANGULAR_VELOCITY)
            .unwrap_or(Vector3::new(0.0, 0.0, 0.0)),
        ..Default::default()
    }
}

pub(crate) fn parse_material(prim: &Prim) -> RigidBodyMaterialDesc {
    RigidBodyMaterialDesc {
        static_friction: prim.get_float(tokens::STATIC_FRICTION).unwrap_or(0.0),
        dynamic_friction: prim.get_float(tokens::DYNAMIC_FRICTION).unwrap_or(0.0),
        restitution: prim.get_float(tokens::RESTITUTION).unwrap_or(0.0),
        density: prim.get_float(tokens::DENSITY).unwrap_or(0.0),
    }
}

pub(crate) fn parse_articulation(prim: &Prim) -> ArticulationDesc {
    ArticulationDesc {
        root_prims: vec![prim.path().clone()],
        filtered_collisions: filtered_pairs(prim),
    }
}

/// Geometry for a collider, or `None` if the prim is not a collider.
fn shape_geometry(prim: &Prim, custom_tokens: &CustomPhysicsTokens) -> Option<ShapeGeometry> {
    if let Some(token) = match_token(prim, &custom_tokens.shape_tokens) {
        return Some(ShapeGeometry::Custom {
            token: token.to_string(),
        });
    }

    let type_name = prim.type_name()?;
    let geometry = match type_name {
        tokens::SPHERE => ShapeGeometry::Sphere {
            radius: prim.get_float(tokens::RADIUS).unwrap_or(1.0),
        },
        tokens::CUBE => {
            let half = prim.get_float(tokens::SIZE).unwrap_or(2.0) * 0.5;
            ShapeGeometry::Cube {
                half_extents: cgmath::Vector3::new(half, half, half),
            }
        }
        tokens::CAPSULE => ShapeGeometry::Capsule {
            radius: prim.get_float(tokens::RADIUS).unwrap_or(0.5),
            half_height: prim.get_float(tokens::HEIGHT).unwrap_or(1.0) * 0.5,
            axis: axis_attr(prim, tokens::AXIS, Axis::Z),
        },
        tokens::CYLINDER => ShapeGeometry::Cylinder {
            radius: prim.get_float(tokens::RADIUS).unwrap_or(1.0),
            half_height: prim.get_float(tokens::HEIGHT).unwrap_or(2.0) * 0.5,
            axis: axis_attr(prim, tokens::AXIS, Axis::Z),
        },
        tokens::CONE => ShapeGeometry::Cone {
            radius: prim.get_float(tokens::RADIUS).unwrap_or(1.0),
            half_height: prim.get_float(tokens::HEIGHT).unwrap_or(2.0) * 0.5,
            axis: axis_attr(prim, tokens::AXIS, Axis::Z),
        },
        tokens::PLANE => ShapeGeometry::Plane {
            axis: axis_attr(prim, tokens::AXIS, Axis::Z),
        },
        tokens::POINTS_PRIM => ShapeGeometry::SpherePoints {
            points: sphere_points(prim)?,
        },
        tokens::MESH => ShapeGeometry::Mesh {
            approximation: if prim.has_api(tokens::MESH_COLLISION_API) {
                prim.get_token(tokens::APPROXIMATION).unwrap_or("none").to_string()
            } else {
                "none".to_string()
            },
            double_sided: prim.get_bool(tokens::DOUBLE_SIDED).unwrap_or(false),
        },
        _ => {
            log::warn!(
                "Collision on unsupported prim type '{}' at {}",
                type_name,
                prim.path()
            );
            return None;
        }
    };
    Some(geometry)
}

/// Spheres of a points prim: one radius per point, or a single radius
/// shared by every point.
fn sphere_points(prim: &Prim) -> Option<Vec<SpherePoint>> {
    let centers = prim.get_vec3_array(tokens::POINTS).unwrap_or_default();
    let widths = prim.get_float_array(tokens::WIDTHS).unwrap_or_default();

    let radius = |index: usize| match widths.len() {
        1 => Some(widths[0] * 0.5),
        len if len == centers.len() => Some(widths[index] * 0.5),
        _ => None,
    };

    let points: Option<Vec<SpherePoint>> = centers
        .iter()
        .enumerate()
        .map(|(index, &center)| Some(SpherePoint { center, radius: radius(index)? }))
        .collect();
    if points.is_none() {
        log::warn!(
            "Points prim {} has {} points but {} widths, skipping",
            prim.path(),
            centers.len(),
            widths.len()
        );
    }
    points
}

pub(crate) fn parse_shape(prim: &Prim, custom_tokens: &CustomPhysicsTokens) -> Option<ShapeDesc> {
    let is_custom = match_token(prim, &custom_tokens.shape_tokens).is_some();
    if !prim.has_api(tokens::COLLISION_API) && !is_custom {
        return None;
    }

    let geometry = shape_geometry(prim, custom_tokens)?;
    let mut shape = ShapeDesc::new(geometry);
    shape.collision_enabled = prim.get_bool(tokens::COLLISION_ENABLED).unwrap_or(true);
    shape.materials = targets(prim, tokens::PHYSICS_MATERIAL_BINDING);
    shape.simulation_owners = targets(prim, tokens::SIMULATION_OWNER);
    shape.filtered_collisions = filtered_pairs(prim);
    Some(shape)
}

fn float_or(prim: &Prim, name: &str, default: f32) -> f32 {
    prim.get_float(name).unwrap_or(default)
}

/// Drive for a `PhysicsDriveAPI:<instance>` schema; disabled when the schema
/// is not applied.
fn parse_drive(prim: &Prim, instance: &str) -> JointDrive {
    if !prim.has_api(&tokens::api_instance(tokens::DRIVE_API, instance)) {
        return JointDrive::default();
    }
    let attr = |name: &str| tokens::drive_attr(instance, name);
    JointDrive {
        enabled: true,
        target_position: float_or(prim, &attr(tokens::DRIVE_TARGET_POSITION), 0.0),
        target_velocity: float_or(prim, &attr(tokens::DRIVE_TARGET_VELOCITY), 0.0),
        force_limit: float_or(prim, &attr(tokens::DRIVE_MAX_FORCE), f32::MAX),
        stiffness: float_or(prim, &attr(tokens::DRIVE_STIFFNESS), 0.0),
        damping: float_or(prim, &attr(tokens::DRIVE_DAMPING), 0.0),
        acceleration: prim.get_token(&attr(tokens::DRIVE_TYPE)) == Some(tokens::DRIVE_ACCELERATION),
    }
}

/// Lower/upper limit pair; the limit is enabled when either bound is finite.
fn bounded_limit(prim: &Prim) -> JointLimit {
    let lower = float_or(prim, tokens::LOWER_LIMIT, f32::NEG_INFINITY);
    let upper = float_or(prim, tokens::UPPER_LIMIT, f32::INFINITY);
    JointLimit {
        enabled: lower.is_finite() || upper.is_finite(),
        lower,
        upper,
    }
}

fn parse_d6(prim: &Prim) -> JointFamily {
    let mut limits = Vec::new();
    let mut drives = Vec::new();
    for dof in JointDof::ALL {
        let instance = dof.token();
        if prim.has_api(&tokens::api_instance(tokens::LIMIT_API, instance)) {
            limits.push((
                dof,
                JointLimit {
                    enabled: true,
                    lower: float_or(
                        prim,
                        &tokens::limit_attr(instance, tokens::LIMIT_LOW),
                        f32::NEG_INFINITY,
                    ),
                    upper: float_or(
                        prim,
                        &tokens::limit_attr(instance, tokens::LIMIT_HIGH),
                        f32::INFINITY,
                    ),
                },
            ));
        }
        let drive = parse_drive(prim, instance);
        if drive.enabled {
            drives.push((dof, drive));
        }
    }
    JointFamily::D6 { limits, drives }
}

fn joint_family(prim: &Prim, custom_tokens: &CustomPhysicsTokens) -> Option<JointFamily> {
    let family = match prim.type_name() {
        Some(tokens::FIXED_JOINT) => JointFamily::Fixed,
        Some(tokens::REVOLUTE_JOINT) => JointFamily::Revolute {
            axis: axis_attr(prim, tokens::JOINT_AXIS, Axis::X),
            limit: bounded_limit(prim),
            drive: parse_drive(prim, tokens::ANGULAR),
        },
        Some(tokens::PRISMATIC_JOINT) => JointFamily::Prismatic {
            axis: axis_attr(prim, tokens::JOINT_AXIS, Axis::X),
            limit: bounded_limit(prim),
            drive: parse_drive(prim, tokens::LINEAR),
        },
        Some(tokens::SPHERICAL_JOINT) => {
            let cone0 = float_or(prim, tokens::CONE_ANGLE0_LIMIT, -1.0);
            let cone1 = float_or(prim, tokens::CONE_ANGLE1_LIMIT, -1.0);
            JointFamily::Spherical {
                axis: axis_attr(prim, tokens::JOINT_AXIS, Axis::X),
                limit: JointLimit {
                    enabled: cone0 >= 0.0 && cone1 >= 0.0,
                    lower: cone0,
                    upper: cone1,
                },
            }
        }
        Some(tokens::DISTANCE_JOINT) => {
            let min = float_or(prim, tokens::MIN_DISTANCE, -1.0);
            let max = float_or(prim, tokens::MAX_DISTANCE, -1.0);
            JointFamily::Distance {
                min_enabled: min >= 0.0,
                max_enabled: max >= 0.0,
                limit: JointLimit {
                    enabled: min >= 0.0 || max >= 0.0,
                    lower: min,
                    upper: max,
                },
            }
        }
        Some(tokens::JOINT) => parse_d6(prim),
        _ => JointFamily::Custom {
            token: match_token(prim, &custom_tokens.joint_tokens)?.to_string(),
        },
    };
    Some(family)
}

pub(crate) fn parse_joint(prim: &Prim, custom_tokens: &CustomPhysicsTokens) -> Option<JointDesc> {
    let mut joint = JointDesc::new(joint_family(prim, custom_tokens)?);
    joint.body0 = single_target(prim, tokens::BODY0);
    joint.body1 = single_target(prim, tokens::BODY1);
    if let Some(position) = prim.get_vec3(tokens::LOCAL_POS0) {
        joint.local_pose0_position = position;
    }
    if let Some(orientation) = prim.get_quat(tokens::LOCAL_ROT0) {
        joint.local_pose0_orientation = orientation;
    }
    if let Some(position) = prim.get_vec3(tokens::LOCAL_POS1) {
        joint.local_pose1_position = position;
    }
    if let Some(orientation) = prim.get_quat(tokens::LOCAL_ROT1) {
        joint.local_pose1_orientation = orientation;
    }
    joint.joint_enabled = prim.get_bool(tokens::JOINT_ENABLED).unwrap_or(true);
    joint.collision_enabled = prim.get_bool(tokens::COLLISION_ENABLED).unwrap_or(false);
    joint.exclude_from_articulation = prim
        .get_bool(tokens::EXCLUDE_FROM_ARTICULATION)
        .unwrap_or(false);
    joint.break_force = float_or(prim, tokens::BREAK_FORCE, f32::INFINITY);
    joint.break_torque = float_or(prim, tokens::BREAK_TORQUE, f32::INFINITY);

    Some(joint)
}
