//! Physics object descriptors produced by parsing.

use std::fmt;

use cgmath::{Quaternion, Vector3};

use crate::path::ScenePath;

/// Physics object type, used to group reported descriptors.
///
/// Descriptor groups are reported in the declaration order of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectType {
    Undefined,

    Scene,

    RigidBody,

    SphereShape,
    CubeShape,
    CapsuleShape,
    CylinderShape,
    ConeShape,
    MeshShape,
    PlaneShape,
    CustomShape,
    SpherePointsShape,

    FixedJoint,
    RevoluteJoint,
    PrismaticJoint,
    SphericalJoint,
    DistanceJoint,
    D6Joint,
    CustomJoint,

    RigidBodyMaterial,

    Articulation,

    CollisionGroup,
}

impl ObjectType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Scene => "Scene",
            Self::RigidBody => "RigidBody",
            Self::SphereShape => "SphereShape",
            Self::CubeShape => "CubeShape",
            Self::CapsuleShape => "CapsuleShape",
            Self::CylinderShape => "CylinderShape",
            Self::ConeShape => "ConeShape",
            Self::MeshShape => "MeshShape",
            Self::PlaneShape => "PlaneShape",
            Self::CustomShape => "CustomShape",
            Self::SpherePointsShape => "SpherePointsShape",
            Self::FixedJoint => "FixedJoint",
            Self::RevoluteJoint => "RevoluteJoint",
            Self::PrismaticJoint => "PrismaticJoint",
            Self::SphericalJoint => "SphericalJoint",
            Self::DistanceJoint => "DistanceJoint",
            Self::D6Joint => "D6Joint",
            Self::CustomJoint => "CustomJoint",
            Self::RigidBodyMaterial => "RigidBodyMaterial",
            Self::Articulation => "Articulation",
            Self::CollisionGroup => "CollisionGroup",
        }
    }

    pub fn is_shape(self) -> bool {
        (Self::SphereShape..=Self::SpherePointsShape).contains(&self)
    }

    pub fn is_joint(self) -> bool {
        (Self::FixedJoint..=Self::CustomJoint).contains(&self)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Principal axis of a shape or joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "X" => Some(Self::X),
            "Y" => Some(Self::Y),
            "Z" => Some(Self::Z),
            _ => None,
        }
    }
}

/// Joint degree of freedom, used to key D6 limits and drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JointDof {
    Distance,
    TransX,
    TransY,
    TransZ,
    RotX,
    RotY,
    RotZ,
}

impl JointDof {
    pub const ALL: [JointDof; 7] = [
        Self::Distance,
        Self::TransX,
        Self::TransY,
        Self::TransZ,
        Self::RotX,
        Self::RotY,
        Self::RotZ,
    ];

    /// Schema instance name of the degree of freedom.
    pub fn token(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::TransX => "transX",
            Self::TransY => "transY",
            Self::TransZ => "transZ",
            Self::RotX => "rotX",
            Self::RotY => "rotY",
            Self::RotZ => "rotZ",
        }
    }
}

fn identity_rotation() -> Quaternion<f32> {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// Scene descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDesc {
    /// Zero means "negative up axis" is to be used.
    pub gravity_direction: Vector3<f32>,
    /// Negative infinity means earth gravity adjusted for stage units.
    pub gravity_magnitude: f32,
}

impl Default for SceneDesc {
    fn default() -> Self {
        Self {
            gravity_direction: Vector3::new(0.0, 0.0, 0.0),
            gravity_magnitude: f32::NEG_INFINITY,
        }
    }
}

/// Rigid body descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyDesc {
    pub rigid_body_enabled: bool,
    pub kinematic_body: bool,
    pub starts_asleep: bool,
    pub simulation_owners: Vec<ScenePath>,
    pub filtered_collisions: Vec<ScenePath>,
    /// Shapes owned by this body, filled once the pass completes.
    pub collisions: Vec<ScenePath>,
    /// World space pose.
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            rigid_body_enabled: true,
            kinematic_body: false,
            starts_asleep: false,
            simulation_owners: Vec::new(),
            filtered_collisions: Vec::new(),
            collisions: Vec::new(),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: identity_rotation(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            linear_velocity: Vector3::new(0.0, 0.0, 0.0),
            angular_velocity: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

/// Geometry of a collision shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Sphere { radius: f32 },
    Cube { half_extents: Vector3<f32> },
    Capsule { radius: f32, half_height: f32, axis: Axis },
    Cylinder { radius: f32, half_height: f32, axis: Axis },
    Cone { radius: f32, half_height: f32, axis: Axis },
    Plane { axis: Axis },
    Mesh { approximation: String, double_sided: bool },
    Custom { token: String },
    SpherePoints { points: Vec<SpherePoint> },
}

/// One sphere of a sphere-points shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpherePoint {
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl ShapeGeometry {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Sphere { .. } => ObjectType::SphereShape,
            Self::Cube { .. } => ObjectType::CubeShape,
            Self::Capsule { .. } => ObjectType::CapsuleShape,
            Self::Cylinder { .. } => ObjectType::CylinderShape,
            Self::Cone { .. } => ObjectType::ConeShape,
            Self::Plane { .. } => ObjectType::PlaneShape,
            Self::Mesh { .. } => ObjectType::MeshShape,
            Self::Custom { .. } => ObjectType::CustomShape,
            Self::SpherePoints { .. } => ObjectType::SpherePointsShape,
        }
    }
}

/// Collision shape descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDesc {
    /// Owning rigid body; `None` for a static collider.
    pub rigid_body: Option<ScenePath>,
    /// Pose relative to the owning body, or the world pose for a static
    /// collider. Filled once the pass completes.
    pub local_pos: Vector3<f32>,
    pub local_rot: Quaternion<f32>,
    pub local_scale: Vector3<f32>,
    pub collision_enabled: bool,
    pub materials: Vec<ScenePath>,
    pub simulation_owners: Vec<ScenePath>,
    pub filtered_collisions: Vec<ScenePath>,
    /// Collision groups from the same parse that include this shape.
    pub collision_groups: Vec<ScenePath>,
    pub geometry: ShapeGeometry,
}

impl ShapeDesc {
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            rigid_body: None,
            local_pos: Vector3::new(0.0, 0.0, 0.0),
            local_rot: identity_rotation(),
            local_scale: Vector3::new(1.0, 1.0, 1.0),
            collision_enabled: true,
            materials: Vec::new(),
            simulation_owners: Vec::new(),
            filtered_collisions: Vec::new(),
            collision_groups: Vec::new(),
            geometry,
        }
    }
}

/// Joint limit. `lower`/`upper` hold angles for angular limits and
/// distances for linear ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub enabled: bool,
    pub lower: f32,
    pub upper: f32,
}

impl Default for JointLimit {
    fn default() -> Self {
        Self {
            enabled: false,
            lower: 90.0,
            upper: -90.0,
        }
    }
}

/// Joint drive, following
/// `force = stiffness * (target_position - position) + damping * (target_velocity - velocity)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDrive {
    pub enabled: bool,
    pub target_position: f32,
    pub target_velocity: f32,
    pub force_limit: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Acceleration drive rather than force drive.
    pub acceleration: bool,
}

impl Default for JointDrive {
    fn default() -> Self {
        Self {
            enabled: false,
            target_position: 0.0,
            target_velocity: 0.0,
            force_limit: f32::MAX,
            stiffness: 0.0,
            damping: 0.0,
            acceleration: false,
        }
    }
}

/// Type specific part of a joint.
#[derive(Debug, Clone, PartialEq)]
pub enum JointFamily {
    Fixed,
    Revolute {
        axis: Axis,
        limit: JointLimit,
        drive: JointDrive,
    },
    Prismatic {
        axis: Axis,
        limit: JointLimit,
        drive: JointDrive,
    },
    Spherical {
        axis: Axis,
        limit: JointLimit,
    },
    Distance {
        min_enabled: bool,
        max_enabled: bool,
        limit: JointLimit,
    },
    /// Generic joint; only degrees of freedom with an applied limit or
    /// drive are listed.
    D6 {
        limits: Vec<(JointDof, JointLimit)>,
        drives: Vec<(JointDof, JointDrive)>,
    },
    Custom {
        token: String,
    },
}

impl JointFamily {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Fixed => ObjectType::FixedJoint,
            Self::Revolute { .. } => ObjectType::RevoluteJoint,
            Self::Prismatic { .. } => ObjectType::PrismaticJoint,
            Self::Spherical { .. } => ObjectType::SphericalJoint,
            Self::Distance { .. } => ObjectType::DistanceJoint,
            Self::D6 { .. } => ObjectType::D6Joint,
            Self::Custom { .. } => ObjectType::CustomJoint,
        }
    }

    pub fn axis(&self) -> Option<Axis> {
        match self {
            Self::Revolute { axis, .. }
            | Self::Prismatic { axis, .. }
            | Self::Spherical { axis, .. } => Some(*axis),
            _ => None,
        }
    }
}

/// Joint descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDesc {
    pub family: JointFamily,
    pub body0: Option<ScenePath>,
    pub body1: Option<ScenePath>,
    /// Joint frame relative to body0.
    pub local_pose0_position: Vector3<f32>,
    pub local_pose0_orientation: Quaternion<f32>,
    /// Joint frame relative to body1.
    pub local_pose1_position: Vector3<f32>,
    pub local_pose1_orientation: Quaternion<f32>,
    pub joint_enabled: bool,
    pub collision_enabled: bool,
    pub exclude_from_articulation: bool,
    pub break_force: f32,
    pub break_torque: f32,
}

impl JointDesc {
    pub fn new(family: JointFamily) -> Self {
        Self {
            family,
            body0: None,
            body1: None,
            local_pose0_position: Vector3::new(0.0, 0.0, 0.0),
            local_pose0_orientation: identity_rotation(),
            local_pose1_position: Vector3::new(0.0, 0.0, 0.0),
            local_pose1_orientation: identity_rotation(),
            joint_enabled: true,
            collision_enabled: false,
            exclude_from_articulation: false,
            break_force: f32::INFINITY,
            break_torque: f32::INFINITY,
        }
    }

    pub fn joint_type(&self) -> ObjectType {
        self.family.object_type()
    }
}

/// Rigid body material descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RigidBodyMaterialDesc {
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub restitution: f32,
    pub density: f32,
}

/// Articulation descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticulationDesc {
    pub root_prims: Vec<ScenePath>,
    pub filtered_collisions: Vec<ScenePath>,
}

/// Collision group descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionGroupDesc {
    pub filtered_groups: Vec<ScenePath>,
    pub invert_filtered_groups: bool,
    pub merge_group_name: Option<String>,
    /// Paths whose subtrees are members of the group.
    pub includes: Vec<ScenePath>,
}

/// Type specific payload of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Scene(SceneDesc),
    RigidBody(RigidBodyDesc),
    Shape(ShapeDesc),
    Joint(JointDesc),
    RigidBodyMaterial(RigidBodyMaterialDesc),
    Articulation(ArticulationDesc),
    CollisionGroup(CollisionGroupDesc),
}

/// A parsed physics object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDesc {
    /// Path of the prim the descriptor was parsed from.
    pub prim_path: ScenePath,
    /// Parsing may succeed while the described object is not usable.
    pub is_valid: bool,
    pub kind: ObjectKind,
}

impl ObjectDesc {
    pub fn new(prim_path: ScenePath, kind: ObjectKind) -> Self {
        Self {
            prim_path,
            is_valid: true,
            kind,
        }
    }

    pub fn prim_path(&self) -> &ScenePath {
        &self.prim_path
    }

    pub fn object_type(&self) -> ObjectType {
        match &self.kind {
            ObjectKind::Scene(_) => ObjectType::Scene,
            ObjectKind::RigidBody(_) => ObjectType::RigidBody,
            ObjectKind::Shape(shape) => shape.geometry.object_type(),
            ObjectKind::Joint(joint) => joint.joint_type(),
            ObjectKind::RigidBodyMaterial(_) => ObjectType::RigidBodyMaterial,
            ObjectKind::Articulation(_) => ObjectType::Articulation,
            ObjectKind::CollisionGroup(_) => ObjectType::CollisionGroup,
        }
    }
}
