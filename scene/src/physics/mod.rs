//! Physics schema parsing on top of the cursor traversal.

pub mod classify;
pub mod desc;
pub mod parse;
pub mod tokens;

pub use classify::PhysicsClassifier;
pub use desc::{
    ArticulationDesc, Axis, CollisionGroupDesc, JointDesc, JointDof, JointDrive, JointFamily,
    JointLimit, ObjectDesc, ObjectKind, ObjectType, RigidBodyDesc, RigidBodyMaterialDesc,
    SceneDesc, ShapeDesc, ShapeGeometry, SpherePoint,
};
pub use parse::{load_physics_from_range, ParseError, ParseOptions, ParseSummary};
pub use tokens::CustomPhysicsTokens;
