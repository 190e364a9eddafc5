//! Schema, attribute and relationship names recognised by the physics parser.

use serde::{Deserialize, Serialize};

use crate::prim::Prim;

// ============================================================================
// Prim Types
// ============================================================================

pub const PHYSICS_SCENE: &str = "PhysicsScene";
pub const COLLISION_GROUP: &str = "PhysicsCollisionGroup";

pub const JOINT: &str = "PhysicsJoint";
pub const FIXED_JOINT: &str = "PhysicsFixedJoint";
pub const REVOLUTE_JOINT: &str = "PhysicsRevoluteJoint";
pub const PRISMATIC_JOINT: &str = "PhysicsPrismaticJoint";
pub const SPHERICAL_JOINT: &str = "PhysicsSphericalJoint";
pub const DISTANCE_JOINT: &str = "PhysicsDistanceJoint";

pub const SPHERE: &str = "Sphere";
pub const CUBE: &str = "Cube";
pub const CAPSULE: &str = "Capsule";
pub const CYLINDER: &str = "Cylinder";
pub const CONE: &str = "Cone";
pub const MESH: &str = "Mesh";
pub const PLANE: &str = "Plane";
pub const POINTS_PRIM: &str = "Points";
pub const POINT_INSTANCER: &str = "PointInstancer";

// ============================================================================
// API Schemas
// ============================================================================

pub const RIGID_BODY_API: &str = "PhysicsRigidBodyAPI";
pub const COLLISION_API: &str = "PhysicsCollisionAPI";
pub const MESH_COLLISION_API: &str = "PhysicsMeshCollisionAPI";
pub const MATERIAL_API: &str = "PhysicsMaterialAPI";
pub const ARTICULATION_ROOT_API: &str = "PhysicsArticulationRootAPI";
pub const FILTERED_PAIRS_API: &str = "PhysicsFilteredPairsAPI";
pub const LIMIT_API: &str = "PhysicsLimitAPI";
pub const DRIVE_API: &str = "PhysicsDriveAPI";

// ============================================================================
// Attributes
// ============================================================================

pub const GRAVITY_DIRECTION: &str = "physics:gravityDirection";
pub const GRAVITY_MAGNITUDE: &str = "physics:gravityMagnitude";

pub const RIGID_BODY_ENABLED: &str = "physics:rigidBodyEnabled";
pub const KINEMATIC_ENABLED: &str = "physics:kinematicEnabled";
pub const STARTS_ASLEEP: &str = "physics:startsAsleep";
pub const VELOCITY: &str = "physics:velocity";
pub const ANGULAR_VELOCITY: &str = "physics:angularVelocity";

pub const COLLISION_ENABLED: &str = "physics:collisionEnabled";
pub const APPROXIMATION: &str = "physics:approximation";

pub const JOINT_ENABLED: &str = "physics:jointEnabled";
pub const EXCLUDE_FROM_ARTICULATION: &str = "physics:excludeFromArticulation";
pub const BREAK_FORCE: &str = "physics:breakForce";
pub const BREAK_TORQUE: &str = "physics:breakTorque";
pub const JOINT_AXIS: &str = "physics:axis";
pub const LOCAL_POS0: &str = "physics:localPos0";
pub const LOCAL_ROT0: &str = "physics:localRot0";
pub const LOCAL_POS1: &str = "physics:localPos1";
pub const LOCAL_ROT1: &str = "physics:localRot1";
pub const LOWER_LIMIT: &str = "physics:lowerLimit";
pub const UPPER_LIMIT: &str = "physics:upperLimit";
pub const CONE_ANGLE0_LIMIT: &str = "physics:coneAngle0Limit";
pub const CONE_ANGLE1_LIMIT: &str = "physics:coneAngle1Limit";
pub const MIN_DISTANCE: &str = "physics:minDistance";
pub const MAX_DISTANCE: &str = "physics:maxDistance";

// Per-instance names under `limit:<dof>:physics:` and `drive:<dof>:physics:`
pub const LIMIT_LOW: &str = "low";
pub const LIMIT_HIGH: &str = "high";
pub const DRIVE_TARGET_POSITION: &str = "targetPosition";
pub const DRIVE_TARGET_VELOCITY: &str = "targetVelocity";
pub const DRIVE_MAX_FORCE: &str = "maxForce";
pub const DRIVE_STIFFNESS: &str = "stiffness";
pub const DRIVE_DAMPING: &str = "damping";
pub const DRIVE_TYPE: &str = "type";
pub const DRIVE_ACCELERATION: &str = "acceleration";

/// Drive instance of revolute joints.
pub const ANGULAR: &str = "angular";
/// Drive instance of prismatic joints.
pub const LINEAR: &str = "linear";

pub const STATIC_FRICTION: &str = "physics:staticFriction";
pub const DYNAMIC_FRICTION: &str = "physics:dynamicFriction";
pub const RESTITUTION: &str = "physics:restitution";
pub const DENSITY: &str = "physics:density";

pub const INVERT_FILTERED_GROUPS: &str = "physics:invertFilteredGroups";
pub const MERGE_GROUP: &str = "physics:mergeGroup";

pub const RADIUS: &str = "radius";
pub const HEIGHT: &str = "height";
pub const SIZE: &str = "size";
pub const AXIS: &str = "axis";
pub const DOUBLE_SIDED: &str = "doubleSided";
pub const POINTS: &str = "points";
pub const WIDTHS: &str = "widths";

// ============================================================================
// Relationships
// ============================================================================

pub const SIMULATION_OWNER: &str = "physics:simulationOwner";
pub const FILTERED_PAIRS: &str = "physics:filteredPairs";
pub const BODY0: &str = "physics:body0";
pub const BODY1: &str = "physics:body1";
pub const FILTERED_GROUPS: &str = "physics:filteredGroups";
pub const COLLIDERS_INCLUDES: &str = "collection:colliders:includes";
pub const PHYSICS_MATERIAL_BINDING: &str = "material:binding:physics";

/// Name of a multiple-apply schema instance, e.g. `PhysicsDriveAPI:angular`.
pub fn api_instance(schema: &str, instance: &str) -> String {
    format!("{}:{}", schema, instance)
}

/// Limit attribute of a degree of freedom, e.g. `limit:rotX:physics:low`.
pub fn limit_attr(instance: &str, name: &str) -> String {
    format!("limit:{}:physics:{}", instance, name)
}

/// Drive attribute of a drive instance, e.g. `drive:angular:physics:stiffness`.
pub fn drive_attr(instance: &str, name: &str) -> String {
    format!("drive:{}:physics:{}", instance, name)
}

/// Token lists for custom physics objects.
///
/// A prim matches a token when its type name or one of its applied API
/// schemas equals it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPhysicsTokens {
    /// Custom joints to be reported by parsing.
    #[serde(default)]
    pub joint_tokens: Vec<String>,
    /// Custom shapes to be reported by parsing.
    #[serde(default)]
    pub shape_tokens: Vec<String>,
    /// Custom instancers; their subtrees are skipped.
    #[serde(default)]
    pub instancer_tokens: Vec<String>,
}

impl CustomPhysicsTokens {
    pub fn is_empty(&self) -> bool {
        self.joint_tokens.is_empty() && self.shape_tokens.is_empty() && self.instancer_tokens.is_empty()
    }
}

/// Returns the first token matching the prim's type name or API schemas.
pub fn match_token<'t>(prim: &Prim, tokens: &'t [String]) -> Option<&'t str> {
    tokens
        .iter()
        .find(|token| prim.is_a(token) || prim.has_api(token))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ScenePath;

    #[test]
    fn test_match_token_by_type_and_api() {
        let mut prim = Prim::new(1, ScenePath::parse("/J").unwrap(), Some("MyJoint".to_string()));
        let tokens = vec!["Other".to_string(), "MyJoint".to_string()];
        assert_eq!(match_token(&prim, &tokens), Some("MyJoint"));

        prim.set_type_name(None);
        assert_eq!(match_token(&prim, &tokens), None);

        prim.apply_api("Other");
        assert_eq!(match_token(&prim, &tokens), Some("Other"));
    }

    #[test]
    fn test_instance_names() {
        assert_eq!(api_instance(DRIVE_API, ANGULAR), "PhysicsDriveAPI:angular");
        assert_eq!(limit_attr("rotX", LIMIT_LOW), "limit:rotX:physics:low");
        assert_eq!(drive_attr(LINEAR, DRIVE_MAX_FORCE), "drive:linear:physics:maxForce");
    }

    #[test]
    fn test_custom_tokens_default_is_empty() {
        let tokens = CustomPhysicsTokens::default();
        assert!(tokens.is_empty());

        let tokens: CustomPhysicsTokens =
            serde_json::from_str(r#"{ "shape_tokens": ["Blob"] }"#).unwrap();
        assert!(!tokens.is_empty());
        assert_eq!(tokens.shape_tokens, vec!["Blob"]);
    }
}
