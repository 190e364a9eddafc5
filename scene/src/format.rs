//! Stage file format serialization.
//!
//! Stages are stored as JSON documents listing every prim by path. Parents
//! may appear after their children; missing ancestors are created untyped.
//!
//! ```text
//! {
//!   "generator": "physwalk-scene 0.1.0",
//!   "prims": [
//!     { "path": "/World", "type": "Xform" },
//!     { "path": "/World/Ball", "type": "Sphere",
//!       "apiSchemas": ["PhysicsRigidBodyAPI", "PhysicsCollisionAPI"],
//!       "attributes": { "radius": 0.5 },
//!       "relationships": { "physics:simulationOwner": ["/World/Scene"] } }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::{PathError, ScenePath};
use crate::prim::{AttrValue, Prim};
use crate::stage::{Stage, StageError, PSEUDO_ROOT_ID};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during stage serialization/deserialization.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    PathError(#[from] PathError),

    #[error("Stage error: {0}")]
    StageError(#[from] StageError),

    #[error("Prim {0} is listed more than once")]
    DuplicatePrim(ScenePath),
}

// ============================================================================
// Serializable Data Structures
// ============================================================================

/// Serializable stage document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializedStage {
    /// Generator string (e.g., "physwalk-scene 0.1.0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    pub prims: Vec<SerializedPrim>,
}

/// Serializable prim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPrim {
    pub path: ScenePath,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_schemas: Vec<String>,
    #[serde(default = "default_active", skip_serializing_if = "is_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Vec<ScenePath>>,
}

fn default_active() -> bool {
    true
}

fn is_active(active: &bool) -> bool {
    *active
}

impl SerializedPrim {
    fn from_prim(prim: &Prim) -> Self {
        Self {
            path: prim.path().clone(),
            type_name: prim.type_name().map(str::to_string),
            api_schemas: prim.api_schemas().to_vec(),
            active: prim.is_active(),
            attributes: prim.attributes().clone(),
            relationships: prim.relationships().clone(),
        }
    }

    fn apply(self, stage: &mut Stage) -> Result<(), FormatError> {
        let id = stage.define_prim(&self.path, self.type_name.as_deref())?;
        let Some(prim) = stage.prim_mut(id) else {
            return Err(StageError::PseudoRoot.into());
        };
        for schema in &self.api_schemas {
            prim.apply_api(schema);
        }
        prim.set_active(self.active);
        for (name, value) in self.attributes {
            prim.set_attribute(&name, value);
        }
        for (name, targets) in self.relationships {
            prim.set_targets(&name, targets);
        }
        Ok(())
    }
}

// ============================================================================
// Stage Serialization
// ============================================================================

impl Stage {
    /// Captures every prim except the pseudo-root, parents first.
    pub fn to_serialized(&self) -> SerializedStage {
        SerializedStage {
            generator: Some(format!("physwalk-scene {}", env!("CARGO_PKG_VERSION"))),
            prims: self
                .prims()
                .filter(|prim| prim.id != PSEUDO_ROOT_ID)
                .map(SerializedPrim::from_prim)
                .collect(),
        }
    }

    /// Builds a stage from a serialized document.
    pub fn from_serialized(serialized: SerializedStage) -> Result<Stage, FormatError> {
        let mut stage = Stage::new();
        let mut seen = HashSet::new();
        for prim in serialized.prims {
            if !seen.insert(prim.path.clone()) {
                return Err(FormatError::DuplicatePrim(prim.path));
            }
            prim.apply(&mut stage)?;
        }
        log::debug!("Loaded stage with {} prims", stage.len() - 1);
        Ok(stage)
    }

    /// Serializes the stage to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(&self.to_serialized())?)
    }

    /// Deserializes a stage from JSON.
    pub fn from_json(json: &str) -> Result<Stage, FormatError> {
        let serialized: SerializedStage = serde_json::from_str(json)?;
        Self::from_serialized(serialized)
    }

    /// Saves the stage to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), FormatError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Loads a stage from a JSON file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Stage, FormatError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================
