use std::collections::BTreeMap;

use cgmath::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::path::ScenePath;

/// Unique identifier for a Prim on a stage.
pub type PrimId = u32;

/// A value authored on a prim attribute.
///
/// Variant order is the JSON matching order: a 3 element number array is a
/// `Float3`, a 4 element one a `Float4` (quaternions, real part first) and
/// any other number array a `FloatArray`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Float(f32),
    Float3([f32; 3]),
    Float4([f32; 4]),
    FloatArray(Vec<f32>),
    Float3Array(Vec<[f32; 3]>),
    Token(String),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vector3<f32>> {
        match self {
            Self::Float3([x, y, z]) => Some(Vector3::new(*x, *y, *z)),
            _ => None,
        }
    }

    /// Reads a `[w, x, y, z]` quaternion.
    pub fn as_quat(&self) -> Option<Quaternion<f32>> {
        match self {
            Self::Float4([w, x, y, z]) => Some(Quaternion::new(*w, *x, *y, *z)),
            _ => None,
        }
    }

    /// Any number array, whatever variant it was matched as.
    pub fn as_float_array(&self) -> Option<Vec<f32>> {
        match self {
            Self::FloatArray(v) => Some(v.clone()),
            Self::Float3(v) => Some(v.to_vec()),
            Self::Float4(v) => Some(v.to_vec()),
            _ => None,
        }
    }

    pub fn as_vec3_array(&self) -> Option<Vec<Vector3<f32>>> {
        match self {
            Self::Float3Array(v) => Some(v.iter().map(|&[x, y, z]| Vector3::new(x, y, z)).collect()),
            Self::FloatArray(v) if v.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(v) => Some(v),
            _ => None,
        }
    }
}

/// A prim in the stage hierarchy.
///
/// Hierarchy links are maintained by [`Stage`](crate::Stage); prims are only
/// handed out by reference, so a traversal never owns them.
#[derive(Debug, Clone)]
pub struct Prim {
    pub id: PrimId,
    path: ScenePath,

    // Schema
    type_name: Option<String>,
    api_schemas: Vec<String>,
    active: bool,

    // Hierarchy
    parent: Option<PrimId>,
    children: Vec<PrimId>,

    // Content
    attributes: BTreeMap<String, AttrValue>,
    relationships: BTreeMap<String, Vec<ScenePath>>,
}

impl Prim {
    /// Creates a new active prim with no schema and no content.
    pub fn new(id: PrimId, path: ScenePath, type_name: Option<String>) -> Self {
        Self {
            id,
            path,
            type_name,
            api_schemas: Vec::new(),
            active: true,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &ScenePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    // Schema

    /// The concrete type name, e.g. `Cube` or `PhysicsRevoluteJoint`.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn set_type_name(&mut self, type_name: Option<String>) {
        self.type_name = type_name;
    }

    pub fn is_a(&self, type_name: &str) -> bool {
        self.type_name.as_deref() == Some(type_name)
    }

    pub fn api_schemas(&self) -> &[String] {
        &self.api_schemas
    }

    /// Applies an API schema. Applying the same schema twice is a no-op.
    pub fn apply_api(&mut self, schema: &str) {
        if !self.has_api(schema) {
            self.api_schemas.push(schema.to_string());
        }
    }

    pub fn has_api(&self, schema: &str) -> bool {
        self.api_schemas.iter().any(|s| s == schema)
    }

    /// Inactive prims, and everything below them, are skipped by ranges.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    // Hierarchy management

    pub fn parent(&self) -> Option<PrimId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<PrimId>) {
        self.parent = parent;
    }

    /// Child ids in authoring order.
    pub fn children(&self) -> &[PrimId] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: PrimId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    // Attributes and relationships

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: AttrValue) {
        self.attributes.insert(name.to_string(), value);
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.attribute(name).and_then(AttrValue::as_bool)
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.attribute(name).and_then(AttrValue::as_float)
    }

    pub fn get_vec3(&self, name: &str) -> Option<Vector3<f32>> {
        self.attribute(name).and_then(AttrValue::as_vec3)
    }

    pub fn get_quat(&self, name: &str) -> Option<Quaternion<f32>> {
        self.attribute(name).and_then(AttrValue::as_quat)
    }

    pub fn get_float_array(&self, name: &str) -> Option<Vec<f32>> {
        self.attribute(name).and_then(AttrValue::as_float_array)
    }

    pub fn get_vec3_array(&self, name: &str) -> Option<Vec<Vector3<f32>>> {
        self.attribute(name).and_then(AttrValue::as_vec3_array)
    }

    pub fn get_token(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttrValue::as_token)
    }

    pub fn relationships(&self) -> &BTreeMap<String, Vec<ScenePath>> {
        &self.relationships
    }

    /// Targets of a relationship; empty when it is not authored.
    pub fn targets(&self, name: &str) -> &[ScenePath] {
        self.relationships.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_targets(&mut self, name: &str, targets: Vec<ScenePath>) {
        self.relationships.insert(name.to_string(), targets);
    }
}
