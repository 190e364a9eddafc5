use std::collections::HashMap;

use thiserror::Error;

use crate::path::{PathError, ScenePath};
use crate::prim::{Prim, PrimId};

/// Id of the pseudo-root prim at `/`.
pub const PSEUDO_ROOT_ID: PrimId = 0;

/// Errors that can occur while authoring a stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("The pseudo-root cannot be redefined")]
    PseudoRoot,
}

/// A prim hierarchy rooted at the pseudo-root `/`.
///
/// Prims live in an arena and refer to each other by [`PrimId`]. The stage
/// owns every prim; ranges and cursors only borrow it.
pub struct Stage {
    prims: Vec<Prim>,
    path_index: HashMap<ScenePath, PrimId>,
}

impl Stage {
    /// Creates a stage holding only the pseudo-root.
    pub fn new() -> Self {
        let root = Prim::new(PSEUDO_ROOT_ID, ScenePath::root(), None);
        let mut path_index = HashMap::new();
        path_index.insert(ScenePath::root(), PSEUDO_ROOT_ID);
        Self {
            prims: vec![root],
            path_index,
        }
    }

    pub fn pseudo_root(&self) -> &Prim {
        &self.prims[PSEUDO_ROOT_ID as usize]
    }

    /// Number of prims, including the pseudo-root.
    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.len() == 1
    }

    /// Defines a prim at `path`, creating untyped ancestors as needed.
    ///
    /// Redefining an existing prim replaces its type name and returns the
    /// existing id.
    pub fn define_prim(
        &mut self,
        path: &ScenePath,
        type_name: Option<&str>,
    ) -> Result<PrimId, StageError> {
        if path.is_root() {
            return Err(StageError::PseudoRoot);
        }

        if let Some(&id) = self.path_index.get(path) {
            self.prims[id as usize].set_type_name(type_name.map(str::to_string));
            return Ok(id);
        }

        let mut parent_id = PSEUDO_ROOT_ID;
        let mut current = ScenePath::root();
        for segment in path.segments() {
            current = current.append_child(segment)?;
            parent_id = match self.path_index.get(&current) {
                Some(&id) => id,
                None => self.insert_prim(parent_id, current.clone(), None),
            };
        }

        self.prims[parent_id as usize].set_type_name(type_name.map(str::to_string));
        Ok(parent_id)
    }

    /// Convenience wrapper that parses `path` first.
    pub fn define(&mut self, path: &str, type_name: Option<&str>) -> Result<PrimId, StageError> {
        let path = ScenePath::parse(path)?;
        self.define_prim(&path, type_name)
    }

    fn insert_prim(&mut self, parent: PrimId, path: ScenePath, type_name: Option<String>) -> PrimId {
        let id = self.prims.len() as PrimId;
        let mut prim = Prim::new(id, path.clone(), type_name);
        prim.set_parent(Some(parent));
        self.prims.push(prim);
        self.prims[parent as usize].add_child(id);
        self.path_index.insert(path, id);
        id
    }

    pub fn get_prim(&self, id: PrimId) -> Option<&Prim> {
        self.prims.get(id as usize)
    }

    pub fn prim_mut(&mut self, id: PrimId) -> Option<&mut Prim> {
        self.prims.get_mut(id as usize)
    }

    pub fn get_prim_id(&self, path: &ScenePath) -> Option<PrimId> {
        self.path_index.get(path).copied()
    }

    pub fn get_prim_at_path(&self, path: &ScenePath) -> Option<&Prim> {
        self.get_prim_id(path).and_then(|id| self.get_prim(id))
    }

    /// Iterates over every prim in arena order (pseudo-root first).
    pub fn prims(&self) -> impl Iterator<Item = &Prim> {
        self.prims.iter()
    }

    /// Returns true if `prim` and all of its ancestors are active.
    pub fn is_active_in_hierarchy(&self, id: PrimId) -> bool {
        let mut next = Some(id);
        while let Some(id) = next {
            match self.get_prim(id) {
                Some(prim) if prim.is_active() => next = prim.parent(),
                _ => return false,
            }
        }
        true
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
