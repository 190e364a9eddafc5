//! Physics descriptor collection over a set of stage subtrees.
//!
//! [`load_physics_from_range`] walks every subtree named by the include
//! paths in a single pass, classifies the prims it reaches and reports the
//! resulting descriptors grouped by [`ObjectType`].

use std::collections::{BTreeMap, HashMap, HashSet};

use thiserror::Error;

use crate::cursor::{ExcludeListCursor, MapRangeCursor, PrimMap, RangeCursor, TraversalCursor};
use crate::path::ScenePath;
use crate::range::PrimRange;
use crate::stage::Stage;
use crate::tree::walk_cursor;
use crate::xform::Pose;

use super::classify::PhysicsClassifier;
use super::desc::{ObjectDesc, ObjectKind, ObjectType};
use super::tokens::CustomPhysicsTokens;

/// Errors that can occur while collecting physics descriptors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No include paths given")]
    NoIncludePaths,

    #[error("No prim at include path {0}")]
    PrimNotFound(ScenePath),
}

/// Options that control descriptor collection.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Prims pruned from the traversal, together with their subtrees.
    pub exclude_paths: Vec<ScenePath>,
    /// Custom joint, shape and instancer tokens.
    pub custom_tokens: CustomPhysicsTokens,
    /// Simulation owners to keep. `None` keeps everything; the root path `/`
    /// stands for objects without an owner.
    pub simulation_owners: Option<Vec<ScenePath>>,
}

/// Counters describing a completed parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Prims reached by the traversal.
    pub visited: usize,
    /// Descriptors handed to the report function.
    pub reported: usize,
    /// Calls made to the report function.
    pub groups: usize,
}

/// Collects physics descriptors from the subtrees rooted at `include_paths`
/// and reports them through `report_fn`.
///
/// `report_fn` is called once per non-empty descriptor type, in
/// [`ObjectType`] order, with parallel slices of prim paths and descriptors.
/// `user_data` is passed through untouched.
pub fn load_physics_from_range<U, F>(
    stage: &Stage,
    include_paths: &[ScenePath],
    mut report_fn: F,
    user_data: &U,
    options: &ParseOptions,
) -> Result<ParseSummary, ParseError>
where
    U: ?Sized,
    F: FnMut(ObjectType, &[ScenePath], &[ObjectDesc], &U),
{
    let roots = resolve_roots(stage, include_paths)?;

    let mut classifier = PhysicsClassifier::new(&options.custom_tokens);
    let mut visited = 0;
    for mut cursor in build_cursors(stage, &roots, &options.exclude_paths) {
        let count = walk_cursor(&mut cursor, &mut classifier);
        log::debug!("{} cursor visited {} prims", cursor.kind(), count);
        visited += count;
    }

    let mut descs = classifier.into_descs();
    link_descriptors(stage, &mut descs);
    if let Some(owners) = &options.simulation_owners {
        filter_simulation_owners(&mut descs, owners);
    }

    let mut summary = ParseSummary {
        visited,
        ..Default::default()
    };
    for (object_type, (paths, group)) in group_by_type(descs) {
        report_fn(object_type, &paths, &group, user_data);
        summary.reported += group.len();
        summary.groups += 1;
    }

    log::info!(
        "Parsed {} prims under {} root(s): {} descriptors in {} groups",
        summary.visited,
        roots.len(),
        summary.reported,
        summary.groups
    );
    Ok(summary)
}

/// Resolves include paths to a root map, dropping paths nested under
/// another include path so that no subtree is walked twice.
pub(crate) fn resolve_roots(
    stage: &Stage,
    include_paths: &[ScenePath],
) -> Result<PrimMap, ParseError> {
    if include_paths.is_empty() {
        return Err(ParseError::NoIncludePaths);
    }

    let mut candidates = PrimMap::new();
    for path in include_paths {
        let id = stage
            .get_prim_id(path)
            .ok_or_else(|| ParseError::PrimNotFound(path.clone()))?;
        candidates.insert(path.clone(), id);
    }

    let mut roots = PrimMap::new();
    for (path, id) in candidates {
        if let Some(ancestor) = roots.keys().find(|root| path.has_prefix(root)) {
            log::debug!("Include path {} is already covered by {}", path, ancestor);
            continue;
        }
        roots.insert(path, id);
    }
    Ok(roots)
}

/// Picks the traversal strategy for the given roots and exclusions.
pub(crate) fn build_cursors<'a>(
    stage: &'a Stage,
    roots: &'a PrimMap,
    exclude_paths: &[ScenePath],
) -> Vec<TraversalCursor<'a>> {
    if !exclude_paths.is_empty() {
        return roots
            .values()
            .map(|&id| ExcludeListCursor::new(PrimRange::new(stage, id), exclude_paths).into())
            .collect();
    }

    match roots.values().next() {
        Some(&id) if roots.len() == 1 => vec![RangeCursor::new(PrimRange::new(stage, id)).into()],
        Some(_) => vec![MapRangeCursor::new(stage, roots).into()],
        None => Vec::new(),
    }
}

/// Cross-links descriptors once the whole pass is known: shapes to their
/// rigid body, rigid bodies to their shapes, shapes to the collision groups
/// that include them. Joints with dangling body targets are marked invalid.
/// Rigid bodies get their world pose and shapes their pose relative to the
/// owning body.
pub(crate) fn link_descriptors(stage: &Stage, descs: &mut [ObjectDesc]) {
    let bodies: HashMap<ScenePath, usize> = descs
        .iter()
        .enumerate()
        .filter(|(_, desc)| matches!(desc.kind, ObjectKind::RigidBody(_)))
        .map(|(index, desc)| (desc.prim_path.clone(), index))
        .collect();

    let groups: Vec<(ScenePath, Vec<ScenePath>)> = descs
        .iter()
        .filter_map(|desc| match &desc.kind {
            ObjectKind::CollisionGroup(group) => {
                Some((desc.prim_path.clone(), group.includes.clone()))
            }
            _ => None,
        })
        .collect();

    let mut body_collisions: Vec<(usize, ScenePath)> = Vec::new();

    for desc in descs.iter_mut() {
        let path = desc.prim_path.clone();
        let Some(id) = stage.get_prim_id(&path) else {
            continue;
        };
        match &mut desc.kind {
            ObjectKind::RigidBody(body) => {
                let pose = Pose::from_matrix(&stage.world_transform(id));
                body.position = pose.position;
                body.rotation = pose.rotation;
                body.scale = pose.scale;
            }
            ObjectKind::Shape(shape) => {
                let mut next = Some(path.clone());
                while let Some(candidate) = next {
                    if let Some(&index) = bodies.get(&candidate) {
                        shape.rigid_body = Some(candidate);
                        body_collisions.push((index, path.clone()));
                        break;
                    }
                    next = candidate.parent();
                }

                let frame = shape.rigid_body.as_ref().and_then(|body| stage.get_prim_id(body));
                let pose = Pose::from_matrix(&stage.relative_transform(id, frame));
                shape.local_pos = pose.position;
                shape.local_rot = pose.rotation;
                shape.local_scale = pose.scale;

                for (group, includes) in &groups {
                    if includes.iter().any(|include| path.has_prefix(include)) {
                        shape.collision_groups.push(group.clone());
                    }
                }
            }
            ObjectKind::Joint(joint) => {
                for body in [&joint.body0, &joint.body1].into_iter().flatten() {
                    if stage.get_prim_at_path(body).is_none() {
                        log::warn!("Joint {} targets missing prim {}", path, body);
                        desc.is_valid = false;
                    }
                }
            }
            _ => {}
        }
    }

    for (index, shape_path) in body_collisions {
        if let ObjectKind::RigidBody(body) = &mut descs[index].kind {
            body.collisions.push(shape_path);
        }
    }
}

/// Drops descriptors that belong to simulation owners outside `owners`.
pub(crate) fn filter_simulation_owners(descs: &mut Vec<ObjectDesc>, owners: &[ScenePath]) {
    let allowed: HashSet<&ScenePath> = owners.iter().collect();
    let no_owner = ScenePath::root();
    let owner_ok = |list: &[ScenePath]| {
        if list.is_empty() {
            allowed.contains(&no_owner)
        } else {
            list.iter().any(|owner| allowed.contains(owner))
        }
    };

    let mut rejected_bodies: HashSet<ScenePath> = HashSet::new();
    for desc in descs.iter() {
        if let ObjectKind::RigidBody(body) = &desc.kind {
            if !owner_ok(&body.simulation_owners) {
                rejected_bodies.insert(desc.prim_path.clone());
            }
        }
    }

    let before = descs.len();
    descs.retain(|desc| match &desc.kind {
        ObjectKind::Scene(_) => allowed.contains(&desc.prim_path),
        ObjectKind::RigidBody(_) => !rejected_bodies.contains(&desc.prim_path),
        ObjectKind::Shape(shape) => match &shape.rigid_body {
            Some(body) => !rejected_bodies.contains(body),
            None => owner_ok(&shape.simulation_owners),
        },
        ObjectKind::Joint(joint) => {
            let bodies: Vec<&ScenePath> = [&joint.body0, &joint.body1].into_iter().flatten().collect();
            bodies.is_empty() || !bodies.iter().all(|body| rejected_bodies.contains(*body))
        }
        _ => true,
    });
    log::debug!(
        "Simulation owner filter dropped {} of {} descriptors",
        before - descs.len(),
        before
    );
}

/// Splits descriptors into per-type groups of parallel path/descriptor
/// vectors, ordered by type. Order within a group is traversal order.
pub(crate) fn group_by_type(
    descs: Vec<ObjectDesc>,
) -> BTreeMap<ObjectType, (Vec<ScenePath>, Vec<ObjectDesc>)> {
    let mut groups: BTreeMap<ObjectType, (Vec<ScenePath>, Vec<ObjectDesc>)> = BTreeMap::new();
    for desc in descs {
        let (paths, group) = groups.entry(desc.object_type()).or_default();
        paths.push(desc.prim_path.clone());
        group.push(desc);
    }
    groups
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
