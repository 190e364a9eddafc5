use std::collections::btree_map;
use std::collections::BTreeMap;

use super::{exhausted, PrimCursor};
use crate::path::ScenePath;
use crate::prim::{Prim, PrimId};
use crate::range::{PrimRange, PrimRangeIter};
use crate::stage::Stage;

/// Independent roots to traverse as one sequence, keyed and ordered by path.
pub type PrimMap = BTreeMap<ScenePath, PrimId>;

/// Cursor that walks several hierarchies in one pass.
///
/// Used to process subtrees discovered after an initial pass without
/// restarting from the pseudo-root. Roots are visited in path order and each
/// root's subtree in pre-order. Roots whose range is empty are skipped, so
/// the cursor is never positioned on an empty range.
///
/// The root map is borrowed and must not change while the cursor is alive.
pub struct MapRangeCursor<'a> {
    stage: &'a Stage,
    prim_map: &'a PrimMap,
    entries: btree_map::Iter<'a, ScenePath, PrimId>,
    root: Option<&'a ScenePath>,
    iter: Option<PrimRangeIter<'a>>,
}

impl<'a> MapRangeCursor<'a> {
    /// Creates a cursor positioned at the first prim of the first non-empty
    /// root.
    pub fn new(stage: &'a Stage, prim_map: &'a PrimMap) -> Self {
        let mut cursor = Self {
            stage,
            prim_map,
            entries: prim_map.iter(),
            root: None,
            iter: None,
        };
        cursor.reset();
        cursor
    }

    /// Path of the root whose subtree is being walked.
    pub fn current_root(&self) -> Option<&'a ScenePath> {
        self.root
    }

    /// Moves to the first prim of the next root with a non-empty range, or
    /// marks the cursor exhausted when no root is left.
    fn roll_forward(&mut self) {
        self.iter = None;
        self.root = None;

        for (path, &id) in self.entries.by_ref() {
            let iter = PrimRange::new(self.stage, id).begin();
            if iter.is_end() {
                log::trace!("Skipping empty root {}", path);
                continue;
            }
            log::trace!("Entering root {}", path);
            self.root = Some(path);
            self.iter = Some(iter);
            return;
        }
    }
}

impl<'a> PrimCursor<'a> for MapRangeCursor<'a> {
    fn reset(&mut self) {
        self.entries = self.prim_map.iter();
        self.roll_forward();
    }

    fn at_end(&self) -> bool {
        self.iter.is_none()
    }

    fn current(&self) -> &'a Prim {
        match self.iter.as_ref().and_then(PrimRangeIter::current) {
            Some(prim) => prim,
            None => exhausted("MapRangeCursor"),
        }
    }

    fn advance(&mut self) {
        let Some(iter) = self.iter.as_mut() else {
            return;
        };

        iter.advance();
        if iter.is_end() {
            self.roll_forward();
        }
    }

    fn prune_children(&mut self) {
        if let Some(iter) = self.iter.as_mut() {
            iter.prune_children();
        }
    }
}
