//! Depth-first prim ranges.
//!
//! A [`PrimRange`] describes the pre-order traversal of one subtree of a
//! [`Stage`]. Its position type, [`PrimRangeIter`], supports skipping the
//! descendants of the current prim, which is the primitive every traversal
//! cursor is built on.
//!
//! Inactive prims are never yielded and neither are their descendants. A
//! range rooted at a prim that is not active in the hierarchy is empty.

use crate::prim::{Prim, PrimId};
use crate::stage::Stage;

/// The pre-order range over the subtree rooted at one prim.
#[derive(Clone, Copy)]
pub struct PrimRange<'a> {
    stage: &'a Stage,
    root: PrimId,
}

impl<'a> PrimRange<'a> {
    pub fn new(stage: &'a Stage, root: PrimId) -> Self {
        Self { stage, root }
    }

    /// Position at the first prim of the range, or at the end if the range
    /// yields nothing.
    pub fn begin(&self) -> PrimRangeIter<'a> {
        let current = if self.stage.is_active_in_hierarchy(self.root) {
            Some(self.root)
        } else {
            None
        };
        PrimRangeIter {
            stage: self.stage,
            current,
            stack: Vec::new(),
            prune_pending: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.begin().is_end()
    }

    /// Plain iteration over the range without pruning.
    pub fn iter(&self) -> Prims<'a> {
        Prims { iter: self.begin() }
    }
}

/// A position within a [`PrimRange`].
///
/// Iteration keeps an explicit stack of pending prims and never recurses,
/// so arbitrarily deep hierarchies are safe to walk.
#[derive(Clone)]
pub struct PrimRangeIter<'a> {
    stage: &'a Stage,
    current: Option<PrimId>,
    stack: Vec<PrimId>,
    prune_pending: bool,
}

impl<'a> PrimRangeIter<'a> {
    /// Returns true once the range is exhausted.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn current(&self) -> Option<&'a Prim> {
        self.current.and_then(|id| self.stage.get_prim(id))
    }

    /// Steps to the next prim in pre-order. No-op at the end.
    pub fn advance(&mut self) {
        let Some(id) = self.current else {
            return;
        };

        let skip_children = std::mem::take(&mut self.prune_pending);
        if !skip_children {
            if let Some(prim) = self.stage.get_prim(id) {
                // Push in reverse so the first child is popped first
                for &child in prim.children().iter().rev() {
                    if self.stage.get_prim(child).is_some_and(Prim::is_active) {
                        self.stack.push(child);
                    }
                }
            }
        }

        self.current = self.stack.pop();
    }

    /// Skips the descendants of the current prim on the next `advance`.
    /// No-op at the end.
    pub fn prune_children(&mut self) {
        if self.current.is_some() {
            self.prune_pending = true;
        }
    }
}

/// Iterator adapter over a [`PrimRange`].
pub struct Prims<'a> {
    iter: PrimRangeIter<'a>,
}

impl<'a> Iterator for Prims<'a> {
    type Item = &'a Prim;

    fn next(&mut self) -> Option<Self::Item> {
        let prim = self.iter.current()?;
        self.iter.advance();
        Some(prim)
    }
}
