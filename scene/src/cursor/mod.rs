//! Traversal cursors over prim hierarchies.
//!
//! Every cursor exposes the same external iteration contract,
//! [`PrimCursor`], regardless of how it walks the stage:
//!
//! - [`RangeCursor`] walks a single [`PrimRange`](crate::PrimRange).
//! - [`MapRangeCursor`] stitches the ranges of several independent roots
//!   into one sequence, visiting roots in path order.
//! - [`ExcludeListCursor`] walks a single range while pruning every prim
//!   whose path is on an exclude list, along with its subtree.
//!
//! [`TraversalCursor`] is the closed sum of the three, for callers that
//! pick a strategy at runtime.
//!
//! A cursor is either *positioned* on a prim or *exhausted*. Once
//! exhausted it stays exhausted until [`PrimCursor::reset`].

mod exclude_list;
mod map_range;
mod range_cursor;

pub use exclude_list::{ExcludeListCursor, ExcludePathSet};
pub use map_range::{MapRangeCursor, PrimMap};
pub use range_cursor::RangeCursor;

use crate::prim::Prim;

/// External iteration contract shared by every traversal strategy.
///
/// The lifetime `'a` is the borrow of the stage (and of any root map) the
/// cursor walks; prims handed out by [`current`](Self::current) live that
/// long.
pub trait PrimCursor<'a> {
    /// Moves back to the first eligible prim of the source.
    fn reset(&mut self);

    /// Returns true if there is no current prim.
    fn at_end(&self) -> bool;

    /// The prim at the current position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is exhausted.
    fn current(&self) -> &'a Prim;

    /// Steps to the next eligible prim in pre-order, skipping pruned
    /// subtrees. No-op once exhausted.
    fn advance(&mut self);

    /// Skips the subtree below the current prim on the next
    /// [`advance`](Self::advance). Does not move the position. No-op once
    /// exhausted.
    fn prune_children(&mut self);
}

/// Runtime choice between the traversal strategies.
pub enum TraversalCursor<'a> {
    Range(RangeCursor<'a>),
    MapRange(MapRangeCursor<'a>),
    ExcludeList(ExcludeListCursor<'a>),
}

impl<'a> TraversalCursor<'a> {
    /// Short strategy name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Range(_) => "range",
            Self::MapRange(_) => "map-range",
            Self::ExcludeList(_) => "exclude-list",
        }
    }
}

impl<'a> PrimCursor<'a> for TraversalCursor<'a> {
    fn reset(&mut self) {
        match self {
            Self::Range(c) => c.reset(),
            Self::MapRange(c) => c.reset(),
            Self::ExcludeList(c) => c.reset(),
        }
    }

    fn at_end(&self) -> bool {
        match self {
            Self::Range(c) => c.at_end(),
            Self::MapRange(c) => c.at_end(),
            Self::ExcludeList(c) => c.at_end(),
        }
    }

    fn current(&self) -> &'a Prim {
        match self {
            Self::Range(c) => c.current(),
            Self::MapRange(c) => c.current(),
            Self::ExcludeList(c) => c.current(),
        }
    }

    fn advance(&mut self) {
        match self {
            Self::Range(c) => c.advance(),
            Self::MapRange(c) => c.advance(),
            Self::ExcludeList(c) => c.advance(),
        }
    }

    fn prune_children(&mut self) {
        match self {
            Self::Range(c) => c.prune_children(),
            Self::MapRange(c) => c.prune_children(),
            Self::ExcludeList(c) => c.prune_children(),
        }
    }
}

impl<'a> From<RangeCursor<'a>> for TraversalCursor<'a> {
    fn from(cursor: RangeCursor<'a>) -> Self {
        Self::Range(cursor)
    }
}

impl<'a> From<MapRangeCursor<'a>> for TraversalCursor<'a> {
    fn from(cursor: MapRangeCursor<'a>) -> Self {
        Self::MapRange(cursor)
    }
}

impl<'a> From<ExcludeListCursor<'a>> for TraversalCursor<'a> {
    fn from(cursor: ExcludeListCursor<'a>) -> Self {
        Self::ExcludeList(cursor)
    }
}

/// Fail-fast for [`PrimCursor::current`] on an exhausted cursor.
#[track_caller]
fn exhausted(strategy: &str) -> ! {
    panic!("{}: current() called on an exhausted cursor", strategy)
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
