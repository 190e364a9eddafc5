use std::collections::HashSet;

use super::{exhausted, PrimCursor};
use crate::path::ScenePath;
use crate::prim::Prim;
use crate::range::{PrimRange, PrimRangeIter};

/// Paths pruned by an [`ExcludeListCursor`].
pub type ExcludePathSet = HashSet<ScenePath>;

/// Cursor over a single range that never yields an excluded prim.
///
/// A prim is tested against the exclude set when it is reached; excluded
/// prims are pruned on the spot, so their descendants are never reached and
/// never need testing.
pub struct ExcludeListCursor<'a> {
    range: PrimRange<'a>,
    iter: PrimRangeIter<'a>,
    exclude: ExcludePathSet,
}

impl<'a> ExcludeListCursor<'a> {
    /// Creates a cursor over `range` that prunes every prim in `exclude_paths`.
    ///
    /// The exclude set is built once here and kept for the cursor's lifetime.
    pub fn new(range: PrimRange<'a>, exclude_paths: &[ScenePath]) -> Self {
        let mut cursor = Self {
            iter: range.begin(),
            range,
            exclude: exclude_paths.iter().cloned().collect(),
        };
        cursor.skip_excluded();
        cursor
    }

    /// Advances past excluded prims until a valid prim or the end is reached.
    fn skip_excluded(&mut self) {
        while let Some(prim) = self.iter.current() {
            if !self.exclude.contains(prim.path()) {
                break;
            }
            log::trace!("Pruning excluded prim {}", prim.path());
            self.iter.prune_children();
            self.iter.advance();
        }
    }
}

impl<'a> PrimCursor<'a> for ExcludeListCursor<'a> {
    fn reset(&mut self) {
        self.iter = self.range.begin();
        self.skip_excluded();
    }

    fn at_end(&self) -> bool {
        self.iter.is_end()
    }

    fn current(&self) -> &'a Prim {
        match self.iter.current() {
            Some(prim) => prim,
            None => exhausted("ExcludeListCursor"),
        }
    }

    fn advance(&mut self) {
        if self.iter.is_end() {
            return;
        }
        self.iter.advance();
        self.skip_excluded();
    }

    fn prune_children(&mut self) {
        if !self.at_end() {
            self.iter.prune_children();
        }
    }
}
