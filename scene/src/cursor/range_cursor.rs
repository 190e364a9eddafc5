use super::{exhausted, PrimCursor};
use crate::prim::Prim;
use crate::range::{PrimRange, PrimRangeIter};

/// Cursor over a single depth-first [`PrimRange`].
pub struct RangeCursor<'a> {
    range: PrimRange<'a>,
    iter: PrimRangeIter<'a>,
}

impl<'a> RangeCursor<'a> {
    /// Creates a cursor positioned at the first prim of `range`.
    pub fn new(range: PrimRange<'a>) -> Self {
        Self {
            iter: range.begin(),
            range,
        }
    }
}

impl<'a> PrimCursor<'a> for RangeCursor<'a> {
    fn reset(&mut self) {
        self.iter = self.range.begin();
    }

    fn at_end(&self) -> bool {
        self.iter.is_end()
    }

    fn current(&self) -> &'a Prim {
        match self.iter.current() {
            Some(prim) => prim,
            None => exhausted("RangeCursor"),
        }
    }

    fn advance(&mut self) {
        self.iter.advance();
    }

    fn prune_children(&mut self) {
        if !self.at_end() {
            self.iter.prune_children();
        }
    }
}
