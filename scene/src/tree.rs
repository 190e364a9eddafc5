use crate::cursor::PrimCursor;
use crate::prim::Prim;

/// Trait for implementing per-prim work during a cursor walk.
///
/// Implementors of this trait can be passed to [`walk_cursor`] to inspect
/// each prim the cursor reaches and decide whether to descend into it.
pub trait PrimVisitor {
    /// Called for every prim reached by the walk.
    ///
    /// Returns true to continue into the prim's children, false to skip the
    /// subtree.
    fn enter_prim(&mut self, prim: &Prim) -> bool;
}

impl<F> PrimVisitor for F
where
    F: FnMut(&Prim) -> bool,
{
    fn enter_prim(&mut self, prim: &Prim) -> bool {
        self(prim)
    }
}

/// Drives `cursor` from its current position to the end, calling `visitor`
/// on every prim reached.
///
/// Works with any strategy since it only relies on the [`PrimCursor`]
/// contract. The cursor is not reset first. Returns the number of prims
/// visited.
pub fn walk_cursor<'a, C, V>(cursor: &mut C, visitor: &mut V) -> usize
where
    C: PrimCursor<'a> + ?Sized,
    V: PrimVisitor + ?Sized,
{
    let mut visited = 0;
    while !cursor.at_end() {
        let prim = cursor.current();
        visited += 1;

        if !visitor.enter_prim(prim) {
            cursor.prune_children();
        }
        cursor.advance();
    }
    visited
}
