pub mod cursor;
pub mod format;
pub mod path;
pub mod physics;
pub mod prim;
pub mod range;
pub mod stage;
pub mod tree;
pub mod xform;

pub use cursor::{ExcludeListCursor, MapRangeCursor, PrimCursor, PrimMap, RangeCursor, TraversalCursor};
pub use format::FormatError;
pub use path::{PathError, ScenePath};
pub use physics::{load_physics_from_range, ObjectDesc, ObjectType, ParseError, ParseOptions};
pub use prim::{AttrValue, Prim, PrimId};
pub use range::PrimRange;
pub use stage::{Stage, StageError};
pub use tree::{walk_cursor, PrimVisitor};
pub use xform::Pose;
