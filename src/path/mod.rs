//! Path data model and curve evaluation
//!
//! Everything here is an immutable value snapshot supplied by the editor for
//! one invocation. Sequence order, not line order, decides execution order.

pub mod bezier;
pub mod model;

pub use bezier::{Segment, SegmentSample, sample_segment};
pub use model::{EventMarker, HeadingMode, Line, Point, SequenceItem, Shape, ShapeKind};
