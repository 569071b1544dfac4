//! Anchors: one-shot predicates selecting where an assembled trace starts.
//!
//! During assembly, frames are discarded from the front until an anchor first
//! accepts one; everything from that frame on is kept unconditionally.

use crate::frame::Frame;
use crate::identifier::{ClassIdentifier, FunctionIdentifier};

pub trait Anchor: Send + Sync {
    fn accepts(&self, index: usize, frame: &Frame) -> bool;
}

/// Skips the `offset` innermost frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewind {
    pub offset: usize,
}

impl Rewind {
    pub fn new(offset: usize) -> Self {
        Rewind { offset }
    }

    /// A copy adjusted for a nested capture: the capturing closure adds one
    /// frame of its own, so the derived anchor skips one more. The original
    /// is never mutated in place.
    pub fn for_nested_capture(&self) -> Rewind {
        Rewind {
            offset: self.offset + 1,
        }
    }
}

impl Anchor for Rewind {
    fn accepts(&self, index: usize, _frame: &Frame) -> bool {
        index >= self.offset
    }
}

/// Starts the trace at the first method frame of any listed class.
#[derive(Debug, Clone)]
pub struct ClassAnchor {
    pub identifiers: Vec<ClassIdentifier>,
}

impl ClassAnchor {
    pub fn new(identifiers: Vec<ClassIdentifier>) -> Self {
        ClassAnchor { identifiers }
    }
}

impl Anchor for ClassAnchor {
    fn accepts(&self, _index: usize, frame: &Frame) -> bool {
        let Some(class) = frame.function.class() else {
            return false;
        };

        self.identifiers
            .iter()
            .any(|identifier| class.equals(identifier))
    }
}

/// Starts the trace at the first frame of any listed function.
#[derive(Debug, Clone)]
pub struct FunctionAnchor {
    pub identifiers: Vec<FunctionIdentifier>,
}

impl FunctionAnchor {
    pub fn new(identifiers: Vec<FunctionIdentifier>) -> Self {
        FunctionAnchor { identifiers }
    }
}

impl Anchor for FunctionAnchor {
    fn accepts(&self, _index: usize, frame: &Frame) -> bool {
        self.identifiers
            .iter()
            .any(|identifier| frame.function.equals(identifier))
    }
}
