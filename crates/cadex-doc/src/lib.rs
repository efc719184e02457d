#![warn(missing_docs)]

//! OCAF-style labeled document model for CAD exchange.
//!
//! An exchange document is a graph of opaque [`Label`] nodes carrying
//! names, compound shapes, colors, and placed component references —
//! the structure STEP/IGES/XML exporters consume. The document itself
//! is abstracted behind the [`CafDocument`] trait and created through a
//! [`DocumentKernel`], so assembly-level code can run unchanged against
//! a native exchange kernel or the bundled in-memory implementation
//! ([`MemoryKernel`]).

mod color;
mod error;
mod memory;

pub use color::{ColorError, Rgba};
pub use error::DocError;
pub use memory::{MemoryDocument, MemoryKernel};

use cadex_math::Location;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to a node in an exchange document graph.
    pub struct Label;
}

/// Which aspect of a labeled shape a color applies to.
///
/// Mirrors the color classes of the usual exchange kernels; STEP
/// surface styling uses [`ColorKind::Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorKind {
    /// Color of the shape's surfaces.
    Surface,
    /// Color of the shape's curves/edges.
    Curve,
    /// Generic (unclassified) color.
    Generic,
}

/// A composite shape aggregating leaf shapes into one entity.
///
/// Documents attach one compound per shape label; a part's individual
/// solids are gathered into a single compound before attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound<S> {
    shapes: Vec<S>,
}

impl<S> Compound<S> {
    /// Gather shapes into one compound.
    pub fn from_shapes(shapes: impl IntoIterator<Item = S>) -> Self {
        Self {
            shapes: shapes.into_iter().collect(),
        }
    }

    /// The leaf shapes, in insertion order.
    pub fn shapes(&self) -> &[S] {
        &self.shapes
    }

    /// Number of leaf shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the compound holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// A mutable exchange document: a graph of labels ready for export.
///
/// Setters take a live [`Label`] previously returned by
/// [`CafDocument::new_shape`] on the same document; passing a label
/// from another document is an error.
pub trait CafDocument {
    /// The opaque geometry type attached to shape labels.
    type Shape;

    /// Enable or disable automatic label naming.
    ///
    /// When enabled (the usual kernel default), freshly created labels
    /// receive a generated name; callers that assign explicit names
    /// disable this first so their names are authoritative.
    fn set_auto_naming(&mut self, enabled: bool);

    /// Allocate a fresh label.
    fn new_shape(&mut self) -> Label;

    /// Attach a compound shape to a label, replacing any previous one.
    fn set_shape(&mut self, label: Label, compound: Compound<Self::Shape>) -> Result<(), DocError>;

    /// Set the label's name, replacing any previous (or generated) one.
    fn set_name(&mut self, label: Label, name: &str) -> Result<(), DocError>;

    /// Set the label's color for one [`ColorKind`].
    fn set_color(&mut self, label: Label, color: Rgba, kind: ColorKind) -> Result<(), DocError>;

    /// Add `child` as a component of `parent`, placed at `loc`.
    fn add_component(&mut self, parent: Label, child: Label, loc: &Location)
        -> Result<(), DocError>;

    /// Recompute assembly state across the whole document.
    ///
    /// Re-derives which labels are assemblies (those with components)
    /// and validates every component reference.
    fn update_assemblies(&mut self) -> Result<(), DocError>;
}

/// Capability to create exchange documents.
///
/// Injected into assembly-level code so it can be exercised against a
/// fake kernel in tests and a native one in production.
pub trait DocumentKernel {
    /// The opaque geometry type this kernel understands.
    type Shape;
    /// The document type this kernel produces.
    type Document: CafDocument<Shape = Self::Shape>;

    /// Create a new, empty document using the given storage format
    /// (e.g. `"XmlOcaf"`).
    fn new_document(&self, format: &str) -> Self::Document;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_gathers_in_order() {
        let c = Compound::from_shapes(["a", "b", "c"]);
        assert_eq!(c.len(), 3);
        assert!(!c.is_empty());
        assert_eq!(c.shapes(), &["a", "b", "c"]);
    }

    #[test]
    fn empty_compound() {
        let c: Compound<u32> = Compound::from_shapes([]);
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn color_kind_serde() {
        let json = serde_json::to_string(&ColorKind::Surface).unwrap();
        let restored: ColorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ColorKind::Surface);
    }
}
