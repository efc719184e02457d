#![warn(missing_docs)]

//! Assembly-tree to exchange-document conversion.
//!
//! Takes an in-memory assembly tree (parts, subassemblies, placements,
//! colors) and populates an OCAF-style labeled document ready for
//! STEP/IGES export. Geometry itself stays opaque: the document is
//! produced through the [`cadex_doc::DocumentKernel`] capability, so
//! the same conversion runs against a native exchange kernel or the
//! in-memory one bundled with `cadex-doc`.
//!
//! # Example
//!
//! ```rust
//! use cadex_assembly::{to_caf, Assembly, AssemblyTree};
//! use cadex_doc::{MemoryKernel, Rgba};
//! use cadex_math::Location;
//!
//! let mut assy = Assembly::new("chassis", vec!["plate"], Location::identity(), None);
//! let root = assy.root();
//! assy.add_child(
//!     root,
//!     "wheel",
//!     vec!["disc"],
//!     Location::translation(40.0, 0.0, 0.0),
//!     Some(Rgba::from_name("red").unwrap()),
//! )
//! .unwrap();
//!
//! let (top, doc) = to_caf(&assy, &MemoryKernel::new(), false).unwrap();
//! assert_eq!(doc.name_of(top), Some("CQ assembly"));
//! ```

mod caf;
mod tree;

pub use caf::{to_caf, CafError, DOC_FORMAT, ROOT_NAME};
pub use tree::{Assembly, AssemblyError, AssemblyTree, NodeKey};
