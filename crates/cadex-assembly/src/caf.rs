//! Conversion of an assembly tree into an exchange document.

use crate::tree::AssemblyTree;
use cadex_doc::{CafDocument, ColorKind, Compound, DocError, DocumentKernel, Label};
use cadex_math::Location;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the fixed top-level root label.
pub const ROOT_NAME: &str = "CQ assembly";

/// Storage format requested for new exchange documents.
pub const DOC_FORMAT: &str = "XmlOcaf";

/// Errors from document conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CafError {
    /// A child was referenced by name before its label was recorded.
    ///
    /// The traversal contract guarantees children are visited before
    /// the nodes that reference them; hitting this means the input
    /// tree's [`AssemblyTree::traverse`] broke that contract. Fatal,
    /// never recovered.
    #[error("subassembly {0:?} referenced before it was recorded")]
    MissingSubassembly(String),

    /// The underlying document kernel failed.
    #[error(transparent)]
    Doc(#[from] DocError),
}

/// Build an exchange document from an assembly tree.
///
/// Creates two labels per tree node — a leaf part label named
/// `"{name}_part"` holding the compound of the node's own shapes, and
/// an assembly label named `"{name}"` holding the positioned instances —
/// plus one top-level root label named [`ROOT_NAME`], and returns the
/// root label together with its owning document, ready for the kernel's
/// STEP/IGES/XML export routines.
///
/// `colored_step` selects the color policy:
///
/// * `true` — STEP-style inheritance: each node takes the nearest
///   ancestor color (starting with its own) and applies it to the
///   *part* label, as downstream STEP viewers expect.
/// * `false` — only a node's own color is used, applied to the
///   *assembly* label.
///
/// One-shot and synchronous: calling it twice produces two independent
/// documents, and the input tree is never mutated. On error the
/// partially built document is discarded.
pub fn to_caf<T, K>(
    tree: &T,
    kernel: &K,
    colored_step: bool,
) -> Result<(Label, K::Document), CafError>
where
    T: AssemblyTree,
    K: DocumentKernel<Shape = T::Shape>,
{
    let mut doc = kernel.new_document(DOC_FORMAT);
    // Explicit names are authoritative
    doc.set_auto_naming(false);

    let top = doc.new_shape();
    doc.set_name(top, ROOT_NAME)?;

    // Single-pass memo table: a node's entry must exist before any
    // other node references it as a child (define before use).
    let mut subassys: HashMap<String, (Label, Location)> = HashMap::new();

    for (name, node) in tree.traverse() {
        let part = doc.new_shape();
        doc.set_shape(part, Compound::from_shapes(tree.shapes(node).iter().cloned()))?;
        doc.set_name(part, &format!("{name}_part"))?;

        let subassy = doc.new_shape();
        doc.add_component(subassy, part, &Location::identity())?;
        doc.set_name(subassy, &name)?;

        if colored_step {
            let mut color = tree.color(node).copied();
            let mut cur = node;
            while color.is_none() {
                match tree.parent(cur) {
                    Some(p) => {
                        color = tree.color(p).copied();
                        cur = p;
                    }
                    None => break,
                }
            }
            if let Some(c) = color {
                doc.set_color(part, c, ColorKind::Surface)?;
            }
        } else if let Some(c) = tree.color(node).copied() {
            doc.set_color(subassy, c, ColorKind::Surface)?;
        }

        subassys.insert(name, (subassy, tree.loc(node).clone()));

        for &child in tree.children(node) {
            let child_name = tree.name(child);
            let (child_label, child_loc) = subassys
                .get(child_name)
                .ok_or_else(|| CafError::MissingSubassembly(child_name.to_string()))?;
            doc.add_component(subassy, *child_label, child_loc)?;
        }
    }

    let root_name = tree.name(tree.root());
    let (root_label, root_loc) = subassys
        .get(root_name)
        .ok_or_else(|| CafError::MissingSubassembly(root_name.to_string()))?;
    doc.add_component(top, *root_label, root_loc)?;

    doc.update_assemblies()?;

    Ok((top, doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Assembly;
    use cadex_doc::{MemoryDocument, MemoryKernel, Rgba};

    #[derive(Debug, Clone, PartialEq)]
    struct Solid(&'static str);

    type Doc = MemoryDocument<Solid>;

    fn kernel() -> MemoryKernel<Solid> {
        MemoryKernel::new()
    }

    fn red() -> Rgba {
        Rgba::from_name("red").unwrap()
    }

    /// Root "R" (no color) with one child "A" (red, one box shape).
    fn two_level(colored: Option<Rgba>) -> Assembly<Solid> {
        let mut assy = Assembly::new("R", vec![], Location::translation(1.0, 0.0, 0.0), None);
        let r = assy.root();
        assy.add_child(
            r,
            "A",
            vec![Solid("box")],
            Location::translation(0.0, 2.0, 0.0),
            colored,
        )
        .unwrap();
        assy
    }

    #[test]
    fn creates_two_labels_per_node_plus_root() {
        let mut assy = two_level(None);
        let r = assy.root();
        let b = assy
            .add_child(r, "B", vec![], Location::identity(), None)
            .unwrap();
        assy.add_child(b, "C", vec![], Location::identity(), None)
            .unwrap();

        let (_, doc): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();
        // 4 nodes -> 4 part labels + 4 assembly labels + 1 root
        assert_eq!(doc.len(), 9);
        for (name, _) in assy.traverse() {
            assert!(doc.find_by_name(&name).is_some());
            assert!(doc.find_by_name(&format!("{name}_part")).is_some());
        }
    }

    #[test]
    fn part_holds_compound_of_own_shapes_only() {
        let assy = two_level(None);
        let (_, doc): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();

        let a_part = doc.find_by_name("A_part").unwrap();
        assert_eq!(doc.shape_of(a_part).unwrap().shapes(), &[Solid("box")]);

        // R owns no shapes; its part compound is empty, not A's box
        let r_part = doc.find_by_name("R_part").unwrap();
        assert!(doc.shape_of(r_part).unwrap().is_empty());
    }

    #[test]
    fn children_wired_with_their_own_placement() {
        let assy = two_level(None);
        let (top, doc): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();

        let r_assy = doc.find_by_name("R").unwrap();
        let a_assy = doc.find_by_name("A").unwrap();
        let a_part = doc.find_by_name("A_part").unwrap();

        // R's assembly label: own part at identity, then A at A's placement
        let comps = doc.components_of(r_assy).unwrap();
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[1], (a_assy, Location::translation(0.0, 2.0, 0.0)));

        // A's assembly label: just its part at identity
        assert_eq!(
            doc.components_of(a_assy).unwrap(),
            &[(a_part, Location::identity())]
        );

        // Top-level root holds R at R's placement
        assert_eq!(doc.name_of(top), Some(ROOT_NAME));
        assert_eq!(
            doc.components_of(top).unwrap(),
            &[(r_assy, Location::translation(1.0, 0.0, 0.0))]
        );
    }

    #[test]
    fn plain_policy_colors_assembly_label_only() {
        let assy = two_level(Some(red()));
        let (_, doc): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();

        let a_assy = doc.find_by_name("A").unwrap();
        let a_part = doc.find_by_name("A_part").unwrap();
        assert_eq!(doc.color_of(a_assy, ColorKind::Surface), Some(red()));
        assert_eq!(doc.color_of(a_part, ColorKind::Surface), None);
    }

    #[test]
    fn plain_policy_never_inherits() {
        // Parent colored, child not: child must stay uncolored
        let mut assy = Assembly::new("R", vec![], Location::identity(), Some(red()));
        let r = assy.root();
        assy.add_child(r, "A", vec![Solid("box")], Location::identity(), None)
            .unwrap();

        let (_, doc): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();
        let a_assy = doc.find_by_name("A").unwrap();
        let a_part = doc.find_by_name("A_part").unwrap();
        assert_eq!(doc.color_of(a_assy, ColorKind::Surface), None);
        assert_eq!(doc.color_of(a_part, ColorKind::Surface), None);
    }

    #[test]
    fn step_policy_inherits_nearest_ancestor_onto_part() {
        // R (red) -> M (no color) -> A (no color)
        let mut assy = Assembly::new("R", vec![], Location::identity(), Some(red()));
        let r = assy.root();
        let m = assy
            .add_child(r, "M", vec![], Location::identity(), None)
            .unwrap();
        assy.add_child(m, "A", vec![Solid("box")], Location::identity(), None)
            .unwrap();

        let (_, doc): (Label, Doc) = to_caf(&assy, &kernel(), true).unwrap();
        let a_part = doc.find_by_name("A_part").unwrap();
        let a_assy = doc.find_by_name("A").unwrap();
        assert_eq!(doc.color_of(a_part, ColorKind::Surface), Some(red()));
        assert_eq!(doc.color_of(a_assy, ColorKind::Surface), None);
    }

    #[test]
    fn step_policy_own_color_beats_ancestor() {
        let blue = Rgba::from_name("blue").unwrap();
        let mut assy = Assembly::new("R", vec![], Location::identity(), Some(red()));
        let r = assy.root();
        assy.add_child(r, "A", vec![Solid("box")], Location::identity(), Some(blue))
            .unwrap();

        let (_, doc): (Label, Doc) = to_caf(&assy, &kernel(), true).unwrap();
        let a_part = doc.find_by_name("A_part").unwrap();
        assert_eq!(doc.color_of(a_part, ColorKind::Surface), Some(blue));
    }

    #[test]
    fn update_assemblies_ran_on_result() {
        let assy = two_level(None);
        let (top, doc): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();

        assert!(doc.is_assembly(top));
        assert!(doc.is_assembly(doc.find_by_name("R").unwrap()));
        let a_part = doc.find_by_name("A_part").unwrap();
        assert!(!doc.is_assembly(a_part));
        assert_eq!(doc.referrer_count(a_part), 1);
    }

    #[test]
    fn conversion_is_repeatable_and_nonmutating() {
        let assy = two_level(Some(red()));
        let (_, d1): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();
        let (_, d2): (Label, Doc) = to_caf(&assy, &kernel(), false).unwrap();
        assert_eq!(d1.len(), d2.len());
        assert_eq!(assy.len(), 2);
    }

    /// A tree whose traverse() yields parents first, violating the
    /// define-before-use contract.
    struct PreorderTree {
        loc: Location,
    }

    impl AssemblyTree for PreorderTree {
        type Shape = Solid;
        type NodeId = usize;

        fn root(&self) -> usize {
            0
        }

        fn name(&self, node: usize) -> &str {
            ["top", "leaf"][node]
        }

        fn loc(&self, _node: usize) -> &Location {
            &self.loc
        }

        fn color(&self, _node: usize) -> Option<&Rgba> {
            None
        }

        fn shapes(&self, _node: usize) -> &[Solid] {
            &[]
        }

        fn children(&self, node: usize) -> &[usize] {
            if node == 0 {
                &[1]
            } else {
                &[]
            }
        }

        fn parent(&self, node: usize) -> Option<usize> {
            (node == 1).then_some(0)
        }

        fn traverse(&self) -> Vec<(String, usize)> {
            vec![("top".to_string(), 0), ("leaf".to_string(), 1)]
        }
    }

    #[test]
    fn broken_traversal_order_fails_fast() {
        let tree = PreorderTree {
            loc: Location::identity(),
        };
        let err = to_caf(&tree, &kernel(), false).unwrap_err();
        assert_eq!(err, CafError::MissingSubassembly("leaf".to_string()));
    }
}
