//! In-memory exchange document.
//!
//! A complete [`DocumentKernel`] implementation backed by a slotmap.
//! Serves as the reference kernel for tests and as a staging structure
//! for exporters that walk the label graph directly.

use crate::{CafDocument, ColorKind, Compound, DocError, DocumentKernel, Label, Rgba};
use cadex_math::Location;
use slotmap::SlotMap;
use std::marker::PhantomData;

#[derive(Debug)]
struct LabelRecord<S> {
    name: Option<String>,
    shape: Option<Compound<S>>,
    colors: Vec<(ColorKind, Rgba)>,
    components: Vec<(Label, Location)>,
    is_assembly: bool,
    referrers: usize,
}

impl<S> LabelRecord<S> {
    fn empty() -> Self {
        Self {
            name: None,
            shape: None,
            colors: Vec::new(),
            components: Vec::new(),
            is_assembly: false,
            referrers: 0,
        }
    }
}

/// An exchange document held entirely in memory.
///
/// Component references are validated lazily: [`CafDocument::add_component`]
/// records the reference as-is, and [`CafDocument::update_assemblies`] is
/// the consistency pass that rejects dangling ones.
#[derive(Debug)]
pub struct MemoryDocument<S> {
    format: String,
    auto_naming: bool,
    next_auto: u64,
    labels: SlotMap<Label, LabelRecord<S>>,
}

impl<S> MemoryDocument<S> {
    fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            // Kernels generate names by default; callers opt out.
            auto_naming: true,
            next_auto: 0,
            labels: SlotMap::with_key(),
        }
    }

    fn record_mut(&mut self, label: Label) -> Result<&mut LabelRecord<S>, DocError> {
        self.labels.get_mut(label).ok_or(DocError::DeadLabel(label))
    }

    /// Storage format this document was created with.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Whether automatic label naming is enabled.
    pub fn auto_naming(&self) -> bool {
        self.auto_naming
    }

    /// Number of labels in the document.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the document has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels, in allocation order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.labels.keys()
    }

    /// The label's name, if alive and named.
    pub fn name_of(&self, label: Label) -> Option<&str> {
        self.labels.get(label)?.name.as_deref()
    }

    /// The compound attached to the label, if any.
    pub fn shape_of(&self, label: Label) -> Option<&Compound<S>> {
        self.labels.get(label)?.shape.as_ref()
    }

    /// The label's color for the given kind, if set.
    pub fn color_of(&self, label: Label, kind: ColorKind) -> Option<Rgba> {
        self.labels
            .get(label)?
            .colors
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| *c)
    }

    /// The label's components as `(child, placement)` pairs, in insertion order.
    pub fn components_of(&self, label: Label) -> Option<&[(Label, Location)]> {
        Some(&self.labels.get(label)?.components)
    }

    /// Whether the label was flagged as an assembly by the last
    /// [`CafDocument::update_assemblies`] pass.
    pub fn is_assembly(&self, label: Label) -> bool {
        self.labels.get(label).map_or(false, |r| r.is_assembly)
    }

    /// How many component entries reference this label, per the last
    /// [`CafDocument::update_assemblies`] pass.
    pub fn referrer_count(&self, label: Label) -> usize {
        self.labels.get(label).map_or(0, |r| r.referrers)
    }

    /// First label carrying the given name, in allocation order.
    pub fn find_by_name(&self, name: &str) -> Option<Label> {
        self.labels
            .iter()
            .find(|(_, r)| r.name.as_deref() == Some(name))
            .map(|(l, _)| l)
    }
}

impl<S> CafDocument for MemoryDocument<S> {
    type Shape = S;

    fn set_auto_naming(&mut self, enabled: bool) {
        self.auto_naming = enabled;
    }

    fn new_shape(&mut self) -> Label {
        let mut record = LabelRecord::empty();
        if self.auto_naming {
            record.name = Some(format!("Shape.{}", self.next_auto));
            self.next_auto += 1;
        }
        self.labels.insert(record)
    }

    fn set_shape(&mut self, label: Label, compound: Compound<S>) -> Result<(), DocError> {
        self.record_mut(label)?.shape = Some(compound);
        Ok(())
    }

    fn set_name(&mut self, label: Label, name: &str) -> Result<(), DocError> {
        self.record_mut(label)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_color(&mut self, label: Label, color: Rgba, kind: ColorKind) -> Result<(), DocError> {
        let record = self.record_mut(label)?;
        if let Some(slot) = record.colors.iter_mut().find(|(k, _)| *k == kind) {
            slot.1 = color;
        } else {
            record.colors.push((kind, color));
        }
        Ok(())
    }

    fn add_component(
        &mut self,
        parent: Label,
        child: Label,
        loc: &Location,
    ) -> Result<(), DocError> {
        self.record_mut(parent)?
            .components
            .push((child, loc.clone()));
        Ok(())
    }

    fn update_assemblies(&mut self) -> Result<(), DocError> {
        // Two passes: validate and count references, then flag assemblies.
        let mut counts: Vec<(Label, usize)> = Vec::new();
        for (parent, record) in &self.labels {
            for &(child, _) in &record.components {
                if !self.labels.contains_key(child) {
                    return Err(DocError::DanglingComponent { parent, child });
                }
                match counts.iter_mut().find(|(l, _)| *l == child) {
                    Some(entry) => entry.1 += 1,
                    None => counts.push((child, 1)),
                }
            }
        }
        for record in self.labels.values_mut() {
            record.is_assembly = !record.components.is_empty();
            record.referrers = 0;
        }
        for (label, n) in counts {
            // contains_key checked above
            self.labels[label].referrers = n;
        }
        Ok(())
    }
}

/// Kernel producing [`MemoryDocument`]s.
#[derive(Debug)]
pub struct MemoryKernel<S> {
    _shape: PhantomData<S>,
}

impl<S> MemoryKernel<S> {
    /// Create a memory kernel.
    pub fn new() -> Self {
        Self {
            _shape: PhantomData,
        }
    }
}

impl<S> Default for MemoryKernel<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> DocumentKernel for MemoryKernel<S> {
    type Shape = S;
    type Document = MemoryDocument<S>;

    fn new_document(&self, format: &str) -> MemoryDocument<S> {
        MemoryDocument::new(format)
    }
}
