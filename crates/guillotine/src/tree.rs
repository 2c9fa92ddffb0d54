//! Guillotine cut tree.
//!
//! The tree alternates cut axes level by level:
//!
//! | Axis | Parent | Value measures | Meaning |
//! |------|--------|----------------|---------|
//! | `Root` | - | sheet width | usable sheet area |
//! | `X` | `Root` | width | vertical cut: column |
//! | `Y` | `X` | height | horizontal cut: strip inside a column |
//! | `Z` | `Y` | width | vertical sub-cut inside a strip |
//! | `W` | `Z` | height | horizontal sub-cut inside a `Z` |
//! | `Q` | `W` | width | vertical subdivision inside a `W` |
//!
//! Nodes live in an arena indexed by [`NodeId`] with explicit parent links,
//! so ancestor lookups walk upward instead of searching from the root.
//! Cloning a tree yields a fully independent copy.

use std::fmt;
use std::ops::Index;

use u_cutplan_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a node within one [`CutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Axis kind of a cut node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CutAxis {
    /// Usable sheet area.
    Root,
    /// Column (vertical cut across the sheet).
    X,
    /// Strip inside a column.
    Y,
    /// Vertical sub-cut inside a strip.
    Z,
    /// Horizontal sub-cut inside a `Z`.
    W,
    /// Vertical subdivision inside a `W`.
    Q,
}

impl CutAxis {
    /// The axis a node of this kind must hang under.
    pub fn parent_axis(self) -> Option<CutAxis> {
        match self {
            CutAxis::Root => None,
            CutAxis::X => Some(CutAxis::Root),
            CutAxis::Y => Some(CutAxis::X),
            CutAxis::Z => Some(CutAxis::Y),
            CutAxis::W => Some(CutAxis::Z),
            CutAxis::Q => Some(CutAxis::W),
        }
    }

    /// The axis of this node's children.
    pub fn child_axis(self) -> Option<CutAxis> {
        match self {
            CutAxis::Root => Some(CutAxis::X),
            CutAxis::X => Some(CutAxis::Y),
            CutAxis::Y => Some(CutAxis::Z),
            CutAxis::Z => Some(CutAxis::W),
            CutAxis::W => Some(CutAxis::Q),
            CutAxis::Q => None,
        }
    }

    /// True when the node's value is measured along the sheet width.
    pub fn measures_width(self) -> bool {
        matches!(self, CutAxis::Root | CutAxis::X | CutAxis::Z | CutAxis::Q)
    }

    /// Short name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            CutAxis::Root => "ROOT",
            CutAxis::X => "X",
            CutAxis::Y => "Y",
            CutAxis::Z => "Z",
            CutAxis::W => "W",
            CutAxis::Q => "Q",
        }
    }
}

impl fmt::Display for CutAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the cut tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CutNode {
    id: NodeId,
    axis: CutAxis,
    value: f64,
    multiplicity: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    label: Option<String>,
}

impl CutNode {
    /// Node identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Axis kind.
    pub fn axis(&self) -> CutAxis {
        self.axis
    }

    /// Length along this node's cut axis.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of identical siblings collapsed into this node.
    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    /// Parent node (None for the root).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Piece label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Extent of this node including its repeats.
    pub fn span(&self) -> f64 {
        self.value * self.multiplicity as f64
    }

    /// True for nodes that represent one placed piece rectangle:
    /// a childless `Z` or `W`, or any `Q`.
    pub fn is_piece_leaf(&self) -> bool {
        match self.axis {
            CutAxis::Z | CutAxis::W => self.children.is_empty(),
            CutAxis::Q => true,
            _ => false,
        }
    }
}

/// Axis-aligned rectangle of a placed piece, in sheet coordinates
/// (origin at the top-left corner of the usable area).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Piece label, if any.
    pub label: Option<String>,
    /// Leaf node this rectangle was derived from.
    pub node: NodeId,
}

impl PlacedRect {
    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True if the interiors of both rectangles intersect.
    pub fn overlaps(&self, other: &PlacedRect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Arena-backed guillotine cut tree for one sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CutTree {
    nodes: Vec<Option<CutNode>>,
    usable_width: f64,
    usable_height: f64,
}

impl CutTree {
    /// Creates an empty tree whose root spans the usable sheet area.
    pub fn new(usable_width: f64, usable_height: f64) -> Self {
        let root = CutNode {
            id: NodeId(0),
            axis: CutAxis::Root,
            value: usable_width,
            multiplicity: 1,
            parent: None,
            children: Vec::new(),
            label: None,
        };
        Self {
            nodes: vec![Some(root)],
            usable_width,
            usable_height,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Usable sheet width.
    pub fn usable_width(&self) -> f64 {
        self.usable_width
    }

    /// Usable sheet height.
    pub fn usable_height(&self) -> f64 {
        self.usable_height
    }

    /// Usable sheet area.
    pub fn usable_area(&self) -> f64 {
        self.usable_width * self.usable_height
    }

    /// Looks up a live node.
    pub fn get(&self, id: NodeId) -> Option<&CutNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut CutNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Finds a live node by identifier.
    pub fn find(&self, id: NodeId) -> Result<&CutNode> {
        self.get(id).ok_or(Error::NodeNotFound(id.0))
    }

    /// Children of a node (empty for unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(CutNode::children).unwrap_or(&[])
    }

    /// Columns of the sheet, left to right.
    pub fn columns(&self) -> &[NodeId] {
        self.children(self.root())
    }

    /// Iterates over every live node in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &CutNode> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when no cut has been made yet.
    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Nearest strict ancestor of `id` whose axis is `axis`.
    pub fn nearest_ancestor(&self, id: NodeId, axis: CutAxis) -> Option<NodeId> {
        let mut current = self.get(id)?.parent;
        while let Some(pid) = current {
            let node = self.get(pid)?;
            if node.axis == axis {
                return Some(pid);
            }
            current = node.parent;
        }
        None
    }

    /// Sum of `value × multiplicity` over the children of `id`.
    pub fn used_along(&self, id: NodeId) -> f64 {
        self.children(id).iter().map(|&c| self[c].span()).sum()
    }

    /// Inserts a node under `reference` or its nearest ancestor of the
    /// required parent axis. `X` nodes always go under the root.
    pub fn insert(
        &mut self,
        reference: NodeId,
        axis: CutAxis,
        value: f64,
        multiplicity: u32,
    ) -> Result<NodeId> {
        let reference_node = self.find(reference)?;
        let required = axis.parent_axis().ok_or_else(|| {
            Error::Internal("a second root cannot be inserted".into())
        })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidPiece(format!(
                "{} cut value must be positive, got {}",
                axis, value
            )));
        }
        if multiplicity == 0 {
            return Err(Error::InvalidPiece(format!(
                "{} cut multiplicity must be at least 1",
                axis
            )));
        }

        let parent = if required == CutAxis::Root {
            self.root()
        } else if reference_node.axis == required {
            reference
        } else {
            self.nearest_ancestor(reference, required)
                .ok_or(Error::MissingAncestor {
                    node: reference.0,
                    axis: required.name(),
                })?
        };

        Ok(self.add_child(parent, axis, value, multiplicity))
    }

    /// Appends a child to a known parent.
    ///
    /// The caller guarantees that `parent` is live and that `axis` is the
    /// parent's child axis.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        axis: CutAxis,
        value: f64,
        multiplicity: u32,
    ) -> NodeId {
        debug_assert_eq!(self.get(parent).and_then(|p| p.axis.child_axis()), Some(axis));
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(CutNode {
            id,
            axis,
            value,
            multiplicity: multiplicity.max(1),
            parent: Some(parent),
            children: Vec::new(),
            label: None,
        }));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Appends a labeled leaf to a known parent.
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        axis: CutAxis,
        value: f64,
        label: Option<String>,
    ) -> NodeId {
        let id = self.add_child(parent, axis, value, 1);
        if let Some(node) = self.get_mut(id) {
            node.label = label;
        }
        id
    }

    /// Deletes a node and all of its descendants.
    pub fn delete(&mut self, id: NodeId) -> Result<()> {
        if id == self.root() {
            return Err(Error::CannotDeleteRoot);
        }
        let parent = self.find(id)?.parent;
        if let Some(p) = parent.and_then(|pid| self.get_mut(pid)) {
            p.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Sets or clears the label of a node.
    pub fn set_label(&mut self, id: NodeId, label: Option<String>) -> Result<()> {
        let node = self.get_mut(id).ok_or(Error::NodeNotFound(id.0))?;
        node.label = label;
        Ok(())
    }

    /// Total area of placed pieces, expanding multiplicity at every level.
    pub fn placed_area(&self) -> f64 {
        self.area_below(self.root(), self.usable_width, self.usable_height)
    }

    fn area_below(&self, id: NodeId, width: f64, height: f64) -> f64 {
        let node = &self[id];
        let (width, height) = match node.axis {
            CutAxis::Root => (width, height),
            CutAxis::X | CutAxis::Z | CutAxis::Q => (node.value, height),
            CutAxis::Y | CutAxis::W => (width, node.value),
        };
        let own = if node.is_piece_leaf() {
            width * height
        } else {
            node.children
                .iter()
                .map(|&c| self.area_below(c, width, height))
                .sum()
        };
        own * node.multiplicity as f64
    }

    /// Placed area over usable area.
    pub fn utilization(&self) -> f64 {
        let usable = self.usable_area();
        if usable > 0.0 {
            self.placed_area() / usable
        } else {
            0.0
        }
    }

    /// Number of placed piece rectangles, expanding multiplicity.
    pub fn placed_piece_count(&self) -> usize {
        self.count_below(self.root())
    }

    fn count_below(&self, id: NodeId) -> usize {
        let node = &self[id];
        let own = if node.is_piece_leaf() {
            1
        } else {
            node.children.iter().map(|&c| self.count_below(c)).sum()
        };
        own * node.multiplicity as usize
    }

    /// Absolute rectangles of every placed piece, expanding multiplicity.
    ///
    /// Children are laid out in order from the parent's top-left corner:
    /// `X`, `Z` and `Q` children advance to the right, `Y` and `W` children
    /// advance downward.
    pub fn leaf_rects(&self) -> Vec<PlacedRect> {
        let mut out = Vec::new();
        let frame = Frame {
            x: 0.0,
            y: 0.0,
            width: self.usable_width,
            height: self.usable_height,
        };
        self.collect_rects(self.root(), frame, &mut out);
        out
    }

    fn collect_rects(&self, id: NodeId, frame: Frame, out: &mut Vec<PlacedRect>) {
        let node = &self[id];
        if node.is_piece_leaf() {
            out.push(PlacedRect {
                x: frame.x,
                y: frame.y,
                width: frame.width,
                height: frame.height,
                label: node.label.clone(),
                node: id,
            });
            return;
        }

        let mut offset = 0.0;
        for &child_id in &node.children {
            let child = &self[child_id];
            for _ in 0..child.multiplicity {
                let child_frame = if child.axis.measures_width() {
                    Frame {
                        x: frame.x + offset,
                        y: frame.y,
                        width: child.value,
                        height: frame.height,
                    }
                } else {
                    Frame {
                        x: frame.x,
                        y: frame.y + offset,
                        width: frame.width,
                        height: child.value,
                    }
                };
                self.collect_rects(child_id, child_frame, out);
                offset += child.value;
            }
        }
    }
}

impl Index<NodeId> for CutTree {
    type Output = CutNode;

    /// Panics on a deleted or foreign id; use [`CutTree::get`] when unsure.
    fn index(&self, id: NodeId) -> &CutNode {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {} is not part of this tree", id),
        }
    }
}
