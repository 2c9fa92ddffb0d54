//! Pieces, inventory entries and sheets.

use std::cmp::Ordering;

use u_cutplan_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// External inventory entry: `quantity` identical rectangles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PieceItem {
    /// Number of identical pieces.
    pub quantity: u32,
    /// Piece width.
    pub width: f64,
    /// Piece height.
    pub height: f64,
    /// Optional label carried to the placed leaves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
}

impl PieceItem {
    /// Creates an unlabeled inventory entry.
    pub fn new(quantity: u32, width: f64, height: f64) -> Self {
        Self {
            quantity,
            width,
            height,
            label: None,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Checks quantity and dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(Error::InvalidPiece(format!(
                "quantity must be at least 1 ({} x {})",
                self.width, self.height
            )));
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(Error::InvalidPiece(format!(
                "dimensions must be positive, got {} x {}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Expands this entry into `quantity` individual pieces.
    pub fn expand(&self) -> Vec<Piece> {
        let piece = Piece {
            width: self.width,
            height: self.height,
            label: self.label.clone(),
            fusion: None,
        };
        vec![piece; self.quantity as usize]
    }
}

/// Validates and expands an inventory, preserving entry order.
pub fn expand_items(items: &[PieceItem]) -> Result<Vec<Piece>> {
    let mut pieces = Vec::with_capacity(items.iter().map(|i| i.quantity as usize).sum());
    for item in items {
        item.validate()?;
        pieces.extend(item.expand());
    }
    Ok(pieces)
}

/// Axis along which the units of a composite piece are laid end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FusedAxis {
    /// Units side by side; the composite width is the sum of unit widths.
    Width,
    /// Units stacked; the composite height is the sum of unit heights.
    Height,
}

impl FusedAxis {
    fn flipped(self) -> Self {
        match self {
            FusedAxis::Width => FusedAxis::Height,
            FusedAxis::Height => FusedAxis::Width,
        }
    }
}

/// One original rectangle inside a composite piece.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FusedUnit {
    /// Length along the fused axis.
    pub along: f64,
    /// Length across the fused axis.
    pub across: f64,
    /// Label of the original piece.
    pub label: Option<String>,
}

/// Fusion record of a composite piece.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fusion {
    /// Axis the units are laid along.
    pub axis: FusedAxis,
    /// Units in placement order.
    pub units: Vec<FusedUnit>,
}

/// One axis-aligned placement option of a piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Placed width.
    pub width: f64,
    /// Placed height.
    pub height: f64,
    /// Whether width and height are swapped relative to the piece.
    pub rotated: bool,
}

/// A placement unit: an ordinary rectangle or a composite of fused rectangles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    width: f64,
    height: f64,
    label: Option<String>,
    fusion: Option<Fusion>,
}

impl Piece {
    /// Creates an ordinary rectangle.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            label: None,
            fusion: None,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Fuses units end to end along `axis`.
    ///
    /// The composite length along the axis is the sum of the unit lengths and
    /// the cross length is the largest unit cross length.
    pub fn fused(axis: FusedAxis, units: Vec<FusedUnit>) -> Self {
        let along: f64 = units.iter().map(|u| u.along).sum();
        let across = units.iter().map(|u| u.across).fold(0.0, f64::max);
        let (width, height) = match axis {
            FusedAxis::Width => (along, across),
            FusedAxis::Height => (across, along),
        };
        Self {
            width,
            height,
            label: None,
            fusion: Some(Fusion { axis, units }),
        }
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Bounding area (`width × height`).
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Sum of the areas of the original rectangles.
    pub fn net_area(&self) -> f64 {
        match &self.fusion {
            Some(f) => f.units.iter().map(|u| u.along * u.across).sum(),
            None => self.area(),
        }
    }

    /// Label of an ordinary piece.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Fusion record of a composite piece.
    pub fn fusion(&self) -> Option<&Fusion> {
        self.fusion.as_ref()
    }

    /// True for composites.
    pub fn is_fused(&self) -> bool {
        self.fusion.is_some()
    }

    /// Number of original rectangles represented.
    pub fn count(&self) -> usize {
        self.fusion.as_ref().map_or(1, |f| f.units.len())
    }

    /// True if this piece or any of its units carries a label.
    pub fn has_label(&self) -> bool {
        match &self.fusion {
            Some(f) => f.units.iter().any(|u| u.label.is_some()),
            None => self.label.is_some(),
        }
    }

    /// Longest side.
    pub fn longest_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Returns the piece turned by 90 degrees. A composite keeps its units
    /// and swaps its fused axis.
    pub fn rotated(&self) -> Piece {
        Piece {
            width: self.height,
            height: self.width,
            label: self.label.clone(),
            fusion: self.fusion.as_ref().map(|f| Fusion {
                axis: f.axis.flipped(),
                units: f.units.clone(),
            }),
        }
    }

    /// Returns the piece as placed in `orientation`.
    pub fn oriented(&self, orientation: Orientation) -> Piece {
        if orientation.rotated {
            self.rotated()
        } else {
            self.clone()
        }
    }

    /// Axis-aligned placement options; a square has only one.
    pub fn orientations(&self) -> Vec<Orientation> {
        let upright = Orientation {
            width: self.width,
            height: self.height,
            rotated: false,
        };
        if self.width == self.height {
            vec![upright]
        } else {
            vec![
                upright,
                Orientation {
                    width: self.height,
                    height: self.width,
                    rotated: true,
                },
            ]
        }
    }

    /// True if every unit of a composite has the same cross length.
    pub fn has_uniform_units(&self) -> bool {
        match &self.fusion {
            Some(f) => f.units.iter().all(|u| u.across == self.cross_length()),
            None => true,
        }
    }

    fn cross_length(&self) -> f64 {
        match self.fusion.as_ref().map(|f| f.axis) {
            Some(FusedAxis::Height) => self.width,
            _ => self.height,
        }
    }

    /// Splits a composite back into its original rectangles.
    pub fn into_units(self) -> Vec<Piece> {
        match self.fusion {
            None => vec![self],
            Some(f) => f
                .units
                .into_iter()
                .map(|u| {
                    let (width, height) = match f.axis {
                        FusedAxis::Width => (u.along, u.across),
                        FusedAxis::Height => (u.across, u.along),
                    };
                    Piece {
                        width,
                        height,
                        label: u.label,
                        fusion: None,
                    }
                })
                .collect(),
        }
    }
}

/// Canonical placement order: area descending, then longest side descending.
pub fn canonical_order(a: &Piece, b: &Piece) -> Ordering {
    b.area()
        .total_cmp(&a.area())
        .then_with(|| b.longest_side().total_cmp(&a.longest_side()))
}

/// Stable sort into canonical placement order.
pub fn sort_canonical(pieces: &mut [Piece]) {
    pieces.sort_by(canonical_order);
}

/// Splits every composite back into original rectangles.
pub fn unfuse_all(pieces: Vec<Piece>) -> Vec<Piece> {
    pieces.into_iter().flat_map(Piece::into_units).collect()
}

/// Stock sheet with an optional margin trimmed from every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sheet {
    /// Raw sheet width.
    pub width: f64,
    /// Raw sheet height.
    pub height: f64,
    /// Margin trimmed from each edge.
    #[cfg_attr(feature = "serde", serde(default))]
    pub margin: f64,
}

impl Sheet {
    /// Creates a sheet without margin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: 0.0,
        }
    }

    /// Sets the edge margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Width left after trimming both side margins.
    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Height left after trimming top and bottom margins.
    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// Usable area.
    pub fn usable_area(&self) -> f64 {
        self.usable_width() * self.usable_height()
    }

    /// Checks that some usable area remains.
    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::InvalidSheet(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        let (w, h) = (self.usable_width(), self.usable_height());
        if !(w.is_finite() && w > 0.0) || !(h.is_finite() && h > 0.0) {
            return Err(Error::InvalidSheet(format!(
                "usable area must be positive, got {} x {}",
                w, h
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(along: f64, across: f64, label: Option<&str>) -> FusedUnit {
        FusedUnit {
            along,
            across,
            label: label.map(String::from),
        }
    }

    #[test]
    fn test_expand_items() {
        let items = vec![
            PieceItem::new(2, 600.0, 400.0).with_label("door"),
            PieceItem::new(1, 300.0, 300.0),
        ];
        let pieces = expand_items(&items).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].label(), Some("door"));
        assert_eq!(pieces[2].area(), 90_000.0);
    }

    #[test]
    fn test_invalid_items() {
        assert!(PieceItem::new(0, 10.0, 10.0).validate().is_err());
        assert!(PieceItem::new(1, -1.0, 10.0).validate().is_err());
        assert!(PieceItem::new(1, 10.0, f64::NAN).validate().is_err());
        assert!(expand_items(&[PieceItem::new(1, 0.0, 5.0)]).is_err());
    }

    #[test]
    fn test_orientations() {
        assert_eq!(Piece::new(100.0, 100.0).orientations().len(), 1);
        let o = Piece::new(600.0, 400.0).orientations();
        assert_eq!(o.len(), 2);
        assert_eq!((o[1].width, o[1].height, o[1].rotated), (400.0, 600.0, true));
    }

    #[test]
    fn test_fused_dimensions() {
        let p = Piece::fused(
            FusedAxis::Width,
            vec![unit(600.0, 400.0, Some("a")), unit(500.0, 380.0, None)],
        );
        assert_eq!((p.width(), p.height()), (1100.0, 400.0));
        assert_eq!(p.count(), 2);
        assert!(p.has_label());
        assert!(!p.has_uniform_units());
        assert_eq!(p.net_area(), 600.0 * 400.0 + 500.0 * 380.0);

        let r = p.rotated();
        assert_eq!((r.width(), r.height()), (400.0, 1100.0));
        assert_eq!(r.fusion().map(|f| f.axis), Some(FusedAxis::Height));
    }

    #[test]
    fn test_into_units_restores_originals() {
        let p = Piece::fused(
            FusedAxis::Height,
            vec![unit(200.0, 500.0, Some("a")), unit(300.0, 500.0, Some("b"))],
        );
        let units = p.into_units();
        assert_eq!(units.len(), 2);
        assert_eq!((units[0].width(), units[0].height()), (500.0, 200.0));
        assert_eq!(units[1].label(), Some("b"));
    }

    #[test]
    fn test_canonical_order() {
        let mut pieces = vec![
            Piece::new(100.0, 100.0),
            Piece::new(200.0, 50.0),
            Piece::new(300.0, 300.0),
        ];
        sort_canonical(&mut pieces);
        assert_eq!(pieces[0].area(), 90_000.0);
        // Equal areas: longest side first.
        assert_eq!(pieces[1].width(), 200.0);
    }

    #[test]
    fn test_sheet_margin() {
        let sheet = Sheet::new(2750.0, 1850.0).with_margin(10.0);
        assert_eq!(sheet.usable_width(), 2730.0);
        assert_eq!(sheet.usable_height(), 1830.0);
        assert!(sheet.validate().is_ok());
        assert!(Sheet::new(100.0, 100.0).with_margin(50.0).validate().is_err());
        assert!(Sheet::new(0.0, 100.0).validate().is_err());
    }
}
