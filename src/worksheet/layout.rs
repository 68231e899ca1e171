//! Row geometry and anchor measurement
//!
//! Anchors are expressed relative to the drawing surface's own top-left
//! corner: the surface is a sibling of the rows, so subtracting its origin
//! keeps lines attached to the rows however the page is scrolled.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

/// Axis-aligned rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn mid_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            left: self.left + delta.x,
            top: self.top + delta.y,
            ..*self
        }
    }
}

/// Which worksheet column a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Term,
    Definition,
}

impl Column {
    fn prefix(self) -> &'static str {
        match self {
            Column::Term => "term-",
            Column::Definition => "definition-",
        }
    }

    /// Element id of row `index` in the worksheet DOM
    pub fn row_id(self, index: usize) -> String {
        format!("{}{}", self.prefix(), index)
    }

    /// Inverse of [`row_id`](Self::row_id)
    pub fn parse_row_id(id: &str) -> Option<(Column, usize)> {
        [Column::Term, Column::Definition]
            .into_iter()
            .find_map(|column| {
                let index = id.strip_prefix(column.prefix())?.parse().ok()?;
                Some((column, index))
            })
    }
}

/// Geometry source for the worksheet view.
///
/// `None` means the element is not laid out (not mounted yet, or hidden).
pub trait LayoutProvider {
    /// Bounding box of the line drawing surface
    fn surface_rect(&self) -> Option<Rect>;

    /// Bounding box of row `index` in `column`
    fn row_rect(&self, column: Column, index: usize) -> Option<Rect>;
}

/// Start and end of one connection line in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    /// Right-edge midpoint of the term row
    pub start: Vec2,
    /// Left-edge midpoint of the definition row
    pub end: Vec2,
}

/// Measure the anchors for a term/definition pair from live geometry
pub fn measure_anchors(
    layout: &dyn LayoutProvider,
    term_index: usize,
    definition_index: usize,
) -> Result<AnchorPair> {
    let missing = || QuizError::MissingAnchor {
        term_index,
        definition_index,
    };
    let surface = layout.surface_rect().ok_or_else(missing)?;
    let term = layout
        .row_rect(Column::Term, term_index)
        .ok_or_else(missing)?;
    let definition = layout
        .row_rect(Column::Definition, definition_index)
        .ok_or_else(missing)?;

    Ok(AnchorPair {
        start: Vec2::new(term.right() - surface.left, term.mid_y() - surface.top),
        end: Vec2::new(definition.left - surface.left, definition.mid_y() - surface.top),
    })
}

/// Two-column layout computed from a handful of metrics.
///
/// Used by the native front end and tests; the browser front end measures
/// real elements instead. Every row shares `row_height`; rows stack from
/// `header` below the surface top with `row_gap` between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub surface: Rect,
    /// Left edge and width of the term column, relative to the surface
    pub term_column: (f32, f32),
    /// Left edge and width of the definition column, relative to the surface
    pub definition_column: (f32, f32),
    pub header: f32,
    pub row_height: f32,
    pub row_gap: f32,
    pub term_rows: usize,
    pub definition_rows: usize,
    pub mounted: bool,
}

impl ColumnLayout {
    pub fn new(surface: Rect, term_rows: usize, definition_rows: usize) -> Self {
        Self {
            surface,
            term_column: (0.0, surface.width * 0.35),
            definition_column: (surface.width * 0.55, surface.width * 0.45),
            header: 48.0,
            row_height: 56.0,
            row_gap: 12.0,
            term_rows,
            definition_rows,
            mounted: true,
        }
    }

    /// Page scroll: the surface and every row move together
    pub fn scroll_by(&mut self, dy: f32) {
        self.surface = self.surface.translated(Vec2::new(0.0, -dy));
    }

    /// Resize the surface, keeping column proportions
    pub fn resize(&mut self, width: f32, height: f32) {
        let scale = if self.surface.width > 0.0 {
            width / self.surface.width
        } else {
            1.0
        };
        self.term_column = (self.term_column.0 * scale, self.term_column.1 * scale);
        self.definition_column = (
            self.definition_column.0 * scale,
            self.definition_column.1 * scale,
        );
        self.surface.width = width;
        self.surface.height = height;
    }

    fn row(&self, column: (f32, f32), index: usize) -> Rect {
        let top = self.surface.top + self.header + index as f32 * (self.row_height + self.row_gap);
        Rect::new(self.surface.left + column.0, top, column.1, self.row_height)
    }
}

impl LayoutProvider for ColumnLayout {
    fn surface_rect(&self) -> Option<Rect> {
        self.mounted.then_some(self.surface)
    }

    fn row_rect(&self, column: Column, index: usize) -> Option<Rect> {
        if !self.mounted {
            return None;
        }
        match column {
            Column::Term if index < self.term_rows => Some(self.row(self.term_column, index)),
            Column::Definition if index < self.definition_rows => {
                Some(self.row(self.definition_column, index))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ColumnLayout {
        let mut l = ColumnLayout::new(Rect::new(20.0, 300.0, 600.0, 400.0), 4, 4);
        l.term_column = (10.0, 200.0);
        l.definition_column = (350.0, 240.0);
        l.header = 40.0;
        l.row_height = 50.0;
        l.row_gap = 10.0;
        l
    }

    #[test]
    fn test_anchor_rule() {
        let anchors = measure_anchors(&layout(), 1, 2).expect("mounted");
        // Term row 1: left 10, width 200, top 40 + 60, mid 125
        assert_eq!(anchors.start, Vec2::new(210.0, 125.0));
        // Definition row 2: left 350, top 40 + 120, mid 185
        assert_eq!(anchors.end, Vec2::new(350.0, 185.0));
    }

    #[test]
    fn test_scroll_keeps_relative_anchors() {
        let mut l = layout();
        let before = measure_anchors(&l, 0, 3).expect("mounted");
        l.scroll_by(250.0);
        assert_eq!(l.surface_rect().map(|r| r.top), Some(50.0));
        assert_eq!(measure_anchors(&l, 0, 3).expect("mounted"), before);
    }

    #[test]
    fn test_unmounted_or_missing_row() {
        let mut l = layout();
        assert!(matches!(
            measure_anchors(&l, 4, 0),
            Err(QuizError::MissingAnchor {
                term_index: 4,
                definition_index: 0
            })
        ));
        l.mounted = false;
        assert!(measure_anchors(&l, 0, 0).is_err());
    }

    #[test]
    fn test_row_ids() {
        assert_eq!(Column::Term.row_id(3), "term-3");
        assert_eq!(Column::parse_row_id("definition-12"), Some((Column::Definition, 12)));
        assert_eq!(Column::parse_row_id("term-0"), Some((Column::Term, 0)));
        assert_eq!(Column::parse_row_id("term-"), None);
        assert_eq!(Column::parse_row_id("worksheet-lines"), None);
    }

    #[test]
    fn test_resize_scales_columns() {
        let mut l = layout();
        l.resize(300.0, 400.0);
        let anchors = measure_anchors(&l, 0, 0).expect("mounted");
        assert_eq!(anchors.start.x, 105.0);
        assert_eq!(anchors.end.x, 175.0);
    }
}
