//! Draw surface that records commands instead of rasterizing

use glam::Vec2;

use super::{Color, CubicCurve, DrawSurface, StrokeStyle, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Cubic {
        curve: CubicCurve,
        style: StrokeStyle,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Rect {
        min: Vec2,
        size: Vec2,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        style: TextStyle,
    },
}

/// Holds the commands issued since the last `clear`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCommand>,
    clears: u32,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
            clears: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames started (clears issued)
    pub fn clears(&self) -> u32 {
        self.clears
    }

    pub fn curves(&self) -> impl Iterator<Item = (&CubicCurve, &StrokeStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Cubic { curve, style } => Some((curve, style)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn stroke_cubic(&mut self, curve: &CubicCurve, style: &StrokeStyle) {
        self.commands.push(DrawCommand::Cubic {
            curve: *curve,
            style: *style,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect { min, size, color });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            pos,
            style: *style,
        });
    }
}
