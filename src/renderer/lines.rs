//! Connection lines over the worksheet
//!
//! A connection with cached anchors is drawn exactly where its rows were
//! when the shot resolved, even if the layout has moved since. Connections
//! without a cache, and the live selection, are measured on every draw.

use super::{Color, CubicCurve, DrawSurface, StrokeStyle, colors};
use crate::worksheet::{AnchorPair, Connection, LayoutProvider, LiveSelection, Worksheet, measure_anchors};

/// Stroke metrics for recorded and live lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    pub endpoint_radius: f32,
    pub live_width: f32,
    pub live_endpoint_radius: f32,
    pub live_dash: (f32, f32),
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 4.0,
            endpoint_radius: 6.0,
            live_width: 2.0,
            live_endpoint_radius: 5.0,
            live_dash: (5.0, 5.0),
        }
    }
}

/// Something that invalidates the drawn lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawTrigger {
    ConnectionsChanged,
    RoundChanged,
    Resize,
    /// Scroll events arrive in bursts; they are coalesced into the next frame
    Scroll,
}

fn draw_line(
    surface: &mut dyn DrawSurface,
    anchors: &AnchorPair,
    stroke: StrokeStyle,
    endpoint_radius: f32,
) {
    surface.stroke_cubic(&CubicCurve::s_curve(anchors.start, anchors.end), &stroke);
    surface.fill_circle(anchors.start, endpoint_radius, stroke.color);
    surface.fill_circle(anchors.end, endpoint_radius, stroke.color);
}

/// Clear `surface` and draw every connection plus the live selection.
///
/// Returns the number of lines drawn. A connection whose anchors are
/// neither cached nor measurable is skipped for this frame.
pub fn render_connections(
    connections: &[Connection],
    live: Option<LiveSelection>,
    layout: &dyn LayoutProvider,
    style: &LineStyle,
    surface: &mut dyn DrawSurface,
) -> usize {
    surface.clear();
    let mut drawn = 0;

    for connection in connections {
        let anchors = match connection.anchors {
            Some(cached) => cached,
            None => match measure_anchors(layout, connection.term_index, connection.definition_index) {
                Ok(measured) => measured,
                Err(e) => {
                    log::warn!("Skipping connection line: {}", e);
                    continue;
                }
            },
        };
        let color: Color = if connection.correct {
            colors::CORRECT
        } else {
            colors::WRONG
        };
        draw_line(
            surface,
            &anchors,
            StrokeStyle {
                color,
                width: style.width,
                dash: None,
            },
            style.endpoint_radius,
        );
        drawn += 1;
    }

    if let Some(sel) = live {
        match measure_anchors(layout, sel.term_index, sel.definition_index) {
            Ok(anchors) => {
                draw_line(
                    surface,
                    &anchors,
                    StrokeStyle {
                        color: colors::LIVE,
                        width: style.live_width,
                        dash: Some(style.live_dash),
                    },
                    style.live_endpoint_radius,
                );
                drawn += 1;
            }
            Err(e) => log::debug!("Live selection not drawable yet: {}", e),
        }
    }

    drawn
}

/// Redraws the line overlay when the worksheet or its layout changes
#[derive(Debug, Clone, Default)]
pub struct LineRenderer {
    pub style: LineStyle,
    dirty: bool,
    seen_revision: Option<u64>,
    seen_round: Option<usize>,
    redraws: u64,
}

impl LineRenderer {
    pub fn new(style: LineStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Request a redraw on the next frame
    pub fn notify(&mut self, trigger: RedrawTrigger) {
        log::trace!("Line redraw requested: {:?}", trigger);
        self.dirty = true;
    }

    pub fn needs_redraw(&self, worksheet: &Worksheet) -> bool {
        self.dirty
            || self.seen_revision != Some(worksheet.revision())
            || self.seen_round != Some(worksheet.current_round())
            || worksheet.live_selection().is_some()
    }

    /// Total redraws performed
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Per-frame hook: redraw if anything changed since the last draw.
    ///
    /// Connection and round changes are picked up from the worksheet
    /// itself; layout changes need a [`notify`](Self::notify). A live
    /// selection is redrawn every frame so it tracks the layout.
    pub fn frame(
        &mut self,
        worksheet: &Worksheet,
        layout: &dyn LayoutProvider,
        surface: &mut dyn DrawSurface,
    ) -> bool {
        if !self.needs_redraw(worksheet) {
            return false;
        }
        render_connections(
            worksheet.connections().as_slice(),
            worksheet.live_selection(),
            layout,
            &self.style,
            surface,
        );
        self.dirty = false;
        self.seen_revision = Some(worksheet.revision());
        self.seen_round = Some(worksheet.current_round());
        self.redraws += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingSurface};
    use crate::sim::pairs::{Pair, PairSet};
    use crate::sim::state::ShotOutcome;
    use crate::worksheet::{ColumnLayout, Rect};

    fn sheet() -> Worksheet {
        let pairs = PairSet::new(vec![
            Pair::new("TCP", "Reliable byte stream"),
            Pair::new("UDP", "Unreliable datagrams"),
            Pair::new("IP", "Packet addressing"),
            Pair::new("ARP", "Address resolution on a LAN"),
        ])
        .expect("valid pairs");
        Worksheet::new(&pairs, 11)
    }

    fn layout() -> ColumnLayout {
        ColumnLayout::new(Rect::new(0.0, 100.0, 600.0, 400.0), 4, 4)
    }

    fn shoot(sheet: &mut Worksheet, layout: &ColumnLayout, round: usize, definition: &str, correct: bool) {
        sheet
            .record_outcome(
                &ShotOutcome {
                    round_index: round,
                    definition,
                    correct,
                },
                layout,
            )
            .expect("recorded");
    }

    #[test]
    fn test_line_style_by_correctness() {
        let mut ws = sheet();
        let layout = layout();
        shoot(&mut ws, &layout, 0, "Reliable byte stream", true);
        shoot(&mut ws, &layout, 1, "Packet addressing", false);

        let mut surface = RecordingSurface::new(600.0, 400.0);
        let drawn = render_connections(
            ws.connections().as_slice(),
            None,
            &layout,
            &LineStyle::default(),
            &mut surface,
        );
        assert_eq!(drawn, 2);

        let curves: Vec<_> = surface.curves().collect();
        assert_eq!(curves[0].1.color, colors::CORRECT);
        assert_eq!(curves[1].1.color, colors::WRONG);
        assert!(curves.iter().all(|(_, s)| s.width == 4.0 && s.dash.is_none()));

        let first = ws.connections().as_slice()[0].anchors.expect("cached");
        assert_eq!(curves[0].0.start, first.start);
        assert_eq!(curves[0].0.end, first.end);
        let dots = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { radius, .. } if *radius == 6.0))
            .count();
        assert_eq!(dots, 4);
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let mut ws = sheet();
        let layout = layout();
        shoot(&mut ws, &layout, 0, "Unreliable datagrams", false);

        let mut surface = RecordingSurface::new(600.0, 400.0);
        let style = LineStyle::default();
        render_connections(ws.connections().as_slice(), None, &layout, &style, &mut surface);
        let once = surface.commands().to_vec();
        render_connections(ws.connections().as_slice(), None, &layout, &style, &mut surface);
        assert_eq!(surface.commands(), once.as_slice());
        assert_eq!(surface.clears(), 2);
    }

    #[test]
    fn test_cached_line_stays_put_fallback_follows_layout() {
        let mut ws = sheet();
        let mut layout = layout();
        shoot(&mut ws, &layout, 0, "Reliable byte stream", true);

        layout.mounted = false;
        shoot(&mut ws, &layout, 1, "Unreliable datagrams", true);
        layout.mounted = true;

        let style = LineStyle::default();
        let mut surface = RecordingSurface::new(600.0, 400.0);
        render_connections(ws.connections().as_slice(), None, &layout, &style, &mut surface);
        let before: Vec<CubicCurve> = surface.curves().map(|(c, _)| *c).collect();

        // Rows grow taller between draws
        layout.row_height += 30.0;
        render_connections(ws.connections().as_slice(), None, &layout, &style, &mut surface);
        let after: Vec<CubicCurve> = surface.curves().map(|(c, _)| *c).collect();

        assert_eq!(before.len(), 2);
        assert_eq!(after[0], before[0]);
        assert_ne!(after[1], before[1]);
        let conn = &ws.connections().as_slice()[1];
        let live = measure_anchors(&layout, conn.term_index, conn.definition_index).expect("mounted");
        assert_eq!(after[1].start, live.start);
    }

    #[test]
    fn test_unmeasurable_connection_is_skipped() {
        let mut ws = sheet();
        let mut layout = layout();
        layout.mounted = false;
        shoot(&mut ws, &layout, 0, "Packet addressing", false);

        let mut surface = RecordingSurface::new(600.0, 400.0);
        let drawn = render_connections(
            ws.connections().as_slice(),
            None,
            &layout,
            &LineStyle::default(),
            &mut surface,
        );
        assert_eq!(drawn, 0);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_live_selection_is_dashed() {
        let mut ws = sheet();
        let layout = layout();
        ws.set_live_selection(Some(LiveSelection {
            term_index: 2,
            definition_index: 0,
        }));
        let mut surface = RecordingSurface::new(600.0, 400.0);
        render_connections(&[], ws.live_selection(), &layout, &LineStyle::default(), &mut surface);

        let (curve, stroke) = surface.curves().next().expect("live line");
        assert_eq!(stroke.color, colors::LIVE);
        assert_eq!(stroke.width, 2.0);
        assert_eq!(stroke.dash, Some((5.0, 5.0)));
        let expected = measure_anchors(&layout, 2, 0).expect("mounted");
        assert_eq!(curve.start, expected.start);
        assert_eq!(curve.end, expected.end);
        assert!(curve.end.x > curve.start.x);
        assert_eq!(curve.c1.y, curve.start.y);
    }

    #[test]
    fn test_renderer_redraws_only_on_change() {
        let mut ws = sheet();
        let layout = layout();
        let mut renderer = LineRenderer::new(LineStyle::default());
        let mut surface = RecordingSurface::new(600.0, 400.0);

        assert!(renderer.frame(&ws, &layout, &mut surface));
        assert!(!renderer.frame(&ws, &layout, &mut surface));

        shoot(&mut ws, &layout, 0, "Reliable byte stream", true);
        assert!(renderer.frame(&ws, &layout, &mut surface));
        assert_eq!(surface.curves().count(), 1);
        assert!(!renderer.frame(&ws, &layout, &mut surface));

        // A burst of scroll events collapses into one redraw
        renderer.notify(RedrawTrigger::Scroll);
        renderer.notify(RedrawTrigger::Scroll);
        renderer.notify(RedrawTrigger::Scroll);
        assert!(renderer.frame(&ws, &layout, &mut surface));
        assert!(!renderer.frame(&ws, &layout, &mut surface));

        renderer.notify(RedrawTrigger::Resize);
        assert!(renderer.frame(&ws, &layout, &mut surface));
        assert_eq!(renderer.redraws(), 4);
    }
}
