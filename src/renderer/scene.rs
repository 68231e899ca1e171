//! Play field painter: targets, projectiles, turret and the HUD

use glam::Vec2;

use super::{DrawSurface, TextAlign, TextStyle, colors};
use crate::direction;
use crate::sim::{Session, SessionPhase};

/// Target label font size
const LABEL_SIZE: f32 = 14.0;
/// Approximate characters per label line at `LABEL_SIZE`
const LABEL_CHARS: usize = 16;
const TURRET_LENGTH: f32 = 36.0;
const TURRET_HALF_WIDTH: f32 = 14.0;

/// Greedy word wrap at `max_chars` per line; overlong words stay whole
pub fn wrap_label(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn text(size: f32, bold: bool, align: TextAlign) -> TextStyle {
    TextStyle {
        color: colors::HUD_TEXT,
        size,
        bold,
        align,
    }
}

/// Paint one frame of the play field
pub fn draw_field(session: &Session, surface: &mut dyn DrawSurface) {
    let size = surface.size();
    surface.clear();
    surface.fill_rect(Vec2::ZERO, size, colors::BACKGROUND);

    let label_style = TextStyle {
        color: colors::TARGET_TEXT,
        size: LABEL_SIZE,
        bold: false,
        align: TextAlign::Center,
    };
    for target in session.targets() {
        surface.fill_rect(target.pos - target.size / 2.0, target.size, colors::TARGET);
        let lines = wrap_label(&target.label.text, LABEL_CHARS);
        let line_height = LABEL_SIZE * 1.2;
        let first_y = target.label.pos.y - line_height * (lines.len() as f32 - 1.0) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            surface.fill_text(
                line,
                Vec2::new(target.label.pos.x, first_y + i as f32 * line_height),
                &label_style,
            );
        }
    }

    for projectile in session.projectiles().active() {
        surface.fill_circle(projectile.pos, projectile.radius, colors::PROJECTILE);
    }

    let turret = session.turret();
    let forward = direction(turret.aim);
    let side = Vec2::new(-forward.y, forward.x) * TURRET_HALF_WIDTH;
    surface.fill_polygon(
        &[
            turret.pos + forward * TURRET_LENGTH,
            turret.pos + side,
            turret.pos - side,
        ],
        colors::TURRET,
    );

    draw_hud(session, surface, size);
}

fn draw_hud(session: &Session, surface: &mut dyn DrawSurface, size: Vec2) {
    let prompt = session.term_prompt();
    if !prompt.is_empty() {
        surface.fill_text(
            &prompt,
            Vec2::new(size.x / 2.0, 32.0),
            &text(24.0, true, TextAlign::Center),
        );
    }
    surface.fill_text(
        &session.score_text(),
        Vec2::new(16.0, 28.0),
        &text(18.0, false, TextAlign::Left),
    );

    if let Some(feedback) = session.feedback() {
        let color = if feedback.correct {
            colors::CORRECT
        } else {
            colors::WRONG
        };
        surface.fill_text(
            feedback.message(),
            size / 2.0,
            &TextStyle {
                color,
                size: 32.0,
                bold: true,
                align: TextAlign::Center,
            },
        );
    }

    if session.phase() == SessionPhase::Complete {
        if let Some(summary) = session.summary() {
            surface.fill_text(
                &summary.to_string(),
                Vec2::new(size.x / 2.0, size.y / 2.0 + 56.0),
                &text(36.0, true, TextAlign::Center),
            );
            surface.fill_text(
                "Click to Play Again",
                Vec2::new(size.x / 2.0, size.y / 2.0 + 100.0),
                &text(20.0, false, TextAlign::Center),
            );
        }
    }
}
