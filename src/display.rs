//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable snapshot of
//! the world. No game logic is performed; this module only scales the
//! logical field down to terminal cells and translates state into
//! terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use sea_strike::entities::{Projectile, Status, World, START_LIVES};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_TIME: Color = Color::Cyan;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_OPPONENT: Color = Color::Green;
const C_SHOT_PLAYER: Color = Color::Cyan;
const C_SHOT_OPPONENT: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_PROMPT: Color = Color::Yellow;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Scales logical field pixels down to the drawable cell region
/// (inside the border, below the HUD row).
struct Viewport {
    cols: u16,
    rows: u16,
    field_w: i32,
    field_h: i32,
}

impl Viewport {
    fn new(snap: &World) -> std::io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Viewport {
            cols,
            rows,
            field_w: snap.field.width.max(1),
            field_h: snap.field.height.max(1),
        })
    }

    fn inner_cols(&self) -> i32 {
        i32::from(self.cols).saturating_sub(2).max(1)
    }

    fn inner_rows(&self) -> i32 {
        i32::from(self.rows).saturating_sub(4).max(1)
    }

    fn cell(&self, x: i32, y: i32) -> (u16, u16) {
        let cx = 1 + x.clamp(0, self.field_w) * self.inner_cols() / self.field_w;
        let cy = 2 + y.clamp(0, self.field_h) * self.inner_rows() / self.field_h;
        // Keep sprites off the border cells
        let cx = cx.min(i32::from(self.cols) - 2).max(1);
        let cy = cy.min(i32::from(self.rows) - 3).max(2);
        (cx as u16, cy as u16)
    }

    /// Width of a logical span in cells, at least one.
    fn span(&self, w: i32) -> usize {
        (w * self.inner_cols() / self.field_w).max(1) as usize
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame from a snapshot.
pub fn render<W: Write>(out: &mut W, snap: &World, paused: bool) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let vp = Viewport::new(snap)?;

    draw_border(out, &vp)?;
    draw_hud(out, snap, &vp)?;

    for opponent in &snap.opponents {
        if opponent.visible() {
            let (cx, cy) = vp.cell(opponent.rect.x, opponent.rect.y);
            draw_sprite(out, cx, cy, "▼", vp.span(opponent.rect.w), C_OPPONENT)?;
        }
        for shot in &opponent.projectiles {
            draw_shot(out, &vp, shot, C_SHOT_OPPONENT)?;
        }
    }

    if let Some(player) = &snap.player {
        for shot in &player.projectiles {
            draw_shot(out, &vp, shot, C_SHOT_PLAYER)?;
        }
        if player.visible() {
            let (cx, cy) = vp.cell(player.rect.x, player.rect.y);
            draw_sprite(out, cx, cy, "▲", vp.span(player.rect.w), C_PLAYER)?;
        }
    }

    draw_hint(out, &vp)?;

    if snap.status == Status::GameOver {
        draw_prompt(out, &vp, snap, "GAME OVER", "Try again? [Y/N]")?;
    } else if paused {
        draw_prompt(out, &vp, snap, "PAUSED", "Continue? [Y/N]")?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, vp.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, vp: &Viewport) -> std::io::Result<()> {
    let w = vp.cols as usize;
    let h = vp.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(vp.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, snap: &World, vp: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("SCORE:{:>6}", snap.score)))?;

    let time_str = format!("TIME: {}s", snap.elapsed_seconds());
    let tx = (vp.cols / 2).saturating_sub(time_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(time_str))?;

    // Lives as filled/empty hearts, right-aligned
    let mut hearts = String::new();
    for i in 0..START_LIVES {
        hearts.push(if i < snap.lives { '♥' } else { '·' });
    }
    let lx = vp.cols.saturating_sub(hearts.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(hearts))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_sprite<W: Write>(
    out: &mut W,
    cx: u16,
    cy: u16,
    glyph: &str,
    span: usize,
    color: Color,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(cx, cy))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph.repeat(span)))?;
    Ok(())
}

fn draw_shot<W: Write>(
    out: &mut W,
    vp: &Viewport,
    shot: &Projectile,
    color: Color,
) -> std::io::Result<()> {
    let (cx, cy) = vp.cell(shot.x, shot.y);
    out.queue(cursor::MoveTo(cx, cy))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print("•"))?;
    Ok(())
}

// ── Hint & prompts ────────────────────────────────────────────────────────────

fn draw_hint<W: Write>(out: &mut W, vp: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, vp.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "←→/A D : Move   SPACE : Shoot   ↑↓ : Speed   ESC : Pause   Q : Quit",
    ))?;
    Ok(())
}

/// Modal summary shown while paused or after game over. The Y/N answer
/// is read by the caller; this only paints the question.
fn draw_prompt<W: Write>(
    out: &mut W,
    vp: &Viewport,
    snap: &World,
    title: &str,
    question: &str,
) -> std::io::Result<()> {
    let summary = format!(
        "Your Score: {}   Play Time: {}s",
        snap.score,
        snap.elapsed_seconds()
    );
    let cx = vp.cols / 2;
    let cy = vp.rows / 2;

    out.queue(style::SetForegroundColor(C_PROMPT))?;
    for (i, line) in [title, summary.as_str(), question].iter().enumerate() {
        let x = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(x, cy.saturating_sub(1) + i as u16))?;
        out.queue(Print(line))?;
    }

    Ok(())
}
