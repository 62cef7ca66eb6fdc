// Copyright (c) 2026 rezky_nightky

use std::env;
use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Intensity;
use crate::frame::Frame;

pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 10;

/// Terminal size, falling back to `COLUMNS`/`LINES`, then 80x24. A failed
/// query is not an error; the chain always yields something usable.
pub fn query_dimensions() -> (u16, u16) {
    if let Ok((w, h)) = terminal::size() {
        if w > 0 && h > 0 {
            return (w, h);
        }
    }

    let width = env_dimension("COLUMNS").unwrap_or(80);
    let height = env_dimension("LINES").unwrap_or(24);
    (width, height)
}

fn env_dimension(name: &str) -> Option<u16> {
    let v: u16 = env::var(name).ok()?.trim().parse().ok()?;
    if v > 0 {
        Some(v)
    } else {
        None
    }
}

pub fn clamp_dimensions(width: u16, height: u16) -> (u16, u16) {
    (width.max(MIN_WIDTH), height.max(MIN_HEIGHT))
}

/// Scoped animation mode: raw mode, alternate screen, hidden cursor, no
/// line wrap. `Drop` restores all of it on every exit path.
pub struct Terminal {
    stdout: Stdout,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self { stdout: out })
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flush the frame's dirty cells as one batched write, terminated by a
    /// single attribute/color reset.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        if frame.needs_full_clear() {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let mut cur_fg: Option<Color> = None;
        let mut cur_intensity = Intensity::Normal;
        let mut cur_pos: Option<(u16, u16)> = None;
        let width = frame.width as usize;

        frame.sort_dirty();
        for &idx in frame.dirty_indices() {
            let cell = frame.cell_at_index(idx);
            let x = (idx % width) as u16;
            let y = (idx / width) as u16;

            if cur_pos != Some((x, y)) {
                self.stdout.queue(cursor::MoveTo(x, y))?;
            }

            if cell.fg != cur_fg {
                self.stdout
                    .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                cur_fg = cell.fg;
            }

            if cell.intensity != cur_intensity {
                // SGR bold and dim accumulate; clear both before switching.
                self.stdout.queue(SetAttribute(Attribute::NormalIntensity))?;
                match cell.intensity {
                    Intensity::Bold => {
                        self.stdout.queue(SetAttribute(Attribute::Bold))?;
                    }
                    Intensity::Dim => {
                        self.stdout.queue(SetAttribute(Attribute::Dim))?;
                    }
                    Intensity::Normal => {}
                }
                cur_intensity = cell.intensity;
            }

            self.stdout.queue(Print(cell.ch))?;
            let next_x = x.saturating_add(1);
            cur_pos = if next_x < frame.width {
                Some((next_x, y))
            } else {
                None
            };
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_enforces_minimum_dimensions() {
        assert_eq!(clamp_dimensions(5, 3), (MIN_WIDTH, MIN_HEIGHT));
        assert_eq!(clamp_dimensions(120, 40), (120, 40));
        assert_eq!(clamp_dimensions(120, 3), (120, MIN_HEIGHT));
    }

    #[test]
    fn env_dimension_parses_positive_integers_only() {
        env::set_var("PRISMATRIX_TEST_DIM", "132");
        assert_eq!(env_dimension("PRISMATRIX_TEST_DIM"), Some(132));

        env::set_var("PRISMATRIX_TEST_DIM", "0");
        assert_eq!(env_dimension("PRISMATRIX_TEST_DIM"), None);

        env::set_var("PRISMATRIX_TEST_DIM", "wide");
        assert_eq!(env_dimension("PRISMATRIX_TEST_DIM"), None);

        env::remove_var("PRISMATRIX_TEST_DIM");
        assert_eq!(env_dimension("PRISMATRIX_TEST_DIM"), None);
    }
}
