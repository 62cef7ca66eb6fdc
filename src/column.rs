// Copyright (c) 2026 rezky_nightky

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::cell::{Cell, Intensity};
use crate::frame::Frame;
use crate::rainbow::RainbowTable;

/// Read-only state shared by every column advance within one tick
/// (split-borrowed out of `Rain` so columns can be mutated alongside it).
pub struct DrawCtx<'a> {
    pub height: u16,
    pub rainbow: &'a RainbowTable,
    pub glyphs: &'a [char],
    pub rand_gap: &'a Uniform<u16>,
    pub rand_len: &'a Uniform<u16>,
    pub rand_offset: &'a Uniform<usize>,
    pub rand_glyph: &'a Uniform<usize>,
}

/// One falling stream. Either waiting out a gap or raining, never both.
/// `head` is a 1-based row and keeps advancing past the bottom edge until
/// the whole trail has scrolled off.
#[derive(Clone, Debug)]
pub struct Column {
    pub active: bool,
    pub head: u16,
    pub gap: u16,
    pub length: u16,
    pub color_offset: usize,
    pub last_glyph: Option<char>,
}

impl Column {
    /// Advance one frame: count down the gap, or draw the bold head, dim
    /// the glyph behind it, and blank the row that left the trail window.
    pub fn advance(&mut self, ctx: &DrawCtx, x: u16, frame: &mut Frame, rng: &mut StdRng) {
        if !self.active {
            if self.gap > 0 {
                self.gap -= 1;
                return;
            }
            self.active = true;
            self.head = 1;
        }

        let head = i32::from(self.head);
        let height = i32::from(ctx.height);
        let offset = self.color_offset as i32;
        let prev = self.last_glyph;

        if (1..=height).contains(&head) {
            let glyph = ctx.glyphs[ctx.rand_glyph.sample(rng)];
            self.last_glyph = Some(glyph);
            frame.set(
                x,
                (head - 1) as u16,
                Cell {
                    ch: glyph,
                    fg: Some(ctx.rainbow.color_at(head + offset)),
                    intensity: Intensity::Bold,
                },
            );
        }

        let trail = head - 1;
        if (1..=height).contains(&trail) {
            if let Some(ch) = prev {
                frame.set(
                    x,
                    (trail - 1) as u16,
                    Cell {
                        ch,
                        fg: Some(ctx.rainbow.color_at(trail + offset)),
                        intensity: Intensity::Dim,
                    },
                );
            }
        }

        let erase = head - i32::from(self.length);
        if (1..=height).contains(&erase) {
            frame.set(x, (erase - 1) as u16, Cell::blank());
        }

        self.head += 1;

        if head > height + i32::from(self.length) {
            self.active = false;
            self.head = 0;
            self.gap = ctx.rand_gap.sample(rng);
            self.length = ctx.rand_len.sample(rng);
            // The hue drifts on every new drop instead of resetting.
            self.color_offset =
                (self.color_offset + ctx.rand_offset.sample(rng)) % ctx.rainbow.len();
            self.last_glyph = None;
        }
    }
}
