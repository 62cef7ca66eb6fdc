// Copyright (c) 2026 rezky_nightky

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::charset::KATAKANA;
use crate::column::{Column, DrawCtx};
use crate::config;
use crate::frame::Frame;
use crate::rainbow::{RainbowTable, RAINBOW_CYCLE, RAINBOW_FREQ};

/// Owns every falling column plus the randomness feeding them. One `tick`
/// advances the whole sky by a single frame.
pub struct Rain {
    pub height: u16,
    density: u8,
    columns: Vec<Column>,
    rainbow: RainbowTable,
    glyphs: &'static [char],
    mt: StdRng,
    rand_gap: Uniform<u16>,
    rand_len: Uniform<u16>,
    rand_offset: Uniform<usize>,
    rand_glyph: Uniform<usize>,
}

impl Rain {
    pub fn new(density: u8) -> Self {
        Self::with_rng(density, StdRng::from_os_rng())
    }

    /// Tests inject a seeded generator here; `reset` must be called before
    /// the first tick.
    pub fn with_rng(density: u8, rng: StdRng) -> Self {
        Self {
            height: 0,
            density,
            columns: Vec::new(),
            rainbow: RainbowTable::new(RAINBOW_FREQ, RAINBOW_CYCLE),
            glyphs: KATAKANA,
            mt: rng,
            rand_gap: Uniform::new(5, 15).expect("valid range"),
            rand_len: Uniform::new_inclusive(3, 8).expect("valid range"),
            rand_offset: Uniform::new(0, RAINBOW_CYCLE).expect("valid range"),
            rand_glyph: Uniform::new(0, KATAKANA.len()).expect("valid range"),
        }
    }

    /// Rebuild for the given geometry. Every column is replaced wholesale
    /// with fresh samples; nothing carries across a resize.
    pub fn reset(&mut self, width: u16, height: u16) {
        self.height = height;
        self.rand_len = Uniform::new_inclusive(3, height / 2 + 3).expect("valid range");

        let count = config::column_count(width, self.density);
        self.columns.clear();
        for _ in 0..count {
            self.columns.push(Column {
                active: false,
                head: 0,
                gap: self.rand_gap.sample(&mut self.mt),
                length: self.rand_len.sample(&mut self.mt),
                color_offset: self.rand_offset.sample(&mut self.mt),
                last_glyph: None,
            });
        }
    }

    /// Advance every column exactly once, in column order.
    pub fn tick(&mut self, frame: &mut Frame) {
        let ctx = DrawCtx {
            height: self.height,
            rainbow: &self.rainbow,
            glyphs: self.glyphs,
            rand_gap: &self.rand_gap,
            rand_len: &self.rand_len,
            rand_offset: &self.rand_offset,
            rand_glyph: &self.rand_glyph,
        };
        let mt = &mut self.mt;
        for (x, col) in self.columns.iter_mut().enumerate() {
            col.advance(&ctx, x as u16, frame, mt);
        }
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(density: u8) -> Rain {
        Rain::with_rng(density, StdRng::seed_from_u64(0x1234567))
    }

    #[test]
    fn reset_derives_column_count_from_width_and_density() {
        let mut rain = seeded(80);
        rain.reset(80, 24);
        assert_eq!(rain.columns().len(), 64);

        let mut sparse = seeded(1);
        sparse.reset(20, 10);
        assert_eq!(sparse.columns().len(), 1);
    }

    #[test]
    fn reset_starts_every_column_waiting_with_valid_samples() {
        let mut rain = seeded(80);
        rain.reset(80, 24);
        for col in rain.columns() {
            assert!(!col.active);
            assert_eq!(col.head, 0);
            assert!((5..15).contains(&col.gap));
            assert!((3..=15).contains(&col.length));
            assert!(col.color_offset < RAINBOW_CYCLE);
            assert!(col.last_glyph.is_none());
        }
    }

    #[test]
    fn tick_advances_each_column_exactly_once() {
        let mut rain = seeded(80);
        rain.reset(40, 12);
        let gaps_before: Vec<u16> = rain.columns().iter().map(|c| c.gap).collect();

        let mut frame = Frame::new(40, 12);
        rain.tick(&mut frame);

        for (col, before) in rain.columns().iter().zip(gaps_before) {
            assert_eq!(col.gap, before - 1);
        }
    }

    #[test]
    fn ticks_eventually_rain_glyphs_into_the_frame() {
        let mut rain = seeded(100);
        rain.reset(20, 10);
        let mut frame = Frame::new(20, 10);

        // Initial gaps are at most 14 frames; the 15th tick has drawn.
        for _ in 0..15 {
            rain.tick(&mut frame);
        }
        assert!(!frame.dirty_indices().is_empty());
    }

    #[test]
    fn resize_discards_all_prior_column_state() {
        let mut rain = seeded(80);
        rain.reset(80, 24);
        let before: Vec<(u16, u16, usize)> = rain
            .columns()
            .iter()
            .map(|c| (c.gap, c.length, c.color_offset))
            .collect();

        rain.reset(80, 24);
        let after: Vec<(u16, u16, usize)> = rain
            .columns()
            .iter()
            .map(|c| (c.gap, c.length, c.color_offset))
            .collect();

        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }
}
