// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// SGR intensity of a cell. Heads render bold, the trailing glyph dim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intensity {
    Normal,
    Bold,
    Dim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub intensity: Intensity,
}

impl Cell {
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            fg: None,
            intensity: Intensity::Normal,
        }
    }
}
