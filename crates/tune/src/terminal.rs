//! Raw-mode terminal handling and the single-line progress display.

use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::{
    queue,
    style::Print,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode},
};

/// Keeps the terminal in raw mode until dropped.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        println!();
    }
}

/// Overwrite the current line with `line` (which starts with `\r`).
pub fn draw_line(out: &mut impl Write, line: &str) -> io::Result<()> {
    queue!(out, Print(line), Clear(ClearType::UntilNewLine))?;
    out.flush()
}
