//! Stable per-run color assignment for a single rendering pass.

use plotters::style::RGBColor;
use std::collections::HashMap;

/// Ten-color cycle (Tableau palette), reused across every subplot.
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Assigns one palette color per run label, in first-encountered order, and
/// remembers the assignment so a run keeps its color across subplots.
/// Scoped to one figure render; never shared between pipeline runs.
#[derive(Debug, Default)]
pub struct ColorMap {
    assigned: HashMap<String, RGBColor>,
    cursor: usize,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `run`, assigning the next palette entry on first sight.
    pub fn color_for(&mut self, run: &str) -> RGBColor {
        if let Some(&color) = self.assigned.get(run) {
            return color;
        }
        let color = PALETTE[self.cursor % PALETTE.len()];
        self.cursor += 1;
        self.assigned.insert(run.to_string(), color);
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_run_keeps_its_color() {
        let mut colors = ColorMap::new();
        let first = colors.color_for("run1");
        colors.color_for("run2");
        assert_eq!(colors.color_for("run1"), first);
    }

    #[test]
    fn runs_are_assigned_in_encounter_order() {
        let mut colors = ColorMap::new();
        assert_eq!(colors.color_for("a"), PALETTE[0]);
        assert_eq!(colors.color_for("b"), PALETTE[1]);
        assert_eq!(colors.color_for("c"), PALETTE[2]);
    }

    #[test]
    fn palette_wraps_after_ten_runs() {
        let mut colors = ColorMap::new();
        for i in 0..10 {
            colors.color_for(&format!("run{}", i));
        }
        assert_eq!(colors.color_for("run10"), PALETTE[0]);
    }
}
