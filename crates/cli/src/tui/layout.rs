//! Geometry for the formula box and the dropdown.
//!
//! Computed before each draw so mouse clicks can be hit-tested against the
//! same positions that were rendered. All coordinates are relative to the
//! inner area of the formula box.

use crate::util;

/// Text of the remove control drawn inside each chip.
pub const REMOVE_LABEL: &str = "[x]";

/// Minimum columns kept for the input before it wraps to its own line.
const MIN_INPUT_WIDTH: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipRect {
    pub index: usize,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    /// Column where the remove control starts
    pub remove_x: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipHit {
    /// Click on the chip body: re-open for editing
    Tag(usize),
    /// Click on the chip's remove control
    Remove(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormulaLayout {
    pub chips: Vec<ChipRect>,
    pub input_x: u16,
    pub input_y: u16,
    /// Lines used, including the input line
    pub lines: u16,
}

/// Chip text: ` label [x] `
pub fn chip_text(label: &str) -> String {
    format!(" {} {} ", label, REMOVE_LABEL)
}

/// Flow chips left to right, wrapping at `width`, with the input after the
/// last chip.
pub fn layout_formula<S: AsRef<str>>(labels: &[S], width: u16) -> FormulaLayout {
    let mut chips = Vec::with_capacity(labels.len());
    let mut x: u16 = 0;
    let mut y: u16 = 0;

    for (index, label) in labels.iter().enumerate() {
        let label = label.as_ref();
        let chip_width = util::display_width(&chip_text(label)) as u16;
        if x > 0 && x.saturating_add(chip_width) > width {
            x = 0;
            y += 1;
        }
        let remove_x = x + 1 + util::display_width(label) as u16 + 1;
        chips.push(ChipRect { index, x, y, width: chip_width, remove_x });
        x = x.saturating_add(chip_width + 1);
    }

    if x > 0 && x.saturating_add(MIN_INPUT_WIDTH) > width {
        x = 0;
        y += 1;
    }

    FormulaLayout { chips, input_x: x, input_y: y, lines: y + 1 }
}

impl FormulaLayout {
    pub fn hit(&self, x: u16, y: u16) -> Option<ChipHit> {
        let chip = self
            .chips
            .iter()
            .find(|c| c.y == y && x >= c.x && x < c.x + c.width)?;
        let remove_end = chip.remove_x + REMOVE_LABEL.len() as u16;
        if x >= chip.remove_x && x < remove_end {
            Some(ChipHit::Remove(chip.index))
        } else {
            Some(ChipHit::Tag(chip.index))
        }
    }
}

/// Scroll offset that brings `index` into a window of `visible` rows while
/// moving as little as possible.
pub fn nearest_offset(offset: usize, index: usize, visible: usize) -> usize {
    if visible == 0 {
        return index;
    }
    if index < offset {
        index
    } else if index >= offset + visible {
        index + 1 - visible
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_flow_and_wrap() {
        // " Water [x] " = 11 cols, " + [x] " = 7 cols
        let layout = layout_formula(&["Water", "+", "Salt"], 24);
        assert_eq!(layout.chips[0], ChipRect { index: 0, x: 0, y: 0, width: 11, remove_x: 7 });
        assert_eq!(layout.chips[1].x, 12);
        // " Salt [x] " (10) no longer fits after 20 cols
        assert_eq!((layout.chips[2].x, layout.chips[2].y), (0, 1));
        assert_eq!((layout.input_x, layout.input_y), (11, 1));
        assert_eq!(layout.lines, 2);
    }

    #[test]
    fn input_wraps_when_line_is_full() {
        let layout = layout_formula(&["Water"], 16);
        assert_eq!((layout.input_x, layout.input_y), (0, 1));

        let empty = layout_formula::<&str>(&[], 40);
        assert_eq!((empty.input_x, empty.input_y, empty.lines), (0, 0, 1));
    }

    #[test]
    fn hit_testing() {
        let layout = layout_formula(&["Water", "+"], 80);
        assert_eq!(layout.hit(2, 0), Some(ChipHit::Tag(0)));
        assert_eq!(layout.hit(7, 0), Some(ChipHit::Remove(0)));
        assert_eq!(layout.hit(9, 0), Some(ChipHit::Remove(0)));
        assert_eq!(layout.hit(10, 0), Some(ChipHit::Tag(0)));
        assert_eq!(layout.hit(11, 0), None); // gap
        assert_eq!(layout.hit(13, 0), Some(ChipHit::Tag(1)));
        assert_eq!(layout.hit(15, 0), Some(ChipHit::Remove(1)));
        assert_eq!(layout.hit(2, 1), None);
    }

    #[test]
    fn nearest_scrolls_minimally() {
        // Already visible: no movement
        assert_eq!(nearest_offset(2, 4, 5), 2);
        // Below the window: align bottom edge
        assert_eq!(nearest_offset(0, 7, 5), 3);
        // Above the window: align top edge
        assert_eq!(nearest_offset(3, 1, 5), 1);
    }
}
