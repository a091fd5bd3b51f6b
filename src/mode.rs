/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Static sensor modes and the selection among them

use crate::regs::{LINK_FREQUENCIES, MBUS_FMT_Y10_1X10, MODE_1280X720_REGS};

/// One supported sensor operating mode
#[derive(Debug, PartialEq, Eq)]
pub struct Mode {
    pub width: u32,
    pub height: u32,
    /// Media bus format code
    pub code: u32,
    /// Horizontal blank, in pixels
    pub hblank: u32,
    /// Default vertical blank, in lines
    pub vblank: u32,
    pub vblank_min: u32,
    pub vblank_max: u32,
    /// Pixel clock in Hz
    pub pclk: u64,
    pub link_freq_idx: u32,
    /// Applied in order when the mode is programmed
    pub regs: &'static [(u16, u8)],
}

impl Mode {
    /// Frame length for a given vertical blank
    pub const fn total_lines(&self, vblank: u32) -> u32 {
        self.height + vblank
    }

    pub fn link_frequency(&self) -> u64 {
        LINK_FREQUENCIES[self.link_freq_idx as usize]
    }

    pub fn format(&self) -> FrameFormat {
        FrameFormat {
            width: self.width,
            height: self.height,
            code: self.code,
        }
    }
}

pub const MODE_1280X720: Mode = Mode {
    width: 1280,
    height: 720,
    code: MBUS_FMT_Y10_1X10,
    hblank: 250,
    vblank: 1022,
    vblank_min: 151,
    vblank_max: 51540,
    pclk: 160_000_000,
    link_freq_idx: 0,
    regs: &MODE_1280X720_REGS,
};

const MODES: [Mode; 1] = [MODE_1280X720];

pub static SUPPORTED_MODES: [Mode; 1] = MODES;

const fn modes_are_consistent(modes: &[Mode]) -> bool {
    let mut i = 0;
    while i < modes.len() {
        let mode = &modes[i];
        if mode.vblank_min > mode.vblank || mode.vblank > mode.vblank_max {
            return false;
        }
        if mode.link_freq_idx as usize >= LINK_FREQUENCIES.len() {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(modes_are_consistent(&MODES));

/// Image format reported on the sensor's source pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
    pub code: u32,
}

/// Discrete frame size of a mode, as enumerated to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizeRange {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

/// The list of supported modes plus the active selection
#[derive(Debug)]
pub struct ModeTable {
    modes: &'static [Mode],
    active: usize,
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::new(&SUPPORTED_MODES)
    }
}

impl ModeTable {
    pub fn new(modes: &'static [Mode]) -> Self {
        assert!(!modes.is_empty(), "mode table must not be empty");
        Self { modes, active: 0 }
    }

    pub fn active_mode(&self) -> &'static Mode {
        &self.modes[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Select a mode by index. Returns true when the selection changed.
    ///
    /// Panics on an index outside the table.
    pub fn select(&mut self, index: usize) -> bool {
        assert!(
            index < self.modes.len(),
            "mode index {} out of range",
            index
        );
        let changed = index != self.active;
        self.active = index;
        changed
    }

    /// Index of the mode closest in size to the request
    pub fn nearest(&self, width: u32, height: u32) -> usize {
        let distance = |mode: &Mode| {
            let dw = (i64::from(mode.width) - i64::from(width)).abs();
            let dh = (i64::from(mode.height) - i64::from(height)).abs();
            dw + dh
        };
        self.modes
            .iter()
            .enumerate()
            .min_by_key(|(_, mode)| distance(*mode))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// The `index`th media bus code offered by this sensor
    pub fn enum_mbus_code(&self, index: usize) -> Option<u32> {
        let mut codes: heapless::Vec<u32, 8> = heapless::Vec::new();
        for mode in self.modes {
            if !codes.contains(&mode.code) && codes.push(mode.code).is_err() {
                break;
            }
        }
        codes.get(index).copied()
    }

    /// The `index`th frame size available for `code`
    pub fn enum_frame_size(
        &self,
        code: u32,
        index: usize,
    ) -> Option<FrameSizeRange> {
        self.modes
            .iter()
            .filter(|mode| mode.code == code)
            .nth(index)
            .map(|mode| FrameSizeRange {
                min_width: mode.width,
                max_width: mode.width,
                min_height: mode.height,
                max_height: mode.height,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::TEST_MODES;

    #[test]
    fn reference_mode_timing() {
        let mode = ModeTable::default().active_mode();
        assert_eq!(mode.total_lines(mode.vblank), 1742);
        assert_eq!(mode.link_frequency(), 400_000_000);
        assert_eq!(mode.regs.len(), 99);
        assert!(modes_are_consistent(&SUPPORTED_MODES));
    }

    #[test]
    fn select_reports_change() {
        let mut table = ModeTable::new(&TEST_MODES);
        assert!(!table.select(0));
        assert!(table.select(1));
        assert_eq!(table.active_mode().width, 640);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn select_out_of_range_panics() {
        let mut table = ModeTable::default();
        table.select(3);
    }

    #[test]
    fn nearest_mode_by_size() {
        let table = ModeTable::new(&TEST_MODES);
        assert_eq!(table.nearest(1920, 1080), 0);
        assert_eq!(table.nearest(600, 480), 1);
    }

    #[test]
    fn enumerates_codes_and_sizes() {
        let table = ModeTable::new(&TEST_MODES);
        assert_eq!(table.enum_mbus_code(0), Some(MBUS_FMT_Y10_1X10));
        assert_eq!(table.enum_mbus_code(1), None);

        let second = table.enum_frame_size(MBUS_FMT_Y10_1X10, 1).unwrap();
        assert_eq!((second.max_width, second.max_height), (640, 400));
        assert_eq!(table.enum_frame_size(MBUS_FMT_Y10_1X10, 2), None);
        assert_eq!(table.enum_frame_size(0x1234, 0), None);
    }
}
