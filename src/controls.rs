/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Runtime controls and the register writes they translate to.
//!
//! Setting a control clamps the request into the control's current range,
//! records it, and plans the register writes needed to apply it. Controls whose
//! range depends on another control are kept in step by the [`DEPENDENCIES`]
//! hook list: after a control changes, every hook registered for it runs and
//! may adjust dependent values and queue their rewrites in the same batch.
//! Nothing here touches the bus; the caller decides whether and how to apply
//! the planned writes.

use crate::bus::RegWrite;
use crate::mode::Mode;
use crate::regs::*;

/// Controls exposed by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    /// Menu index into the supported link frequencies (read-only)
    LinkFrequency,
    /// Pixel clock in Hz (read-only)
    PixelRate,
    /// Horizontal blank (read-only)
    HorizontalBlank,
    /// Vertical blank, in lines
    VerticalBlank,
    /// Exposure, in lines
    Exposure,
    AnalogueGain,
}

impl ControlId {
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            ControlId::LinkFrequency
                | ControlId::PixelRate
                | ControlId::HorizontalBlank
        )
    }
}

/// Range metadata of a control under the current mode and values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRange {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub default: i64,
    pub read_only: bool,
}

impl ControlRange {
    fn fixed(value: i64) -> Self {
        Self {
            min: value,
            max: value,
            step: 1,
            default: value,
            read_only: true,
        }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.max(self.min).min(self.max)
    }
}

/// Planned register writes for one control update.
/// Sized for every writable control plus one spare.
pub type WriteBatch = heapless::Vec<RegWrite, 4>;

fn queue(batch: &mut WriteBatch, reg: Register, value: u32) {
    if batch.push(RegWrite { reg, value }).is_err() {
        panic!("register write batch overflow");
    }
}

/// A recomputation triggered after `source` changes
pub struct Dependency {
    pub source: ControlId,
    pub apply: fn(&Mode, &mut ControlSet, &mut WriteBatch),
}

/// Derived-control hooks, run in order after their source control is set
pub static DEPENDENCIES: [Dependency; 1] = [Dependency {
    source: ControlId::VerticalBlank,
    apply: fit_exposure_to_frame,
}];

/// Shrinking the frame may leave the exposure longer than the frame allows
fn fit_exposure_to_frame(
    mode: &Mode,
    controls: &mut ControlSet,
    batch: &mut WriteBatch,
) {
    let exposure_max = controls.exposure_max(mode);
    if controls.exposure > exposure_max {
        log::debug!(
            "exposure {} clamped to {} for new frame length",
            controls.exposure,
            exposure_max
        );
        controls.exposure = exposure_max;
        queue(batch, EXPOSURE, exposure_register_value(exposure_max));
    }
}

/// Register encoding of an exposure: the firmware adds its own fixed offset,
/// so the driver programs the shorter line count
pub fn exposure_register_value(exposure: u32) -> u32 {
    exposure.saturating_sub(EXPOSURE_OFFSET) << EXPOSURE_SHIFT
}

/// Live control values, owned by one driver instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSet {
    vblank: u32,
    exposure: u32,
    analog_gain: u32,
}

impl ControlSet {
    /// Controls at their defaults for `mode`
    pub fn new(mode: &Mode) -> Self {
        let mut controls = Self {
            vblank: mode.vblank,
            exposure: EXPOSURE_DEFAULT,
            analog_gain: ANALOG_GAIN_DEFAULT,
        };
        controls.exposure = controls.exposure.min(controls.exposure_max(mode));
        controls
    }

    pub fn vblank(&self) -> u32 {
        self.vblank
    }

    pub fn exposure(&self) -> u32 {
        self.exposure
    }

    pub fn analog_gain(&self) -> u32 {
        self.analog_gain
    }

    /// Longest exposure the current frame length allows
    pub fn exposure_max(&self, mode: &Mode) -> u32 {
        mode.total_lines(self.vblank)
            .saturating_sub(EXPOSURE_OFFSET)
            .max(EXPOSURE_MIN)
    }

    /// Last known value of a control
    pub fn get(&self, mode: &Mode, id: ControlId) -> i64 {
        match id {
            ControlId::LinkFrequency => i64::from(mode.link_freq_idx),
            // pixel rates fit comfortably in i64
            ControlId::PixelRate => mode.pclk as i64,
            ControlId::HorizontalBlank => i64::from(mode.hblank),
            ControlId::VerticalBlank => i64::from(self.vblank),
            ControlId::Exposure => i64::from(self.exposure),
            ControlId::AnalogueGain => i64::from(self.analog_gain),
        }
    }

    pub fn range(&self, mode: &Mode, id: ControlId) -> ControlRange {
        match id {
            ControlId::VerticalBlank => ControlRange {
                min: i64::from(mode.vblank_min),
                max: i64::from(mode.vblank_max),
                step: 1,
                default: i64::from(mode.vblank),
                read_only: false,
            },
            ControlId::Exposure => ControlRange {
                min: i64::from(EXPOSURE_MIN),
                max: i64::from(self.exposure_max(mode)),
                step: i64::from(EXPOSURE_STEP),
                default: i64::from(EXPOSURE_DEFAULT),
                read_only: false,
            },
            ControlId::AnalogueGain => ControlRange {
                min: i64::from(ANALOG_GAIN_MIN),
                max: i64::from(ANALOG_GAIN_MAX),
                step: i64::from(ANALOG_GAIN_STEP),
                default: i64::from(ANALOG_GAIN_DEFAULT),
                read_only: false,
            },
            _ => ControlRange::fixed(self.get(mode, id)),
        }
    }

    /// Clamp and record a new value, returning the writes that apply it.
    /// Returns `None` for read-only controls.
    pub fn set(
        &mut self,
        mode: &Mode,
        id: ControlId,
        value: i64,
    ) -> Option<WriteBatch> {
        if id.is_read_only() {
            return None;
        }
        // ranges are within u32, so the clamped value always fits
        let clamped = self.range(mode, id).clamp(value) as u32;
        let mut batch = WriteBatch::new();
        match id {
            ControlId::VerticalBlank => {
                self.vblank = clamped;
                queue(&mut batch, LINES_PER_FRAME, mode.total_lines(clamped));
            }
            ControlId::Exposure => {
                self.exposure = clamped;
                queue(&mut batch, EXPOSURE, exposure_register_value(clamped));
            }
            ControlId::AnalogueGain => {
                self.analog_gain = clamped;
                queue(&mut batch, ANALOG_GAIN, clamped);
            }
            _ => return None,
        }

        for dependency in DEPENDENCIES.iter().filter(|dep| dep.source == id) {
            (dependency.apply)(mode, self, &mut batch);
        }
        Some(batch)
    }

    /// Writes that bring a freshly programmed sensor in line with the cache
    pub fn all_writes(&self, mode: &Mode) -> WriteBatch {
        let mut batch = WriteBatch::new();
        queue(&mut batch, LINES_PER_FRAME, mode.total_lines(self.vblank));
        queue(&mut batch, EXPOSURE, exposure_register_value(self.exposure));
        queue(&mut batch, ANALOG_GAIN, self.analog_gain);
        batch
    }
}
