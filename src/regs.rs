/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register map of the OV9282 as used by this driver.
//! Multi-byte registers are big-endian and occupy consecutive addresses.

/// A sensor register: a 16-bit address plus its width in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub address: u16,
    pub width: u8,
}

impl Register {
    pub const fn new(address: u16, width: u8) -> Self {
        Self { address, width }
    }
}

/// Streaming / standby selection
pub const MODE_SELECT: Register = Register::new(0x0100, 1);
pub const MODE_STANDBY: u32 = 0x00;
pub const MODE_STREAMING: u32 = 0x01;

/// Lines per frame: active height plus vertical blank
pub const LINES_PER_FRAME: Register = Register::new(0x380e, 2);

pub const CHIP_ID: Register = Register::new(0x300a, 2);
pub const EXPECTED_CHIP_ID: u16 = 0x9281;

/// Coarse exposure in lines, held in bits [19:4]
pub const EXPOSURE: Register = Register::new(0x3500, 3);
pub const EXPOSURE_SHIFT: u32 = 4;

pub const ANALOG_GAIN: Register = Register::new(0x3509, 1);

/// Writes between open and close latch on the same frame boundary
pub const GROUP_HOLD: Register = Register::new(0x3308, 1);
pub const GROUP_HOLD_OPEN: u32 = 1;
pub const GROUP_HOLD_CLOSE: u32 = 0;

pub const EXPOSURE_MIN: u32 = 1;
/// The sensor firmware adds this many lines to the programmed exposure
pub const EXPOSURE_OFFSET: u32 = 12;
pub const EXPOSURE_STEP: u32 = 1;
pub const EXPOSURE_DEFAULT: u32 = 0x0282;

pub const ANALOG_GAIN_MIN: u32 = 0x10;
pub const ANALOG_GAIN_MAX: u32 = 0xff;
pub const ANALOG_GAIN_STEP: u32 = 1;
pub const ANALOG_GAIN_DEFAULT: u32 = 0x10;

/// Required sensor input clock
pub const INCLK_RATE: u32 = 24_000_000;

/// CSI-2 output configuration
pub const LINK_FREQUENCIES: [u64; 1] = [400_000_000];
pub const NUM_DATA_LANES: u8 = 2;

/// MEDIA_BUS_FMT_Y10_1X10
pub const MBUS_FMT_Y10_1X10: u32 = 0x200a;

/// Register program for 1280x720 10-bit mono at 160 MHz pixel clock
pub const MODE_1280X720_REGS: [(u16, u8); 99] = [
    (0x0302, 0x32),
    (0x030d, 0x50),
    (0x030e, 0x02),
    (0x3001, 0x00),
    (0x3004, 0x00),
    (0x3005, 0x00),
    (0x3006, 0x04),
    (0x3011, 0x0a),
    (0x3013, 0x18),
    (0x301c, 0xf0),
    (0x3022, 0x01),
    (0x3030, 0x10),
    (0x3039, 0x32),
    (0x303a, 0x00),
    (0x3500, 0x00),
    (0x3501, 0x5f),
    (0x3502, 0x1e),
    (0x3503, 0x08),
    (0x3505, 0x8c),
    (0x3507, 0x03),
    (0x3508, 0x00),
    (0x3509, 0x10),
    (0x3610, 0x80),
    (0x3611, 0xa0),
    (0x3620, 0x6e),
    (0x3632, 0x56),
    (0x3633, 0x78),
    (0x3666, 0x00),
    (0x366f, 0x5a),
    (0x3680, 0x84),
    (0x3712, 0x80),
    (0x372d, 0x22),
    (0x3731, 0x80),
    (0x3732, 0x30),
    (0x3778, 0x00),
    (0x377d, 0x22),
    (0x3788, 0x02),
    (0x3789, 0xa4),
    (0x378a, 0x00),
    (0x378b, 0x4a),
    (0x3799, 0x20),
    (0x3800, 0x00),
    (0x3801, 0x00),
    (0x3802, 0x00),
    (0x3803, 0x00),
    (0x3804, 0x05),
    (0x3805, 0x0f),
    (0x3806, 0x02),
    (0x3807, 0xdf),
    (0x3808, 0x05),
    (0x3809, 0x00),
    (0x380a, 0x02),
    (0x380b, 0xd0),
    (0x380c, 0x05),
    (0x380d, 0xfa),
    (0x380e, 0x06),
    (0x380f, 0xce),
    (0x3810, 0x00),
    (0x3811, 0x08),
    (0x3812, 0x00),
    (0x3813, 0x08),
    (0x3814, 0x11),
    (0x3815, 0x11),
    (0x3820, 0x3c),
    (0x3821, 0x84),
    (0x3881, 0x42),
    (0x38a8, 0x02),
    (0x38a9, 0x80),
    (0x38b1, 0x00),
    (0x38c4, 0x00),
    (0x38c5, 0xc0),
    (0x38c6, 0x04),
    (0x38c7, 0x80),
    (0x3920, 0xff),
    (0x4003, 0x40),
    (0x4008, 0x02),
    (0x4009, 0x05),
    (0x400c, 0x00),
    (0x400d, 0x03),
    (0x4010, 0x40),
    (0x4043, 0x40),
    (0x4307, 0x30),
    (0x4317, 0x00),
    (0x4501, 0x00),
    (0x4507, 0x00),
    (0x4509, 0x80),
    (0x450a, 0x08),
    (0x4601, 0x04),
    (0x470f, 0x00),
    (0x4f07, 0x00),
    (0x4800, 0x20),
    (0x5000, 0x9f),
    (0x5001, 0x00),
    (0x5e00, 0x00),
    (0x5d00, 0x07),
    (0x5d01, 0x00),
    (0x0101, 0x01),
    (0x1000, 0x03),
    (0x5a08, 0x84),
];
