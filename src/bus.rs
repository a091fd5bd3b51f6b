/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register access over the sensor's two-wire (i2c) configuration interface

use crate::regs::{Register, GROUP_HOLD, GROUP_HOLD_CLOSE, GROUP_HOLD_OPEN};
use crate::Error;

/// Widest register this sensor exposes, in bytes
const MAX_REG_WIDTH: usize = 4;

/// A single pending register update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    pub reg: Register,
    pub value: u32,
}

/// Register transport bound to one sensor address
pub struct SensorBus<I2C> {
    address: u8,
    i2c: I2C,
}

impl<I2C, CommE> SensorBus<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write<Error = CommE>
        + embedded_hal::blocking::i2c::WriteRead<Error = CommE>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { address, i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Read a big-endian register of up to four bytes from a 16-bit address
    pub fn read_reg(&mut self, reg: Register) -> Result<u32, Error<CommE>> {
        let width = reg.width as usize;
        debug_assert!(width > 0 && width <= MAX_REG_WIDTH);
        let cmd_buf = reg.address.to_be_bytes();
        let mut recv_buf = [0u8; MAX_REG_WIDTH];
        self.i2c
            .write_read(self.address, &cmd_buf, &mut recv_buf[..width])
            .map_err(Error::Comm)?;

        Ok(recv_buf[..width]
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)))
    }

    /// Write a big-endian register in one bus transaction;
    /// the sensor auto-increments through the register's bytes
    pub fn write_reg(
        &mut self,
        reg: Register,
        value: u32,
    ) -> Result<(), Error<CommE>> {
        let width = reg.width as usize;
        debug_assert!(width > 0 && width <= MAX_REG_WIDTH);
        let mut write_buf = [0u8; 2 + MAX_REG_WIDTH];
        write_buf[..2].copy_from_slice(&reg.address.to_be_bytes());
        let value_bytes = value.to_be_bytes();
        write_buf[2..2 + width]
            .copy_from_slice(&value_bytes[MAX_REG_WIDTH - width..]);
        self.i2c
            .write(self.address, &write_buf[..2 + width])
            .map_err(Error::Comm)?;
        Ok(())
    }

    /// Write a u8 to a 16-bit address
    pub fn write_reg_u8(
        &mut self,
        address: u16,
        val: u8,
    ) -> Result<(), Error<CommE>> {
        self.write_reg(Register::new(address, 1), u32::from(val))
    }

    /// Apply an ordered register program, stopping at the first failure
    pub fn write_table(
        &mut self,
        table: &[(u16, u8)],
    ) -> Result<(), Error<CommE>> {
        for &(address, val) in table {
            self.write_reg_u8(address, val)?;
        }
        Ok(())
    }

    /// Apply a set of updates so that they land on the same frame.
    /// A lone update is written directly; several are wrapped in a group hold.
    pub fn write_batch(
        &mut self,
        writes: &[RegWrite],
    ) -> Result<(), Error<CommE>> {
        match writes {
            [] => Ok(()),
            [single] => self.write_reg(single.reg, single.value),
            _ => self.group_hold(writes),
        }
    }

    /// Open a group hold, perform `writes`, then release the hold.
    /// The release is attempted even when an enclosed write fails,
    /// in which case the enclosed write's error is returned.
    pub fn group_hold(
        &mut self,
        writes: &[RegWrite],
    ) -> Result<(), Error<CommE>> {
        self.write_reg(GROUP_HOLD, GROUP_HOLD_OPEN)?;

        let applied = writes
            .iter()
            .try_for_each(|write| self.write_reg(write.reg, write.value));
        let released = self.write_reg(GROUP_HOLD, GROUP_HOLD_CLOSE);

        match (applied, released) {
            (Err(err), released) => {
                if released.is_err() {
                    log::warn!("group hold release failed after write error");
                }
                Err(err)
            }
            (Ok(()), released) => released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{ANALOG_GAIN, CHIP_ID, EXPOSURE, LINES_PER_FRAME};
    use embedded_hal_mock::i2c::{
        Mock as I2cMock, Transaction as I2cTransaction,
    };
    use embedded_hal_mock::MockError;
    use std::io::ErrorKind;

    const ADDR: u8 = 0x60;

    fn bus_error() -> MockError {
        MockError::Io(ErrorKind::Other)
    }

    #[test]
    fn reads_multi_byte_register_big_endian() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![0x30, 0x0a],
            vec![0x92, 0x81],
        )];
        let mut i2c = I2cMock::new(&expectations);
        let mut bus = SensorBus::new(i2c.clone(), ADDR);

        assert_eq!(bus.read_reg(CHIP_ID).unwrap(), 0x9281);
        i2c.done();
    }

    #[test]
    fn writes_register_width_bytes() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x38, 0x0e, 0x06, 0xce]),
            I2cTransaction::write(ADDR, vec![0x35, 0x00, 0x01, 0x23, 0x40]),
            I2cTransaction::write(ADDR, vec![0x35, 0x09, 0x10]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut bus = SensorBus::new(i2c.clone(), ADDR);

        bus.write_reg(LINES_PER_FRAME, 1742).unwrap();
        bus.write_reg(EXPOSURE, 0x1234 << 4).unwrap();
        bus.write_reg(ANALOG_GAIN, 0x10).unwrap();
        i2c.done();
    }

    #[test]
    fn single_write_skips_group_hold() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![0x35, 0x09, 0x20])];
        let mut i2c = I2cMock::new(&expectations);
        let mut bus = SensorBus::new(i2c.clone(), ADDR);

        bus.write_batch(&[RegWrite {
            reg: ANALOG_GAIN,
            value: 0x20,
        }])
        .unwrap();
        i2c.done();
    }

    #[test]
    fn several_writes_are_held() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x33, 0x08, 0x01]),
            I2cTransaction::write(ADDR, vec![0x35, 0x09, 0x20]),
            I2cTransaction::write(ADDR, vec![0x38, 0x0e, 0x03, 0x67]),
            I2cTransaction::write(ADDR, vec![0x33, 0x08, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut bus = SensorBus::new(i2c.clone(), ADDR);

        bus.write_batch(&[
            RegWrite {
                reg: ANALOG_GAIN,
                value: 0x20,
            },
            RegWrite {
                reg: LINES_PER_FRAME,
                value: 871,
            },
        ])
        .unwrap();
        i2c.done();
    }

    #[test]
    fn failed_write_still_releases_hold() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x33, 0x08, 0x01]),
            I2cTransaction::write(ADDR, vec![0x35, 0x09, 0x20])
                .with_error(bus_error()),
            I2cTransaction::write(ADDR, vec![0x33, 0x08, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut bus = SensorBus::new(i2c.clone(), ADDR);

        let result = bus.group_hold(&[
            RegWrite {
                reg: ANALOG_GAIN,
                value: 0x20,
            },
            RegWrite {
                reg: LINES_PER_FRAME,
                value: 871,
            },
        ]);
        assert!(matches!(result, Err(Error::Comm(_))));
        i2c.done();
    }

    #[test]
    fn table_stops_at_first_failure() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x03, 0x02, 0x32]),
            I2cTransaction::write(ADDR, vec![0x03, 0x0d, 0x50])
                .with_error(bus_error()),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut bus = SensorBus::new(i2c.clone(), ADDR);

        let result =
            bus.write_table(&[(0x0302, 0x32), (0x030d, 0x50), (0x030e, 0x02)]);
        assert!(matches!(result, Err(Error::Comm(_))));
        i2c.done();
    }
}
