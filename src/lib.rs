//! # Rust voltage driver for the MCP4728 4-channel 12-bit I2C DAC
//!
//! This is a platform agnostic rust driver for the MCP4728 DAC using the [embedded-hal](https://github.com/rust-embedded/embedded-hal) traits.
//! It works in volts rather than raw codes: every channel is assumed to run from the internal
//! 2.048V reference with x2 gain, so codes 0-4095 map to 0-4.095V.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(target_os = "linux")] {
//! use linux_embedded_hal::{Delay, I2cdev};
//! use mcp4728_voltage::MCP4728;
//!
//! let i2c = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut dac = MCP4728::new(i2c, 0x61);
//! dac.initialize(&mut Delay).unwrap();
//! dac.fast_write([2.1, 0.0, 3.5, 4.0]).unwrap();
//! let voltages = dac.read_dac_voltages().unwrap();
//! # }
//! ```
//!
//! # Features
//!
//! - `sync` (default): blocking API on [`embedded_hal::i2c::I2c`].
//! - `async`: the same API with an `_async` suffix on [`embedded_hal_async::i2c::I2c`].
//! - `defmt`: `defmt::Format` for all public types and trace logging of every bus write.
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "async")]
mod async_impl;
mod codec;
mod config;
mod frame;
mod types;

pub use crate::codec::{
    code_to_voltage, split_bytes, try_voltage_to_code, voltage_to_code, RangePolicy,
    FULL_SCALE_VOLTS, MAX_CODE,
};
pub use crate::config::*;
pub use crate::types::*;

#[cfg(feature = "sync")]
use embedded_hal::{delay::DelayNs, i2c};

/// MCP4728 4-channel 12-bit I2C DAC.
///
/// The driver keeps no record of the device state. Gain, reference and power-down modes live on
/// the chip only, so commands such as [`MCP4728::fast_write`] rely on them having been set by
/// [`MCP4728::initialize`] (or equivalent commands) beforehand.
pub struct MCP4728<I2C> {
    i2c: I2C,
    config: Config,
}

impl<I2C> MCP4728<I2C> {
    /// Creates a new [`MCP4728`] at `address` with the default [`Config`].
    ///
    /// Nothing is sent to the device; call [`MCP4728::initialize`] to put it in a known state.
    ///
    /// `address` is not checked in release builds. An address of `0x00` is the general call
    /// address and would send every frame to all devices on the bus; use
    /// [`MCP4728::with_config`] when the address comes from outside the program.
    pub fn new(i2c: I2C, address: u8) -> Self {
        debug_assert!(
            address != 0 && address <= 0x7f,
            "MCP4728 address must be a non-zero 7-bit address"
        );
        MCP4728 {
            i2c,
            config: Config::new().address(address),
        }
    }

    /// Creates a new [`MCP4728`] with a custom [`Config`], which is validated first.
    pub fn with_config(i2c: I2C, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(MCP4728 { i2c, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Destroy this instance and return the inner I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn codes<E>(&self, voltages: [f32; 4]) -> Result<[u16; 4], Error<E>> {
        codec::voltages_to_codes(voltages, self.config.range_policy)
            .map_err(Error::VoltageOutOfRange)
    }
}

/// Implementation of all commands given a blocking I2C bus.
///
/// # Errors
///
/// Any errors encountered within the I2C device will be wrapped in [`Error::I2CError`].
#[cfg(feature = "sync")]
impl<I2C, E> MCP4728<I2C>
where
    I2C: i2c::I2c<Error = E>,
{
    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("MCP4728 write to {=u8:#x}: {=[u8]:#x}", address, bytes);
        self.i2c.write(address, bytes).map_err(Error::I2CError)
    }

    /// Puts the device into the state the rest of the driver assumes.
    ///
    /// In order:
    ///   1. Sequential EEPROM write of 0V to all channels, followed by the EEPROM settle wait.
    ///   2. x2 gain on all channels.
    ///   3. Internal voltage reference on all channels.
    ///
    /// This costs one EEPROM write cycle, so call it once per device rather than on every boot
    /// loop iteration. Stops at the first failing step.
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("MCP4728 {=u8:#x}: initializing", self.config.address);
        self.sequential_write_eeprom([0.0; 4], delay)?;
        self.set_gain_x2(true)?;
        self.set_internal_reference(true)
    }

    /// Reads all registers of all channels from the device.
    ///
    /// Each channel includes both the values in EEPROM and in the input registers to the DAC, which
    /// might differ if e.g. fast_write has been used.
    pub fn read_report(&mut self) -> Result<ReadReport, Error<E>> {
        let mut bytes = [0; frame::READ_REPORT_LEN];
        self.i2c.read(self.config.address, &mut bytes)?;
        Ok(frame::parse_report(&bytes))
    }

    /// Reads the output voltages held in the DAC input registers.
    pub fn read_dac_voltages(&mut self) -> Result<[f32; 4], Error<E>> {
        Ok(self.read_report()?.dac_voltages())
    }

    /// Reads the power-on default voltages stored in EEPROM.
    pub fn read_eeprom_voltages(&mut self) -> Result<[f32; 4], Error<E>> {
        Ok(self.read_report()?.eeprom_voltages())
    }

    /// Reads the gain of each channel: `true` for x2, `false` for x1.
    pub fn read_gain_flags(&mut self) -> Result<[bool; 4], Error<E>> {
        Ok(self.read_report()?.gain_flags())
    }

    /// Reads the reference of each channel: `true` for the internal 2.048V reference, `false` for
    /// VDD.
    pub fn read_reference_flags(&mut self) -> Result<[bool; 4], Error<E>> {
        Ok(self.read_report()?.reference_flags())
    }

    /// Issues a general call command (address 0x00) to reset the device.
    ///
    /// **Every** MCP4728 on the bus, not just this one, will abort any conversion, reset, and load
    /// the values from EEPROM into the output registers.
    pub fn reset_all_devices(&mut self) -> Result<(), Error<E>> {
        self.write_bytes(
            frame::ADDRESS_GENERAL_CALL,
            &[frame::COMMAND_GENERAL_CALL_RESET],
        )
    }

    /// Issues a general call command (address 0x00) to wake up the device.
    ///
    /// **Every** MCP4728 on the bus, not just this one, will reset its power down bits and turn on
    /// all channels.
    pub fn wake_all_devices(&mut self) -> Result<(), Error<E>> {
        self.write_bytes(
            frame::ADDRESS_GENERAL_CALL,
            &[frame::COMMAND_GENERAL_CALL_WAKE_UP],
        )
    }

    /// Issues a general call command (address 0x00) to update software.
    ///
    /// **Every** MCP4728 on the bus, not just this one, will immediately update its output
    /// voltages from the input registers.
    pub fn software_update_all_devices(&mut self) -> Result<(), Error<E>> {
        self.write_bytes(
            frame::ADDRESS_GENERAL_CALL,
            &[frame::COMMAND_GENERAL_CALL_SOFTWARE_UPDATE],
        )
    }

    /// Updates the output voltages of all four channels and keeps them powered on.
    ///
    /// This command writes to the input registers directly and does not affect the EEPROM, so it
    /// is the one to use for frequent updates.  The voltage reference mode and gain mode are not
    /// affected; they must already be internal and x2 (see [`MCP4728::initialize`]) for the
    /// output to match the requested voltages.
    ///
    /// # Errors
    ///
    /// In addition to the internal I2C errors, this can return [`Error::VoltageOutOfRange`] under
    /// [`RangePolicy::Reject`].
    pub fn fast_write(&mut self, voltages: [f32; 4]) -> Result<(), Error<E>> {
        let codes = self.codes(voltages)?;
        self.write_bytes(self.config.address, &frame::fast_write(codes))
    }

    /// Updates the output voltages of all four channels in both the input registers and EEPROM,
    /// then waits for the EEPROM write to complete.
    ///
    /// Each channel is sent with its [`Config::channel_modes`] bits, by default internal reference
    /// and x2 gain.  The wait follows [`Config::eeprom_settle`].
    ///
    /// The EEPROM has limited write endurance; prefer [`MCP4728::fast_write`] for anything
    /// frequent.
    ///
    /// # Errors
    ///
    /// In addition to the internal I2C errors, this can return [`Error::VoltageOutOfRange`] under
    /// [`RangePolicy::Reject`] and [`Error::EepromTimeout`] under [`EepromSettle::PollReady`].
    pub fn sequential_write_eeprom<D: DelayNs>(
        &mut self,
        voltages: [f32; 4],
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        let codes = self.codes(voltages)?;
        let bytes = frame::sequential_write(codes, &self.config.channel_modes);
        self.write_bytes(self.config.address, &bytes)?;
        self.wait_for_eeprom(delay)
    }

    /// Updates the output voltages of all four channels with one addressed triplet per channel.
    ///
    /// Each channel is sent with its [`Config::channel_modes`] bits.  The EEPROM is not affected.
    ///
    /// # Errors
    ///
    /// In addition to the internal I2C errors, this can return [`Error::VoltageOutOfRange`] under
    /// [`RangePolicy::Reject`].
    pub fn multi_write(&mut self, voltages: [f32; 4]) -> Result<(), Error<E>> {
        let codes = self.codes(voltages)?;
        let bytes = frame::multi_write(codes, &self.config.channel_modes);
        self.write_bytes(self.config.address, &bytes)
    }

    /// Sets x2 (`true`) or x1 (`false`) gain on all channels.
    pub fn set_gain_x2(&mut self, enabled: bool) -> Result<(), Error<E>> {
        let mode = if enabled {
            GainMode::TimesTwo
        } else {
            GainMode::TimesOne
        };
        self.write_gain_mode([mode; 4])
    }

    /// Selects the internal 2.048V reference (`true`) or VDD (`false`) on all channels.
    pub fn set_internal_reference(&mut self, enabled: bool) -> Result<(), Error<E>> {
        let mode = if enabled {
            VoltageReferenceMode::Internal
        } else {
            VoltageReferenceMode::External
        };
        self.write_voltage_reference_mode([mode; 4])
    }

    /// Writes only the voltage reference mode bits for all channels.
    ///
    /// The EEPROM data is not affected and the output of each channel is updated after the command
    /// has been received.
    pub fn write_voltage_reference_mode(
        &mut self,
        modes: [VoltageReferenceMode; 4],
    ) -> Result<(), Error<E>> {
        let byte = frame::write_voltage_reference_mode(modes);
        self.write_bytes(self.config.address, &[byte])
    }

    /// Writes only the gain mode bits for all channels.
    ///
    /// The EEPROM data is not affected and the output of each channel is updated after the command
    /// has been received.
    pub fn write_gain_mode(&mut self, modes: [GainMode; 4]) -> Result<(), Error<E>> {
        let byte = frame::write_gain_mode(modes);
        self.write_bytes(self.config.address, &[byte])
    }

    /// Writes only the power down mode bits for all channels.
    ///
    /// The EEPROM data is not affected.
    pub fn write_power_down_mode(&mut self, modes: [PowerDownMode; 4]) -> Result<(), Error<E>> {
        let bytes = frame::write_power_down_mode(modes);
        self.write_bytes(self.config.address, &bytes)
    }

    fn wait_for_eeprom<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        match self.config.eeprom_settle {
            EepromSettle::Fixed { ms } => {
                delay.delay_ms(ms);
                Ok(())
            }
            EepromSettle::PollReady {
                interval_ms,
                timeout_ms,
            } => {
                let mut waited: u32 = 0;
                loop {
                    delay.delay_ms(interval_ms);
                    waited = waited.saturating_add(interval_ms);
                    // A NACK while programming is expected, keep polling.
                    if let Ok(ReadyState::Ready) = self.read_ready_state() {
                        #[cfg(feature = "defmt")]
                        defmt::debug!("MCP4728 EEPROM ready after {=u32} ms", waited);
                        return Ok(());
                    }
                    if waited >= timeout_ms {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("MCP4728 EEPROM still busy after {=u32} ms", waited);
                        return Err(Error::EepromTimeout);
                    }
                }
            }
        }
    }

    fn read_ready_state(&mut self) -> Result<ReadyState, E> {
        let mut status = [0; 1];
        self.i2c.read(self.config.address, &mut status)?;
        Ok(frame::parse_ready_state(status[0]))
    }
}
