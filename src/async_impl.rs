use crate::frame;
use crate::types::*;
use crate::{EepromSettle, MCP4728};

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c;

/// Implementation of all commands given an async I2C bus.
///
/// Each method behaves exactly like its blocking counterpart without the `_async` suffix.
///
/// # Errors
///
/// Any errors encountered within the I2C device will be wrapped in [`Error::I2CError`].
impl<I, E> MCP4728<I>
where
    I: i2c::I2c<Error = E>,
{
    async fn write_bytes_async(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("MCP4728 write to {=u8:#x}: {=[u8]:#x}", address, bytes);
        self.i2c.write(address, bytes).await.map_err(Error::I2CError)
    }

    /// Puts the device into the state the rest of the driver assumes: 0V in EEPROM, x2 gain and
    /// internal reference on all channels.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use mcp4728_voltage::MCP4728;
    ///
    /// let mut dac = MCP4728::new(i2c, 0x60);
    /// dac.initialize_async(&mut delay).await.unwrap();
    /// dac.fast_write_async([1.0, 2.0, 3.0, 4.0]).await.unwrap();
    /// ```
    pub async fn initialize_async<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("MCP4728 {=u8:#x}: initializing", self.config.address);
        self.sequential_write_eeprom_async([0.0; 4], delay).await?;
        self.set_gain_x2_async(true).await?;
        self.set_internal_reference_async(true).await
    }

    /// Reads all registers of all channels from the device.
    pub async fn read_report_async(&mut self) -> Result<ReadReport, Error<E>> {
        let mut bytes = [0; frame::READ_REPORT_LEN];
        self.i2c.read(self.config.address, &mut bytes).await?;
        Ok(frame::parse_report(&bytes))
    }

    /// Reads the output voltages held in the DAC input registers.
    pub async fn read_dac_voltages_async(&mut self) -> Result<[f32; 4], Error<E>> {
        Ok(self.read_report_async().await?.dac_voltages())
    }

    /// Reads the power-on default voltages stored in EEPROM.
    pub async fn read_eeprom_voltages_async(&mut self) -> Result<[f32; 4], Error<E>> {
        Ok(self.read_report_async().await?.eeprom_voltages())
    }

    /// Reads the gain of each channel: `true` for x2, `false` for x1.
    pub async fn read_gain_flags_async(&mut self) -> Result<[bool; 4], Error<E>> {
        Ok(self.read_report_async().await?.gain_flags())
    }

    /// Reads the reference of each channel: `true` for internal, `false` for VDD.
    pub async fn read_reference_flags_async(&mut self) -> Result<[bool; 4], Error<E>> {
        Ok(self.read_report_async().await?.reference_flags())
    }

    /// Issues a general call reset (address 0x00). Affects **every** MCP4728 on the bus.
    pub async fn reset_all_devices_async(&mut self) -> Result<(), Error<E>> {
        self.write_bytes_async(
            frame::ADDRESS_GENERAL_CALL,
            &[frame::COMMAND_GENERAL_CALL_RESET],
        )
        .await
    }

    /// Issues a general call wake-up (address 0x00). Affects **every** MCP4728 on the bus.
    pub async fn wake_all_devices_async(&mut self) -> Result<(), Error<E>> {
        self.write_bytes_async(
            frame::ADDRESS_GENERAL_CALL,
            &[frame::COMMAND_GENERAL_CALL_WAKE_UP],
        )
        .await
    }

    /// Issues a general call software update (address 0x00). Affects **every** MCP4728 on the
    /// bus.
    pub async fn software_update_all_devices_async(&mut self) -> Result<(), Error<E>> {
        self.write_bytes_async(
            frame::ADDRESS_GENERAL_CALL,
            &[frame::COMMAND_GENERAL_CALL_SOFTWARE_UPDATE],
        )
        .await
    }

    /// Updates the output voltages of all four channels without touching the EEPROM.
    pub async fn fast_write_async(&mut self, voltages: [f32; 4]) -> Result<(), Error<E>> {
        let codes = self.codes(voltages)?;
        self.write_bytes_async(self.config.address, &frame::fast_write(codes))
            .await
    }

    /// Updates the output voltages of all four channels in the input registers and EEPROM, then
    /// waits for the EEPROM write to complete.
    pub async fn sequential_write_eeprom_async<D: DelayNs>(
        &mut self,
        voltages: [f32; 4],
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        let codes = self.codes(voltages)?;
        let bytes = frame::sequential_write(codes, &self.config.channel_modes);
        self.write_bytes_async(self.config.address, &bytes).await?;
        self.wait_for_eeprom_async(delay).await
    }

    /// Updates the output voltages of all four channels with one addressed triplet per channel.
    pub async fn multi_write_async(&mut self, voltages: [f32; 4]) -> Result<(), Error<E>> {
        let codes = self.codes(voltages)?;
        let bytes = frame::multi_write(codes, &self.config.channel_modes);
        self.write_bytes_async(self.config.address, &bytes).await
    }

    /// Sets x2 (`true`) or x1 (`false`) gain on all channels.
    pub async fn set_gain_x2_async(&mut self, enabled: bool) -> Result<(), Error<E>> {
        let mode = if enabled {
            GainMode::TimesTwo
        } else {
            GainMode::TimesOne
        };
        self.write_gain_mode_async([mode; 4]).await
    }

    /// Selects the internal 2.048V reference (`true`) or VDD (`false`) on all channels.
    pub async fn set_internal_reference_async(&mut self, enabled: bool) -> Result<(), Error<E>> {
        let mode = if enabled {
            VoltageReferenceMode::Internal
        } else {
            VoltageReferenceMode::External
        };
        self.write_voltage_reference_mode_async([mode; 4]).await
    }

    /// Writes only the voltage reference mode bits for all channels.
    pub async fn write_voltage_reference_mode_async(
        &mut self,
        modes: [VoltageReferenceMode; 4],
    ) -> Result<(), Error<E>> {
        let byte = frame::write_voltage_reference_mode(modes);
        self.write_bytes_async(self.config.address, &[byte]).await
    }

    /// Writes only the gain mode bits for all channels.
    pub async fn write_gain_mode_async(&mut self, modes: [GainMode; 4]) -> Result<(), Error<E>> {
        let byte = frame::write_gain_mode(modes);
        self.write_bytes_async(self.config.address, &[byte]).await
    }

    /// Writes only the power down mode bits for all channels.
    pub async fn write_power_down_mode_async(
        &mut self,
        modes: [PowerDownMode; 4],
    ) -> Result<(), Error<E>> {
        let bytes = frame::write_power_down_mode(modes);
        self.write_bytes_async(self.config.address, &bytes).await
    }

    async fn wait_for_eeprom_async<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        match self.config.eeprom_settle {
            EepromSettle::Fixed { ms } => {
                delay.delay_ms(ms).await;
                Ok(())
            }
            EepromSettle::PollReady {
                interval_ms,
                timeout_ms,
            } => {
                let mut waited: u32 = 0;
                loop {
                    delay.delay_ms(interval_ms).await;
                    waited = waited.saturating_add(interval_ms);
                    if let Ok(ReadyState::Ready) = self.read_ready_state_async().await {
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

    async fn read_ready_state_async(&mut self) -> Result<ReadyState, E> {
        let mut status = [0; 1];
        self.i2c.read(self.config.address, &mut status).await?;
        Ok(frame::parse_ready_state(status[0]))
    }
}
