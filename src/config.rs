//! Driver configuration.

use crate::codec::RangePolicy;
use crate::types::{Channel, ChannelMode};

/// Factory-programmed I2C address of the MCP4728 (address bits `000`).
pub const DEFAULT_ADDRESS: u8 = 0x60;

/// Default wait after an EEPROM write.
pub const DEFAULT_EEPROM_SETTLE_MS: u32 = 100;

/// Shortest accepted fixed EEPROM settle time, the datasheet's maximum EEPROM write time.
pub const MIN_EEPROM_SETTLE_MS: u32 = 50;

/// How to wait for the EEPROM to finish programming after a sequential write.
///
/// The device ignores commands while the EEPROM is busy, so every EEPROM write is followed by one
/// of these before the call returns.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromSettle {
    /// Sleep for a fixed number of milliseconds. Must be at least [`MIN_EEPROM_SETTLE_MS`].
    Fixed {
        /// Time to sleep in milliseconds.
        ms: u32,
    },
    /// Repeatedly sleep for `interval_ms` and read the RDY/BSY bit until it reports ready.
    ///
    /// Failed reads (e.g. the device not acknowledging its address) count as busy. Gives up with
    /// [`Error::EepromTimeout`](crate::Error::EepromTimeout) once `timeout_ms` has passed.
    PollReady {
        /// Time between status reads. Must be non-zero.
        interval_ms: u32,
        /// Total time to wait before giving up.
        timeout_ms: u32,
    },
}

impl Default for EepromSettle {
    fn default() -> Self {
        EepromSettle::Fixed {
            ms: DEFAULT_EEPROM_SETTLE_MS,
        }
    }
}

/// Reason a [`Config`] was refused.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Address does not fit in 7 bits or is the general call address.
    InvalidAddress,
    /// Fixed settle time below [`MIN_EEPROM_SETTLE_MS`].
    SettleTooShort,
    /// Polling interval of zero.
    ZeroPollInterval,
}

/// User-facing configuration for the MCP4728 driver.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit I2C address of the device.
    pub address: u8,
    /// Wait strategy after EEPROM writes.
    pub eeprom_settle: EepromSettle,
    /// Handling of voltages outside of the 0-4.095V range.
    pub range_policy: RangePolicy,
    /// Mode bits sent with each channel in sequential and multi writes.
    ///
    /// Defaults to [`ChannelMode::new`] (internal reference, x2 gain) for every channel, which is
    /// what the voltage codec assumes.
    pub channel_modes: [ChannelMode; 4],
}

impl Config {
    /// Creates a configuration with defaults for everything.
    pub fn new() -> Config {
        Config {
            address: DEFAULT_ADDRESS,
            eeprom_settle: EepromSettle::default(),
            range_policy: RangePolicy::default(),
            channel_modes: [ChannelMode::new(); 4],
        }
    }

    /// Convenience builder method to set the I2C address.
    pub fn address(mut self, new_val: u8) -> Config {
        self.address = new_val;
        self
    }

    /// Convenience builder method to set the EEPROM settle strategy.
    pub fn eeprom_settle(mut self, new_val: EepromSettle) -> Config {
        self.eeprom_settle = new_val;
        self
    }

    /// Convenience builder method to set the range policy.
    pub fn range_policy(mut self, new_val: RangePolicy) -> Config {
        self.range_policy = new_val;
        self
    }

    /// Convenience builder method to set the mode bits of one channel.
    pub fn channel_mode(mut self, channel: Channel, new_val: ChannelMode) -> Config {
        self.channel_modes[channel as usize] = new_val;
        self
    }

    /// Checks the configuration against the datasheet limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address == 0 || self.address > 0x7f {
            return Err(ConfigError::InvalidAddress);
        }
        match self.eeprom_settle {
            EepromSettle::Fixed { ms } if ms < MIN_EEPROM_SETTLE_MS => {
                Err(ConfigError::SettleTooShort)
            }
            EepromSettle::PollReady { interval_ms: 0, .. } => Err(ConfigError::ZeroPollInterval),
            _ => Ok(()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GainMode;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
        assert_eq!(Config::default().address, 0x60);
        assert_eq!(
            Config::default().eeprom_settle,
            EepromSettle::Fixed { ms: 100 }
        );
    }

    #[test]
    fn rejects_short_settle_time() {
        let config = Config::new().eeprom_settle(EepromSettle::Fixed { ms: 49 });
        assert_eq!(config.validate(), Err(ConfigError::SettleTooShort));
        let config = Config::new().eeprom_settle(EepromSettle::Fixed { ms: 50 });
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let config = Config::new().eeprom_settle(EepromSettle::PollReady {
            interval_ms: 0,
            timeout_ms: 100,
        });
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }

    #[test]
    fn rejects_bad_addresses() {
        assert_eq!(
            Config::new().address(0x00).validate(),
            Err(ConfigError::InvalidAddress)
        );
        assert_eq!(
            Config::new().address(0x80).validate(),
            Err(ConfigError::InvalidAddress)
        );
        assert_eq!(Config::new().address(0x67).validate(), Ok(()));
    }

    #[test]
    fn channel_mode_builder_touches_one_channel() {
        let mode = ChannelMode::new().gain_mode(GainMode::TimesOne);
        let config = Config::new().channel_mode(Channel::C, mode);
        assert_eq!(
            config.channel_modes,
            [ChannelMode::new(), ChannelMode::new(), mode, ChannelMode::new()]
        );
    }
}
