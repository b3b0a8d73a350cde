use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::codec;

// Error type.

/// Error type for the crate, which can represent either an error from this driver or an inner error
/// that comes from the I2C type.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<InnerError> {
    /// A voltage for the given channel was outside of `0.0..=4.095` volts.
    ///
    /// Only returned when the driver is configured with [`RangePolicy::Reject`](crate::RangePolicy);
    /// the default policy saturates out-of-range voltages instead.
    VoltageOutOfRange(Channel),
    /// The EEPROM did not report ready before the configured polling timeout elapsed.
    EepromTimeout,
    /// Error representing an error that came from the inner I2C driver.
    I2CError(InnerError),
}

impl<InnerError> From<InnerError> for Error<InnerError> {
    fn from(inner: InnerError) -> Self {
        Error::I2CError(inner)
    }
}

// Enums for configuration.

/// Output channel selection.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Channel {
    /// All channels in the order they appear on the wire.
    pub const ALL: [Channel; 4] = [Channel::A, Channel::B, Channel::C, Channel::D];
}

/// Configuration bit for which voltage reference a channel should use.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VoltageReferenceMode {
    /// Use the external pin VDD as a voltage reference.
    External = 0,
    /// Use the internal 2.048V reference.
    Internal = 1,
}

/// Configuration bits for the powered-down state of a channel.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerDownMode {
    /// Channel is not powered down.
    Normal = 0,
    /// Channel is powered down and output pin is connected to ground through a 1K resistor.
    PowerDownOneK = 1,
    /// Channel is powered down and output pin is connected to ground through a 100K resistor.
    PowerDownOneHundredK = 2,
    /// Channel is powered down and output pin is connected to ground through a 500K resistor.
    PowerDownFiveHundredK = 3,
}

/// Configuration bit for the gain selection mode of a channel.
///
/// If the channel is using an external reference, this bit is ignored and a gain of 1x is always
/// used.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GainMode {
    /// Gain is set to unity (1x).
    TimesOne = 0,
    /// Gain is set to 2x.
    TimesTwo = 1,
}

// Enums for status from reads.

/// Status of the EEPROM, from the RDY/BSY bit.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReadyState {
    /// The EEPROM is being programmed.
    ///
    /// Any additional commands recieved while busy will be ignored.
    Busy = 0,
    /// The EEPROM is not busy.
    Ready = 1,
}

/// The power-on-reset state of the entire device.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerState {
    /// The device is powered off.
    Off = 0,
    /// The device is powered on.
    On = 1,
}

// Container structs.

/// The configuration bits of a single channel: voltage reference, power-down and gain.
///
/// These are the upper four bits of every data high byte sent by
/// [`MCP4728::sequential_write_eeprom`](crate::MCP4728::sequential_write_eeprom) and
/// [`MCP4728::multi_write`](crate::MCP4728::multi_write).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMode {
    /// The voltage reference mode.
    pub voltage_reference_mode: VoltageReferenceMode,
    /// The power-down mode.
    pub power_down_mode: PowerDownMode,
    /// The gain mode.
    pub gain_mode: GainMode,
}

impl ChannelMode {
    /// The mode this driver assumes everywhere: internal 2.048V reference, powered on, x2 gain.
    ///
    /// Together these give the 0-4.095V full-scale range used by the voltage codec.
    pub const fn new() -> ChannelMode {
        ChannelMode {
            voltage_reference_mode: VoltageReferenceMode::Internal,
            power_down_mode: PowerDownMode::Normal,
            gain_mode: GainMode::TimesTwo,
        }
    }

    /// Convenience builder method to set voltage reference mode.
    pub fn voltage_reference_mode(mut self, new_val: VoltageReferenceMode) -> ChannelMode {
        self.voltage_reference_mode = new_val;
        self
    }

    /// Convenience builder method to set power down mode.
    pub fn power_down_mode(mut self, new_val: PowerDownMode) -> ChannelMode {
        self.power_down_mode = new_val;
        self
    }

    /// Convenience builder method to set gain mode.
    pub fn gain_mode(mut self, new_val: GainMode) -> ChannelMode {
        self.gain_mode = new_val;
        self
    }

    /// The mode bits positioned in the upper nibble of a data high byte.
    ///
    /// `VR PD PD G` in `|| VR PD PD G D D D D ||`.
    pub fn bits(&self) -> u8 {
        u8::from(self.voltage_reference_mode) << 7
            | u8::from(self.power_down_mode) << 5
            | u8::from(self.gain_mode) << 4
    }
}

impl Default for ChannelMode {
    fn default() -> Self {
        Self::new()
    }
}

/// One 3-byte register record from a read: status byte plus mode bits and a 12-bit code.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterRecord {
    /// Voltage reference, power-down and gain bits.
    pub mode: ChannelMode,
    /// The 12-bit value of the register.
    pub code: u16,
    /// The EEPROM Ready state of the device.
    ///
    /// Note that this is global to the entire device, but the protocol reports it for each record
    /// so that is duplicated here.
    pub ready_state: ReadyState,
    /// The Power-on-reset state of the device.
    ///
    /// Note that this is global to the entire device, but the protocol reports it for each record
    /// so that is duplicated here.
    pub power_state: PowerState,
}

impl RegisterRecord {
    /// The code of this record converted to volts.
    pub fn voltage(&self) -> f32 {
        codec::code_to_voltage(self.code)
    }
}

/// DAC input register and EEPROM contents of one channel.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRegisters {
    /// Contents of the DAC input register.
    pub dac: RegisterRecord,
    /// Contents of the EEPROM.
    pub eeprom: RegisterRecord,
}

/// Decoded contents of the 24-byte read-back report, indexed by [`Channel`].
///
/// The DAC input registers and EEPROM might differ if e.g. a fast write or multi write has been
/// used since the last EEPROM write.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadReport {
    /// Registers of channels A, B, C and D, in that order.
    pub channels: [ChannelRegisters; 4],
}

impl ReadReport {
    /// Registers of a single channel.
    pub fn channel(&self, channel: Channel) -> &ChannelRegisters {
        &self.channels[channel as usize]
    }

    /// Output voltages held in the DAC input registers.
    pub fn dac_voltages(&self) -> [f32; 4] {
        self.channels.map(|c| c.dac.voltage())
    }

    /// Power-on default voltages held in EEPROM.
    pub fn eeprom_voltages(&self) -> [f32; 4] {
        self.channels.map(|c| c.eeprom.voltage())
    }

    /// `true` for each channel whose DAC register selects x2 gain.
    pub fn gain_flags(&self) -> [bool; 4] {
        self.channels
            .map(|c| c.dac.mode.gain_mode == GainMode::TimesTwo)
    }

    /// `true` for each channel whose DAC register selects the internal 2.048V reference.
    pub fn reference_flags(&self) -> [bool; 4] {
        self.channels
            .map(|c| c.dac.mode.voltage_reference_mode == VoltageReferenceMode::Internal)
    }
}
