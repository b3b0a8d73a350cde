//! Byte layouts of the MCP4728 command set. None of these touch the bus.

use crate::codec::split_bytes;
use crate::types::*;

pub(crate) const ADDRESS_GENERAL_CALL: u8 = 0x00;
pub(crate) const COMMAND_GENERAL_CALL_RESET: u8 = 0b00000110;
pub(crate) const COMMAND_GENERAL_CALL_WAKE_UP: u8 = 0b00001001;
pub(crate) const COMMAND_GENERAL_CALL_SOFTWARE_UPDATE: u8 = 0b00001000;
const COMMAND_MULTI_WRITE: u8 = 0b01000000;
const COMMAND_SEQUENTIAL_WRITE: u8 = 0b01010000;
const COMMAND_WRITE_VOLTAGE_REFERENCE_MODE: u8 = 0b10000000;
const COMMAND_WRITE_GAIN_MODE: u8 = 0b11000000;
const COMMAND_WRITE_POWER_DOWN_MODE: u8 = 0b10100000;

pub(crate) const FAST_WRITE_LEN: usize = 8;
pub(crate) const SEQUENTIAL_WRITE_LEN: usize = 9;
pub(crate) const MULTI_WRITE_LEN: usize = 12;
pub(crate) const READ_REPORT_LEN: usize = 24;

const RECORD_LEN: usize = 3;
const CHANNEL_GROUP_LEN: usize = 2 * RECORD_LEN;

/// Fast write of all four channels.
///
/// `|| 0 0 PD PD D D D D || D D D D D D D D ||` per channel, with the command and power-down bits
/// left at zero so the channels stay powered on.
pub(crate) fn fast_write(codes: [u16; 4]) -> [u8; FAST_WRITE_LEN] {
    let mut bytes = [0; FAST_WRITE_LEN];
    for (i, &code) in codes.iter().enumerate() {
        let (high, low) = split_bytes(code);
        bytes[2 * i] = high;
        bytes[2 * i + 1] = low;
    }
    bytes
}

/// Sequential write of channels A through D to the input registers and EEPROM.
///
/// `|| 0 1 0 1 0 CH CH UDAC || VR PD PD G D D D D || D D D D D D D D || ...`
pub(crate) fn sequential_write(
    codes: [u16; 4],
    modes: &[ChannelMode; 4],
) -> [u8; SEQUENTIAL_WRITE_LEN] {
    let mut bytes = [0; SEQUENTIAL_WRITE_LEN];
    bytes[0] = COMMAND_SEQUENTIAL_WRITE | u8::from(Channel::A) << 1;
    for (i, (&code, mode)) in codes.iter().zip(modes.iter()).enumerate() {
        let (high, low) = split_bytes(code);
        bytes[1 + 2 * i] = mode.bits() | high;
        bytes[2 + 2 * i] = low;
    }
    bytes
}

/// Multi write of all four channels to the input registers only.
///
/// `|| 0 1 0 0 0 CH CH UDAC || VR PD PD G D D D D || D D D D D D D D ||` repeated per channel.
pub(crate) fn multi_write(codes: [u16; 4], modes: &[ChannelMode; 4]) -> [u8; MULTI_WRITE_LEN] {
    let mut bytes = [0; MULTI_WRITE_LEN];
    for (i, channel) in Channel::ALL.iter().enumerate() {
        let (high, low) = split_bytes(codes[i]);
        bytes[3 * i] = COMMAND_MULTI_WRITE | u8::from(*channel) << 1;
        bytes[3 * i + 1] = modes[i].bits() | high;
        bytes[3 * i + 2] = low;
    }
    bytes
}

// One bit per channel, channel A in bit 3.
fn per_channel_bits(bits: [u8; 4]) -> u8 {
    bits[0] << 3 | bits[1] << 2 | bits[2] << 1 | bits[3]
}

pub(crate) fn write_voltage_reference_mode(modes: [VoltageReferenceMode; 4]) -> u8 {
    COMMAND_WRITE_VOLTAGE_REFERENCE_MODE | per_channel_bits(modes.map(u8::from))
}

pub(crate) fn write_gain_mode(modes: [GainMode; 4]) -> u8 {
    COMMAND_WRITE_GAIN_MODE | per_channel_bits(modes.map(u8::from))
}

pub(crate) fn write_power_down_mode(modes: [PowerDownMode; 4]) -> [u8; 2] {
    let [a, b, c, d] = modes.map(u8::from);
    [COMMAND_WRITE_POWER_DOWN_MODE | a << 2 | b, c << 6 | d << 4]
}

// Both fields are masked to their full width, so every value maps to a variant.
fn parse_record(bytes: &[u8]) -> RegisterRecord {
    RegisterRecord {
        mode: ChannelMode {
            voltage_reference_mode: VoltageReferenceMode::try_from((bytes[1] & 0b10000000) >> 7)
                .unwrap_or(VoltageReferenceMode::External),
            power_down_mode: PowerDownMode::try_from((bytes[1] & 0b01100000) >> 5)
                .unwrap_or(PowerDownMode::Normal),
            gain_mode: GainMode::try_from((bytes[1] & 0b00010000) >> 4)
                .unwrap_or(GainMode::TimesOne),
        },
        code: u16::from_be_bytes([bytes[1] & 0b00001111, bytes[2]]),
        ready_state: parse_ready_state(bytes[0]),
        power_state: PowerState::try_from((bytes[0] & 0b01000000) >> 6)
            .unwrap_or(PowerState::Off),
    }
}

/// RDY/BSY is the top bit of every status byte.
pub(crate) fn parse_ready_state(status: u8) -> ReadyState {
    ReadyState::try_from((status & 0b10000000) >> 7).unwrap_or(ReadyState::Busy)
}

/// Splits the 24-byte report into 6-byte channel groups of `[DAC record, EEPROM record]`.
pub(crate) fn parse_report(bytes: &[u8; READ_REPORT_LEN]) -> ReadReport {
    ReadReport {
        channels: core::array::from_fn(|i| {
            let group = &bytes[i * CHANNEL_GROUP_LEN..(i + 1) * CHANNEL_GROUP_LEN];
            ChannelRegisters {
                dac: parse_record(&group[..RECORD_LEN]),
                eeprom: parse_record(&group[RECORD_LEN..]),
            }
        }),
    }
}
