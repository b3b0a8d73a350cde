//! Conversion between volts and the 12-bit codes the MCP4728 works in.
//!
//! The mapping assumes the internal 2.048V reference with x2 gain, which gives a full scale of
//! 4.095V at code 4095 (1mV per code).

/// Voltage produced by the largest code.
pub const FULL_SCALE_VOLTS: f32 = 4.095;

/// Largest 12-bit code.
pub const MAX_CODE: u16 = 0x0fff;

/// How the driver treats voltages outside of `0.0..=FULL_SCALE_VOLTS`.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangePolicy {
    /// Saturate to code 0 or 4095.
    #[default]
    Clamp,
    /// Refuse the whole write with [`Error::VoltageOutOfRange`](crate::Error::VoltageOutOfRange).
    Reject,
}

/// Converts a voltage to the nearest code, saturating out-of-range input.
///
/// Negative voltages and NaN give 0, voltages above [`FULL_SCALE_VOLTS`] give [`MAX_CODE`].
pub fn voltage_to_code(voltage: f32) -> u16 {
    let scaled = voltage / FULL_SCALE_VOLTS * MAX_CODE as f32;
    // Negated so that NaN lands here too.
    if !(scaled > 0.0) {
        return 0;
    }
    if scaled >= MAX_CODE as f32 {
        return MAX_CODE;
    }
    nearest(scaled)
}

// `scaled + 0.5` would round 0.49999997 up to 1.0 before truncating.
fn nearest(scaled: f32) -> u16 {
    libm::roundf(scaled) as u16
}

/// Converts a voltage to a code, or `None` if it is outside of `0.0..=FULL_SCALE_VOLTS` or not
/// finite.
pub fn try_voltage_to_code(voltage: f32) -> Option<u16> {
    if voltage.is_finite() && (0.0..=FULL_SCALE_VOLTS).contains(&voltage) {
        Some(voltage_to_code(voltage))
    } else {
        None
    }
}

/// Converts a code back to volts. Bits above the 12-bit range are ignored.
pub fn code_to_voltage(code: u16) -> f32 {
    FULL_SCALE_VOLTS * (code & MAX_CODE) as f32 / MAX_CODE as f32
}

/// Splits a code into its high nibble (bits 8-11) and low byte (bits 0-7).
pub fn split_bytes(code: u16) -> (u8, u8) {
    let [high, low] = (code & MAX_CODE).to_be_bytes();
    (high, low)
}

/// Converts all four channel voltages according to `policy`.
///
/// On rejection, the first offending channel is returned.
pub(crate) fn voltages_to_codes(
    voltages: [f32; 4],
    policy: RangePolicy,
) -> Result<[u16; 4], crate::Channel> {
    let mut codes = [0; 4];
    for (i, (code, &voltage)) in codes.iter_mut().zip(voltages.iter()).enumerate() {
        *code = match policy {
            RangePolicy::Clamp => voltage_to_code(voltage),
            RangePolicy::Reject => {
                try_voltage_to_code(voltage).ok_or(crate::Channel::ALL[i])?
            }
        };
    }
    Ok(codes)
}
