//! Property-based tests for the voltage codec.

use mcp4728_voltage::{
    code_to_voltage, split_bytes, try_voltage_to_code, voltage_to_code, FULL_SCALE_VOLTS,
    MAX_CODE,
};

// One code's worth of voltage, plus slack for f32 rounding.
const ONE_CODE: f32 = FULL_SCALE_VOLTS / MAX_CODE as f32 + 1e-5;

proptest::proptest! {
    /// Converting to a code and back lands within one code of the input.
    #[test]
    fn round_trip_within_one_code(v in 0.0f32..=FULL_SCALE_VOLTS) {
        let back = code_to_voltage(voltage_to_code(v));
        assert!((back - v).abs() <= ONE_CODE, "{} -> {}", v, back);
    }

    /// Every code survives code -> voltage -> code unchanged.
    #[test]
    fn codes_round_trip_exactly(code in 0u16..=MAX_CODE) {
        assert_eq!(voltage_to_code(code_to_voltage(code)), code);
    }

    /// Negative voltages saturate to 0.
    #[test]
    fn negative_clamps_to_zero(v in -1000.0f32..0.0f32) {
        assert_eq!(voltage_to_code(v), 0);
        assert_eq!(try_voltage_to_code(v), None);
    }

    /// Voltages above full scale saturate to 4095.
    #[test]
    fn above_full_scale_clamps_to_max(v in 4.0955f32..1000.0f32) {
        assert_eq!(voltage_to_code(v), MAX_CODE);
        assert_eq!(try_voltage_to_code(v), None);
    }

    /// Never produces a code outside of 12 bits, whatever the input.
    #[test]
    fn code_always_fits_twelve_bits(v in proptest::num::f32::ANY) {
        assert!(voltage_to_code(v) <= MAX_CODE);
    }

    /// Higher voltage never gives a lower code.
    #[test]
    fn conversion_is_monotone(a in -1.0f32..5.0f32, b in -1.0f32..5.0f32) {
        if a <= b {
            assert!(voltage_to_code(a) <= voltage_to_code(b));
        }
    }

    /// The nibble/byte split reassembles to the original code.
    #[test]
    fn split_reassembles(code in 0u16..=MAX_CODE) {
        let (high, low) = split_bytes(code);
        assert!(high <= 0x0f);
        assert_eq!(u16::from(high) << 8 | u16::from(low), code);
    }
}
