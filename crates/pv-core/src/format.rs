//! Time units and the fixed-point text format.
//!
//! Raw log timestamps are integers. Dividing by 1000 gives display units, the
//! scale used for geometry and queries. The text format treats the lowest six
//! raw digits as the fraction, so `1234567` prints as `1.234567`.

use std::fmt;

use serde::{Serialize, Serializer};

/// Raw units per display unit.
pub const RAW_PER_DISPLAY: f64 = 1e3;

/// Digits after the decimal point in [`format_fixed`].
pub const FRACTION_DIGITS: usize = 6;

/// Converts a raw value to display units.
#[allow(clippy::cast_precision_loss)]
pub fn to_display(raw: u64) -> f64 {
    raw as f64 / RAW_PER_DISPLAY
}

/// Renders `value` with its last six decimal digits as the fraction.
pub fn format_fixed(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() > FRACTION_DIGITS {
        let (whole, fraction) = digits.split_at(digits.len() - FRACTION_DIGITS);
        format!("{whole}.{fraction}")
    } else {
        format!("0.{digits:0>width$}", width = FRACTION_DIGITS)
    }
}

/// Inverse of [`format_fixed`]: concatenates the digits around the point.
///
/// Requires exactly six fraction digits.
pub fn parse_fixed(text: &str) -> Option<u64> {
    let (whole, fraction) = text.split_once('.')?;
    if whole.is_empty()
        || fraction.len() != FRACTION_DIGITS
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    format!("{whole}{fraction}").parse().ok()
}

/// Display adapter for [`format_fixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(pub u64);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_fixed(self.0))
    }
}

impl Serialize for Fixed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixed_large_values() {
        assert_eq!(format_fixed(1_234_567), "1.234567");
        assert_eq!(format_fixed(1_000_000), "1.000000");
        assert_eq!(format_fixed(98_765_432_100), "98765.432100");
    }

    #[test]
    fn test_format_fixed_pads_small_values() {
        assert_eq!(format_fixed(0), "0.000000");
        assert_eq!(format_fixed(5), "0.000005");
        assert_eq!(format_fixed(123_456), "0.123456");
        assert_eq!(format_fixed(999_999), "0.999999");
    }

    #[test]
    fn test_format_fixed_max() {
        assert_eq!(format_fixed(u64::MAX), "18446744073709.551615");
    }

    #[test]
    fn test_fixed_round_trips() {
        for value in [0, 1, 9, 10, 999_999, 1_000_000, 1_000_001, 42_000_123, u64::MAX] {
            assert_eq!(parse_fixed(&format_fixed(value)), Some(value), "{value}");
        }
    }

    #[test]
    fn test_parse_fixed_rejects_other_shapes() {
        assert_eq!(parse_fixed("1.5"), None);
        assert_eq!(parse_fixed("12"), None);
        assert_eq!(parse_fixed(".000001"), None);
        assert_eq!(parse_fixed("1.00000a"), None);
    }

    #[test]
    fn test_fixed_display_honours_width() {
        assert_eq!(format!("{:>10}", Fixed(1)), "  0.000001");
        assert_eq!(format!("{}", Fixed(2_500_000)), "2.500000");
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact values in binary")]
    fn test_to_display_divides_by_thousand() {
        assert_eq!(to_display(1_500), 1.5);
        assert_eq!(to_display(0), 0.0);
    }
}
