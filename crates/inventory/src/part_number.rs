//! Part-number formatting.

/// Prefix used for in-house part numbers.
pub const PART_NUMBER_PREFIX: &str = "VD-";

const PART_NUMBER_DIGITS: usize = 6;

/// Normalize a part number as typed by an operator.
///
/// Anything already containing a `-` is taken as a complete part number and
/// returned (trimmed) unchanged. Bare numbers are zero-padded to six digits and
/// prefixed, so `3` becomes `VD-000003`. Longer numbers are never truncated.
pub fn format_part_number(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains('-') {
        return raw.to_string();
    }
    format!("{PART_NUMBER_PREFIX}{raw:0>width$}", width = PART_NUMBER_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_numbers() {
        assert_eq!(format_part_number("3"), "VD-000003");
        assert_eq!(format_part_number(" 42 "), "VD-000042");
    }

    #[test]
    fn keeps_dashed_numbers_and_long_numbers() {
        assert_eq!(format_part_number("VD-000006"), "VD-000006");
        assert_eq!(format_part_number("ACME-1"), "ACME-1");
        assert_eq!(format_part_number("722201016"), "VD-722201016");
    }
}
