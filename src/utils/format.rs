//! Human-readable difficulty magnitudes

const SUFFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];

/// Render a difficulty as a compact magnitude, e.g. `1234.5` -> `"1.23K"`.
///
/// Values below one render as `"0"`; non-finite values render as-is.
pub fn format_difficulty(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value < 1.0 {
        return "0".to_string();
    }

    let mut power = 0;
    let mut scaled = value;
    while scaled >= 1000.0 && power < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        power += 1;
    }

    // Rounding can push 999.995 up to "1000.00"; carry it into the next unit
    if format!("{scaled:.2}") == "1000.00" && power < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        power += 1;
    }

    format!("{scaled:.2}{}", SUFFIXES[power])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(format_difficulty(0.0), "0");
        assert_eq!(format_difficulty(0.42), "0");
        assert_eq!(format_difficulty(1.0), "1.00");
        assert_eq!(format_difficulty(999.0), "999.00");
    }

    #[test]
    fn test_magnitudes() {
        assert_eq!(format_difficulty(1234.0), "1.23K");
        assert_eq!(format_difficulty(3_400_000.0), "3.40M");
        assert_eq!(format_difficulty(52_700_000_000.0), "52.70G");
        assert_eq!(format_difficulty(1.5e15), "1.50P");
    }

    #[test]
    fn test_rounding_carries_into_next_unit() {
        assert_eq!(format_difficulty(999_999.0), "1.00M");
    }

    #[test]
    fn test_huge_values_stay_in_largest_unit() {
        assert_eq!(format_difficulty(2e27), "2000.00Y");
    }
}
