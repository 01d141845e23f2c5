use once_cell::sync::Lazy;
use regex::Regex;

// Leading optional sign followed by digits, the way a browser `parseInt` reads a field.
static LEADING_INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());

/// Parse the leading integer of a text field.
///
/// Surrounding whitespace and trailing garbage are ignored, so `" 12abc"`
/// reads as `12`. Returns `None` when no digits lead the input. Values that
/// overflow `i32` saturate, since callers clamp to a small range anyway.
///
/// # Examples
/// ```
/// use anything_goes::utils::parse_leading_int;
/// assert_eq!(parse_leading_int("7"), Some(7));
/// assert_eq!(parse_leading_int(" -3 "), Some(-3));
/// assert_eq!(parse_leading_int("12abc"), Some(12));
/// assert_eq!(parse_leading_int("abc"), None);
/// ```
pub fn parse_leading_int(input: &str) -> Option<i32> {
    let captures = LEADING_INT_REGEX.captures(input)?;
    let digits = &captures[1];
    match digits.parse::<i64>() {
        Ok(v) => Some(v.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
        // More digits than fit in i64; only the sign matters after clamping.
        Err(_) if digits.starts_with('-') => Some(i32::MIN),
        Err(_) => Some(i32::MAX),
    }
}

/// Format a wheel value with an explicit sign for non-negative numbers.
pub fn format_signed(value: i32) -> String {
    if value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Format a `[0, 1]` progress fraction as a rounded percentage.
pub fn format_percent(progress: f64) -> String {
    format!("{}%", (progress.clamp(0.0, 1.0) * 100.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_like_a_form_field() {
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("  -20"), Some(-20));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("- 4"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i32::MAX));
        assert_eq!(parse_leading_int("-99999999999"), Some(i32::MIN));
    }

    #[test]
    fn signed_values_keep_plus_for_zero() {
        assert_eq!(format_signed(0), "+0");
        assert_eq!(format_signed(7), "+7");
        assert_eq!(format_signed(-4), "-4");
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(format_percent(1.0), "100%");
        assert_eq!(format_percent(0.456), "46%");
        assert_eq!(format_percent(-0.2), "0%");
    }
}
