//! Decimal text helpers shared by the checker and the normalizer.
//!
//! The checker inspects numbers as they were written (how many digits sit on
//! each side of the point), so these functions work on the field text rather
//! than on a parsed `f64`. Every function still requires the text to be a
//! finite number and reports [`NumericError`] otherwise.

use crate::error::NumericError;

/// Parse a field as a finite decimal number
pub fn parse_number(value: &str) -> Result<f64, NumericError> {
    let trimmed = value.trim();
    let number = trimmed
        .parse::<f64>()
        .map_err(|_| NumericError::NotNumeric {
            value: value.to_string(),
        })?;

    if !number.is_finite() {
        return Err(NumericError::NotFinite {
            value: value.to_string(),
        });
    }

    Ok(number)
}

/// Number of digits after the decimal point, 0 when there is no point
pub fn decimal_places(value: &str) -> Result<usize, NumericError> {
    parse_number(value)?;

    let places = match value.trim().split_once('.') {
        Some((_, fraction)) => fraction.chars().take_while(char::is_ascii_digit).count(),
        None => 0,
    };
    Ok(places)
}

/// Number of digits before the decimal point (sign excluded)
pub fn integer_digits(value: &str) -> Result<usize, NumericError> {
    parse_number(value)?;

    let trimmed = value.trim();
    let integer_part = trimmed.split_once('.').map_or(trimmed, |(whole, _)| whole);
    Ok(integer_part.chars().filter(char::is_ascii_digit).count())
}

/// Render a number with exactly `places` digits after the point
///
/// Never produces scientific notation or digit grouping.
pub fn format_fixed(value: &str, places: usize) -> Result<String, NumericError> {
    let number = parse_number(value)?;
    Ok(format!("{:.*}", places, number))
}

/// Left-pad with zeros to `width`, keeping a leading sign in front
pub fn zero_pad(value: &str, width: usize) -> String {
    let (sign, digits) = match value.strip_prefix(['+', '-']) {
        Some(rest) => (&value[..1], rest),
        None => ("", value),
    };

    let padding = width.saturating_sub(sign.len() + digits.len());
    format!("{}{}{}", sign, "0".repeat(padding), digits)
}
