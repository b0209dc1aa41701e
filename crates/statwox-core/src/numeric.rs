//! Number parsing with the leniency browsers apply to form input.
//!
//! Answers are stored as text, so every numeric aggregation and comparison
//! goes through these helpers: leading whitespace is skipped and the longest
//! numeric prefix wins (`"7 stars"` parses as `7`). Input with no numeric
//! prefix yields `None`, which callers treat the way IEEE treats NaN.

/// Parse the longest decimal floating-point prefix of `input`.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

/// Parse the longest base-10 integer prefix of `input`, truncating any
/// fractional part (`"8.9"` parses as `8`).
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = count_digits(&bytes[sign_len..]);
    if digits == 0 {
        return None;
    }

    s[..sign_len + digits].parse().ok()
}

/// Round half toward positive infinity, so `-2.5` rounds to `-2`.
///
/// `f64::round` rounds half away from zero, which skews negative
/// percentages such as NPS scores.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
