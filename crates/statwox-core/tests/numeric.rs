use statwox_core::numeric::{parse_float_prefix, parse_int_prefix, round_half_up};

#[test]
fn float_prefix_parsing() {
    assert_eq!(parse_float_prefix("4"), Some(4.0));
    assert_eq!(parse_float_prefix("  3.5 stars"), Some(3.5));
    assert_eq!(parse_float_prefix("-.5"), Some(-0.5));
    assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
    assert_eq!(parse_float_prefix("2e"), Some(2.0));
    assert_eq!(parse_float_prefix("abc"), None);
    assert_eq!(parse_float_prefix(""), None);
    assert_eq!(parse_float_prefix("."), None);
    assert_eq!(parse_float_prefix("-"), None);
}

#[test]
fn int_prefix_truncates() {
    assert_eq!(parse_int_prefix("8.9"), Some(8));
    assert_eq!(parse_int_prefix(" 10/10"), Some(10));
    assert_eq!(parse_int_prefix("-3"), Some(-3));
    assert_eq!(parse_int_prefix("ten"), None);
}

#[test]
fn rounding_goes_half_up() {
    assert_eq!(round_half_up(2.5), 3.0);
    assert_eq!(round_half_up(-2.5), -2.0);
    assert_eq!(round_half_up(66.666), 67.0);
    assert_eq!(round_half_up(-33.4), -33.0);
}
