//! Reserved names of the JSON CAS document
//!
//! Top-level and view keys are spelled once, in the serde attributes of
//! `document.rs`.

pub const RESERVED_PREFIX: &str = "%";
pub const REF_PREFIX: &str = "@";

pub const ID: &str = "%ID";
pub const TYPE: &str = "%TYPE";
pub const VIEWS: &str = "%VIEWS";

pub const NAME: &str = "%NAME";
pub const SUPER_TYPE: &str = "%SUPER_TYPE";
pub const RANGE: &str = "%RANGE";
pub const ELEMENT_TYPE: &str = "%ELEMENT_TYPE";
pub const ALLOWED_VALUES: &str = "%ALLOWED_VALUES";
pub const MULTIPLE_REFERENCES_ALLOWED: &str = "%MULTIPLE_REFERENCES_ALLOWED";

pub const ELEMENTS: &str = "%ELEMENTS";

pub const NAN: &str = "NaN";
pub const POSITIVE_INFINITY: &str = "Infinity";
pub const NEGATIVE_INFINITY: &str = "-Infinity";
pub const POSITIVE_INFINITY_ABBR: &str = "Inf";
pub const NEGATIVE_INFINITY_ABBR: &str = "-Inf";

/// Special floating point spelling, `None` for finite values.
pub fn special_float(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some(NAN)
    } else if value == f64::INFINITY {
        Some(POSITIVE_INFINITY)
    } else if value == f64::NEG_INFINITY {
        Some(NEGATIVE_INFINITY)
    } else {
        None
    }
}

/// Parses a special floating point spelling.
pub fn parse_special_float(text: &str) -> Option<f64> {
    match text {
        NAN => Some(f64::NAN),
        POSITIVE_INFINITY | POSITIVE_INFINITY_ABBR => Some(f64::INFINITY),
        NEGATIVE_INFINITY | NEGATIVE_INFINITY_ABBR => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_floats() {
        assert_eq!(special_float(f64::NAN), Some("NaN"));
        assert_eq!(special_float(f64::NEG_INFINITY), Some("-Infinity"));
        assert_eq!(special_float(1.5), None);
        assert_eq!(parse_special_float("Inf"), Some(f64::INFINITY));
        assert_eq!(parse_special_float("-Inf"), Some(f64::NEG_INFINITY));
        assert!(parse_special_float("NaN").unwrap().is_nan());
        assert_eq!(parse_special_float("nan"), None);
    }
}
