//! # Typed Config Values
//!
//! Config files store text; loaders read it through [`ConfigValue`], which
//! pairs a coercion with the type name shown in errors. Coercion follows the
//! framework's conventions:
//!
//! - booleans: `1`, `yes`, `true`, `on` / `0`, `no`, `false`, `off`, any case;
//! - integers: decimal digits with an optional sign (`5.0` is not an integer);
//! - floats: any decimal or exponent form (`8.e3`, `-3333500.`, `1e5`).
//!
//! Surrounding whitespace is ignored for every type.

use std::num::NonZeroU32;

/// A value that can be read from and written to config text.
pub trait ConfigValue: Sized {
    /// Type name used in [`MalformedConfig::InvalidValue`](crate::MalformedConfig::InvalidValue).
    const EXPECTED: &'static str;

    /// Coerce raw option text, or `None` if it is not a valid spelling.
    fn coerce(raw: &str) -> Option<Self>;

    /// Render the value so that [`coerce`](Self::coerce) reads it back.
    fn render(&self) -> String;
}

/// Parse a boolean using the framework's accepted spellings.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

impl ConfigValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn coerce(raw: &str) -> Option<Self> {
        parse_bool(raw)
    }

    fn render(&self) -> String {
        if *self { "True" } else { "False" }.to_string()
    }
}

impl ConfigValue for f64 {
    const EXPECTED: &'static str = "float";

    fn coerce(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn render(&self) -> String {
        let text = self.to_string();
        // Keep floats recognizable as floats to a human reader.
        if self.is_finite() && !text.contains(['.', 'e', 'E']) {
            format!("{text}.0")
        } else {
            text
        }
    }
}

impl ConfigValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn coerce(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ConfigValue for u32 {
    const EXPECTED: &'static str = "non-negative integer";

    fn coerce(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ConfigValue for NonZeroU32 {
    const EXPECTED: &'static str = "positive integer";

    fn coerce(raw: &str) -> Option<Self> {
        raw.trim().parse::<u32>().ok().and_then(NonZeroU32::new)
    }

    fn render(&self) -> String {
        self.get().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bool_spellings() {
        for raw in ["True", "true", "YES", "on", "1", " yes "] {
            assert_eq!(bool::coerce(raw), Some(true), "{raw}");
        }
        for raw in ["False", "false", "No", "OFF", "0"] {
            assert_eq!(bool::coerce(raw), Some(false), "{raw}");
        }
        assert_eq!(bool::coerce("maybe"), None);
        assert_eq!(bool::coerce(""), None);
    }

    #[test]
    fn float_forms() {
        assert_eq!(f64::coerce("8.e3"), Some(8000.0));
        assert_eq!(f64::coerce("-3333500."), Some(-3333500.0));
        assert_eq!(f64::coerce("1e5"), Some(100000.0));
        assert_eq!(f64::coerce(" 70.0 "), Some(70.0));
        assert_eq!(f64::coerce("-1"), Some(-1.0));
        assert_eq!(f64::coerce("seventy"), None);
    }

    #[test]
    fn integers_reject_fractions() {
        assert_eq!(i64::coerce("5"), Some(5));
        assert_eq!(i64::coerce("+5"), Some(5));
        assert_eq!(i64::coerce("5.0"), None);
        assert_eq!(u32::coerce("-1"), None);
    }

    #[test]
    fn positive_integer_rejects_zero() {
        assert_eq!(NonZeroU32::coerce("0"), None);
        assert_eq!(NonZeroU32::coerce("5").map(NonZeroU32::get), Some(5));
    }

    #[test]
    fn float_render_keeps_decimal_point() {
        assert_eq!(8000.0_f64.render(), "8000.0");
        assert_eq!(2.5_f64.render(), "2.5");
        assert_eq!((-1.0_f64).render(), "-1.0");
    }

    #[test]
    fn bool_render_matches_framework_spelling() {
        assert_eq!(true.render(), "True");
        assert_eq!(false.render(), "False");
    }

    proptest! {
        #[test]
        fn finite_floats_render_and_coerce_back(value in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            prop_assert_eq!(f64::coerce(&value.render()), Some(value));
        }

        #[test]
        fn integers_render_and_coerce_back(value in any::<i64>()) {
            prop_assert_eq!(i64::coerce(&value.render()), Some(value));
        }
    }
}
