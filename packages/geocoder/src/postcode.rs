//! UK postcode normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::GeocodeError;

/// Outward code, a single space, then the inward code (e.g. `SW1A 1AA`),
/// plus the non-geographic `GIR 0AA`.
static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Z]{1,2}[0-9][A-Z0-9]? [0-9][A-Z]{2}|GIR 0AA)$").expect("valid regex")
});

/// Length of the inward code (the part after the space).
const INWARD_LEN: usize = 3;

/// Normalizes user input to the canonical `OUTWARD INWARD` form.
///
/// Whitespace is stripped, letters are uppercased, and a single space is
/// inserted before the inward code, so `" sw1a1aa "` and `"SW1A  1AA"` both
/// become `"SW1A 1AA"`.
///
/// # Errors
///
/// Returns [`GeocodeError::InvalidPostcode`] if the result is not a
/// well-formed UK postcode.
pub fn normalize_postcode(input: &str) -> Result<String, GeocodeError> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let invalid = || GeocodeError::InvalidPostcode {
        postcode: input.trim().to_string(),
    };

    if !compact.is_ascii() || compact.len() <= INWARD_LEN {
        return Err(invalid());
    }

    let (outward, inward) = compact.split_at(compact.len() - INWARD_LEN);
    let normalized = format!("{outward} {inward}");

    if POSTCODE_RE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize_postcode(" sw1a1aa ").unwrap(), "SW1A 1AA");
        assert_eq!(normalize_postcode("SW1A  1AA").unwrap(), "SW1A 1AA");
        assert_eq!(normalize_postcode("m1 1ae").unwrap(), "M1 1AE");
        assert_eq!(normalize_postcode("B33 8TH").unwrap(), "B33 8TH");
        assert_eq!(normalize_postcode("cr26xh").unwrap(), "CR2 6XH");
        assert_eq!(normalize_postcode("DN55 1PT").unwrap(), "DN55 1PT");
        assert_eq!(normalize_postcode("w1a0ax").unwrap(), "W1A 0AX");
    }

    #[test]
    fn accepts_girobank_postcode() {
        assert_eq!(normalize_postcode("gir0aa").unwrap(), "GIR 0AA");
        assert!(normalize_postcode("GIR 0AB").is_err());
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "", "   ", "1AA", "ABC", "SW1A", "12345", "SW1A 1A1", "ZZZZ 1AA", "SW1A-1AA", "SW1Á1AA",
        ] {
            assert!(
                matches!(
                    normalize_postcode(input),
                    Err(GeocodeError::InvalidPostcode { .. })
                ),
                "accepted {input:?}"
            );
        }
    }
}
