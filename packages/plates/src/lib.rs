#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Nepali licence plate handling.
//!
//! Covers the two plate formats seen in the feed: the modern provincial
//! format (`प्रदेश ३-०१-१२ च १२३४`) and the legacy zone format
//! (`बा १२ प १२३४`). Plates are stored as entered and normalized only
//! for comparison, so normalization replaces dash variants without
//! touching spacing.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Vehicle class letters used in both plate formats.
pub const CLASS_LETTERS: [char; 29] = [
    'क', 'ख', 'ग', 'घ', 'च', 'छ', 'ज', 'ट', 'ठ', 'ड', 'ढ', 'त', 'थ', 'द', 'ध', 'न', 'प', 'फ',
    'ब', 'भ', 'म', 'य', 'र', 'ल', 'व', 'श', 'ष', 'स', 'ह',
];

/// Zone prefixes of the legacy plate format.
pub const LEGACY_ZONES: [&str; 11] = [
    "बा", "मे", "को", "सा", "ज", "भ", "रा", "लु", "का", "मा", "ना",
];

/// Bound on plate generation retries before giving up.
pub const MAX_GENERATE_TRIES: usize = 1000;

static PROVINCIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^प्रदेश\s[०-९]{1,2}[-–][०-९]{2}[-–][०-९]{2}\s[क-ह]\s[०-९]{4}$")
        .expect("valid regex")
});

static LEGACY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(बा|मे|को|सा|ज|भ|रा|लु|का|मा|ना)\s[०-९]{2}\s[क-ह]\s[०-९]{4}$")
        .expect("valid regex")
});

#[derive(Debug, Error)]
pub enum PlateError {
    /// Random generation kept colliding with existing plates.
    #[error("Failed to generate a unique plate after {tries} tries")]
    GenerationExhausted { tries: usize },
}

/// Which plate format to generate.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlateFormat {
    #[default]
    Provincial,
    Legacy,
}

/// Normalizes a plate for comparison: trims and maps em/en dashes to
/// `-`. Internal spacing is preserved; collapsing it changes the plate
/// under the format regexes.
#[must_use]
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().replace(['—', '–'], "-")
}

/// Renders `n` as zero-padded Devanagari digits.
#[must_use]
pub fn to_devanagari_number(n: u32, width: usize) -> String {
    to_devanagari_digits(&format!("{n:0width$}"))
}

const fn devanagari_digit(ch: char) -> char {
    match ch {
        '0' => '०',
        '1' => '१',
        '2' => '२',
        '3' => '३',
        '4' => '४',
        '5' => '५',
        '6' => '६',
        '7' => '७',
        '8' => '८',
        '9' => '९',
        _ => ch,
    }
}

/// Converts ASCII digits in a string to Devanagari digits, leaving every
/// other character intact.
#[must_use]
pub fn to_devanagari_digits(s: &str) -> String {
    s.chars().map(devanagari_digit).collect()
}

/// Best-effort conversion of a plate to its Devanagari display form.
#[must_use]
pub fn convert_plate_to_devanagari(plate: &str) -> String {
    to_devanagari_digits(&normalize_plate(plate))
}

/// Whether the plate matches either known format after normalization.
#[must_use]
pub fn is_valid_plate(plate: &str) -> bool {
    let p = normalize_plate(plate);
    PROVINCIAL_RE.is_match(&p) || LEGACY_RE.is_match(&p)
}

/// Generates a random provincial-format plate.
pub fn generate_provincial_plate(rng: &mut impl Rng) -> String {
    let province = rng.gen_range(1..=7u32);
    let area = rng.gen_range(1..=99u32);
    let series = rng.gen_range(1..=99u32);
    let letter = CLASS_LETTERS[rng.gen_range(0..CLASS_LETTERS.len())];
    let number = rng.gen_range(1000..=9999u32);
    format!(
        "प्रदेश {}-{}-{} {letter} {}",
        to_devanagari_number(province, 1),
        to_devanagari_number(area, 2),
        to_devanagari_number(series, 2),
        to_devanagari_number(number, 4),
    )
}

/// Generates a random legacy-format plate.
pub fn generate_legacy_plate(rng: &mut impl Rng) -> String {
    let zone = LEGACY_ZONES[rng.gen_range(0..LEGACY_ZONES.len())];
    let series = rng.gen_range(1..=99u32);
    let letter = CLASS_LETTERS[rng.gen_range(0..CLASS_LETTERS.len())];
    let number = rng.gen_range(1000..=9999u32);
    format!(
        "{zone} {} {letter} {}",
        to_devanagari_number(series, 2),
        to_devanagari_number(number, 4),
    )
}

/// Generates a plate not present in `existing`, retrying up to
/// [`MAX_GENERATE_TRIES`] times.
///
/// # Errors
///
/// Returns `PlateError::GenerationExhausted` when every try collided.
pub fn generate_unique(
    rng: &mut impl Rng,
    format: PlateFormat,
    existing: &HashSet<String>,
) -> Result<String, PlateError> {
    for _ in 0..MAX_GENERATE_TRIES {
        let plate = match format {
            PlateFormat::Provincial => generate_provincial_plate(rng),
            PlateFormat::Legacy => generate_legacy_plate(rng),
        };
        if is_valid_plate(&plate) && !existing.contains(&plate) {
            return Ok(plate);
        }
    }
    Err(PlateError::GenerationExhausted {
        tries: MAX_GENERATE_TRIES,
    })
}

/// Extracts the Devanagari province number (e.g. `३`) from a
/// provincial-format plate. Legacy plates carry no province.
#[must_use]
pub fn extract_province(plate: &str) -> Option<String> {
    let p = normalize_plate(plate);
    if !PROVINCIAL_RE.is_match(&p) {
        return None;
    }
    // "प्रदेश X-YY-ZZ L NNNN" -> "X-YY-ZZ" -> "X"
    let body = p.split_whitespace().nth(1)?;
    body.split('-').next().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    #[test]
    fn accepts_provincial_plates() {
        assert!(is_valid_plate("प्रदेश ३-०१-१२ च १२३४"));
        assert!(is_valid_plate("प्रदेश १०-९९-०१ क ९९९९"));
    }

    #[test]
    fn accepts_legacy_plates() {
        assert!(is_valid_plate("बा १२ प १२३४"));
        assert!(is_valid_plate("ना ०७ ह ४३२१"));
    }

    #[test]
    fn rejects_malformed_plates() {
        assert!(!is_valid_plate(""));
        assert!(!is_valid_plate("ABC 123"));
        assert!(!is_valid_plate("प्रदेश ३-०१ च १२३४"));
        assert!(!is_valid_plate("बा १२ प १२"));
    }

    #[test]
    fn normalization_maps_dashes_but_keeps_spacing() {
        assert_eq!(
            normalize_plate("  प्रदेश ३–०१—१२ च १२३४  "),
            "प्रदेश ३-०१-१२ च १२३४"
        );
        // Adjacent whitespace stays significant.
        assert_eq!(normalize_plate("बा  १२ प १२३४"), "बा  १२ प १२३४");
    }

    #[test]
    fn en_dash_plates_validate_via_normalization() {
        assert!(is_valid_plate("प्रदेश ३–०१–१२ च १२३४"));
    }

    #[test]
    fn converts_ascii_digits_to_devanagari() {
        assert_eq!(to_devanagari_digits("1234"), "१२३४");
        assert_eq!(to_devanagari_digits("ba 12 pa 3456"), "ba १२ pa ३४५६");
        assert_eq!(to_devanagari_number(7, 1), "७");
        assert_eq!(to_devanagari_number(7, 2), "०७");
        assert_eq!(to_devanagari_number(1234, 4), "१२३४");
    }

    #[test]
    fn converts_plate_display_form() {
        assert_eq!(
            convert_plate_to_devanagari(" प्रदेश 3-01-12 च 1234 "),
            "प्रदेश ३-०१-१२ च १२३४"
        );
    }

    #[test]
    fn generated_plates_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let provincial = generate_provincial_plate(&mut rng);
            assert!(is_valid_plate(&provincial), "invalid plate: {provincial}");
            let legacy = generate_legacy_plate(&mut rng);
            assert!(is_valid_plate(&legacy), "invalid plate: {legacy}");
        }
    }

    #[test]
    fn generate_unique_skips_existing_plates() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut existing = HashSet::new();
        for _ in 0..20 {
            let plate = generate_unique(&mut rng, PlateFormat::Provincial, &existing).unwrap();
            assert!(!existing.contains(&plate));
            existing.insert(plate);
        }
        assert_eq!(existing.len(), 20);
    }

    #[test]
    fn generate_unique_gives_up_after_bounded_tries() {
        // A constant rng produces the same plate every try.
        let mut rng = StepRng::new(0, 0);
        let plate = generate_provincial_plate(&mut rng);
        let existing: HashSet<String> = [plate].into_iter().collect();

        let mut rng = StepRng::new(0, 0);
        let err = generate_unique(&mut rng, PlateFormat::Provincial, &existing).unwrap_err();
        assert!(matches!(
            err,
            PlateError::GenerationExhausted {
                tries: MAX_GENERATE_TRIES
            }
        ));
    }

    #[test]
    fn extracts_province_from_provincial_plates() {
        assert_eq!(
            extract_province("प्रदेश ३-०१-१२ च १२३४").as_deref(),
            Some("३")
        );
        assert_eq!(
            extract_province("प्रदेश १०–९९–०१ क ९९९९").as_deref(),
            Some("१०")
        );
        assert_eq!(extract_province("बा १२ प १२३४"), None);
        assert_eq!(extract_province("garbage"), None);
    }

    #[test]
    fn plate_format_parses_from_strings() {
        assert_eq!(
            "provincial".parse::<PlateFormat>().unwrap(),
            PlateFormat::Provincial
        );
        assert_eq!("legacy".parse::<PlateFormat>().unwrap(), PlateFormat::Legacy);
        assert!("modern".parse::<PlateFormat>().is_err());
    }
}
