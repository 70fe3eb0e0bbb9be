//! Devanagari name pools for simulated vehicle owners.

use rand::Rng;

const MALE_FIRST: [&str; 20] = [
    "राम", "हरि", "सुमन", "प्रकाश", "पवन", "दिपेश", "रेमेश", "नरेश", "कृष्ण", "विसाल",
    "लक्ष्मण", "सुरज", "अनिल", "किरण", "अजय", "दीपक", "सन्तोष", "मनोज", "नविन", "राजन",
];

const FEMALE_FIRST: [&str; 20] = [
    "सीता", "गीता", "राधा", "सुनिता", "बिमला", "मिना", "सरिता", "अनीता", "कञ्चन", "बिना",
    "मनिषा", "प्रमिला", "सबिना", "रुपा", "अस्मिता", "निर्मला", "पवित्रा", "रेखा", "अनु", "लक्ष्मी",
];

const MALE_MIDDLE: [&str; 3] = ["बहादुर", "प्रसाद", "कुमार"];
const FEMALE_MIDDLE: [&str; 2] = ["देवी", "कुमारी"];

/// Blended surname pool used when the province is unknown.
const FALLBACK_SURNAMES: &[&str] = &[
    "श्रेष्ठ", "शर्मा", "कार्की", "बस्नेत", "थापा", "गुरुङ", "मगर", "राई", "लिम्बु", "तामाङ",
    "महर्जन", "पौडेल", "अधिकारी", "न्यौपाने", "चौधरी", "बीके", "भट्ट",
];

/// Owner gender, used to pick matching name pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

/// Common surnames for a Devanagari province number.
fn province_surnames(province: &str) -> &'static [&'static str] {
    match province {
        "१" => &["राई", "लिम्बु", "शेर्पा", "कार्की", "तामाङ"],
        "२" => &["यादव", "झा", "मिश्रा", "गुप्ता", "चौधरी"],
        "३" => &["श्रेष्ठ", "महर्जन", "तामाङ", "केसी", "बस्नेत"],
        "४" => &["गुरुङ", "मगर", "थापा", "पौडेल", "अधिकारी"],
        "५" => &["थारु", "चौधरी", "अर्याल", "न्यौपाने", "शर्मा"],
        "६" => &["बीके", "बुढा", "शाही", "भट्ट", "रावत"],
        "७" => &["चौधरी", "बिष्ट", "पाली", "धामी", "सिंह"],
        _ => FALLBACK_SURNAMES,
    }
}

/// Picks a full Devanagari owner name, with the surname pool skewed by
/// province when one is known.
#[must_use]
pub fn pick_devanagari_name(
    rng: &mut impl Rng,
    province: Option<&str>,
    gender: Gender,
) -> String {
    let (first_pool, middle_pool): (&[&str], &[&str]) = match gender {
        Gender::Male => (&MALE_FIRST, &MALE_MIDDLE),
        Gender::Female => (&FEMALE_FIRST, &FEMALE_MIDDLE),
    };
    let surnames = province.map_or(FALLBACK_SURNAMES, province_surnames);

    let first = first_pool[rng.gen_range(0..first_pool.len())];
    let middle = middle_pool[rng.gen_range(0..middle_pool.len())];
    let last = surnames[rng.gen_range(0..surnames.len())];
    format!("{first} {middle} {last}")
}
