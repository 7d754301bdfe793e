//! Heuristic extractors for the individual fields of a nutrition row.
//!
//! All functions here are total: input that matches no known vocabulary falls
//! back to a named default instead of failing.

use std::sync::LazyLock;

use regex::Regex;

/// Cup sizes, checked in order; the first substring match wins.
const SIZES: &[(&str, &str)] = &[
    ("short", "Short"),
    ("tall", "Tall"),
    ("grande", "Grande"),
    ("venti", "Venti"),
    ("single", "Single"),
    ("double", "Double"),
];

/// Milk phrasings, most specific first ("semi-skimmed" before "skimmed").
const MILK_TYPES: &[(&[&str], &str)] = &[
    (&["lactose-free milk", "lactose free milk"], "Lactose-free Milk"),
    (&["semi skimmed milk", "semi-skimmed milk"], "Semi-skimmed Milk"),
    (&["whole milk"], "Whole Milk"),
    (&["low-fat milk", "low fat milk"], "Low-fat Milk"),
    (&["skimmed milk", "skim milk"], "Skimmed Milk"),
    (&["oat drink", "oat milk"], "Oat Milk"),
    (&["almond drink", "almond milk"], "Almond Milk"),
    (&["soya drink", "soy milk"], "Soy Milk"),
    (&["coconut drink", "coconut milk"], "Coconut Milk"),
];

pub const STANDARD_MILK: &str = "Standard";
pub const UNKNOWN_SIZE: &str = "Unknown";

/// Literal suffixes removed by [`clean_drink_name`].
const MILK_SUFFIXES: &[&str] = &[
    "- lactose-free milk",
    "- lactose free milk",
    "- semi skimmed milk",
    "- semi-skimmed milk",
    "- whole milk",
    "- low-fat milk",
    "- low fat milk",
    "- skimmed milk",
    "- skim milk",
    "- oat drink",
    "- oat milk",
    "- almond drink",
    "- almond milk",
    "- soya drink",
    "- soy milk",
    "- coconut drink",
    "- coconut milk",
];

static MILK_SUFFIX_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    MILK_SUFFIXES
        .iter()
        .map(|suffix| Regex::new(&format!("(?i){}", regex::escape(suffix))).unwrap())
        .collect()
});

static BASE_NAME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s*-\s*lactose[-\s]?free\s+milk\s*",
        r"(?i)\s*-\s*semi\s+skimmed\s+milk\s*",
        r"(?i)\s*-\s*skimmed\s+milk\s*",
        r"(?i)\s*-\s*whole\s+milk\s*",
        r"(?i)\s*-\s*low[-\s]?fat\s+milk\s*",
        r"(?i)\s*-\s*oat\s+drink\s*",
        r"(?i)\s*-\s*almond\s+drink\s*",
        r"(?i)\s*-\s*soya\s+drink\s*",
        r"(?i)\s*-\s*coconut\s+drink\s*",
        r"(?i)\s*-\s*plant[-\s]?based\s+milk\s*",
        r"(?i)\s*-\s*dairy[-\s]?free\s*",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static TRAILING_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*$").unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());
static TRADEMARK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[®™©]").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());
static UNDERSCORES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Cup size named in `raw`, if it uses the size vocabulary.
pub fn known_size(raw: &str) -> Option<&'static str> {
    let lower = raw.to_lowercase();
    SIZES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, size)| *size)
}

pub fn parse_size(raw: &str) -> String {
    if raw.is_empty() {
        return UNKNOWN_SIZE.to_string();
    }
    known_size(raw)
        .map(str::to_string)
        .unwrap_or_else(|| title_case(raw))
}

/// Milk type named anywhere in a drink label, or "Standard".
pub fn parse_milk_type(name: &str) -> String {
    let lower = name.to_lowercase();
    MILK_TYPES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|phrase| lower.contains(phrase)))
        .map(|(_, milk)| milk.to_string())
        .unwrap_or_else(|| STANDARD_MILK.to_string())
}

/// Light clean for display: drops the literal milk suffix the label carries.
pub fn clean_drink_name(name: &str) -> String {
    let stripped = MILK_SUFFIX_RES
        .iter()
        .fold(name.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());
    tidy_name(&stripped)
}

/// Aggressive clean used as the grouping key of a drink.
///
/// Strips are repeated until nothing changes, because removing one phrase can
/// join the text around it into another strippable phrase.
pub fn base_drink_name(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let stripped = BASE_NAME_RES
            .iter()
            .fold(current.clone(), |acc, re| re.replace_all(&acc, "").into_owned());
        let next = tidy_name(&stripped);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn tidy_name(name: &str) -> String {
    let without_dash = TRAILING_DASH_RE.replace(name, "");
    crate::text::clean(&without_dash)
}

/// First run of digits in the cell, as an integer.
pub fn parse_numeric_value(cell: &str) -> Option<u64> {
    DIGITS_RE.find(cell)?.as_str().parse().ok()
}

/// Identifier-safe slug for a drink name; never empty.
pub fn generate_id(name: &str) -> String {
    let lower = name.to_lowercase();
    let id = TRADEMARK_RE.replace_all(&lower, "");
    let id = NON_WORD_RE.replace_all(&id, "");
    let id = SEPARATOR_RE.replace_all(&id, "_");
    let id = UNDERSCORES_RE.replace_all(&id, "_");
    let id = id.trim_matches('_');
    if id.is_empty() {
        "unknown".to_string()
    } else {
        id.to_string()
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn size_vocabulary_first_match_wins() {
        assert_eq!(parse_size("Tall (354ml)"), "Tall");
        assert_eq!(parse_size("GRANDE"), "Grande");
        assert_eq!(parse_size("Short/Tall"), "Short");
        assert_eq!(parse_size("Double Shot"), "Double");
    }

    #[test]
    fn unknown_sizes_fall_back_to_title_case() {
        assert_eq!(parse_size(""), "Unknown");
        assert_eq!(parse_size("kids' cup"), "Kids' Cup");
        assert_eq!(parse_size("330ML bottle"), "330Ml Bottle");
    }

    #[test]
    fn milk_type_prefers_specific_phrases() {
        assert_eq!(parse_milk_type("Latte - Semi-Skimmed Milk"), "Semi-skimmed Milk");
        assert_eq!(parse_milk_type("Latte - Skimmed Milk"), "Skimmed Milk");
        assert_eq!(parse_milk_type("Latte - Lactose free milk"), "Lactose-free Milk");
        assert_eq!(parse_milk_type("Cappuccino - Oat Drink"), "Oat Milk");
        assert_eq!(parse_milk_type("Mocha - Soya Drink"), "Soy Milk");
        assert_eq!(parse_milk_type("Americano"), "Standard");
        assert_eq!(parse_milk_type(""), "Standard");
    }

    #[test]
    fn clean_name_removes_the_milk_suffix() {
        assert_eq!(clean_drink_name("Caffè Latte - Whole Milk"), "Caffè Latte");
        assert_eq!(clean_drink_name("Flat White - OAT DRINK "), "Flat White");
        assert_eq!(clean_drink_name("Chai Tea Latte -"), "Chai Tea Latte");
        assert_eq!(clean_drink_name("Iced  Mocha"), "Iced Mocha");
    }

    #[test]
    fn base_name_strips_broader_phrasings() {
        assert_eq!(base_drink_name("Caffè Latte - Lactose-free Milk"), "Caffè Latte");
        assert_eq!(base_drink_name("Mocha - plant based milk"), "Mocha");
        assert_eq!(base_drink_name("Matcha Latte - Dairy free"), "Matcha Latte");
        assert_eq!(base_drink_name("Latte-low fat milk"), "Latte");
    }

    #[test]
    fn base_name_settles_when_a_strip_exposes_another() {
        let once = base_drink_name("Latte - lactose - whole milk free milk");
        assert_eq!(once, "Latte");
        assert_eq!(base_drink_name(&once), once);
    }

    #[test]
    fn numeric_value_takes_first_digit_run() {
        assert_eq!(parse_numeric_value("120"), Some(120));
        assert_eq!(parse_numeric_value("approx. 502 kJ / 120"), Some(502));
        assert_eq!(parse_numeric_value("<1"), Some(1));
        assert_eq!(parse_numeric_value("n/a"), None);
        assert_eq!(parse_numeric_value(""), None);
        assert_eq!(parse_numeric_value("99999999999999999999999"), None);
    }

    #[test]
    fn numeric_value_only_reads_ascii_digits() {
        assert_eq!(parse_numeric_value("٣ 120"), Some(120));
        assert_eq!(parse_numeric_value("１２０"), None);
    }

    #[test]
    fn ids_are_slugs() {
        assert_eq!(generate_id("Caffè Latte"), "caffè_latte");
        assert_eq!(generate_id("Frappuccino® Mocha - Light"), "frappuccino_mocha_light");
        assert_eq!(generate_id("  Chai -- Tea  "), "chai_tea");
        assert_eq!(generate_id("!!!"), "unknown");
        assert_eq!(generate_id(""), "unknown");
    }

    proptest! {
        #[test]
        fn base_name_is_idempotent(name in "[ -~\t\nÀ-ÿ]{0,48}") {
            let once = base_drink_name(&name);
            prop_assert_eq!(base_drink_name(&once), once);
        }

        #[test]
        fn base_name_is_idempotent_on_milk_heavy_labels(
            parts in prop::collection::vec(
                prop::sample::select(vec![
                    "Latte", " - ", "-", " ", "lactose", "free", "milk", "whole", "oat",
                    "drink", "dairy", "plant", "based", "semi", "skimmed", "low", "fat",
                ]),
                0..12,
            )
        ) {
            let name = parts.concat();
            let once = base_drink_name(&name);
            prop_assert_eq!(base_drink_name(&once), once);
        }

        #[test]
        fn ids_are_total_and_idempotent(name in "[ -~\t\nÀ-ÿ®™©]{0,48}") {
            let id = generate_id(&name);
            prop_assert!(!id.is_empty());
            prop_assert_eq!(generate_id(&id), id.clone());
            prop_assert_eq!(generate_id(&name), id);
        }

        #[test]
        fn field_parsers_never_panic(text in ".{0,64}") {
            let _ = parse_size(&text);
            let _ = parse_milk_type(&text);
            let _ = clean_drink_name(&text);
            let _ = parse_numeric_value(&text);
        }
    }
}
