use serde::{Deserialize, Serialize};

use crate::fields::{clean_drink_name, parse_milk_type, parse_numeric_value, parse_size};

/// Nutrition values of one drink variant.
///
/// Energy values are parsed to integers; the rest keep the cell text with its
/// unit (e.g. `"4g"`). Missing columns and empty cells stay `None` and are left
/// out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_kj: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caffeine: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Calories,
    EnergyKj,
    Fat,
    SaturatedFat,
    Carbs,
    Sugar,
    Protein,
    Salt,
    Fiber,
    Caffeine,
}

struct NutrientRule {
    matches: fn(&str) -> bool,
    nutrient: Nutrient,
}

/// Header keyword rules, first match wins. "fat" must be checked with its
/// "saturated" exclusion before the saturated rule.
static NUTRIENT_RULES: &[NutrientRule] = &[
    NutrientRule { matches: |h| h.contains("kcal"), nutrient: Nutrient::Calories },
    NutrientRule { matches: |h| h.contains("energy") && h.contains("kj"), nutrient: Nutrient::EnergyKj },
    NutrientRule { matches: |h| h.contains("fat") && !h.contains("saturated"), nutrient: Nutrient::Fat },
    NutrientRule { matches: |h| h.contains("saturated"), nutrient: Nutrient::SaturatedFat },
    NutrientRule { matches: |h| h.contains("carbo") || h.contains("carb"), nutrient: Nutrient::Carbs },
    NutrientRule { matches: |h| h.contains("sugar"), nutrient: Nutrient::Sugar },
    NutrientRule { matches: |h| h.contains("protein"), nutrient: Nutrient::Protein },
    NutrientRule { matches: |h| h.contains("salt"), nutrient: Nutrient::Salt },
    NutrientRule { matches: |h| h.contains("fiber") || h.contains("fibre"), nutrient: Nutrient::Fiber },
    NutrientRule { matches: |h| h.contains("caffeine"), nutrient: Nutrient::Caffeine },
];

/// Nutrient a column header stands for, if any.
pub fn classify_header(header: &str) -> Option<Nutrient> {
    let lower = header.to_lowercase().replace('\n', " ");
    NUTRIENT_RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| rule.nutrient)
}

impl Nutrition {
    /// Store a cell under `nutrient`, overwriting an earlier column.
    pub fn set(&mut self, nutrient: Nutrient, value: &str) {
        let text = Some(value.to_string());
        match nutrient {
            Nutrient::Calories => self.calories = parse_numeric_value(value),
            Nutrient::EnergyKj => self.energy_kj = parse_numeric_value(value),
            Nutrient::Fat => self.fat = text,
            Nutrient::SaturatedFat => self.saturated_fat = text,
            Nutrient::Carbs => self.carbs = text,
            Nutrient::Sugar => self.sugar = text,
            Nutrient::Protein => self.protein = text,
            Nutrient::Salt => self.salt = text,
            Nutrient::Fiber => self.fiber = text,
            Nutrient::Caffeine => self.caffeine = text,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One parsed table row, before grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNutritionRecord {
    pub name: String,
    pub raw_name: String,
    pub size: String,
    pub milk_type: String,
    pub nutrition: Nutrition,
}

/// Turn a cleaned row into a record, using `headers` to place nutrition columns.
///
/// Rows with fewer than three cells or without a usable drink label are rejected.
pub fn parse_row(cells: &[String], headers: &[String]) -> Option<FlatNutritionRecord> {
    if cells.len() < 3 {
        return None;
    }
    let raw_name = cells[0].trim();
    if raw_name.chars().count() < 3 {
        return None;
    }
    let name = clean_drink_name(raw_name);
    if name.is_empty() {
        return None;
    }

    let mut nutrition = Nutrition::default();
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() || value.is_empty() {
            continue;
        }
        if let Some(nutrient) = classify_header(header) {
            nutrition.set(nutrient, value);
        }
    }

    Some(FlatNutritionRecord {
        name,
        raw_name: raw_name.to_string(),
        size: parse_size(&cells[1]),
        milk_type: parse_milk_type(raw_name),
        nutrition,
    })
}
