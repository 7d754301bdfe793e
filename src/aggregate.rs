use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::fields::{base_drink_name, generate_id};
use crate::record::{FlatNutritionRecord, Nutrition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilkVariant {
    #[serde(rename = "milkType")]
    pub milk_type: String,
    pub nutrition: Nutrition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBucket {
    pub size: String,
    #[serde(rename = "milkVariants")]
    pub milk_variants: Vec<MilkVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkEntry {
    pub id: String,
    pub name: String,
    pub sizes: Vec<SizeBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    #[serde(with = "timestamp")]
    pub extracted_at: DateTime<Local>,
    pub total_drinks: usize,
}

/// `extracted_at` as RFC 3339 with microseconds and a numeric offset,
/// e.g. `2025-04-01T12:30:05.123456+02:00`.
mod timestamp {
    use chrono::{DateTime, Local, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Local))
            .map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionDocument {
    pub drinks: Vec<DrinkEntry>,
    pub metadata: Metadata,
}

impl NutritionDocument {
    pub fn drink(&self, id: &str) -> Option<&DrinkEntry> {
        self.drinks.iter().find(|drink| drink.id == id)
    }
}

// Working state: vectors keep first-seen order, the maps point into them.
struct SizeGroup {
    bucket: SizeBucket,
    variant_index: HashMap<String, usize>,
}

struct DrinkGroup {
    id: String,
    name: String,
    sizes: Vec<SizeGroup>,
    size_index: HashMap<String, usize>,
}

impl SizeGroup {
    fn upsert(&mut self, record: &FlatNutritionRecord) {
        let key = format!("{}_{}", record.milk_type, record.size);
        let variant = MilkVariant {
            milk_type: record.milk_type.clone(),
            nutrition: record.nutrition.clone(),
        };
        match self.variant_index.get(&key) {
            Some(&idx) => self.bucket.milk_variants[idx] = variant,
            None => {
                self.variant_index.insert(key, self.bucket.milk_variants.len());
                self.bucket.milk_variants.push(variant);
            }
        }
    }
}

impl DrinkGroup {
    fn size_mut(&mut self, size: &str) -> &mut SizeGroup {
        let idx = match self.size_index.get(size) {
            Some(&idx) => idx,
            None => {
                self.size_index.insert(size.to_string(), self.sizes.len());
                self.sizes.push(SizeGroup {
                    bucket: SizeBucket {
                        size: size.to_string(),
                        milk_variants: Vec::new(),
                    },
                    variant_index: HashMap::new(),
                });
                self.sizes.len() - 1
            }
        };
        &mut self.sizes[idx]
    }

    fn into_entry(self) -> DrinkEntry {
        DrinkEntry {
            id: self.id,
            name: self.name,
            sizes: self.sizes.into_iter().map(|group| group.bucket).collect(),
        }
    }
}

/// Group flat records into drinks, stamped with the current local time.
pub fn aggregate(records: &[FlatNutritionRecord], source: &str) -> NutritionDocument {
    aggregate_at(records, source, Local::now())
}

/// Group flat records by base drink name, then size, then milk type.
///
/// Sizes and milk variants keep the order in which they first appear; a later
/// record for the same milk type and size replaces the earlier nutrition.
/// Drinks are sorted by name.
pub fn aggregate_at(
    records: &[FlatNutritionRecord],
    source: &str,
    extracted_at: DateTime<Local>,
) -> NutritionDocument {
    let mut drinks: Vec<DrinkGroup> = Vec::new();
    let mut drink_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let base = base_drink_name(&record.name);
        let idx = *drink_index.entry(base.clone()).or_insert_with(|| {
            drinks.push(DrinkGroup {
                id: generate_id(&base),
                name: base.clone(),
                sizes: Vec::new(),
                size_index: HashMap::new(),
            });
            drinks.len() - 1
        });
        drinks[idx].size_mut(&record.size).upsert(record);
    }

    let mut entries: Vec<DrinkEntry> = drinks.into_iter().map(DrinkGroup::into_entry).collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    NutritionDocument {
        metadata: Metadata {
            source: source.to_string(),
            extracted_at,
            total_drinks: entries.len(),
        },
        drinks: entries,
    }
}
