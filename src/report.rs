use std::collections::BTreeSet;

use tracing::info;

use crate::record::FlatNutritionRecord;

const SAMPLE_SIZE: usize = 5;

/// Summary used to sanity-check an extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub total: usize,
    pub sizes: BTreeSet<String>,
    pub milk_types: BTreeSet<String>,
    pub sample: Vec<FlatNutritionRecord>,
}

impl ValidationReport {
    /// A healthy extraction sees more than one size and more than one milk type.
    pub fn has_variety(&self) -> bool {
        self.sizes.len() > 1 && self.milk_types.len() > 1
    }

    pub fn is_valid(&self) -> bool {
        self.total > 0 && self.has_variety()
    }

    pub fn log(&self) {
        info!(total = self.total, "Extracted drink entries");
        for (i, record) in self.sample.iter().enumerate() {
            let calories = record
                .nutrition
                .calories
                .map(|kcal| kcal.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            info!(
                "Drink {}: name={:?} size={} milk={} calories={} raw={:?}",
                i + 1,
                record.name,
                record.size,
                record.milk_type,
                calories,
                record.raw_name
            );
        }
        info!("Sizes found: {:?}", self.sizes);
        info!("Milk types found: {:?}", self.milk_types);
        info!("Good variety: {}", self.has_variety());
    }
}

pub fn validate(records: &[FlatNutritionRecord]) -> ValidationReport {
    ValidationReport {
        total: records.len(),
        sizes: records.iter().map(|r| r.size.clone()).collect(),
        milk_types: records.iter().map(|r| r.milk_type.clone()).collect(),
        sample: records.iter().take(SAMPLE_SIZE).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Nutrition;

    fn record(size: &str, milk: &str) -> FlatNutritionRecord {
        FlatNutritionRecord {
            name: "Latte".into(),
            raw_name: "Latte".into(),
            size: size.into(),
            milk_type: milk.into(),
            nutrition: Nutrition::default(),
        }
    }

    #[test]
    fn variety_needs_several_sizes_and_milks() {
        let uniform = validate(&[record("Tall", "Standard"), record("Tall", "Standard")]);
        assert!(!uniform.has_variety());
        assert!(!uniform.is_valid());

        let varied = validate(&[record("Tall", "Standard"), record("Grande", "Oat Milk")]);
        assert!(varied.is_valid());
        assert_eq!(varied.sizes.iter().collect::<Vec<_>>(), ["Grande", "Tall"]);
    }

    #[test]
    fn empty_extraction_is_invalid_and_sample_is_capped() {
        assert!(!validate(&[]).is_valid());
        let many: Vec<_> = (0..8).map(|_| record("Tall", "Standard")).collect();
        assert_eq!(validate(&many).sample.len(), SAMPLE_SIZE);
    }
}
