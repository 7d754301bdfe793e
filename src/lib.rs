pub mod aggregate;
pub mod fields;
pub mod layout;
pub mod record;
pub mod report;
pub mod server;
pub mod source;
pub mod table;
pub mod text;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

pub use aggregate::{DrinkEntry, MilkVariant, NutritionDocument, SizeBucket, aggregate, aggregate_at};
pub use record::{FlatNutritionRecord, Nutrition, parse_row};
pub use report::{ValidationReport, validate};
pub use source::{ExtractorConfig, SourceError};
pub use table::{RawTable, find_header_row, select_data_rows, tables_from_page_text};

/// Records of the given tables, in table and row order.
///
/// Tables without a header row and rows that do not parse are skipped.
pub fn extract_tables(tables: &[RawTable]) -> Vec<FlatNutritionRecord> {
    let mut records = Vec::new();
    for table in tables {
        if table.len() < 2 {
            continue;
        }
        let Some(header_index) = find_header_row(table) else {
            debug!("Skipping table without a nutrition header");
            continue;
        };
        let headers = table::header_cells(table, header_index);
        for row in select_data_rows(table, header_index) {
            match parse_row(&row, &headers) {
                Some(record) => records.push(record),
                None => debug!("Skipping unparseable row {:?}", row),
            }
        }
    }
    records
}

/// Records of every page, pages taken in order.
pub fn extract_pages(pages: &[Vec<RawTable>]) -> Vec<FlatNutritionRecord> {
    pages.iter().flat_map(|tables| extract_tables(tables)).collect()
}

/// Tables and records of the 1-based, inclusive page range.
pub fn extract_page_texts(texts: &[String], first_page: usize, last_page: usize) -> Vec<FlatNutritionRecord> {
    let mut records = Vec::new();
    let last = last_page.min(texts.len());
    for page_num in first_page.max(1)..=last {
        info!("Processing page {page_num}...");
        let tables = tables_from_page_text(&texts[page_num - 1]);
        let page_records = extract_tables(&tables);
        if page_records.is_empty() {
            info!("  No data extracted from page {page_num}");
        } else {
            info!("  Extracted {} entries from page {page_num}", page_records.len());
        }
        records.extend(page_records);
    }
    records
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SourceError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|err| SourceError::io(path, err))
}

pub fn read_document(path: &Path) -> Result<NutritionDocument, SourceError> {
    let json = std::fs::read_to_string(path).map_err(|err| SourceError::io(path, err))?;
    Ok(serde_json::from_str(&json)?)
}

/// Flat test dump next to the configured output file.
pub fn test_output_path(config: &ExtractorConfig, first_page: usize, last_page: usize) -> PathBuf {
    let file_name = format!("test_nutrition_data_{first_page}-{last_page}.json");
    match config.output_file.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Extract a few pages, dump the flat records and report on them.
pub async fn run_test(
    config: &ExtractorConfig,
    first_page: usize,
    last_page: usize,
) -> anyhow::Result<ValidationReport> {
    if !config.pdf_file.exists() {
        let client = source::build_client()?;
        source::download_pdf(&client, config).await?;
    }

    let texts = source::load_page_texts(&config.pdf_file).await?;
    info!("PDF has {} pages", texts.len());
    let records = extract_page_texts(&texts, first_page, last_page);

    let report = validate(&records);
    info!("=== Validation for pages {first_page}-{last_page} ===");
    report.log();

    let out = test_output_path(config, first_page, last_page);
    write_json(&out, &records)?;
    info!("Test data saved to {}", out.display());
    Ok(report)
}

/// Extract the whole PDF (cover page excluded) into the grouped document.
pub async fn run_full(config: &ExtractorConfig, force_download: bool) -> anyhow::Result<NutritionDocument> {
    let client = source::build_client()?;
    source::ensure_pdf(&client, config, force_download).await?;

    let texts = source::load_page_texts(&config.pdf_file).await?;
    info!("Processing complete PDF ({} pages)...", texts.len());
    let records = extract_page_texts(&texts, 2, texts.len());

    let doc = aggregate(&records, &config.pdf_url);
    write_json(&config.output_file, &doc)?;
    info!("Complete nutrition data saved to {}", config.output_file.display());
    info!("Total drinks: {}", doc.metadata.total_drinks);
    Ok(doc)
}
