use std::fs;

use beverage_nutrition::source::{file_md5, should_download};
use beverage_nutrition::{ExtractorConfig, aggregate, read_document, write_json};

fn config_in(dir: &std::path::Path) -> ExtractorConfig {
    ExtractorConfig {
        pdf_url: "http://127.0.0.1:9/nutrition.pdf".to_string(),
        output_file: dir.join("nutrition_data.json"),
        pdf_file: dir.join("nutrition.pdf"),
        md5_file: dir.join("nutrition.md5"),
    }
}

#[test]
fn missing_pdf_or_hash_requires_download() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    assert!(should_download(&config));

    fs::write(&config.pdf_file, b"%PDF-1.4 fake").unwrap();
    assert!(should_download(&config));
}

#[test]
fn matching_hash_skips_download_and_mismatch_does_not() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.pdf_file, b"%PDF-1.4 fake").unwrap();

    let hash = file_md5(&config.pdf_file).unwrap();
    fs::write(&config.md5_file, format!("{hash}\n")).unwrap();
    assert!(!should_download(&config));

    fs::write(&config.pdf_file, b"%PDF-1.4 changed").unwrap();
    assert!(should_download(&config));
}

#[test]
fn written_document_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let doc = aggregate(&[], &config.pdf_url);

    write_json(&config.output_file, &doc).unwrap();
    let loaded = read_document(&config.output_file).unwrap();
    assert_eq!(loaded.metadata.source, config.pdf_url);
    assert_eq!(loaded.metadata.total_drinks, 0);
    assert!(loaded.drinks.is_empty());
}
