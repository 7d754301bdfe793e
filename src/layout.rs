//! Page text rendering that keeps the column structure of PDF tables.
//!
//! Words inside a cell are joined by a space, cells by a tab, rows by a newline.

use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use tracing::warn;

/// Horizontal gap, in font sizes, past which the next word starts a new column.
const COLUMN_GAP: f64 = 1.0;
/// Horizontal gap, in font sizes, past which two glyphs belong to different words.
const WORD_GAP: f64 = 0.1;
/// Vertical move, in font sizes, that always ends the line.
const LINE_GAP: f64 = 1.5;

#[derive(Debug, Default)]
pub struct ColumnTextOutput {
    text: String,
    page_height: f64,
    word_start: bool,
    last_end: f64,
    last_y: f64,
}

impl ColumnTextOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text rendered since the last call.
    pub fn take_text(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    /// Append one glyph at page position (`x`, `y`) with top-down `y`.
    pub fn place_glyph(&mut self, x: f64, y: f64, advance: f64, font_size: f64, glyph: &str) {
        if self.word_start && !self.text.is_empty() && !self.text.ends_with('\n') {
            let dy = (y - self.last_y).abs();
            let moved_down_left = x < self.last_end && dy > font_size * 0.5;
            if dy > font_size * LINE_GAP || moved_down_left {
                self.text.push('\n');
            } else if x > self.last_end + font_size * COLUMN_GAP {
                self.text.push('\t');
            } else if x > self.last_end + font_size * WORD_GAP {
                self.text.push(' ');
            }
        }
        self.text.push_str(glyph);
        self.word_start = false;
        self.last_y = y;
        self.last_end = x + advance;
    }
}

impl OutputDev for ColumnTextOutput {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.page_height = media_box.ury - media_box.lly;
        self.word_start = false;
        self.last_end = 0.0;
        self.last_y = 0.0;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        // Scale of the glyph in page space, from the text rendering matrix.
        let scaled_x = font_size * trm.m11 + font_size * trm.m21;
        let scaled_y = font_size * trm.m12 + font_size * trm.m22;
        let scaled_size = (scaled_x * scaled_y).abs().sqrt();
        let x = trm.m31;
        let y = self.page_height - trm.m32;
        self.place_glyph(x, y, width * scaled_size, scaled_size, char);
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        self.word_start = true;
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Column-preserving text of every page, in page order.
///
/// A page that fails to render yields an empty string so page numbers stay aligned.
pub fn page_texts(bytes: &[u8]) -> Result<Vec<String>, OutputError> {
    let mut doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        doc.decrypt("")?;
    }

    let mut output = ColumnTextOutput::new();
    let mut texts = Vec::new();
    for page_num in doc.get_pages().into_keys() {
        match pdf_extract::output_doc_page(&doc, &mut output, page_num) {
            Ok(()) => texts.push(output.take_text()),
            Err(err) => {
                warn!("Could not render page {page_num}: {err}");
                output.take_text();
                texts.push(String::new());
            }
        }
    }
    Ok(texts)
}
