//! Export Serializer: renders the producer table to a file.
//!
//! Two representations share the fixed header `ID, Name, Contact, Address,
//! Products, Category` and store order:
//! 1. Delimited text (comma-separated, quoted where needed)
//! 2. PDF document via `printpdf`: title, paginated table with a shaded
//!    header row repeated per page, and an "Exported on:" footer line
//!
//! Export only reads from the store.

use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use printpdf::path::PaintMode;
use printpdf::*;
use thiserror::Error;

use crate::config::AppConfig;
use crate::delimited::format_row;
use crate::models::{ExportFormat, Producer};
use crate::store::{RecordStore, StoreError};

pub const EXPORT_HEADER: [&str; 6] = ["ID", "Name", "Contact", "Address", "Products", "Category"];
pub const PDF_TITLE: &str = "Global Energy Producers Database";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("{0} is unavailable: disabled in configuration")]
    FeatureUnavailable(&'static str),

    #[error("Cannot read producers for export: {0}")]
    Storage(#[from] StoreError),
}

/// Write the full producer table to `path` in the requested format.
/// Returns the number of producer rows written.
pub fn export_to_file(
    store: &RecordStore,
    path: &Path,
    format: ExportFormat,
    config: &AppConfig,
) -> Result<usize, ExportError> {
    if format == ExportFormat::Pdf && !config.pdf_export_enabled {
        return Err(ExportError::FeatureUnavailable("PDF export"));
    }

    let producers = store.get_all()?;
    let bytes = match format {
        ExportFormat::Csv => {
            let mut buf = Vec::new();
            write_delimited(&producers, &mut buf)
                .map_err(|e| ExportError::ExportFailed(format!("Cannot encode rows: {e}")))?;
            buf
        }
        ExportFormat::Pdf => render_pdf(&producers, Local::now().naive_local())?,
    };

    std::fs::write(path, bytes).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Export write failed");
        ExportError::ExportFailed(format!("Cannot write {}: {e}", path.display()))
    })?;

    tracing::info!(
        path = %path.display(),
        format = format.as_str(),
        rows = producers.len(),
        "Producers exported"
    );
    Ok(producers.len())
}

/// Delimited text: header line then one line per producer, CRLF-terminated.
pub fn write_delimited<W: Write>(producers: &[Producer], writer: &mut W) -> std::io::Result<()> {
    write!(writer, "{}\r\n", format_row(EXPORT_HEADER))?;
    for p in producers {
        write!(writer, "{}\r\n", format_row(row_cells(p)))?;
    }
    writer.flush()
}

fn row_cells(p: &Producer) -> [String; 6] {
    [
        p.id.to_string(),
        p.name.clone(),
        p.contact.clone(),
        p.address.clone(),
        p.products.clone(),
        p.category.clone(),
    ]
}

// ─── PDF layout ───────────────────────────────────────────────────────────────

// US Letter, landscape.
const PAGE_W: f32 = 279.4;
const PAGE_H: f32 = 215.9;
const MARGIN: f32 = 15.0;
const TITLE_BLOCK: f32 = 14.0;
const FOOTER_BLOCK: f32 = 10.0;
const HEADER_ROW_H: f32 = 8.0;
const BODY_ROW_H: f32 = 6.5;
const CELL_PAD: f32 = 1.5;
const TITLE_SIZE: f32 = 16.0;
const HEADER_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 8.0;
const FOOTER_SIZE: f32 = 9.0;

/// Column widths in mm; they sum to the printable width.
const COLUMN_WIDTHS: [f32; 6] = [14.0, 45.0, 45.0, 60.0, 50.0, 35.4];

/// Rough Helvetica advance per character, as a fraction of the font size.
const AVG_CHAR_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

fn rows_on_page(first_page: bool) -> usize {
    let mut usable = PAGE_H - 2.0 * MARGIN - HEADER_ROW_H - FOOTER_BLOCK;
    if first_page {
        usable -= TITLE_BLOCK;
    }
    ((usable / BODY_ROW_H).floor() as usize).max(1)
}

/// Split `total` rows into per-page ranges. Always at least one page.
fn page_ranges(total: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut first = true;
    loop {
        let end = (start + rows_on_page(first)).min(total);
        ranges.push(start..end);
        if end >= total {
            break;
        }
        start = end;
        first = false;
    }
    ranges
}

/// Truncate cell text to what fits in `width_mm` at `font_size`.
fn fit_cell(text: &str, width_mm: f32, font_size: f32) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let char_mm = font_size * AVG_CHAR_EM * PT_TO_MM;
    let max_chars = (((width_mm - 2.0 * CELL_PAD) / char_mm).floor() as usize).max(1);
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let kept: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

struct TableStyle {
    fill: Color,
    text: Color,
    height: f32,
    size: f32,
}

/// Draw one table row whose top edge is at `top`; returns the new top.
fn draw_row(
    layer: &PdfLayerReference,
    top: f32,
    cells: &[String],
    font: &IndirectFontRef,
    style: &TableStyle,
) -> f32 {
    let bottom = top - style.height;

    layer.set_fill_color(style.fill.clone());
    let rect = Rect::new(Mm(MARGIN), Mm(bottom), Mm(PAGE_W - MARGIN), Mm(top))
        .with_mode(PaintMode::FillStroke);
    layer.add_rect(rect);

    let mut x = MARGIN;
    for (i, width) in COLUMN_WIDTHS.iter().enumerate() {
        if i > 0 {
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(x), Mm(bottom)), false),
                    (Point::new(Mm(x), Mm(top)), false),
                ],
                is_closed: false,
            });
        }
        x += width;
    }

    layer.set_fill_color(style.text.clone());
    let baseline = bottom + (style.height - style.size * PT_TO_MM) / 2.0 + 0.5;
    let mut x = MARGIN;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        let text = fit_cell(cell, width, style.size);
        layer.use_text(text, style.size, Mm(x + CELL_PAD), Mm(baseline), font);
        x += width;
    }

    bottom
}

/// Render the producers as a paginated PDF document. Returns PDF bytes.
pub fn render_pdf(producers: &[Producer], exported_at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(PDF_TITLE, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::ExportFailed(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::ExportFailed(format!("PDF font error: {e}")))?;

    let header_style = TableStyle {
        fill: rgb(0.5, 0.5, 0.5),
        text: rgb(0.96, 0.96, 0.96),
        height: HEADER_ROW_H,
        size: HEADER_SIZE,
    };
    let body_style = TableStyle {
        fill: rgb(0.96, 0.96, 0.86),
        text: rgb(0.0, 0.0, 0.0),
        height: BODY_ROW_H,
        size: BODY_SIZE,
    };
    let header: Vec<String> = EXPORT_HEADER.iter().map(|h| h.to_string()).collect();

    let ranges = page_ranges(producers.len());
    let last_page = ranges.len() - 1;
    let mut y = 0.0;

    for (page_no, range) in ranges.into_iter().enumerate() {
        let layer = if page_no == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Page {}", page_no + 1));
            doc.get_page(page).get_layer(layer)
        };
        layer.set_outline_color(rgb(0.0, 0.0, 0.0));
        layer.set_outline_thickness(0.5);

        y = PAGE_H - MARGIN;
        if page_no == 0 {
            layer.set_fill_color(rgb(0.0, 0.0, 0.0));
            layer.use_text(PDF_TITLE, TITLE_SIZE, Mm(MARGIN), Mm(y - TITLE_SIZE * PT_TO_MM), &bold);
            y -= TITLE_BLOCK;
        }

        y = draw_row(&layer, y, &header, &bold, &header_style);
        for p in &producers[range] {
            y = draw_row(&layer, y, &row_cells(p), &font, &body_style);
        }

        if page_no == last_page {
            layer.set_fill_color(rgb(0.0, 0.0, 0.0));
            let stamp = format!("Exported on: {}", exported_at.format("%Y-%m-%d %H:%M:%S"));
            layer.use_text(stamp, FOOTER_SIZE, Mm(MARGIN), Mm(y - FOOTER_BLOCK + 2.0), &font);
        }
    }
    tracing::debug!(rows = producers.len(), bottom_mm = y, "PDF table rendered");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::ExportFailed(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::ExportFailed(format!("PDF buffer error: {e}")))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
