//! PDF presentation of an extraction outcome.
//!
//! A deliberately plain A4 layout: a bold title line, then one `KEY: value`
//! paragraph per record field, wrapped and paginated by hand. `_sources` is
//! a debugging annotation and stays out of the document.

use anyhow::{anyhow, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::extract::record::{ExtractOutcome, Extraction, SchoolRecord};

/// Rough character budget per line for 10pt Helvetica on A4 with margins.
const WRAP_COLUMNS: usize = 95;

pub fn render_outcome(outcome: &ExtractOutcome) -> Result<Vec<u8>> {
    match &outcome.extraction {
        Extraction::Refusal { error } => render_error(error),
        Extraction::Record(record) => render_record(record),
    }
}

pub fn render_error(message: &str) -> Result<Vec<u8>> {
    render_lines("Error", &wrap(&format!("Error: {message}"), WRAP_COLUMNS))
}

fn render_record(record: &SchoolRecord) -> Result<Vec<u8>> {
    let title = if record.school_name.is_empty() {
        "School Report"
    } else {
        record.school_name.as_str()
    };

    let mut lines: Vec<String> = Vec::new();
    for (key, value) in record_fields(record) {
        lines.extend(wrap(&format!("{}: {value}", key.to_uppercase()), WRAP_COLUMNS));
        lines.push(String::new());
    }

    render_lines(title, &lines)
}

/// Wire order of the record fields, with the sequence field flattened for
/// display.
fn record_fields(r: &SchoolRecord) -> Vec<(&'static str, String)> {
    vec![
        ("school_name", r.school_name.clone()),
        ("address", r.address.clone()),
        ("location", r.location.clone()),
        ("contact", r.contact.clone()),
        ("website", r.website.clone()),
        ("email", r.email.clone()),
        ("board", r.board.clone()),
        ("classes_offered", r.classes_offered.clone()),
        ("fees", r.fees.clone()),
        ("admission_process", r.admission_process.clone()),
        ("facilities", r.facilities.join(", ")),
        ("transport", r.transport.clone()),
        ("rating", r.rating.clone()),
        ("about", r.about.clone()),
        ("summary", r.summary.clone()),
    ]
}

fn render_lines(title: &str, lines: &[String]) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new("School Report", Mm(210.0), Mm(297.0), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("loading builtin font: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("loading builtin font: {e}"))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = 275.0;

    layer.use_text(title, 16.0, Mm(15.0), Mm(y), &bold);
    y -= 12.0;

    for line in lines {
        if line.is_empty() {
            y -= 3.0;
            continue;
        }
        if y < 18.0 {
            let (next_page, next_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = 275.0;
        }
        layer.use_text(line.as_str(), 10.0, Mm(15.0), Mm(y), &regular);
        y -= 5.5;
    }

    doc.save_to_bytes().map_err(|e| anyhow!("writing pdf: {e}"))
}

/// Greedy word wrap by character count; overlong words get their own line.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= columns {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
