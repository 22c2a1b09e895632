//! Content normalization rules shared by every engine.
//!
//! Tables are rectangular, text is an ordered list of segments with one join
//! rule, URLs are absolute, and document ids are collision resistant.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::types::{Domain, Table};

/// Separator used whenever text segments are flattened into one string.
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// A table cell as reported by an engine that addresses cells by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub row: usize,
    pub column: usize,
    pub content: String,
}

impl TableCell {
    pub fn new(row: usize, column: usize, content: impl Into<String>) -> Self {
        Self {
            row,
            column,
            content: content.into(),
        }
    }
}

/// Reassemble index-addressed cells into a grid of
/// `(max row + 1) x (max column + 1)`; unreported cells are empty strings.
///
/// Returns `None` when there are no cells.
pub fn assemble_table<I>(cells: I) -> Option<Table>
where
    I: IntoIterator<Item = TableCell>,
{
    let cells: Vec<TableCell> = cells.into_iter().collect();
    let rows = cells.iter().map(|c| c.row).max()? + 1;
    let columns = cells.iter().map(|c| c.column).max()? + 1;

    let mut grid = vec![vec![String::new(); columns]; rows];
    for cell in cells {
        grid[cell.row][cell.column] = cell.content;
    }
    Some(grid)
}

/// Pad ragged rows with empty strings up to the widest row, dropping empty rows.
///
/// Returns `None` when no row has any cell.
pub fn rectangularize(rows: Vec<Vec<String>>) -> Option<Table> {
    let mut rows: Vec<Vec<String>> = rows.into_iter().filter(|r| !r.is_empty()).collect();
    let width = rows.iter().map(Vec::len).max()?;
    for row in &mut rows {
        row.resize(width, String::new());
    }
    Some(rows)
}

/// Split a single block of text into trimmed, non-blank line segments.
pub fn split_segments(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flatten segments with [`SEGMENT_SEPARATOR`].
pub fn join_segments(segments: &[String]) -> String {
    segments.join(SEGMENT_SEPARATOR)
}

/// Resolve a possibly relative reference against the page URL.
///
/// References that already carry an http(s) scheme are returned unchanged;
/// references that cannot be resolved are returned as given.
pub fn resolve_url(base: &url::Url, reference: &str) -> String {
    let reference = reference.trim();
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    base.join(reference)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| reference.to_string())
}

/// Build a document id: `{domain}_{tag}_{hash8}_{YYYYmmdd_HHMMSS}_{rand8}`.
///
/// The hash token is the first 8 hex chars of the SHA-256 of `identity`; the
/// random suffix keeps ids unique for identical inputs within one second.
pub fn document_id(
    domain: Domain,
    engine_tag: &str,
    identity: &[u8],
    now: DateTime<Utc>,
) -> String {
    let digest = hex::encode(Sha256::digest(identity));
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}_{}_{}",
        domain,
        engine_tag,
        &digest[..8],
        now.format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    )
}

/// Serialize a table as CSV with RFC 4180 quoting.
pub fn table_to_csv(table: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in table {
        let line = row
            .iter()
            .map(|cell| csv_field(cell))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn csv_field(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// MIME type for an image file extension.
pub fn image_content_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "jp2" | "jpx" => "image/jp2",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}
