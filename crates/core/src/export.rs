//! CSV rendering for the asset export.

/// Column headers of `assets_export.csv`.
pub const ASSET_EXPORT_HEADERS: &[&str] = &[
    "ID",
    "Name",
    "Category",
    "Serial Number",
    "Status",
    "Condition",
    "Purchase Date",
    "Purchase Price",
    "Warranty Expiration",
    "Assigned To",
    "Location",
    "Created At",
];

/// Download filename for the asset export.
pub const ASSET_EXPORT_FILENAME: &str = "assets_export.csv";

/// Escape a value for CSV: wrap in quotes if it contains a comma, quote, or line break.
pub fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one CSV record terminated by CRLF.
pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

/// Render a header row followed by data rows.
pub fn build_csv<S, I>(headers: &[&str], rows: I) -> String
where
    S: AsRef<str>,
    I: IntoIterator<Item = Vec<S>>,
{
    let mut out = csv_line(headers);
    for row in rows {
        out.push_str(&csv_line(&row));
    }
    out
}
