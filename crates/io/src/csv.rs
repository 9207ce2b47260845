// CSV roster import/export

use std::path::Path;

use rollcall_recon::model::{Roster, Value};
use rollcall_recon::ReconError;

use crate::header::unique_headers;

/// Cell texts read as missing values, matching common spreadsheet/data-frame
/// exports.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse CSV bytes into a roster. First row is the header.
pub fn import(label: &str, bytes: &[u8]) -> Result<Roster, ReconError> {
    let content = decode_utf8(bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = sniff_delimiter(content);
    import_from_string(label, content, delimiter)
}

/// Separators a roster export may use. Earlier entries win ties.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Records inspected when choosing a delimiter.
const SNIFF_RECORDS: usize = 10;

/// Pick the separator that splits the header into the most fields while the
/// sampled records keep that width. Falls back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    DELIMITERS
        .iter()
        .rev()
        .filter_map(|&delimiter| delimiter_fit(content, delimiter).map(|fit| (fit, delimiter)))
        .max_by_key(|&(fit, _)| fit)
        .map(|(_, delimiter)| delimiter)
        .unwrap_or(b',')
}

/// Fit score for one delimiter: header width times the number of sampled
/// records with that width. `None` when the header does not split.
///
/// Records are read with the csv parser, so quoted separators and quoted
/// line breaks are not miscounted.
fn delimiter_fit(content: &str, delimiter: u8) -> Option<usize> {
    let widths: Vec<usize> = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect();

    let header = *widths.first()?;
    if header < 2 {
        return None;
    }
    Some(header * widths.iter().filter(|&&w| w == header).count())
}

/// Decode bytes as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs).
pub fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn import_from_string(label: &str, content: &str, delimiter: u8) -> Result<Roster, ReconError> {
    let parse_err = |e: csv::Error| ReconError::Parse {
        source: label.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if raw_headers.is_empty() {
        return Err(ReconError::Parse {
            source: label.to_string(),
            message: "no header row".into(),
        });
    }

    let headers = unique_headers(&raw_headers);
    let width = headers.len();

    let mut cells: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_err)?;
        let mut row: Vec<String> = record.iter().take(width).map(|f| f.to_string()).collect();
        row.resize(width, String::new());
        cells.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| infer_kind(cells.iter().map(|row| row[col].as_str())))
        .collect();

    let rows = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect()
        })
        .collect();

    log::debug!("csv '{label}': {} columns, delimiter {:?}", width, delimiter as char);

    Ok(Roster::from_rows(label, headers, rows))
}

// ---------------------------------------------------------------------------
// Column typing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell.trim())
}

/// Optional sign followed by digits only.
fn is_integer_literal(cell: &str) -> bool {
    let cell = cell.trim();
    let digits = cell
        .strip_prefix('-')
        .or_else(|| cell.strip_prefix('+'))
        .unwrap_or(cell);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_int(cell: &str) -> Option<i64> {
    cell.trim().parse::<i64>().ok()
}

fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

/// Numeric cell that is safe to hold as a float: an `i64`, or a decimal that
/// is not an oversized integer.
fn is_float_cell(cell: &str) -> bool {
    parse_int(cell).is_some() || (!is_integer_literal(cell) && parse_float(cell).is_some())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// A column is numeric (or boolean) only when every non-missing cell is.
///
/// Whole numbers that fit an `i64` make an integer column. Digit strings too
/// long for an `i64` keep the column as text rather than rounding them
/// through a float.
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let present: Vec<&str> = cells.filter(|c| !is_na(c)).collect();
    if present.is_empty() {
        return ColumnKind::Text;
    }
    if present.iter().all(|c| parse_int(c).is_some()) {
        ColumnKind::Int
    } else if present.iter().all(|c| is_float_cell(c)) {
        ColumnKind::Float
    } else if present.iter().all(|c| parse_bool(c).is_some()) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

impl ColumnKind {
    fn convert(self, cell: String) -> Value {
        if is_na(&cell) {
            return Value::Missing;
        }
        match self {
            Self::Int => parse_int(&cell).map(Value::Int).unwrap_or(Value::Text(cell)),
            Self::Float => parse_float(&cell).map(Value::number).unwrap_or(Value::Text(cell)),
            Self::Bool => parse_bool(&cell).map(Value::Bool).unwrap_or(Value::Text(cell)),
            Self::Text => Value::Text(cell),
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Serialize a roster as comma-separated text: header row, then one line per row.
pub fn export(roster: &Roster) -> Result<Vec<u8>, ReconError> {
    let mut writer = writer_builder().from_writer(Vec::new());
    write_records(roster, &mut writer)?;
    writer
        .into_inner()
        .map_err(|e| ReconError::Io(e.to_string()))
}

pub fn export_path(roster: &Roster, path: &Path) -> Result<(), ReconError> {
    let mut writer = writer_builder()
        .from_path(path)
        .map_err(|e| ReconError::Io(format!("cannot write {}: {e}", path.display())))?;
    write_records(roster, &mut writer)
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn write_records<W: std::io::Write>(
    roster: &Roster,
    writer: &mut csv::Writer<W>,
) -> Result<(), ReconError> {
    let io_err = |e: csv::Error| ReconError::Io(e.to_string());

    writer.write_record(roster.columns()).map_err(io_err)?;
    for row in roster.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(io_err)?;
    }
    writer.flush()?;
    Ok(())
}
