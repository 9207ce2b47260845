// Excel roster import (xls, xlsx)

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::{NaiveDate, Timelike};
use rollcall_recon::model::{Roster, Value};
use rollcall_recon::ReconError;

use crate::format::TableFormat;
use crate::header::unique_headers;

/// Read the first worksheet of an Excel workbook. First row is the header.
pub fn import(label: &str, bytes: &[u8], format: TableFormat) -> Result<Roster, ReconError> {
    let cursor = Cursor::new(bytes);
    let range = match format {
        TableFormat::Xlsx => first_sheet::<_, Xlsx<_>>(label, cursor)?,
        TableFormat::Xls => first_sheet::<_, Xls<_>>(label, cursor)?,
        TableFormat::Csv => {
            return Err(ReconError::UnsupportedFormat(format!(
                "{format} is not a workbook format"
            )))
        }
    };
    roster_from_range(label, &range)
}

fn parse_error(label: &str, message: impl Into<String>) -> ReconError {
    ReconError::Parse {
        source: label.to_string(),
        message: message.into(),
    }
}

fn first_sheet<RS, R>(label: &str, reader: RS) -> Result<Range<Data>, ReconError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let mut workbook =
        R::new(reader).map_err(|e| parse_error(label, format!("failed to open workbook: {e}")))?;

    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(parse_error(label, format!("failed to read first sheet: {e}"))),
        None => Err(parse_error(label, "workbook contains no sheets")),
    }
}

fn roster_from_range(label: &str, range: &Range<Data>) -> Result<Roster, ReconError> {
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| parse_error(label, "first sheet is empty"))?;

    let raw: Vec<String> = header_row.iter().map(|c| cell_value(c).to_string()).collect();
    let headers = unique_headers(&raw);

    let body: Vec<Vec<Value>> = rows.map(|row| row.iter().map(cell_value).collect()).collect();

    log::debug!("xlsx '{label}': {} columns, {} rows", headers.len(), body.len());

    Ok(Roster::from_rows(label, headers, body))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Missing,
        Data::String(s) if s.trim().is_empty() => Value::Missing,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(n) => Value::number(*n),
        Data::Int(n) => Value::Int(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Text(serial_to_iso(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Render an Excel 1900-system serial as an ISO date (or date-time when it
/// has a time part).
fn serial_to_iso(serial: f64) -> String {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0));
    let millis = (serial * 86_400_000.0).round() as i64;
    let Some(dt) = base.and_then(|b| b.checked_add_signed(chrono::Duration::milliseconds(millis)))
    else {
        return serial.to_string();
    };

    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
