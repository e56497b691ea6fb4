//! CSV parser for raw parking-violation exports.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{HotspotError, Result};
use crate::records::{ViolationRecord, ViolationTable};

/// Columns every input file must provide, in no particular order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "location",
    "amount",
    "lat",
    "lon",
    "dayofweek",
    "hourofday",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header positions of the required columns.
struct ColumnIndex {
    location: usize,
    amount: usize,
    lat: usize,
    lon: usize,
    dayofweek: usize,
    hourofday: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| HotspotError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            location: find("location")?,
            amount: find("amount")?,
            lat: find("lat")?,
            lon: find("lon")?,
            dayofweek: find("dayofweek")?,
            hourofday: find("hourofday")?,
        })
    }
}

/// Decodes a CSV export into a [`ViolationTable`].
///
/// All required columns are checked against the header before any row is
/// read. Extra columns are allowed and carried through untouched.
///
/// # Errors
///
/// Returns [`HotspotError::MissingColumn`] for an incomplete header,
/// [`HotspotError::MalformedValue`] for an unparseable or negative amount or a
/// non-finite coordinate, and [`HotspotError::Csv`] for structurally broken CSV
/// (for example a row with a different field count than the header).
pub fn parse_violations(bytes: &[u8]) -> Result<ViolationTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let fields = result?;
        records.push(parse_record(row, &columns, fields)?);
    }

    debug!(rows = records.len(), columns = headers.len(), "Parsed violation records");

    Ok(ViolationTable { headers, records })
}

fn parse_record(row: usize, columns: &ColumnIndex, fields: StringRecord) -> Result<ViolationRecord> {
    let text = |idx: usize| fields.get(idx).unwrap_or("");

    let amount = parse_number(row, "amount", text(columns.amount))?;
    if amount < 0.0 {
        return Err(malformed(row, "amount", text(columns.amount)));
    }
    let lat = parse_number(row, "lat", text(columns.lat))?;
    let lon = parse_number(row, "lon", text(columns.lon))?;

    Ok(ViolationRecord {
        location: text(columns.location).to_string(),
        amount,
        lat,
        lon,
        dayofweek: text(columns.dayofweek).to_string(),
        hourofday: text(columns.hourofday).to_string(),
        fields,
    })
}

fn parse_number(row: usize, column: &str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(malformed(row, column, value)),
    }
}

fn malformed(row: usize, column: &str, value: &str) -> HotspotError {
    HotspotError::MalformedValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}
