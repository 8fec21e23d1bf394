//! CSV codec for persisted items.
//!
//! One record per item, 14 fields in a fixed order. Quoting follows RFC 4180:
//! a field containing the delimiter, a quote or a line break is wrapped in
//! quotes with inner quotes doubled. Money renders with two decimals,
//! timestamps as Unix seconds, and an expiry of `0` means "no expiry".

use std::io;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use thiserror::Error;

use stockroom_core::{DomainError, ItemId};

use crate::item::{Item, ItemSnapshot};

/// Column names, in record order.
pub const HEADER_FIELDS: [&str; 14] = [
    "ID",
    "Name",
    "Category",
    "Supplier",
    "Barcode",
    "Quantity",
    "MinimumStock",
    "Cost",
    "SellingPrice",
    "DateAdded",
    "LastModified",
    "ExpiryDate",
    "Location",
    "Description",
];

/// Number of fields in every record.
pub const FIELD_COUNT: usize = HEADER_FIELDS.len();

/// Why a persisted record could not be turned back into an item.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed record: expected {expected} fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },

    #[error("invalid value {value:?} for field {field}")]
    InvalidField { field: &'static str, value: String },

    #[error("record violates item invariants: {0}")]
    Invalid(#[from] DomainError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A record that was skipped while reading a file.
#[derive(Debug)]
pub struct LineError {
    /// 1-based line the record starts on, when known.
    pub line: Option<u64>,
    pub error: CodecError,
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Result of reading a whole file: the good items plus every skipped record.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub items: Vec<Item>,
    pub errors: Vec<LineError>,
}

/// The fixed header line.
pub fn header() -> String {
    HEADER_FIELDS.join(",")
}

/// Field values for `item`, in record order.
pub fn to_record(item: &Item) -> StringRecord {
    let expiry = item.expiry_date().map_or(0, |d| d.timestamp());
    StringRecord::from(vec![
        item.id().to_string(),
        item.name().to_string(),
        item.category().to_string(),
        item.supplier().to_string(),
        item.barcode().to_string(),
        item.quantity().to_string(),
        item.minimum_stock().to_string(),
        format!("{:.2}", item.cost()),
        format!("{:.2}", item.selling_price()),
        item.date_added().timestamp().to_string(),
        item.last_modified().timestamp().to_string(),
        expiry.to_string(),
        item.location().to_string(),
        item.description().to_string(),
    ])
}

/// Encode one item as a single record (without the trailing line break).
pub fn encode(item: &Item) -> Result<String, CodecError> {
    let mut writer = record_writer(Vec::new());
    writer.write_record(&to_record(item))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    let mut line = String::from_utf8_lossy(&bytes).into_owned();
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Decode one record. Never panics on malformed input.
pub fn decode(line: &str) -> Result<Item, CodecError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(CodecError::MalformedRecord {
            expected: FIELD_COUNT,
            found: 0,
        });
    }
    from_record(&record)
}

/// Turn an already split record into an item.
pub fn from_record(record: &StringRecord) -> Result<Item, CodecError> {
    if record.len() != FIELD_COUNT {
        return Err(CodecError::MalformedRecord {
            expected: FIELD_COUNT,
            found: record.len(),
        });
    }

    let text = |i: usize| record.get(i).unwrap_or_default().to_string();

    let snapshot = ItemSnapshot {
        id: ItemId::new(parse_field(record, 0)?),
        name: text(1),
        category: text(2),
        supplier: text(3),
        barcode: text(4),
        quantity: parse_field(record, 5)?,
        minimum_stock: parse_field(record, 6)?,
        cost: parse_field(record, 7)?,
        selling_price: parse_field(record, 8)?,
        date_added: timestamp_field(record, 9)?,
        last_modified: timestamp_field(record, 10)?,
        expiry_date: match parse_field::<i64>(record, 11)? {
            0 => None,
            _ => Some(timestamp_field(record, 11)?),
        },
        location: text(12),
        description: text(13),
    };

    Ok(Item::restore(snapshot)?)
}

/// Write the header plus one record per item.
pub fn write_items<'a, W, I>(out: W, items: I) -> Result<(), csv::Error>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Item>,
{
    let mut writer = record_writer(out);
    writer.write_record(HEADER_FIELDS)?;
    for item in items {
        writer.write_record(&to_record(item))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a whole file: skip the header, decode every record independently.
///
/// Undecodable records are collected in [`ReadOutcome::errors`]; only an
/// I/O failure of the underlying reader aborts the read.
pub fn read_items<R: io::Read>(input: R) -> Result<ReadOutcome, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut outcome = ReadOutcome::default();
    let mut record = StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map(|p| p.line());
                match from_record(&record) {
                    Ok(item) => outcome.items.push(item),
                    Err(error) => outcome.errors.push(LineError { line, error }),
                }
            }
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => {
                let line = err.position().map(|p| p.line());
                outcome.errors.push(LineError {
                    line,
                    error: CodecError::Csv(err),
                });
            }
        }
    }

    Ok(outcome)
}

fn record_writer<W: io::Write>(out: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out)
}

fn parse_field<T: core::str::FromStr>(
    record: &StringRecord,
    index: usize,
) -> Result<T, CodecError> {
    let raw = record.get(index).unwrap_or_default();
    raw.trim().parse().map_err(|_| CodecError::InvalidField {
        field: HEADER_FIELDS[index],
        value: raw.to_string(),
    })
}

fn timestamp_field(record: &StringRecord, index: usize) -> Result<DateTime<Utc>, CodecError> {
    let secs: i64 = parse_field(record, index)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| CodecError::InvalidField {
        field: HEADER_FIELDS[index],
        value: secs.to_string(),
    })
}
