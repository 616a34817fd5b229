//! Export parsing.
//!
//! Turns the detailed-report CSV into [`TaskRecord`]s. Columns are located by
//! header name, so extra export columns are ignored. Dates are read day-first.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::debug;

use timeaudit_core::{AuditError, TaskRecord};

pub const COLUMN_USER: &str = "User";
pub const COLUMN_START_DATE: &str = "Start Date";
pub const COLUMN_START_TIME: &str = "Start Time";
pub const COLUMN_END_DATE: &str = "End Date";
pub const COLUMN_END_TIME: &str = "End Time";
pub const COLUMN_DESCRIPTION: &str = "Description";
pub const COLUMN_DURATION: &str = "Duration (decimal)";

/// Columns the export must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COLUMN_USER,
    COLUMN_START_DATE,
    COLUMN_START_TIME,
    COLUMN_END_DATE,
    COLUMN_END_TIME,
    COLUMN_DESCRIPTION,
    COLUMN_DURATION,
];

// Two-digit years come first: `%Y` would accept "26" as year 26.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Parse a whole export. Any bad row fails the entire parse.
pub fn parse_records(content: &str) -> Result<Vec<TaskRecord>, AuditError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = ColumnMap::locate(&headers)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(csv_error)?;
        records.push(columns.to_record(&row, index + 1)?);
    }

    debug!(records = records.len(), "parsed export");
    Ok(records)
}

/// Parse an export given as raw bytes, which must be UTF-8.
pub fn parse_records_bytes(bytes: &[u8]) -> Result<Vec<TaskRecord>, AuditError> {
    let content =
        std::str::from_utf8(bytes).map_err(|source| AuditError::InvalidEncoding { source })?;
    parse_records(content)
}

fn csv_error(err: csv::Error) -> AuditError {
    AuditError::Csv {
        message: err.to_string(),
    }
}

/// Header positions of the required columns.
struct ColumnMap {
    user: usize,
    start_date: usize,
    start_time: usize,
    end_date: usize,
    end_time: usize,
    description: usize,
    duration: usize,
}

impl ColumnMap {
    fn locate(headers: &StringRecord) -> Result<Self, AuditError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| AuditError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            user: find(COLUMN_USER)?,
            start_date: find(COLUMN_START_DATE)?,
            start_time: find(COLUMN_START_TIME)?,
            end_date: find(COLUMN_END_DATE)?,
            end_time: find(COLUMN_END_TIME)?,
            description: find(COLUMN_DESCRIPTION)?,
            duration: find(COLUMN_DURATION)?,
        })
    }

    fn to_record(&self, row: &StringRecord, row_number: usize) -> Result<TaskRecord, AuditError> {
        let cell = |index: usize| row.get(index).unwrap_or("");

        let user = cell(self.user);
        if user.is_empty() {
            return Err(AuditError::malformed_row(row_number, COLUMN_USER, "user is empty"));
        }

        let start = combine(
            row_number,
            (COLUMN_START_DATE, cell(self.start_date)),
            (COLUMN_START_TIME, cell(self.start_time)),
        )?;
        let end = combine(
            row_number,
            (COLUMN_END_DATE, cell(self.end_date)),
            (COLUMN_END_TIME, cell(self.end_time)),
        )?;

        let raw_duration = cell(self.duration);
        let duration = parse_duration(raw_duration).ok_or_else(|| {
            AuditError::malformed_row(
                row_number,
                COLUMN_DURATION,
                format!("'{raw_duration}' is not a non-negative number of hours"),
            )
        })?;

        Ok(TaskRecord {
            user: user.to_string(),
            start,
            end,
            start_date: cell(self.start_date).to_string(),
            description: cell(self.description).to_string(),
            duration,
        })
    }
}

fn combine(
    row_number: usize,
    (date_column, date): (&str, &str),
    (time_column, time): (&str, &str),
) -> Result<NaiveDateTime, AuditError> {
    let date = parse_date(date).ok_or_else(|| {
        AuditError::malformed_row(row_number, date_column, format!("unrecognized date '{date}'"))
    })?;
    let time = parse_time(time).ok_or_else(|| {
        AuditError::malformed_row(row_number, time_column, format!("unrecognized time '{time}'"))
    })?;
    Ok(date.and_time(time))
}

/// Parse a date, day-first when ambiguous.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parse a wall-clock time in 24h or 12h notation.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

fn parse_duration(value: &str) -> Option<Decimal> {
    let duration = Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()?;
    (duration >= Decimal::ZERO).then_some(duration)
}
