//! Core Data Models
//!
//! This module defines the data structures that flow through an SBH check, from
//! the raw flight-log rows to the final report.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`LogRecord`] - One row of the uploaded flight-log CSV
//! 2. **Query**: [`DateRange`] and [`AirportSet`] - Derived from all rows, used to
//!    build the [`ScheduleQuery`]
//! 3. **Lookup**: [`SchedulePage`] / [`ScheduleRecord`] - Pages returned by the
//!    schedule service, flattened before reconciliation
//! 4. **Output**: [`DutySummary`] and [`CheckReport`] - Accumulated block minutes,
//!    pay, and the rows that found no schedule entry
//!
//! ## Features
//!
//! - **Serde Integration**: Schedule types deserialize straight from the lookup
//!   JSON; report types serialize to the `--json` output
//! - **Optional Fields**: Short CSV rows and sparse schedule entries are modelled
//!   with `Option` rather than empty strings

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Header name holding the flight date.
pub const DATE_FIELD: &str = "DATE";
/// Header name holding the departure airport code.
pub const DEPARTURE_FIELD: &str = "DEPARTURE_AIRPORT";
/// Header name holding the arrival airport code.
pub const ARRIVAL_FIELD: &str = "ARRIVAL_AIRPORT";

/// A single flight-log row keyed by the header names.
///
/// A value is `None` when the row had fewer columns than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    fields: HashMap<String, Option<String>>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.fields.insert(key.into(), value);
    }

    /// Value of `key`, or `None` if the column is unknown or was missing on this row.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_deref())
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn date(&self) -> Option<&str> {
        self.get(DATE_FIELD)
    }

    pub fn departure(&self) -> Option<&str> {
        self.get(DEPARTURE_FIELD)
    }

    pub fn arrival(&self) -> Option<&str> {
        self.get(ARRIVAL_FIELD)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LogRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = LogRecord::new();
        for (key, value) in iter {
            record.insert(key, Some(value.into()));
        }
        record
    }
}

/// Airport codes in first-seen order, each present once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AirportSet {
    codes: Vec<String>,
}

impl AirportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `code` unless already present. Returns whether it was added.
    pub fn insert(&mut self, code: &str) -> bool {
        if self.contains(code) {
            return false;
        }
        self.codes.push(code.to_string());
        true
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.codes
    }

    pub fn join(&self, sep: &str) -> String {
        self.codes.join(sep)
    }
}

/// First and last `DATE` of the log, used as the lookup window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Parameters of the initial schedule lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub range: DateRange,
    pub carrier: String,
    pub airports: AirportSet,
    pub code_type: String,
    pub version: String,
}

/// Reads an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirportRef {
    #[serde(default)]
    pub iata: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleDate {
    #[serde(default)]
    pub utc: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleEndpoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub airport: AirportRef,
    #[serde(default)]
    pub date: Option<ScheduleDate>,
}

/// One entry of the schedule service response. Fields not listed are ignored,
/// and a `null` in any listed field reads as its empty value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub departure: ScheduleEndpoint,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival: ScheduleEndpoint,
    /// Block time in minutes; `null` counts as 0.
    #[serde(rename = "elapsedTime", default, deserialize_with = "null_as_default")]
    pub elapsed_time: u32,
}

impl ScheduleRecord {
    pub fn departure_airport(&self) -> Option<&str> {
        self.departure.airport.iata.as_deref()
    }

    pub fn arrival_airport(&self) -> Option<&str> {
        self.arrival.airport.iata.as_deref()
    }

    pub fn departure_date(&self) -> Option<&str> {
        self.departure.date.as_ref().and_then(|d| d.utc.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// A single page of lookup results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulePage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ScheduleRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paging: Paging,
}

impl SchedulePage {
    /// Continuation token, treating an empty string as absent.
    pub fn next_token(&self) -> Option<&str> {
        self.paging.next.as_deref().filter(|t| !t.is_empty())
    }
}

/// A log row that no schedule entry matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedFlight {
    pub date: Option<String>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

impl From<&LogRecord> for UnmatchedFlight {
    fn from(record: &LogRecord) -> Self {
        Self {
            date: record.date().map(str::to_string),
            departure: record.departure().map(str::to_string),
            arrival: record.arrival().map(str::to_string),
        }
    }
}

/// Result of reconciling a flight log against the schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DutySummary {
    pub total_minutes: u64,
    pub matched: usize,
    pub unmatched: Vec<UnmatchedFlight>,
}

/// Whole hours and leftover minutes of a minute total.
pub fn split_minutes(total_minutes: u64) -> (u64, u64) {
    (total_minutes / 60, total_minutes % 60)
}

/// `(minutes / 60) * rate`, unrounded.
pub fn pay_for(total_minutes: u64, rate: f64) -> f64 {
    total_minutes as f64 / 60.0 * rate
}

impl DutySummary {
    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }
}

/// Serializable outcome of a full check, printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    #[serde(rename = "totalMinutes")]
    pub total_minutes: u64,
    pub formatted: String,
    pub rate: f64,
    pub pay: String,
    pub matched: usize,
    pub unmatched: usize,
    #[serde(rename = "unmatchedFlights")]
    pub unmatched_flights: Vec<UnmatchedFlight>,
    pub pages: usize,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub airports: AirportSet,
    #[serde(rename = "checkedAt")]
    pub checked_at: chrono::DateTime<chrono::Utc>,
}
