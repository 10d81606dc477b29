//! Schedule reconciliation
//!
//! Matches every flight-log row against the fetched schedule and sums the
//! block time of the matches. A row matches the first schedule entry with the
//! same departure airport, arrival airport and UTC departure date, compared as
//! exact strings. Rows without a match add nothing and are reported back.

use crate::models::*;
use tracing::{debug, warn};

/// First schedule entry matching `record`, if any.
///
/// A record with a missing date or airport never matches.
pub fn find_match<'a>(
    record: &LogRecord,
    schedules: &'a [ScheduleRecord],
) -> Option<&'a ScheduleRecord> {
    let departure = record.departure()?;
    let arrival = record.arrival()?;
    let date = record.date()?;

    schedules.iter().find(|entry| {
        entry.departure_airport() == Some(departure)
            && entry.arrival_airport() == Some(arrival)
            && entry.departure_date() == Some(date)
    })
}

#[derive(Debug, Default)]
pub struct Reconciler {
    summary: DutySummary,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record to the running total. Returns the minutes it contributed.
    pub fn add(&mut self, record: &LogRecord, schedules: &[ScheduleRecord]) -> u32 {
        match find_match(record, schedules) {
            Some(entry) => {
                self.summary.total_minutes += u64::from(entry.elapsed_time);
                self.summary.matched += 1;
                entry.elapsed_time
            }
            None => {
                warn!(
                    date = record.date().unwrap_or("-"),
                    departure = record.departure().unwrap_or("-"),
                    arrival = record.arrival().unwrap_or("-"),
                    "Flight not found in schedule"
                );
                self.summary.unmatched.push(UnmatchedFlight::from(record));
                0
            }
        }
    }

    pub fn total_minutes(&self) -> u64 {
        self.summary.total_minutes
    }

    pub fn finish(self) -> DutySummary {
        debug!(
            total_minutes = self.summary.total_minutes,
            matched = self.summary.matched,
            unmatched = self.summary.unmatched.len(),
            "Reconciliation finished"
        );
        self.summary
    }
}

/// Reconciles every record against the flattened schedule.
pub fn reconcile(records: &[LogRecord], schedules: &[ScheduleRecord]) -> DutySummary {
    let mut reconciler = Reconciler::new();
    for record in records {
        reconciler.add(record, schedules);
    }
    reconciler.finish()
}
