//! Flight-log parsing
//!
//! Turns an exported flight log into [`LogRecord`]s and derives the lookup
//! window and airport list from them.
//!
//! The format is deliberately naive: the first line is a comma separated
//! header, every other non-empty line is split on commas and zipped against
//! the header by position. Quotes carry no meaning, so a field can never
//! contain a comma. Rows shorter than the header are partially filled in
//! [`ParseMode::Lenient`] and rejected in [`ParseMode::Strict`].

use crate::error::{SbhError, SbhResult};
use crate::models::*;
use std::path::Path;
use tracing::{debug, info};

/// How to treat a row with fewer fields than the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Missing trailing fields are recorded as absent.
    #[default]
    Lenient,
    /// A short row fails the whole parse.
    Strict,
}

/// A parsed log together with everything the lookup needs.
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub records: Vec<LogRecord>,
    pub range: DateRange,
    pub airports: AirportSet,
}

#[derive(Debug, Clone, Default)]
pub struct LogParser {
    mode: ParseMode,
}

impl LogParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    /// Parses raw CSV text into records, skipping empty lines.
    pub fn parse_log(&self, text: &str) -> SbhResult<Vec<LogRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result?;

            if row.len() < headers.len() {
                let line = row.position().map(|p| p.line() as usize).unwrap_or(0);
                if self.mode == ParseMode::Strict {
                    return Err(SbhError::ShortRow {
                        line,
                        expected: headers.len(),
                        found: row.len(),
                    });
                }
                debug!(
                    line,
                    expected = headers.len(),
                    found = row.len(),
                    "Short row, missing fields left empty"
                );
            }

            let mut record = LogRecord::new();
            for (index, key) in headers.iter().enumerate() {
                record.insert(key, row.get(index).map(str::to_string));
            }
            records.push(record);
        }

        debug!(records = records.len(), columns = headers.len(), "Parsed flight log");
        Ok(records)
    }

    /// Parses the log and derives the date range and airport set in one go.
    pub fn parse_and_derive(&self, text: &str) -> SbhResult<ParsedLog> {
        let records = self.parse_log(text)?;
        let range = date_range(&records)?;
        let airports = collect_airports(&records);

        info!(
            records = records.len(),
            start = %range.start,
            end = %range.end,
            airports = airports.len(),
            "Derived lookup parameters from flight log"
        );

        Ok(ParsedLog {
            records,
            range,
            airports,
        })
    }
}

/// Takes the `DATE` of the first and the last record as the lookup window.
pub fn date_range(records: &[LogRecord]) -> SbhResult<DateRange> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SbhError::EmptyLog),
    };

    let start = first
        .date()
        .ok_or(SbhError::MissingField { field: DATE_FIELD })?;
    let end = last
        .date()
        .ok_or(SbhError::MissingField { field: DATE_FIELD })?;

    Ok(DateRange {
        start: start.to_string(),
        end: end.to_string(),
    })
}

/// Collects departure and arrival codes in first-seen order.
pub fn collect_airports(records: &[LogRecord]) -> AirportSet {
    let mut airports = AirportSet::new();
    for record in records {
        if let Some(code) = record.departure() {
            airports.insert(code);
        }
        if let Some(code) = record.arrival() {
            airports.insert(code);
        }
    }
    airports
}

/// Media type implied by the file extension.
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("txt") | Some("log") => "text/plain",
        Some("tsv") => "text/tab-separated-values",
        Some("json") => "application/json",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Rejects anything whose media subtype is not `csv`.
pub fn ensure_csv(path: &Path) -> SbhResult<()> {
    let media_type = media_type_for(path);
    let subtype = media_type.split('/').nth(1).unwrap_or_default();
    if subtype != "csv" {
        return Err(SbhError::WrongFileType {
            path: path.to_path_buf(),
            media_type: media_type.to_string(),
        });
    }
    Ok(())
}

/// Checks the media type and reads the whole log as text.
pub async fn read_log_file(path: &Path) -> SbhResult<String> {
    ensure_csv(path)?;
    let contents = tokio::fs::read_to_string(path).await?;
    debug!(path = %path.display(), bytes = contents.len(), "Read flight log");
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = "DATE, DEPARTURE_AIRPORT ,ARRIVAL_AIRPORT\n\
                          2023-01-01, DUB ,STN\n\
                          \n\
                          2023-01-02,STN,BCN\n\
                          2023-01-03,BCN,DUB\n";

    #[test]
    fn test_parse_counts_non_blank_rows() {
        let records = LogParser::default().parse_log(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].departure(), Some("DUB"));
        assert_eq!(records[0].arrival(), Some("STN"));
        assert_eq!(records[2].date(), Some("2023-01-03"));
    }

    #[test]
    fn test_parse_trims_header_names() {
        let records = LogParser::default().parse_log(SAMPLE).unwrap();
        assert!(records[0].has_field("DEPARTURE_AIRPORT"));
        assert!(!records[0].has_field(" DEPARTURE_AIRPORT "));
        assert_eq!(records[0].field_count(), 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT\r\n2023-01-01,DUB,STN\r\n\r\n";
        let records = LogParser::default().parse_log(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].arrival(), Some("STN"));
    }

    #[test]
    fn test_quotes_are_plain_characters() {
        let text = "DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT,NOTE\n2023-01-01,DUB,STN,\"late, again\"\n";
        let records = LogParser::default().parse_log(text).unwrap();
        assert_eq!(records[0].get("NOTE"), Some("\"late"));
    }

    #[test]
    fn test_short_row_partially_filled_when_lenient() {
        let text = "DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT\n2023-01-01,DUB\n";
        let records = LogParser::new(ParseMode::Lenient).parse_log(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].departure(), Some("DUB"));
        assert_eq!(records[0].arrival(), None);
    }

    #[test]
    fn test_short_row_rejected_when_strict() {
        let text = "DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT\n2023-01-01,DUB,STN\n2023-01-02,STN\n";
        let err = LogParser::new(ParseMode::Strict).parse_log(text).unwrap_err();
        match err {
            SbhError::ShortRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_surplus_columns_ignored() {
        let text = "DATE,DEPARTURE_AIRPORT\n2023-01-01,DUB,STN,extra\n";
        let records = LogParser::default().parse_log(text).unwrap();
        assert_eq!(records[0].field_count(), 2);
        assert_eq!(records[0].departure(), Some("DUB"));
    }

    #[test]
    fn test_date_range_uses_first_and_last_rows() {
        let records = LogParser::default().parse_log(SAMPLE).unwrap();
        let range = date_range(&records).unwrap();
        assert_eq!(range.start, "2023-01-01");
        assert_eq!(range.end, "2023-01-03");
    }

    #[test]
    fn test_date_range_of_empty_log() {
        let records = LogParser::default()
            .parse_log("DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT\n")
            .unwrap();
        assert!(matches!(date_range(&records), Err(SbhError::EmptyLog)));
    }

    #[test]
    fn test_collect_airports_first_seen_order() {
        let records = LogParser::default().parse_log(SAMPLE).unwrap();
        let airports = collect_airports(&records);
        assert_eq!(airports.as_slice(), &["DUB", "STN", "BCN"]);
    }

    #[test]
    fn test_media_type_check() {
        assert!(ensure_csv(&PathBuf::from("logbook.csv")).is_ok());
        assert!(ensure_csv(&PathBuf::from("LOGBOOK.CSV")).is_ok());

        let err = ensure_csv(&PathBuf::from("logbook.xlsx")).unwrap_err();
        assert!(matches!(err, SbhError::WrongFileType { .. }));
        assert!(ensure_csv(&PathBuf::from("logbook")).is_err());
    }
}
