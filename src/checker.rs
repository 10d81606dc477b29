//! SBH Check Engine
//!
//! [`SbhChecker`] runs the whole pipeline for one flight log:
//!
//! 1. **Selection**: the file in [`AppState`] must be present and have the `csv` media type
//! 2. **Parsing**: the log is parsed and the date window and airport set derived
//! 3. **Lookup**: all schedule pages for the derived query are fetched in order
//! 4. **Reconciliation**: every row is matched and the block minutes summed
//!
//! [`AppState`] holds what the user chose (file, rate) and what the last run
//! produced (status, total). Each run moves the status to `Loading` and then to
//! `Success` or `Error`. A failed run leaves the previous total untouched.
//!
//! ```rust,no_run
//! use sbh_check::checker::{AppState, SbhChecker};
//! use sbh_check::config::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let checker = SbhChecker::from_config(&config)?;
//! let mut state = AppState::new(config.pay.rate);
//! state.select_file("logbook.csv")?;
//! let outcome = checker.run(&mut state).await?;
//! println!("{} minutes", outcome.summary.total_minutes);
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, LookupConfig};
use crate::error::{SbhError, SbhResult};
use crate::logging::check_span;
use crate::lookup::{fetch_all_schedules, HttpScheduleSource, ScheduleSource};
use crate::models::*;
use crate::parser::{ensure_csv, read_log_file, LogParser, ParseMode, ParsedLog};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn, Instrument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub file: Option<PathBuf>,
    pub rate: f64,
    pub status: Status,
    pub total_minutes: u64,
}

impl AppState {
    pub fn new(rate: f64) -> Self {
        Self {
            file: None,
            rate,
            status: Status::Idle,
            total_minutes: 0,
        }
    }

    /// Selects a flight log. A non-CSV file is rejected and clears the selection.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> SbhResult<()> {
        let path = path.into();
        match ensure_csv(&path) {
            Ok(()) => {
                self.file = Some(path);
                Ok(())
            }
            Err(e) => {
                self.file = None;
                Err(e)
            }
        }
    }

    /// Pay for the last successful total at the current rate.
    pub fn pay(&self) -> f64 {
        pay_for(self.total_minutes, self.rate)
    }
}

/// Everything a successful check produced.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub parsed: ParsedLog,
    pub summary: DutySummary,
    pub pages: usize,
}

pub struct SbhChecker<S> {
    source: S,
    parser: LogParser,
    carrier: String,
    code_type: String,
    version: String,
    max_pages: usize,
}

impl SbhChecker<HttpScheduleSource> {
    pub fn from_config(config: &Config) -> SbhResult<Self> {
        let source = HttpScheduleSource::from_config(&config.lookup)?;
        let mode = if config.pay.strict_rows {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        };
        Ok(Self::new(source, LogParser::new(mode), &config.lookup))
    }
}

impl<S: ScheduleSource> SbhChecker<S> {
    pub fn new(source: S, parser: LogParser, lookup: &LookupConfig) -> Self {
        Self {
            source,
            parser,
            carrier: lookup.carrier.clone(),
            code_type: lookup.code_type.clone(),
            version: lookup.version.clone(),
            max_pages: lookup.max_pages,
        }
    }

    pub fn build_query(&self, parsed: &ParsedLog) -> ScheduleQuery {
        ScheduleQuery {
            range: parsed.range.clone(),
            carrier: self.carrier.clone(),
            airports: parsed.airports.clone(),
            code_type: self.code_type.clone(),
            version: self.version.clone(),
        }
    }

    /// Runs parse, lookup and reconciliation over already loaded log text.
    pub async fn check_text(&self, text: &str) -> SbhResult<CheckOutcome> {
        let parsed = self.parser.parse_and_derive(text)?;
        let query = self.build_query(&parsed);

        let fetch = fetch_all_schedules(&self.source, &query, self.max_pages).await?;
        let summary = crate::reconcile::reconcile(&parsed.records, &fetch.records);

        Ok(CheckOutcome {
            parsed,
            summary,
            pages: fetch.pages,
        })
    }

    /// Checks the file selected in `state` and records the outcome there.
    pub async fn run(&self, state: &mut AppState) -> SbhResult<CheckOutcome> {
        state.status = Status::Loading;

        let file_label = state
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let result = self
            .run_selected(state.file.clone())
            .instrument(check_span(&file_label))
            .await;

        match &result {
            Ok(outcome) => {
                state.total_minutes = outcome.summary.total_minutes;
                state.status = Status::Success;
                info!(
                    total_minutes = outcome.summary.total_minutes,
                    matched = outcome.summary.matched,
                    unmatched = outcome.summary.unmatched_count(),
                    "Check complete"
                );
            }
            Err(e) => {
                if matches!(e, SbhError::WrongFileType { .. }) {
                    state.file = None;
                }
                state.status = Status::Error;
                warn!(error = %e, "Check failed");
            }
        }

        result
    }

    async fn run_selected(&self, file: Option<PathBuf>) -> SbhResult<CheckOutcome> {
        let path = file.ok_or(SbhError::NoFile)?;
        let text = read_log_file(&path).await?;
        self.check_text(&text).await
    }
}
