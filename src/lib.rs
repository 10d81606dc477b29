//! SBH Check Library
//!
//! Reconciles a pilot's flight-log export against a flight schedule service and
//! totals the Scheduled Block Hours (SBH) and the pay they earn.
//!
//! ## Architecture Overview
//!
//! - [`parser`] - CSV flight-log parsing, date window and airport set derivation
//! - [`lookup`] - Schedule service client and sequential pagination
//! - [`reconcile`] - Matching log rows to schedule entries and summing block time
//! - [`checker`] - End-to-end pipeline and the explicit application state
//! - [`display`] - Terminal and JSON rendering
//! - [`config`] - Configuration with file and environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//! - [`error`] - Error type shared by all of the above
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use sbh_check::{AppState, SbhChecker};
//! use sbh_check::config::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let checker = SbhChecker::from_config(&config)?;
//!
//! let mut state = AppState::new(config.pay.rate);
//! state.select_file("logbook.csv")?;
//! checker.run(&mut state).await?;
//! println!("pay: {}", sbh_check::display::format_pay(state.total_minutes, state.rate));
//! # Ok(())
//! # }
//! ```

pub mod checker;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod parser;
pub mod reconcile;

pub use checker::{AppState, CheckOutcome, SbhChecker, Status};
pub use error::{SbhError, SbhResult};
pub use models::*;
