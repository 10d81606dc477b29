//! Output Formatting and Display Management
//!
//! Renders check results either as coloured terminal text or as JSON.
//!
//! ## Output Formats
//!
//! ### Terminal
//! ```text
//! ================================================================
//! Scheduled Block Hours Check
//! ================================================================
//!
//! 📅 2023-01-01 → 2023-01-02 • 2 flights • 1 page
//!
//! Total SBH: 2h 30min
//! Total pay: 150.00
//! ```
//!
//! Flights that found no schedule entry are listed underneath.
//!
//! ### JSON
//! With `json_output` enabled the [`CheckReport`] is printed as pretty JSON.

use crate::models::*;
use crate::parser::ParsedLog;
use colored::Colorize;

/// `"{h}h {m}min"` for a minute total.
pub fn format_duration(total_minutes: u64) -> String {
    let (hours, minutes) = split_minutes(total_minutes);
    format!("{}h {}min", hours, minutes)
}

/// Pay for `total_minutes` at `rate` per hour, to two decimal places.
pub fn format_pay(total_minutes: u64, rate: f64) -> String {
    format_cents(pay_for(total_minutes, rate))
}

/// Two decimal places, with an exact half cent rounded away from zero.
///
/// `{:.2}` rounds exact ties to even. A binary float sits exactly on a half
/// cent only when it is an odd number of eighths (`.125`, `.375`, `.625`,
/// `.875`), and scaling by 8 is exact, so those are nudged off the tie first.
pub fn format_cents(value: f64) -> String {
    let eighths = value * 8.0;
    if eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return format!("{:.2}", value + value.signum() * 0.001);
    }
    format!("{:.2}", value)
}

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    pub fn build_report(
        &self,
        summary: &DutySummary,
        rate: f64,
        pages: usize,
        range: &DateRange,
        airports: &AirportSet,
    ) -> CheckReport {
        CheckReport {
            total_minutes: summary.total_minutes,
            formatted: format_duration(summary.total_minutes),
            rate,
            pay: format_pay(summary.total_minutes, rate),
            matched: summary.matched,
            unmatched: summary.unmatched_count(),
            unmatched_flights: summary.unmatched.clone(),
            pages,
            start_date: range.start.clone(),
            end_date: range.end.clone(),
            airports: airports.clone(),
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn display_report(&self, report: &CheckReport, json_output: bool) {
        if json_output {
            match serde_json::to_string_pretty(report) {
                Ok(json_str) => println!("{}", json_str),
                Err(e) => eprintln!("Error serializing report to JSON: {}", e),
            }
            return;
        }

        for line in self.render_report(report) {
            println!("{}", line);
        }
    }

    /// Human-readable report, one entry per output line.
    pub fn render_report(&self, report: &CheckReport) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(format!("\n{}", "=".repeat(64).bright_cyan()));
        lines.push(format!(
            "{}",
            "Scheduled Block Hours Check".bright_white().bold()
        ));
        lines.push(format!("{}", "=".repeat(64).bright_cyan()));

        lines.push(format!(
            "\n{} {} → {} • {} flights • {} {}\n",
            "📅".bright_blue(),
            report.start_date.bright_white().bold(),
            report.end_date.bright_white().bold(),
            (report.matched + report.unmatched).to_string().bright_white(),
            report.pages.to_string().bright_white(),
            if report.pages == 1 { "page" } else { "pages" }
        ));

        lines.push(format!(
            "Total SBH: {}",
            report.formatted.bright_green().bold()
        ));
        lines.push(format!("Total pay: {}", report.pay.bright_green().bold()));

        if !report.unmatched_flights.is_empty() {
            lines.push(format!(
                "\n{} {} flights not found in schedule:",
                "⚠️".bright_yellow(),
                report.unmatched.to_string().bright_yellow().bold()
            ));
            for flight in &report.unmatched_flights {
                lines.push(format!(
                    "   {} {} → {}",
                    flight.date.as_deref().unwrap_or("?").bright_white(),
                    flight.departure.as_deref().unwrap_or("?").bright_cyan(),
                    flight.arrival.as_deref().unwrap_or("?").bright_cyan()
                ));
            }
        }

        lines
    }

    pub fn display_inspect(&self, parsed: &ParsedLog, json_output: bool) {
        if json_output {
            let output = serde_json::json!({
                "records": parsed.records.len(),
                "startDate": parsed.range.start,
                "endDate": parsed.range.end,
                "airports": parsed.airports,
            });
            match serde_json::to_string_pretty(&output) {
                Ok(json_str) => println!("{}", json_str),
                Err(e) => eprintln!("Error serializing log summary to JSON: {}", e),
            }
            return;
        }

        println!("\n{} Flight log summary:", "📊".bright_yellow());
        println!(
            "   Records: {}",
            parsed.records.len().to_string().bright_white().bold()
        );
        println!(
            "   Period: {} → {}",
            parsed.range.start.bright_white(),
            parsed.range.end.bright_white()
        );
        println!(
            "   Airports ({}): {}",
            parsed.airports.len().to_string().bright_white().bold(),
            parsed.airports.join(", ").bright_cyan()
        );
    }
}
