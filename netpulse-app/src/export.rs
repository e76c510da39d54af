use std::io;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use jiff::tz::TimeZone;
use netpulse_core::Report;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::session::SessionState;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export requires an admin login")]
    Forbidden,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct ReportCsvRow<'a> {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Provider")]
    provider: &'static str,
    #[serde(rename = "Signal")]
    signal: u8,
    #[serde(rename = "Network Type")]
    network_type: &'static str,
    #[serde(rename = "Issue Type")]
    issue_type: &'static str,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Weather")]
    weather: &'static str,
    #[serde(rename = "User")]
    user: &'a str,
}

impl<'a> ReportCsvRow<'a> {
    fn from_model(report: &'a Report, tz: &TimeZone) -> Self {
        Self {
            id: report.id.0,
            date: report
                .submitted_at
                .to_zoned(tz.clone())
                .strftime("%Y-%m-%d %H:%M:%S")
                .to_string(),
            provider: report.provider.as_str(),
            signal: report.signal_strength.bars(),
            network_type: report.network_type.as_str(),
            issue_type: report.issue_type.as_str(),
            location: &report.location,
            weather: report.weather.map_or("N/A", |w| w.as_str()),
            user: &report.submitted_by,
        }
    }
}

/// `netpulse-reports-YYYY-MM-DD.csv`
pub fn export_file_name(today: Date) -> String {
    format!("netpulse-reports-{}.csv", today.strftime("%Y-%m-%d"))
}

/// Writes a header and one row per report, in collection order.
pub fn write_reports_csv<W: io::Write>(
    reports: &[Report],
    tz: &TimeZone,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    if reports.is_empty() {
        // serialize() only emits the header together with the first row.
        wtr.write_record([
            "ID",
            "Date",
            "Provider",
            "Signal",
            "Network Type",
            "Issue Type",
            "Location",
            "Weather",
            "User",
        ])?;
    }

    for report in reports {
        wtr.serialize(ReportCsvRow::from_model(report, tz))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the session's reports into `dir`. Only a privileged identity may
/// export, whatever view the caller is on.
pub fn export_reports(
    state: &SessionState,
    dir: &Path,
    today: Date,
    tz: &TimeZone,
) -> Result<PathBuf, ExportError> {
    if !state.identity.as_ref().is_some_and(|i| i.is_privileged) {
        return Err(ExportError::Forbidden);
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(today));
    let file = std::fs::File::create(&path)?;
    write_reports_csv(&state.reports, tz, io::BufWriter::new(file))?;

    info!(path = ?path, reports = state.reports.len(), "reports exported");
    Ok(path)
}
