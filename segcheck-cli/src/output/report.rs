use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use segcheck_engine::{RunReport, SegmentCase};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::utils::format_duration;

/// How reports are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One line per case plus a summary line
    #[default]
    Text,
    /// The whole report as a JSON document
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown report format: {s}")),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Report destination: a file when a path is given, stdout otherwise
pub fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            debug!("Writing report to {}", path.display());
            Ok(Box::new(BufWriter::new(File::create(path)?)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[derive(Serialize)]
struct Collection<'a> {
    master_url: &'a str,
    total: usize,
    cases: &'a [SegmentCase],
}

/// List the discovered cases without running them
pub fn render_collection(
    master_url: &str,
    cases: &[SegmentCase],
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    match format {
        ReportFormat::Text => {
            for case in cases {
                writeln!(out, "{}", case.url)?;
            }
            let noun = if cases.len() == 1 { "segment" } else { "segments" };
            writeln!(out, "\n{} {noun} collected from {master_url}", cases.len())?;
        }
        ReportFormat::Json => {
            let collection = Collection {
                master_url,
                total: cases.len(),
                cases,
            };
            serde_json::to_writer_pretty(&mut *out, &collection)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Render the outcome of every case followed by the summary
pub fn render_run(report: &RunReport, format: ReportFormat, out: &mut dyn Write) -> Result<(), AppError> {
    match format {
        ReportFormat::Text => {
            for case in &report.cases {
                match case.outcome.reason() {
                    Some(reason) => writeln!(
                        out,
                        "{:<7} {} - {reason}",
                        case.outcome.label(),
                        case.case.url
                    )?,
                    None => writeln!(out, "{:<7} {}", case.outcome.label(), case.case.url)?,
                }
            }
            writeln!(
                out,
                "\n{} in {}",
                report.summary,
                format_duration(report.elapsed())
            )?;
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    info!(
        passed = report.summary.passed,
        failed = report.summary.failed,
        errors = report.summary.errors,
        "Report written"
    );
    Ok(())
}
