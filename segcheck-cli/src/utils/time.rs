use std::time::Duration;

use crate::error::AppError;

/// Parse a duration with an optional unit (s, m, h); a bare number is seconds
pub fn parse_time(time_str: &str) -> Result<Duration, AppError> {
    let time_str = time_str.trim();
    if time_str.is_empty() {
        return Err(AppError::ParseError(
            "Invalid format: empty string".to_string(),
        ));
    }

    let split_index = time_str
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(time_str.len());

    let value = time_str[..split_index]
        .parse::<f64>()
        .map_err(|_| AppError::ParseError(format!("Invalid number in '{time_str}'")))?;

    let seconds = match time_str[split_index..].trim().to_lowercase().as_str() {
        "" | "s" => value,
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        unit => {
            return Err(AppError::ParseError(format!(
                "Invalid unit '{unit}' in '{time_str}'"
            )));
        }
    };

    Duration::try_from_secs_f64(seconds)
        .map_err(|_| AppError::ParseError(format!("Duration out of range: '{time_str}'")))
}

/// Elapsed time the way the summary line shows it
pub fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}
